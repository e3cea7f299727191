//! Level bookkeeping and anti-starvation selection for `PriorityQueue`.
//!
//! The selector never touches items. It tracks the highest occupied level,
//! the item total and one skip counter per level, and decides which level
//! an any-level removal should service. Occupancy is supplied by the caller
//! as a predicate so the selector stays independent of the storage.

/// Which level the next any-level removal services, and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub level: usize,
    /// True when a starved level was chosen over `top`.
    pub promoted: bool,
}

/// Bookkeeping shared by every operation of a `PriorityQueue`.
#[derive(Debug, Clone)]
pub struct LevelSelector {
    top: usize,
    total: usize,
    /// Consecutive any-level removals that skipped each nonempty level.
    waiting: Vec<usize>,
    wait_limit: usize,
}

impl LevelSelector {
    /// Create bookkeeping for levels `0..=max_priority`.
    pub fn new(max_priority: usize, wait_limit: usize) -> Self {
        Self {
            top: 0,
            total: 0,
            waiting: vec![0; max_priority.saturating_add(1)],
            wait_limit,
        }
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn wait_limit(&self) -> usize {
        self.wait_limit
    }

    pub fn max_priority(&self) -> usize {
        self.waiting.len() - 1
    }

    /// Skip counter for `level`, or `None` if out of range.
    pub fn waiting(&self, level: usize) -> Option<usize> {
        self.waiting.get(level).copied()
    }

    /// Clip a requested priority into `0..=max_priority`.
    pub fn clip(&self, priority: usize) -> usize {
        priority.min(self.max_priority())
    }

    /// Account for an item added at `level` (already clipped).
    pub fn record_add(&mut self, level: usize) {
        self.total += 1;
        if level > self.top {
            self.top = level;
            self.waiting[level] = 0;
        }
    }

    /// Pick the level for the next any-level removal and advance the
    /// skip counters.
    ///
    /// Must only be called while `total > 0`; the chosen level is then
    /// guaranteed to be occupied.
    pub fn next_level<F>(&mut self, occupied: F) -> Selection
    where
        F: Fn(usize) -> bool,
    {
        let selection = self.select(&occupied);
        if self.wait_limit == 0 || self.top == 0 {
            return selection;
        }
        for level in 0..=self.top {
            if level != selection.level && occupied(level) {
                self.waiting[level] += 1;
            }
        }
        self.waiting[selection.level] = 0;
        selection
    }

    /// The level `next_level` would pick, without advancing counters.
    pub fn peek_level<F>(&self, occupied: F) -> Selection
    where
        F: Fn(usize) -> bool,
    {
        self.select(&occupied)
    }

    /// Account for an item removed from `level`.
    ///
    /// Resets the level's skip counter and walks `top` down past empty
    /// levels.
    pub fn record_remove<F>(&mut self, level: usize, occupied: F)
    where
        F: Fn(usize) -> bool,
    {
        self.total = self.total.saturating_sub(1);
        self.waiting[level] = 0;
        if self.total == 0 {
            self.top = 0;
            return;
        }
        while self.top > 0 && !occupied(self.top) {
            self.top -= 1;
        }
    }

    /// Forget all items and counters.
    pub fn reset(&mut self) {
        self.top = 0;
        self.total = 0;
        self.waiting.iter_mut().for_each(|w| *w = 0);
    }

    fn select<F>(&self, occupied: &F) -> Selection
    where
        F: Fn(usize) -> bool,
    {
        let top = Selection { level: self.top, promoted: false };
        if self.wait_limit == 0 || self.top == 0 {
            return top;
        }
        (0..=self.top)
            .rev()
            .find(|&level| occupied(level) && self.waiting[level] >= self.wait_limit)
            .map_or(top, |level| Selection {
                level,
                promoted: level != self.top,
            })
    }
}
