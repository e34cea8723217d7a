//! Tick-indexed liquidity ledger.
//!
//! Slots are stored contiguously from `lower_tick` upward, one slot per
//! `tick_space`. The ledger only grows: extending down prepends zero slots
//! and rebases the origin, extending up appends zero slots.

use std::collections::VecDeque;

/// Aggregate liquidity per tick over a contiguous, grow-only tick window.
#[derive(Debug, Clone, PartialEq)]
pub struct TickLedger {
    lower_tick: i32,
    tick_space: i32,
    slots: VecDeque<f64>,
}

impl TickLedger {
    /// Creates a zeroed ledger covering `[lower_tick, upper_tick]`.
    ///
    /// Both bounds must be multiples of `tick_space`; an inverted window is
    /// collapsed to the single slot at `lower_tick`.
    pub fn new(lower_tick: i32, upper_tick: i32, tick_space: i32) -> Self {
        debug_assert!(tick_space > 0);
        let len = ((upper_tick - lower_tick).max(0) / tick_space) as usize + 1;
        Self {
            lower_tick,
            tick_space,
            slots: VecDeque::from(vec![0.0; len]),
        }
    }

    /// Lowest materialized tick.
    pub fn lower_tick(&self) -> i32 {
        self.lower_tick
    }

    /// Highest materialized tick.
    pub fn upper_tick(&self) -> i32 {
        self.lower_tick + (self.slots.len() as i32 - 1) * self.tick_space
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// A ledger always holds at least one slot.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `tick` lies inside the materialized window.
    pub fn contains(&self, tick: i32) -> bool {
        tick >= self.lower_tick && tick <= self.upper_tick()
    }

    /// Slot index of `tick`, if materialized.
    pub fn index_of(&self, tick: i32) -> Option<usize> {
        self.contains(tick)
            .then(|| ((tick - self.lower_tick) / self.tick_space) as usize)
    }

    /// Tick stored at slot `index`.
    pub fn tick_of(&self, index: usize) -> i32 {
        self.lower_tick + index as i32 * self.tick_space
    }

    /// Aggregate liquidity at `tick`. Ticks outside the window hold none.
    pub fn liquidity_at(&self, tick: i32) -> f64 {
        self.index_of(tick).map_or(0.0, |i| self.slots[i])
    }

    /// Grows the window so that `tick` is materialized. Existing slots keep
    /// their values; a tick already inside is a no-op.
    pub fn extend_to(&mut self, tick: i32) {
        let upper = self.upper_tick();
        if tick > upper {
            let extra = ((tick - upper) / self.tick_space) as usize;
            self.slots.extend(std::iter::repeat_n(0.0, extra));
        }
        if tick < self.lower_tick {
            let extra = (self.lower_tick - tick) / self.tick_space;
            for _ in 0..extra {
                self.slots.push_front(0.0);
            }
            self.lower_tick -= extra * self.tick_space;
        }
    }

    /// Adds `liquidity` to every slot in `[min_tick, max_tick]` inclusive,
    /// extending the window first when needed.
    pub fn add_liquidity(&mut self, min_tick: i32, max_tick: i32, liquidity: f64) {
        self.extend_to(min_tick);
        self.extend_to(max_tick);
        let start = ((min_tick - self.lower_tick) / self.tick_space) as usize;
        let end = ((max_tick - self.lower_tick) / self.tick_space) as usize;
        for slot in self.slots.range_mut(start..=end) {
            *slot += liquidity;
        }
    }

    /// Iterates `(tick, liquidity)` pairs from the lowest tick upward.
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, &liquidity)| (self.tick_of(i), liquidity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ledger_bounds() {
        let ledger = TickLedger::new(-20, 30, 10);
        assert_eq!(ledger.len(), 6);
        assert_eq!(ledger.lower_tick(), -20);
        assert_eq!(ledger.upper_tick(), 30);
        assert_eq!(ledger.index_of(0), Some(2));
        assert_eq!(ledger.index_of(40), None);
        assert_eq!(ledger.tick_of(5), 30);
    }

    #[test]
    fn test_extend_preserves_slots() {
        let mut ledger = TickLedger::new(0, 20, 10);
        ledger.add_liquidity(0, 10, 5.0);

        ledger.extend_to(50);
        assert_eq!(ledger.upper_tick(), 50);
        ledger.extend_to(-30);
        assert_eq!(ledger.lower_tick(), -30);
        assert_eq!(ledger.len(), 9);

        assert_eq!(ledger.liquidity_at(0), 5.0);
        assert_eq!(ledger.liquidity_at(10), 5.0);
        assert_eq!(ledger.liquidity_at(20), 0.0);
        assert_eq!(ledger.liquidity_at(-30), 0.0);
    }

    #[test]
    fn test_extend_inside_is_noop() {
        let mut ledger = TickLedger::new(0, 20, 10);
        let before = ledger.clone();
        ledger.extend_to(10);
        ledger.extend_to(0);
        ledger.extend_to(20);
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_add_liquidity_outside_window_grows() {
        let mut ledger = TickLedger::new(0, 20, 10);
        ledger.add_liquidity(-20, 40, 2.5);
        ledger.add_liquidity(10, 20, 1.0);

        assert_eq!(ledger.lower_tick(), -20);
        assert_eq!(ledger.upper_tick(), 40);
        let values: Vec<f64> = ledger.iter().map(|(_, l)| l).collect();
        assert_eq!(values, vec![2.5, 2.5, 2.5, 3.5, 3.5, 2.5, 2.5]);
    }

    #[test]
    fn test_liquidity_outside_window_is_zero() {
        let ledger = TickLedger::new(0, 20, 10);
        assert_eq!(ledger.liquidity_at(-10), 0.0);
        assert_eq!(ledger.liquidity_at(100), 0.0);
    }
}
