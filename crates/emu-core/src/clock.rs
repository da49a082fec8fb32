//! The shared time base.

/// Colour clocks per CPU cycle.
///
/// The TIA runs at the NTSC colour-burst frequency and the 6507 runs at a
/// third of it, so every CPU cycle is worth three clock ticks.
pub const CYCLES_TO_CLOCK: u64 = 3;

/// A monotonically increasing count of colour clocks.
///
/// This is the single piece of mutable state that every component agrees
/// on. CPU instructions advance it by whole cycles, `WSYNC` advances it to
/// the next scanline boundary, and the TIA and RIOT derive their state
/// from it lazily whenever they are accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Clock(u64);

impl Clock {
    #[must_use]
    pub const fn new(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Current clock value.
    #[must_use]
    pub const fn now(self) -> u64 {
        self.0
    }

    /// Advance by raw colour clocks.
    pub fn advance(&mut self, ticks: u64) {
        self.0 += ticks;
    }

    /// Advance by CPU cycles.
    pub fn cycles(&mut self, cycles: u64) {
        self.0 += cycles * CYCLES_TO_CLOCK;
    }

    /// Overwrite the clock (save-state restore only).
    pub fn set(&mut self, ticks: u64) {
        self.0 = ticks;
    }
}

impl core::ops::AddAssign<u64> for Clock {
    fn add_assign(&mut self, rhs: u64) {
        self.0 += rhs;
    }
}

impl From<Clock> for u64 {
    fn from(clock: Clock) -> Self {
        clock.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_are_three_ticks() {
        let mut clock = Clock::new(10);
        clock.cycles(2);
        assert_eq!(clock.now(), 16);
        clock += 4;
        assert_eq!(clock.now(), 20);
    }
}
