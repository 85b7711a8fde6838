//! Cosmetic progress model.
//!
//! A time-driven percentage shown while the real job runs. It creeps
//! toward [`COSMETIC_PROGRESS_CAP`] with shrinking steps and is snapped
//! to 100 only once real completion is observed.

use crate::polling::COSMETIC_PROGRESS_CAP;

/// Divisor applied to the remaining distance on each tick.
const APPROACH_DIVISOR: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CosmeticProgress {
    value: u8,
    cap: u8,
}

impl Default for CosmeticProgress {
    fn default() -> Self {
        Self::new(COSMETIC_PROGRESS_CAP)
    }
}

impl CosmeticProgress {
    /// `cap` is clamped to 99 so that 100 always means "really done".
    pub fn new(cap: u8) -> Self {
        Self {
            value: 0,
            cap: cap.min(99),
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn cap(&self) -> u8 {
        self.cap
    }

    pub fn is_complete(&self) -> bool {
        self.value == 100
    }

    /// Move one tick toward the cap and return the new value.
    ///
    /// The step is a tenth of the remaining distance, at least 1.
    /// No-op at the cap or after [`complete`](Self::complete).
    pub fn advance(&mut self) -> u8 {
        if self.is_complete() || self.value >= self.cap {
            return self.value;
        }
        let step = ((self.cap - self.value) / APPROACH_DIVISOR).max(1);
        self.value = (self.value + step).min(self.cap);
        self.value
    }

    /// Snap to 100.
    pub fn complete(&mut self) -> u8 {
        self.value = 100;
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}
