use std::time::Duration;

use crate::foundation::error::{ReelError, ReelResult};

/// Frame rate as a rational `num / den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Frames per `den` seconds.
    pub num: u32,
    /// Seconds denominator. Never zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Validated frame rate; both parts must be non-zero.
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if den == 0 {
            return Err(ReelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole frames per second.
    pub fn whole(num: u32) -> ReelResult<Self> {
        Self::new(num, 1)
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Wall-clock time allotted to one frame (`1/fps`).
    pub fn frame_budget(self) -> Duration {
        Duration::from_nanos(u64::from(self.den) * 1_000_000_000 / u64::from(self.num))
    }

    /// Whole frames covered by `secs` seconds.
    pub fn frames_for_secs(self, secs: u64) -> u64 {
        secs * u64::from(self.num) / u64::from(self.den)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 60, den: 1 }
    }
}
