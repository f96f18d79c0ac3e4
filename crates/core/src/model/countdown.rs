/// How pressing the remaining time is, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// More than half of the limit remains.
    Normal,
    /// Between five seconds and half of the limit.
    Elevated,
    /// Five seconds or less.
    Critical,
}

/// Seconds at or below which a countdown is critical.
pub const CRITICAL_SECS: u32 = 5;

impl Urgency {
    #[must_use]
    pub fn for_remaining(remaining: u32, limit: u32) -> Self {
        if remaining <= CRITICAL_SECS {
            Urgency::Critical
        } else if remaining > limit / 2 {
            Urgency::Normal
        } else {
            Urgency::Elevated
        }
    }
}
