use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether the user may spin right now
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpinStatus {
    pub spins_remaining: u32,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub next_spin_at: Option<DateTime<Utc>>,
}

impl SpinStatus {
    pub fn can_spin(&self) -> bool {
        self.spins_remaining > 0
    }
}

/// The server-decided result of one spin
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpinOutcome {
    /// Index of the winning wheel segment
    pub segment: u32,
    pub label: String,
    pub reward: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spins_remaining: u32,
}
