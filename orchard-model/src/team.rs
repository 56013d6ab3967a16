use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A referred account somewhere below the current user
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReferralMember {
    pub username: String,
    /// 1 for direct referrals, 2 for their referrals, and so on
    pub level: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub total_invested: f64,
    /// Commission this member has generated for the current user
    #[cfg_attr(feature = "serde", serde(default))]
    pub commission_earned: f64,
    pub joined_at: DateTime<Utc>,
}

/// Response of `/team`
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TeamSummary {
    pub referral_code: String,
    pub total_members: u32,
    pub total_commission: f64,
    pub members: Vec<ReferralMember>,
}

impl TeamSummary {
    /// Members at a given level, in server order
    pub fn at_level(&self, level: u8) -> impl Iterator<Item = &ReferralMember> {
        self.members.iter().filter(move |m| m.level == level)
    }
}
