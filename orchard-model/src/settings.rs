//! Application-wide settings published by the server.
//!
//! The server sends a settings snapshot with login/register responses and from
//! `/settings`. Every field is optional on the wire; the accessor methods
//! document the default the client assumes when a field is absent.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Schema version this client understands
pub const APPLICATION_SETTINGS_VERSION: u32 = 1;

const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_SITE_NAME: &str = "Orchard";

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ApplicationSettings {
    pub version: u32,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub site_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub support_contact: Option<String>,
    /// ISO 4217 code
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub currency: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub min_withdrawal: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub withdrawal_fee_percent: Option<f64>,
    /// Commission percent per referral level, level 1 first
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub referral_commission_percents: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub spin_enabled: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub daily_spins: Option<u32>,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            version: APPLICATION_SETTINGS_VERSION,
            site_name: None,
            support_contact: None,
            currency: None,
            min_withdrawal: None,
            withdrawal_fee_percent: None,
            referral_commission_percents: Vec::new(),
            spin_enabled: None,
            daily_spins: None,
        }
    }
}

impl ApplicationSettings {
    /// Snapshots written by a newer server schema are not interpreted
    pub fn is_supported(&self) -> bool {
        self.version <= APPLICATION_SETTINGS_VERSION
    }

    /// Defaults to `"Orchard"`
    pub fn site_name(&self) -> &str {
        self.site_name.as_deref().unwrap_or(DEFAULT_SITE_NAME)
    }

    /// Defaults to `"USD"`
    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    /// Defaults to `0.0` (no minimum)
    pub fn min_withdrawal(&self) -> f64 {
        self.min_withdrawal.unwrap_or(0.0)
    }

    /// Defaults to `0.0`
    pub fn withdrawal_fee_percent(&self) -> f64 {
        self.withdrawal_fee_percent.unwrap_or(0.0)
    }

    /// Defaults to `false`; the wheel stays hidden unless the server opts in
    pub fn spin_enabled(&self) -> bool {
        self.spin_enabled.unwrap_or(false)
    }

    /// Defaults to `0`
    pub fn daily_spins(&self) -> u32 {
        self.daily_spins.unwrap_or(0)
    }

    /// Commission percent for a 1-based referral level, `None` past the last level
    pub fn referral_commission_percent(&self, level: usize) -> Option<f64> {
        level
            .checked_sub(1)
            .and_then(|idx| self.referral_commission_percents.get(idx))
            .copied()
    }
}
