use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An investment plan offered in the catalogue
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Product {
    pub id: String,
    pub name: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub description: Option<String>,
    pub price: f64,
    /// Income credited per day while the investment is active
    pub daily_income: f64,
    pub duration_days: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_vip_level: u8,
    /// Remaining stock, `None` when unlimited
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub stock: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default = "default_active"))]
    pub active: bool,
}

#[cfg(feature = "serde")]
fn default_active() -> bool {
    true
}

impl Product {
    /// Gross income over the whole plan, as advertised
    pub fn total_return(&self) -> f64 {
        self.daily_income * f64::from(self.duration_days)
    }

    pub fn is_available(&self) -> bool {
        self.active && self.stock != Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PurchaseRequest {
    pub quantity: u32,
}

impl Default for PurchaseRequest {
    fn default() -> Self {
        Self { quantity: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InvestmentStatus {
    Active,
    Completed,
    Cancelled,
}

/// A purchased product accruing income
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Investment {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub amount: f64,
    pub daily_income: f64,
    pub earned: f64,
    pub status: InvestmentStatus,
    pub started_at: DateTime<Utc>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub ends_at: Option<DateTime<Utc>>,
}
