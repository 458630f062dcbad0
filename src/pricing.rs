use serde::{Deserialize, Serialize};

pub const DEFAULT_HOURLY_RATE: f64 = 5.0;
pub const DEFAULT_BASE_FEE: f64 = 2.0;

/// Flat tariff: `hours * hourly_rate + base_fee`. No proration on early release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    pub hourly_rate: f64,
    pub base_fee: f64,
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            hourly_rate: DEFAULT_HOURLY_RATE,
            base_fee: DEFAULT_BASE_FEE,
        }
    }
}

/// Price breakdown for a stay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Charges {
    pub hourly_rate: f64,
    pub base_fee: f64,
    pub total: f64,
}

impl Tariff {
    pub fn compute_charges(&self, duration_hours: u32) -> Charges {
        Charges {
            hourly_rate: self.hourly_rate,
            base_fee: self.base_fee,
            total: f64::from(duration_hours) * self.hourly_rate + self.base_fee,
        }
    }
}
