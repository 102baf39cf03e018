use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::season::MonthOrder;

/// Groups smaller than this are suppressed in the country and composition views.
pub const DEFAULT_MIN_GROUP_BOOKINGS: u64 = 10;
/// Width of an ADR bucket in the price view.
pub const DEFAULT_BUCKET_WIDTH: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("bucket width must be at least 1")]
    ZeroBucketWidth,
}

/// Tunables of the aggregation and presentation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub month_order: MonthOrder,
    pub min_group_bookings: u64,
    pub bucket_width: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            month_order: MonthOrder::Calendar,
            min_group_bookings: DEFAULT_MIN_GROUP_BOOKINGS,
            bucket_width: DEFAULT_BUCKET_WIDTH,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_width == 0 {
            return Err(ConfigError::ZeroBucketWidth);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.min_group_bookings, 10);
        assert_eq!(cfg.bucket_width, 30);
        assert_eq!(cfg.month_order, MonthOrder::Calendar);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_width_is_rejected() {
        let cfg = DashboardConfig {
            bucket_width: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroBucketWidth));
    }

    #[test]
    fn round_trips_through_json() {
        let text = r#"{"month_order":"legacy","min_group_bookings":5,"bucket_width":20}"#;
        let cfg: DashboardConfig = serde_json::from_str(text).unwrap();
        assert_eq!(cfg.month_order, MonthOrder::Legacy);
        assert_eq!(cfg.bucket_width, 20);
    }
}
