// In crates/strategies/src/types.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Lookback lengths for the three moving averages.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ThreeMaSettings {
    #[serde(default = "default_short")]
    pub short_period: u32,
    #[serde(default = "default_median")]
    pub median_period: u32,
    #[serde(default = "default_long")]
    pub long_period: u32,
}

impl Default for ThreeMaSettings {
    fn default() -> Self {
        Self {
            short_period: default_short(),
            median_period: default_median(),
            long_period: default_long(),
        }
    }
}

impl ThreeMaSettings {
    pub fn validate(&self) -> Result<()> {
        for (name, period) in [
            ("short_period", self.short_period),
            ("median_period", self.median_period),
            ("long_period", self.long_period),
        ] {
            if period == 0 {
                return Err(Error::InvalidPeriod { name, period });
            }
        }
        if !(self.short_period < self.median_period && self.median_period < self.long_period) {
            return Err(Error::PeriodOrder {
                short: self.short_period,
                median: self.median_period,
                long: self.long_period,
            });
        }
        Ok(())
    }
}

fn default_short() -> u32 {
    5
}

fn default_median() -> u32 {
    20
}

fn default_long() -> u32 {
    60
}

/// One step's worth of derived signals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignalFrame {
    pub short_ma: Decimal,
    pub median_ma: Decimal,
    pub long_ma: Decimal,
    /// median > long and short > median.
    pub long_regime: bool,
    /// median < long and short < median.
    pub short_regime: bool,
    /// First step of the long regime.
    pub long_entry: bool,
    /// First step of the short regime.
    pub short_entry: bool,
    /// Short average crossed below the median average.
    pub close_long: bool,
    /// Short average crossed above the median average.
    pub close_short: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_5_20_60() {
        let s = ThreeMaSettings::default();
        assert_eq!((s.short_period, s.median_period, s.long_period), (5, 20, 60));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let s: ThreeMaSettings = toml::from_str("short_period = 3").unwrap();
        assert_eq!((s.short_period, s.median_period, s.long_period), (3, 20, 60));
    }

    #[test]
    fn zero_and_unordered_periods_are_rejected() {
        let zero = ThreeMaSettings { short_period: 0, ..Default::default() };
        assert_eq!(
            zero.validate(),
            Err(Error::InvalidPeriod { name: "short_period", period: 0 })
        );

        let unordered = ThreeMaSettings { short_period: 30, median_period: 20, long_period: 60 };
        assert!(matches!(unordered.validate(), Err(Error::PeriodOrder { .. })));
    }
}
