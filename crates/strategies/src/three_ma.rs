// In crates/strategies/src/three_ma.rs

use crate::moving_average::RollingMean;
use crate::types::{SignalFrame, ThreeMaSettings};
use crate::{Result, Strategy};
use core_types::Kline;
use rust_decimal::Decimal;

/// The averages and regimes from the previous evaluated step.
#[derive(Debug, Clone, Copy)]
struct PreviousStep {
    short_ma: Decimal,
    median_ma: Decimal,
    long_regime: bool,
    short_regime: bool,
}

/// Triple moving-average alignment strategy.
///
/// The long regime holds while the three averages are stacked bullishly
/// (short > median > long); the short regime is the mirror image. Entries fire
/// on the first step of a regime, exits on the short/median crossover.
#[derive(Debug, Clone)]
pub struct ThreeMovingAverage {
    short: RollingMean,
    median: RollingMean,
    long: RollingMean,
    previous: Option<PreviousStep>,
}

impl ThreeMovingAverage {
    pub fn new(settings: ThreeMaSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            short: RollingMean::new("short_period", settings.short_period)?,
            median: RollingMean::new("median_period", settings.median_period)?,
            long: RollingMean::new("long_period", settings.long_period)?,
            previous: None,
        })
    }

    /// Feeds a closing price and derives this step's signals.
    pub fn next_close(&mut self, close: Decimal) -> Option<SignalFrame> {
        // All three windows advance on every bar, ready or not.
        let short = self.short.update(close);
        let median = self.median.update(close);
        let long = self.long.update(close);

        let (Some(short_ma), Some(median_ma), Some(long_ma)) = (short, median, long) else {
            return None;
        };

        let long_regime = median_ma > long_ma && short_ma > median_ma;
        let short_regime = median_ma < long_ma && short_ma < median_ma;

        let frame = match self.previous {
            Some(prev) => SignalFrame {
                short_ma,
                median_ma,
                long_ma,
                long_regime,
                short_regime,
                long_entry: long_regime && !prev.long_regime,
                short_entry: short_regime && !prev.short_regime,
                close_long: prev.short_ma > prev.median_ma && short_ma < median_ma,
                close_short: prev.short_ma < prev.median_ma && short_ma > median_ma,
            },
            // First ready step: no history to compare against, so no edges or crosses.
            None => SignalFrame {
                short_ma,
                median_ma,
                long_ma,
                long_regime,
                short_regime,
                ..SignalFrame::default()
            },
        };

        self.previous = Some(PreviousStep {
            short_ma,
            median_ma,
            long_regime,
            short_regime,
        });

        Some(frame)
    }
}

impl Strategy for ThreeMovingAverage {
    fn name(&self) -> &'static str {
        "ThreeMovingAverage"
    }

    fn warmup_bars(&self) -> usize {
        self.long.period()
    }

    fn assess(&mut self, kline: &Kline) -> Option<SignalFrame> {
        self.next_close(kline.close)
    }
}
