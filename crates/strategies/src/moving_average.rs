// In crates/strategies/src/moving_average.rs

use std::collections::VecDeque;

use rust_decimal::Decimal;

use crate::{Error, Result};

/// A rolling arithmetic mean that reports nothing until its window is full.
///
/// The window sum is kept in `Decimal`, so adding and removing prices never
/// drifts: a window of identical prices always averages to exactly that price.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: VecDeque<Decimal>,
    period: usize,
    sum: Decimal,
}

impl RollingMean {
    pub fn new(name: &'static str, period: u32) -> Result<Self> {
        if period == 0 {
            return Err(Error::InvalidPeriod { name, period });
        }
        Ok(Self {
            window: VecDeque::with_capacity(period as usize + 1),
            period: period as usize,
            sum: Decimal::ZERO,
        })
    }

    /// Feeds one value and returns the mean if the window is full.
    pub fn update(&mut self, value: Decimal) -> Option<Decimal> {
        self.window.push_back(value);
        self.sum += value;
        if self.window.len() > self.period {
            if let Some(oldest) = self.window.pop_front() {
                self.sum -= oldest;
            }
        }
        self.is_ready()
            .then(|| self.sum / Decimal::from(self.period as u64))
    }

    pub fn is_ready(&self) -> bool {
        self.window.len() == self.period
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn undefined_until_window_is_full() {
        let mut ma = RollingMean::new("test", 3).unwrap();
        assert_eq!(ma.update(dec!(1)), None);
        assert_eq!(ma.update(dec!(2)), None);
        assert!(!ma.is_ready());
        assert_eq!(ma.update(dec!(3)), Some(dec!(2)));
        assert!(ma.is_ready());
    }

    #[test]
    fn rolls_over_the_last_period_values() {
        let mut ma = RollingMean::new("test", 2).unwrap();
        ma.update(dec!(10));
        assert_eq!(ma.update(dec!(20)), Some(dec!(15)));
        assert_eq!(ma.update(dec!(40)), Some(dec!(30)));
    }

    #[test]
    fn zero_period_is_an_error() {
        assert_eq!(
            RollingMean::new("short_period", 0).unwrap_err(),
            Error::InvalidPeriod { name: "short_period", period: 0 }
        );
    }

    #[test]
    fn plateau_after_volatile_history_averages_exactly() {
        let mut ma = RollingMean::new("test", 7).unwrap();
        // Two-decimal prices whose f64 sums would not cancel cleanly.
        let mut price = dec!(1987.43);
        for i in 0..500u32 {
            let step = Decimal::new(i64::from((i * 7919) % 613) - 306, 2);
            price = (price + step).max(dec!(0.01));
            ma.update(price);
        }
        let mut last = None;
        for _ in 0..7 {
            last = ma.update(dec!(1987.43));
        }
        assert_eq!(last, Some(dec!(1987.43)));
    }
}
