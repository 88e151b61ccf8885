//! Return, moving-average and volatility calculations over a [`PriceSeries`].
//!
//! Derived series never grow past the source series. Returns drop the first
//! period outright; moving averages and volatility keep one entry per source
//! row and leave the warm-up rows as `None`.

use crate::error::{Error, Result};
use crate::model::{Granularity, PriceSeries};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptionalPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSeries {
    pub granularity: Granularity,
    pub points: Vec<SeriesPoint>,
}

impl ReturnSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// The source series with one moving-average column per window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverages {
    pub series: PriceSeries,
    pub columns: BTreeMap<usize, Vec<Option<f64>>>,
}

impl MovingAverages {
    pub fn column(&self, window: usize) -> Option<&[Option<f64>]> {
        self.columns.get(&window).map(|c| c.as_slice())
    }

    pub fn windows(&self) -> Vec<usize> {
        self.columns.keys().copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilitySeries {
    pub window: usize,
    pub points: Vec<OptionalPoint>,
}

impl VolatilitySeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.points.iter().rev().find_map(|p| p.value)
    }
}

/// Last close of each bucket, stamped with that bar's timestamp. Weeks and
/// months are taken on the exchange-local date.
pub fn resample_closes(series: &PriceSeries, granularity: Granularity) -> Vec<SeriesPoint> {
    let offset = series.utc_offset();
    let mut out: Vec<SeriesPoint> = Vec::new();
    let mut current_key: Option<(i32, u32)> = None;

    for bar in series.bars() {
        let local = bar.timestamp.with_timezone(&offset);
        let key = match granularity {
            Granularity::Daily => None,
            Granularity::Weekly => {
                let week = local.iso_week();
                Some((week.year(), week.week()))
            }
            Granularity::Monthly => Some((local.year(), local.month())),
        };
        let point = SeriesPoint {
            timestamp: bar.timestamp,
            value: bar.close,
        };

        let same_bucket = key.is_some() && key == current_key;
        match out.last_mut() {
            Some(last) if same_bucket => *last = point,
            _ => out.push(point),
        }
        current_key = key;
    }

    out
}

/// Simple percentage returns between consecutive resampled periods.
///
/// Fewer than two periods yields an empty series rather than an error.
pub fn calculate_returns(series: &PriceSeries, granularity: Granularity) -> ReturnSeries {
    let closes = resample_closes(series, granularity);
    let points = closes
        .windows(2)
        .map(|w| SeriesPoint {
            timestamp: w[1].timestamp,
            value: w[1].value / w[0].value - 1.0,
        })
        .collect();

    ReturnSeries {
        granularity,
        points,
    }
}

/// Trailing simple moving average of closes for each window.
pub fn moving_averages(series: &PriceSeries, windows: &[usize]) -> Result<MovingAverages> {
    if let Some(bad) = windows.iter().find(|w| **w == 0) {
        return Err(Error::config(format!(
            "moving average window must be positive, got {}",
            bad
        )));
    }

    let closes = series.closes();
    let mut columns = BTreeMap::new();
    for &window in windows {
        columns
            .entry(window)
            .or_insert_with(|| rolling_mean(&closes, window));
    }

    Ok(MovingAverages {
        series: series.clone(),
        columns,
    })
}

/// Annualized rolling standard deviation of daily returns.
///
/// Entry `i` covers the `window` returns ending at row `i`, so the first
/// `window` rows are `None`.
pub fn volatility(series: &PriceSeries, window: usize) -> Result<VolatilitySeries> {
    if window < 2 {
        return Err(Error::config(format!(
            "volatility window must be at least 2, got {}",
            window
        )));
    }

    let closes = series.closes();
    // returns[i] is the return ending at row i + 1
    let returns: Vec<f64> = closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
    let annualize = TRADING_DAYS_PER_YEAR.sqrt();

    let points = series
        .bars()
        .iter()
        .enumerate()
        .map(|(row, bar)| {
            let value = if row >= window {
                sample_std(&returns[row - window..row]).map(|sd| sd * annualize)
            } else {
                None
            };
            OptionalPoint {
                timestamp: bar.timestamp,
                value,
            }
        })
        .collect();

    Ok(VolatilitySeries { window, points })
}

fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|row| {
            if row + 1 < window {
                None
            } else {
                let slice = &values[row + 1 - window..=row];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_mean_warms_up() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn sample_std_matches_hand_computation() {
        // mean 5, squared deviations sum 32, n - 1 = 7
        let sd = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(sample_std(&[1.0]), None);
    }
}
