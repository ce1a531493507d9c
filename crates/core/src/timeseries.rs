//! Index time-series shapes and chart data shaping.
//!
//! Two wire shapes exist: the indices endpoint returns multi-index
//! data points (one row per acquisition date), the advanced endpoint
//! returns a single-index `(date, value)` series. The helpers here
//! project and summarise them for chart components.

use serde::{Deserialize, Serialize};

use crate::indices::IndexType;
use crate::types::{Date, FarmId};

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// One acquisition-date row from `GET /api/indices/time-series/{farmId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDataPoint {
    pub date: Date,
    #[serde(default)]
    pub ndvi: Option<f64>,
    #[serde(default)]
    pub ndre: Option<f64>,
    #[serde(default)]
    pub lswi: Option<f64>,
    #[serde(default)]
    pub savi: Option<f64>,
    #[serde(default)]
    pub cloud_cover: Option<f64>,
}

impl IndexDataPoint {
    /// Value of one index in this row, if the acquisition produced it.
    pub fn value(&self, index: IndexType) -> Option<f64> {
        match index {
            IndexType::Ndvi => self.ndvi,
            IndexType::Ndre => self.ndre,
            IndexType::Lswi => self.lswi,
            IndexType::Savi => self.savi,
        }
    }
}

/// Response of `GET /api/indices/time-series/{farmId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexTimeSeries {
    pub farm_id: FarmId,
    pub start_date: Date,
    pub end_date: Date,
    pub data: Vec<IndexDataPoint>,
}

/// One `(date, value)` sample from the advanced time-series endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: Date,
    pub value: f64,
}

/// Response of `GET /api/advanced/time-series/{farmId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedTimeSeries {
    pub farm_id: FarmId,
    pub index: String,
    pub period_days: u32,
    pub data: Vec<TimeSeriesPoint>,
}

// ---------------------------------------------------------------------------
// Chart shaping
// ---------------------------------------------------------------------------

/// Project a multi-index series to `(date, value)` pairs for one index,
/// skipping acquisition dates where that index is missing.
pub fn project_series(data: &[IndexDataPoint], index: IndexType) -> Vec<TimeSeriesPoint> {
    data.iter()
        .filter_map(|p| {
            p.value(index).map(|value| TimeSeriesPoint {
                date: p.date,
                value,
            })
        })
        .collect()
}

/// Axis-bound summary of a projected series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub min: f64,
    pub max: f64,
    /// Value of the chronologically last sample.
    pub latest: f64,
}

/// Min/max/latest over a non-empty series; `None` when empty.
pub fn summarize(points: &[TimeSeriesPoint]) -> Option<SeriesSummary> {
    let latest = points.iter().max_by_key(|p| p.date)?.value;
    let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = points
        .iter()
        .map(|p| p.value)
        .fold(f64::NEG_INFINITY, f64::max);
    Some(SeriesSummary { min, max, latest })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> Date {
        chrono::NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn point(day: u32, ndvi: Option<f64>, lswi: Option<f64>) -> IndexDataPoint {
        IndexDataPoint {
            date: d(day),
            ndvi,
            ndre: None,
            lswi,
            savi: None,
            cloud_cover: None,
        }
    }

    #[test]
    fn projection_skips_missing_values() {
        let data = vec![
            point(1, Some(0.3), Some(0.1)),
            point(6, None, Some(0.2)),
            point(11, Some(0.5), None),
        ];
        let ndvi = project_series(&data, IndexType::Ndvi);
        assert_eq!(ndvi.len(), 2);
        assert_eq!(ndvi[0].value, 0.3);
        assert_eq!(ndvi[1].date, d(11));

        let lswi = project_series(&data, IndexType::Lswi);
        assert_eq!(lswi.len(), 2);
    }

    #[test]
    fn summary_tracks_min_max_latest() {
        let points = vec![
            TimeSeriesPoint { date: d(1), value: 0.4 },
            TimeSeriesPoint { date: d(11), value: 0.7 },
            TimeSeriesPoint { date: d(6), value: 0.2 },
        ];
        let summary = summarize(&points).unwrap();
        assert_eq!(summary.min, 0.2);
        assert_eq!(summary.max, 0.7);
        // Latest by date, not by position.
        assert_eq!(summary.latest, 0.7);
    }

    #[test]
    fn summary_of_empty_series_is_none() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn projection_of_empty_series_is_empty() {
        assert!(project_series(&[], IndexType::Savi).is_empty());
    }
}
