//! Analysis job request, status, and result shapes.
//!
//! An analysis is submitted as region + date window + index list; the
//! backend tracks it as an asynchronous job and the client observes it
//! via polling (see the client crate's poller).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geometry::GeoPolygon;
use crate::indices::{DistributionBin, IndexStatistics, IndexType};
use crate::job::JobStatus;
use crate::types::{Date, FarmId, JobId, Timestamp};

// ---------------------------------------------------------------------------
// Request limits
// ---------------------------------------------------------------------------

/// Default maximum acceptable cloud cover percentage.
pub const DEFAULT_MAX_CLOUD_COVER: u8 = 20;
/// Default analysis scale in meters (Sentinel-2 native resolution).
pub const DEFAULT_SCALE_M: u16 = 10;
/// Smallest allowed analysis scale in meters.
pub const MIN_SCALE_M: u16 = 10;
/// Largest allowed analysis scale in meters.
pub const MAX_SCALE_M: u16 = 60;

fn default_indices() -> Vec<IndexType> {
    vec![IndexType::Ndvi, IndexType::Ndre, IndexType::Lswi]
}

fn default_max_cloud_cover() -> u8 {
    DEFAULT_MAX_CLOUD_COVER
}

fn default_scale() -> u16 {
    DEFAULT_SCALE_M
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Payload for `POST /api/analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub geometry: GeoPolygon,
    pub start_date: Date,
    pub end_date: Date,
    #[serde(default = "default_indices")]
    pub indices: Vec<IndexType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_id: Option<FarmId>,
    #[serde(default = "default_max_cloud_cover")]
    pub max_cloud_cover: u8,
    #[serde(default = "default_scale")]
    pub scale: u16,
}

impl AnalysisRequest {
    /// Build a request for a region and date window with default
    /// indices, cloud cover, and scale.
    pub fn new(geometry: GeoPolygon, start_date: Date, end_date: Date) -> Self {
        Self {
            geometry,
            start_date,
            end_date,
            indices: default_indices(),
            farm_id: None,
            max_cloud_cover: DEFAULT_MAX_CLOUD_COVER,
            scale: DEFAULT_SCALE_M,
        }
    }

    /// Validate the request before submission.
    ///
    /// Checks the polygon, the date ordering, that at least one index is
    /// requested, and that cloud cover / scale are within backend bounds.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.geometry.validate()?;

        if self.start_date > self.end_date {
            return Err(CoreError::Validation(format!(
                "start_date {} is after end_date {}",
                self.start_date, self.end_date
            )));
        }

        if self.indices.is_empty() {
            return Err(CoreError::Validation(
                "At least one index must be requested".to_string(),
            ));
        }

        if self.max_cloud_cover > 100 {
            return Err(CoreError::Validation(format!(
                "max_cloud_cover {} exceeds 100",
                self.max_cloud_cover
            )));
        }

        if !(MIN_SCALE_M..=MAX_SCALE_M).contains(&self.scale) {
            return Err(CoreError::Validation(format!(
                "scale {} outside {MIN_SCALE_M}..={MAX_SCALE_M} m",
                self.scale
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Job descriptor
// ---------------------------------------------------------------------------

/// Job descriptor returned by submission and by `GET /api/analysis/{jobId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub job_id: JobId,
    pub status: JobStatus,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    /// Completion percentage in 0..=100, driven entirely by the backend.
    #[serde(default)]
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_id: Option<FarmId>,
}

// ---------------------------------------------------------------------------
// Result snapshot
// ---------------------------------------------------------------------------

/// Immutable result snapshot for a completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub job_id: JobId,
    pub status: JobStatus,
    /// Mean value per index, keyed by wire name (`ndvi`, `ndre`, ...).
    pub indices: HashMap<String, f64>,
    /// Full statistics per index.
    pub statistics: HashMap<String, IndexStatistics>,
    /// Optional per-index histograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histogram: Option<HashMap<String, Vec<DistributionBin>>>,
    pub images_processed: u32,
    /// `start` / `end` ISO dates of the analysed window.
    pub date_range: HashMap<String, String>,
    pub geometry: GeoPolygon,
}

impl AnalysisResult {
    /// Mean value of one index, if it was part of the analysis.
    pub fn mean(&self, index: IndexType) -> Option<f64> {
        self.indices.get(index.as_str()).copied()
    }
}
