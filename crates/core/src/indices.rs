//! Vegetation index vocabulary, NDVI categorisation, and index
//! statistics shapes.
//!
//! Index values are computed server-side from satellite reflectance
//! bands and are opaque numbers here. The only client-side logic is the
//! fixed threshold mapping from an NDVI value to a display category and
//! color.

use serde::{Deserialize, Serialize};

use crate::types::{Date, FarmId};

// ---------------------------------------------------------------------------
// Index types
// ---------------------------------------------------------------------------

/// Core vegetation indices requestable through the analysis endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    /// Normalized Difference Vegetation Index.
    Ndvi,
    /// Normalized Difference Red Edge (chlorophyll / nitrogen proxy).
    Ndre,
    /// Land Surface Water Index (canopy water content).
    Lswi,
    /// Soil-Adjusted Vegetation Index.
    Savi,
}

impl IndexType {
    /// Wire name used in query parameters, e.g. `ndvi`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ndvi => "ndvi",
            Self::Ndre => "ndre",
            Self::Lswi => "lswi",
            Self::Savi => "savi",
        }
    }

    /// Display name, e.g. `NDVI`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ndvi => "NDVI",
            Self::Ndre => "NDRE",
            Self::Lswi => "LSWI",
            Self::Savi => "SAVI",
        }
    }
}

// ---------------------------------------------------------------------------
// NDVI categorisation thresholds
// ---------------------------------------------------------------------------

/// NDVI below this is water or bare soil.
pub const NDVI_SPARSE_THRESHOLD: f64 = 0.0;
/// NDVI at or above this is moderate vegetation.
pub const NDVI_MODERATE_THRESHOLD: f64 = 0.2;
/// NDVI at or above this is healthy vegetation.
pub const NDVI_HEALTHY_THRESHOLD: f64 = 0.4;
/// NDVI at or above this is very healthy vegetation.
pub const NDVI_VERY_HEALTHY_THRESHOLD: f64 = 0.6;

/// Display category for an NDVI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NdviCategory {
    WaterOrBare,
    Sparse,
    Moderate,
    Healthy,
    VeryHealthy,
}

impl NdviCategory {
    /// Classify an NDVI value at the fixed thresholds 0 / 0.2 / 0.4 / 0.6.
    pub fn from_value(ndvi: f64) -> Self {
        if ndvi < NDVI_SPARSE_THRESHOLD {
            Self::WaterOrBare
        } else if ndvi < NDVI_MODERATE_THRESHOLD {
            Self::Sparse
        } else if ndvi < NDVI_HEALTHY_THRESHOLD {
            Self::Moderate
        } else if ndvi < NDVI_VERY_HEALTHY_THRESHOLD {
            Self::Healthy
        } else {
            Self::VeryHealthy
        }
    }

    /// Human-readable label for legends and tooltips.
    pub fn label(self) -> &'static str {
        match self {
            Self::WaterOrBare => "Water / bare soil",
            Self::Sparse => "Sparse vegetation",
            Self::Moderate => "Moderate vegetation",
            Self::Healthy => "Healthy vegetation",
            Self::VeryHealthy => "Very healthy vegetation",
        }
    }

    /// Fixed hex color used by map and chart layers.
    pub fn color(self) -> &'static str {
        match self {
            Self::WaterOrBare => "#0c6b9e",
            Self::Sparse => "#d9a440",
            Self::Moderate => "#c8d44e",
            Self::Healthy => "#6cbf45",
            Self::VeryHealthy => "#1e8a32",
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics & distribution shapes
// ---------------------------------------------------------------------------

/// Summary statistics for one index over an analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
}

/// One histogram bin of an index distribution across a farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBin {
    /// Display label, e.g. `0.4-0.5`.
    pub range: String,
    pub min_value: f64,
    pub max_value: f64,
    pub count: u64,
    pub percentage: f64,
}

/// Response of `GET /api/indices/distribution/{farmId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDistribution {
    pub farm_id: FarmId,
    pub index_type: IndexType,
    pub analysis_date: Date,
    pub statistics: IndexStatistics,
    pub histogram: Vec<DistributionBin>,
}

/// Response of `GET /api/indices/latest/{farmId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestIndices {
    pub farm_id: FarmId,
    pub farm_name: String,
    pub analysis_date: String,
    /// Mean value per index, keyed by wire name.
    pub indices: std::collections::HashMap<String, f64>,
}
