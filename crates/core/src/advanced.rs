//! Comprehensive analysis and risk assessment shapes.
//!
//! The `/api/advanced/*` endpoints return server-computed health,
//! stress, yield, weather, crop-stage, and risk figures. The enums in
//! this module carry the fixed threshold bands the dashboard uses to
//! turn those numbers into display labels; the numbers themselves are
//! never recomputed here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geometry::GeoPolygon;
use crate::types::FarmId;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Payload for `POST /api/advanced/comprehensive`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveRequest {
    pub farm_id: FarmId,
    pub geometry: GeoPolygon,
    /// Crop type key for the backend's yield model, e.g. `wheat`.
    pub crop_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Index readings
// ---------------------------------------------------------------------------

/// The full advanced index panel. Every field is optional: the backend
/// omits indices it could not derive for the window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexReadings {
    #[serde(default, rename = "NDVI")]
    pub ndvi: Option<f64>,
    #[serde(default, rename = "EVI")]
    pub evi: Option<f64>,
    #[serde(default, rename = "NDRE")]
    pub ndre: Option<f64>,
    #[serde(default, rename = "GNDVI")]
    pub gndvi: Option<f64>,
    #[serde(default, rename = "SAVI")]
    pub savi: Option<f64>,
    #[serde(default, rename = "MSAVI2")]
    pub msavi2: Option<f64>,
    #[serde(default, rename = "LSWI")]
    pub lswi: Option<f64>,
    #[serde(default, rename = "NDMI")]
    pub ndmi: Option<f64>,
    #[serde(default, rename = "NDWI")]
    pub ndwi: Option<f64>,
    #[serde(default, rename = "NBR")]
    pub nbr: Option<f64>,
    #[serde(default, rename = "CIgreen")]
    pub ci_green: Option<f64>,
    #[serde(default, rename = "CIre")]
    pub ci_re: Option<f64>,
    #[serde(default, rename = "MCARI")]
    pub mcari: Option<f64>,
    #[serde(default, rename = "TCARI")]
    pub tcari: Option<f64>,
    #[serde(default, rename = "WDRVI")]
    pub wdrvi: Option<f64>,
    #[serde(default, rename = "LAI")]
    pub lai: Option<f64>,
    #[serde(default, rename = "fPAR")]
    pub fpar: Option<f64>,
    #[serde(default, rename = "BSI")]
    pub bsi: Option<f64>,
    #[serde(default, rename = "NDTI")]
    pub ndti: Option<f64>,
}

// ---------------------------------------------------------------------------
// Health score
// ---------------------------------------------------------------------------

/// Overall score at or above which health is "Excellent".
pub const HEALTH_EXCELLENT: f64 = 80.0;
/// Overall score at or above which health is "Good".
pub const HEALTH_GOOD: f64 = 65.0;
/// Overall score at or above which health is "Fair".
pub const HEALTH_FAIR: f64 = 50.0;
/// Overall score at or above which health is "Poor" (below is "Critical").
pub const HEALTH_POOR: f64 = 35.0;

/// Display band for a 0..=100 health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl HealthStatus {
    /// Classify an overall health score at the fixed 80/65/50/35 bands.
    pub fn from_score(score: f64) -> Self {
        if score >= HEALTH_EXCELLENT {
            Self::Excellent
        } else if score >= HEALTH_GOOD {
            Self::Good
        } else if score >= HEALTH_FAIR {
            Self::Fair
        } else if score >= HEALTH_POOR {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::Critical => "Critical",
        }
    }
}

/// Crop health score breakdown from the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthScore {
    pub overall_score: f64,
    pub greenness_score: f64,
    pub vigor_score: f64,
    pub nutrient_score: f64,
    pub water_score: f64,
    pub canopy_score: f64,
    /// Server-assigned label; [`HealthStatus::from_score`] reproduces it
    /// locally when only the number is available.
    pub health_status: String,
}

impl HealthScore {
    pub fn status(&self) -> HealthStatus {
        HealthStatus::from_score(self.overall_score)
    }
}

// ---------------------------------------------------------------------------
// Stress detection
// ---------------------------------------------------------------------------

/// Stress level below which a factor is "normal".
pub const STRESS_MODERATE: f64 = 25.0;
/// Stress level at or above which a factor is "high".
pub const STRESS_HIGH: f64 = 50.0;
/// Stress level at or above which a factor is "critical".
pub const STRESS_CRITICAL: f64 = 75.0;

/// Display band for a 0..=100 stress or risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressStatus {
    Normal,
    Moderate,
    High,
    Critical,
}

impl StressStatus {
    /// Classify a stress level at the fixed 25/50/75 bands.
    pub fn from_level(level: f64) -> Self {
        if level < STRESS_MODERATE {
            Self::Normal
        } else if level < STRESS_HIGH {
            Self::Moderate
        } else if level < STRESS_CRITICAL {
            Self::High
        } else {
            Self::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// One stress factor reading. `indicator`/`value` are present for
/// index-driven factors; heat stress carries `temperature_c` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressFactor {
    pub level: f64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
}

impl StressFactor {
    pub fn band(&self) -> StressStatus {
        StressStatus::from_level(self.level)
    }
}

/// Stress breakdown across the five monitored dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressDetection {
    pub water_stress: StressFactor,
    pub nutrient_stress: StressFactor,
    pub heat_stress: StressFactor,
    pub vegetation_stress: StressFactor,
    pub soil_exposure: StressFactor,
}

// ---------------------------------------------------------------------------
// Yield, weather, crop stage
// ---------------------------------------------------------------------------

/// Yield estimation from the backend's crop-specific regression model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldEstimate {
    /// Estimated yield in tonnes per hectare.
    pub estimated_yield_tha: f64,
    pub yield_min: f64,
    pub yield_max: f64,
    /// Model confidence percentage.
    pub confidence: f64,
    pub crop_type: String,
    pub model_type: String,
}

/// Point weather readings for the farm location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Weather {
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub precipitation_mm: Option<f64>,
    #[serde(default)]
    pub wind_speed_ms: Option<f64>,
    #[serde(default)]
    pub soil_temp_c: Option<f64>,
    #[serde(default)]
    pub evaporation_mm: Option<f64>,
    #[serde(default)]
    pub humidity_percent: Option<f64>,
}

/// Phenological growth stages, ordered by canopy development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStage {
    Germination,
    Vegetative,
    Reproductive,
    Maturity,
    Senescence,
}

impl GrowthStage {
    /// Stage implied by an NDVI reading (the backend's own banding).
    pub fn from_ndvi(ndvi: f64) -> Self {
        if ndvi < 0.2 {
            Self::Germination
        } else if ndvi < 0.4 {
            Self::Vegetative
        } else if ndvi < 0.6 {
            Self::Reproductive
        } else if ndvi < 0.75 {
            Self::Maturity
        } else {
            Self::Senescence
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Germination => "germination",
            Self::Vegetative => "vegetative",
            Self::Reproductive => "reproductive",
            Self::Maturity => "maturity",
            Self::Senescence => "senescence",
        }
    }
}

/// Crop stage detection from the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropStage {
    pub current_stage: String,
    pub stage_confidence: f64,
    pub days_in_stage: i32,
    pub estimated_days_to_next: i32,
    pub growth_rate: String,
    pub phenology_score: f64,
}

// ---------------------------------------------------------------------------
// Comprehensive response
// ---------------------------------------------------------------------------

/// Response of `POST /api/advanced/comprehensive`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveAnalysis {
    pub farm_id: FarmId,
    pub analysis_date: String,
    pub indices: IndexReadings,
    pub health_score: HealthScore,
    pub stress_detection: StressDetection,
    pub yield_estimation: YieldEstimate,
    pub weather: Weather,
    pub crop_stage: CropStage,
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Risk assessment
// ---------------------------------------------------------------------------

/// Display band for a 0..=100 risk level. Same 25/50/75 cut points as
/// stress, but the risk vocabulary names the bottom band `low`, not
/// `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    /// Classify a risk level at the fixed 25/50/75 bands.
    pub fn from_level(level: f64) -> Self {
        if level < STRESS_MODERATE {
            Self::Low
        } else if level < STRESS_HIGH {
            Self::Moderate
        } else if level < STRESS_CRITICAL {
            Self::High
        } else {
            Self::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// One risk factor in the assessment breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub level: f64,
    pub status: String,
    pub description: String,
}

impl RiskFactor {
    pub fn band(&self) -> RiskLevel {
        RiskLevel::from_level(self.level)
    }
}

/// An alert raised for a high or critical risk factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAlert {
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: String,
    pub message: String,
    pub timestamp: String,
}

/// Response of `GET /api/advanced/risk-assessment/{farmId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub farm_id: FarmId,
    pub overall_risk: f64,
    pub risk_status: String,
    /// Factor breakdown keyed by kind: drought, flood, pest, disease,
    /// frost, heatwave.
    pub factors: HashMap<String, RiskFactor>,
    pub alerts: Vec<RiskAlert>,
    pub assessment_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_bands_at_thresholds() {
        assert_eq!(HealthStatus::from_score(80.0), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(79.9), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(65.0), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(50.0), HealthStatus::Fair);
        assert_eq!(HealthStatus::from_score(35.0), HealthStatus::Poor);
        assert_eq!(HealthStatus::from_score(34.9), HealthStatus::Critical);
    }

    #[test]
    fn stress_bands_at_thresholds() {
        assert_eq!(StressStatus::from_level(0.0), StressStatus::Normal);
        assert_eq!(StressStatus::from_level(25.0), StressStatus::Moderate);
        assert_eq!(StressStatus::from_level(50.0), StressStatus::High);
        assert_eq!(StressStatus::from_level(75.0), StressStatus::Critical);
        assert_eq!(StressStatus::from_level(100.0), StressStatus::Critical);
    }

    #[test]
    fn risk_bands_use_the_risk_vocabulary() {
        // Same cut points as stress, but the bottom band reads "low".
        assert_eq!(RiskLevel::from_level(10.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_level(10.0).label(), "low");
        assert_eq!(RiskLevel::from_level(25.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_level(50.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_level(75.0), RiskLevel::Critical);

        let factor = RiskFactor {
            name: "Drought Risk".to_string(),
            level: 12.0,
            status: "low".to_string(),
            description: "Adequate soil moisture".to_string(),
        };
        assert_eq!(factor.band().label(), factor.status);
    }

    #[test]
    fn growth_stage_from_ndvi() {
        assert_eq!(GrowthStage::from_ndvi(0.1), GrowthStage::Germination);
        assert_eq!(GrowthStage::from_ndvi(0.3), GrowthStage::Vegetative);
        assert_eq!(GrowthStage::from_ndvi(0.5), GrowthStage::Reproductive);
        assert_eq!(GrowthStage::from_ndvi(0.7), GrowthStage::Maturity);
        assert_eq!(GrowthStage::from_ndvi(0.8), GrowthStage::Senescence);
    }

    #[test]
    fn index_readings_use_backend_field_names() {
        let json = serde_json::json!({
            "NDVI": 0.62,
            "LAI": 3.4,
            "fPAR": 0.7,
            "CIgreen": 2.1,
        });
        let readings: IndexReadings = serde_json::from_value(json).unwrap();
        assert_eq!(readings.ndvi, Some(0.62));
        assert_eq!(readings.lai, Some(3.4));
        assert_eq!(readings.fpar, Some(0.7));
        assert_eq!(readings.ci_green, Some(2.1));
        assert_eq!(readings.evi, None);
    }

    #[test]
    fn risk_alert_uses_type_field_on_the_wire() {
        let json = serde_json::json!({
            "type": "drought",
            "severity": "warning",
            "message": "Drought risk is high",
            "timestamp": "2025-01-15 10:00",
        });
        let alert: RiskAlert = serde_json::from_value(json).unwrap();
        assert_eq!(alert.alert_type, "drought");
    }

    #[test]
    fn heat_stress_factor_without_indicator() {
        let json = serde_json::json!({
            "level": 62.0,
            "status": "high",
            "temperature_c": 37.5,
        });
        let factor: StressFactor = serde_json::from_value(json).unwrap();
        assert_eq!(factor.band(), StressStatus::High);
        assert_eq!(factor.temperature_c, Some(37.5));
        assert!(factor.indicator.is_none());
    }
}
