//! Farm records and client-side list filtering.
//!
//! Farms are plain CRUD entities owned by the backend. The only logic
//! here is the case-insensitive substring search used by the farm list
//! view and its skip/limit pagination.

use serde::{Deserialize, Serialize};

use crate::geometry::GeoPolygon;
use crate::types::{Date, FarmId, Timestamp};

/// A farm as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Farm {
    pub id: FarmId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farmer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farmer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sowing_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_harvest: Option<Date>,
    pub geometry: GeoPolygon,
    /// Authoritative area computed by the backend.
    pub area_sqm: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Most recent NDVI mean cached on the farm record, if any analysis ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_ndvi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_analysis_date: Option<Timestamp>,
}

/// Payload for `POST /api/farms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farmer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farmer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sowing_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_harvest: Option<Date>,
    pub geometry: GeoPolygon,
}

/// Partial update payload for `PUT /api/farms/{id}`.
///
/// Absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FarmUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farmer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farmer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sowing_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_harvest: Option<Date>,
}

impl Farm {
    /// Case-insensitive substring match over name, farmer name, and
    /// location, the same fields the backend list endpoint searches.
    pub fn matches_search(&self, search: &str) -> bool {
        let needle = search.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self
                .farmer_name
                .as_deref()
                .is_some_and(|f| f.to_lowercase().contains(&needle))
            || self
                .location
                .as_deref()
                .is_some_and(|l| l.to_lowercase().contains(&needle))
    }
}

/// Filter a farm list by search text, then apply skip/limit pagination.
pub fn filter_farms<'a>(
    farms: &'a [Farm],
    search: Option<&str>,
    skip: usize,
    limit: usize,
) -> Vec<&'a Farm> {
    farms
        .iter()
        .filter(|f| search.is_none_or(|s| f.matches_search(s)))
        .skip(skip)
        .take(limit)
        .collect()
}
