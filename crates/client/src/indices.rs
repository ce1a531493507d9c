//! Simple index query endpoints: time series, distribution, latest.
//!
//! All three are read-only aggregates and cached with
//! [`AGGREGATE_TTL`](crate::cache::AGGREGATE_TTL) staleness.

use agriwatch_core::indices::{IndexDistribution, IndexType, LatestIndices};
use agriwatch_core::timeseries::IndexTimeSeries;
use agriwatch_core::types::{Date, FarmId};

use crate::cache::AGGREGATE_TTL;
use crate::error::ApiClientError;
use crate::http::{cache_key, ApiClient};

impl ApiClient {
    /// `GET /api/indices/time-series/{farmId}`: per-acquisition index
    /// rows over a date window. `indices` is serialized as a repeated
    /// query parameter.
    pub async fn index_time_series(
        &self,
        farm_id: FarmId,
        start_date: Date,
        end_date: Date,
        indices: &[IndexType],
    ) -> Result<IndexTimeSeries, ApiClientError> {
        let path = format!("/indices/time-series/{farm_id}");
        let mut query: Vec<(&str, String)> = vec![
            ("start_date", start_date.to_string()),
            ("end_date", end_date.to_string()),
        ];
        for index in indices {
            query.push(("indices", index.as_str().to_string()));
        }

        let key = cache_key(&path, &query);
        if let Some(cached) = self
            .cache
            .get_fresh::<IndexTimeSeries>(&key, Some(AGGREGATE_TTL))
        {
            return Ok(cached);
        }

        let series: IndexTimeSeries = self.get_json_query(&path, &query).await?;
        self.cache.insert(&key, &series);
        Ok(series)
    }

    /// `GET /api/indices/distribution/{farmId}`: histogram of one
    /// index across the farm, optionally for a specific date.
    pub async fn index_distribution(
        &self,
        farm_id: FarmId,
        index_type: IndexType,
        analysis_date: Option<Date>,
    ) -> Result<IndexDistribution, ApiClientError> {
        let path = format!("/indices/distribution/{farm_id}");
        let mut query: Vec<(&str, String)> = vec![("index_type", index_type.as_str().to_string())];
        if let Some(date) = analysis_date {
            query.push(("analysis_date", date.to_string()));
        }

        let key = cache_key(&path, &query);
        if let Some(cached) = self
            .cache
            .get_fresh::<IndexDistribution>(&key, Some(AGGREGATE_TTL))
        {
            return Ok(cached);
        }

        let distribution: IndexDistribution = self.get_json_query(&path, &query).await?;
        self.cache.insert(&key, &distribution);
        Ok(distribution)
    }

    /// `GET /api/indices/latest/{farmId}`: most recent mean value per
    /// index for a farm.
    pub async fn latest_indices(&self, farm_id: FarmId) -> Result<LatestIndices, ApiClientError> {
        let path = format!("/indices/latest/{farm_id}");
        if let Some(cached) = self
            .cache
            .get_fresh::<LatestIndices>(&path, Some(AGGREGATE_TTL))
        {
            return Ok(cached);
        }

        let latest: LatestIndices = self.get_json(&path).await?;
        self.cache.insert(&path, &latest);
        Ok(latest)
    }
}
