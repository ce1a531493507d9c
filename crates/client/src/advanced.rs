//! Advanced analysis endpoints: comprehensive analysis, risk
//! assessment, and single-index history.
//!
//! Comprehensive analysis is synchronous on the backend and never
//! cached (each call is a fresh computation request). Risk assessment
//! and time series are read-only aggregates with TTL staleness.

use agriwatch_core::advanced::{ComprehensiveAnalysis, ComprehensiveRequest, RiskAssessment};
use agriwatch_core::timeseries::AdvancedTimeSeries;
use agriwatch_core::types::FarmId;

use crate::cache::AGGREGATE_TTL;
use crate::error::ApiClientError;
use crate::http::{cache_key, ApiClient};

impl ApiClient {
    /// `POST /api/advanced/comprehensive`: synchronous comprehensive
    /// analysis: indices, health score, stress, yield, weather, crop
    /// stage, and recommendations in one response.
    pub async fn comprehensive_analysis(
        &self,
        request: &ComprehensiveRequest,
    ) -> Result<ComprehensiveAnalysis, ApiClientError> {
        request.geometry.validate()?;
        self.post_json("/advanced/comprehensive", request).await
    }

    /// `GET /api/advanced/risk-assessment/{farmId}`: risk factor
    /// breakdown plus alerts.
    pub async fn risk_assessment(
        &self,
        farm_id: FarmId,
    ) -> Result<RiskAssessment, ApiClientError> {
        let path = format!("/advanced/risk-assessment/{farm_id}");
        if let Some(cached) = self
            .cache
            .get_fresh::<RiskAssessment>(&path, Some(AGGREGATE_TTL))
        {
            return Ok(cached);
        }

        let assessment: RiskAssessment = self.get_json(&path).await?;
        self.cache.insert(&path, &assessment);
        Ok(assessment)
    }

    /// `GET /api/advanced/time-series/{farmId}`: `days` of history for
    /// one index as `(date, value)` samples.
    pub async fn advanced_time_series(
        &self,
        farm_id: FarmId,
        index: &str,
        days: u32,
    ) -> Result<AdvancedTimeSeries, ApiClientError> {
        let path = format!("/advanced/time-series/{farm_id}");
        let query: Vec<(&str, String)> =
            vec![("index", index.to_string()), ("days", days.to_string())];

        let key = cache_key(&path, &query);
        if let Some(cached) = self
            .cache
            .get_fresh::<AdvancedTimeSeries>(&key, Some(AGGREGATE_TTL))
        {
            return Ok(cached);
        }

        let series: AdvancedTimeSeries = self.get_json_query(&path, &query).await?;
        self.cache.insert(&key, &series);
        Ok(series)
    }
}
