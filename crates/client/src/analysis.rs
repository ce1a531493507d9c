//! Analysis job endpoints: submission, status polling, results.
//!
//! Status reads are deliberately uncached; the poller must always see
//! the live job state. Result retrieval is memoized by the poller, not
//! here.

use agriwatch_core::analysis::{AnalysisJob, AnalysisRequest, AnalysisResult};
use agriwatch_core::types::JobId;

use crate::error::ApiClientError;
use crate::http::ApiClient;

impl ApiClient {
    /// `POST /api/analysis`: submit a job. The request is validated
    /// client-side (polygon, date window, index list, bounds) before
    /// being sent. Returns the job descriptor with its initial status.
    pub async fn submit_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisJob, ApiClientError> {
        request.validate()?;
        let job: AnalysisJob = self.post_json("/analysis", request).await?;
        tracing::info!(job_id = %job.job_id, status = ?job.status, "Analysis job submitted");
        Ok(job)
    }

    /// `GET /api/analysis/{jobId}`: poll the live job status.
    pub async fn job_status(&self, job_id: JobId) -> Result<AnalysisJob, ApiClientError> {
        self.get_json(&format!("/analysis/{job_id}")).await
    }

    /// `GET /api/analysis/{jobId}/result`: fetch the terminal result.
    /// The backend rejects this until the job has completed.
    pub async fn job_result(&self, job_id: JobId) -> Result<AnalysisResult, ApiClientError> {
        self.get_json(&format!("/analysis/{job_id}/result")).await
    }

    /// `DELETE /api/analysis/{jobId}`: cancel a queued or running job.
    pub async fn cancel_job(&self, job_id: JobId) -> Result<(), ApiClientError> {
        self.delete(&format!("/analysis/{job_id}")).await?;
        tracing::info!(job_id = %job_id, "Analysis job cancelled");
        Ok(())
    }
}
