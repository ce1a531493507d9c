//! Analysis job status vocabulary.
//!
//! Statuses are assigned by the backend and only observed by this
//! client. The lifecycle is monotonic: {pending|queued} -> processing
//! -> {completed|failed}. A displayed status must never move backward,
//! so observers gate updates through [`JobStatus::may_follow`].

use serde::{Deserialize, Serialize};

/// Lifecycle state of a server-tracked analysis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether this status ends the job (no further transitions).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Position in the monotonic lifecycle. Pending and queued share a
    /// rank: the backend may report either before processing starts.
    pub fn rank(self) -> u8 {
        match self {
            Self::Pending | Self::Queued => 0,
            Self::Processing => 1,
            Self::Completed | Self::Failed => 2,
        }
    }

    /// Whether observing this status after `prev` keeps the displayed
    /// lifecycle monotonic.
    pub fn may_follow(self, prev: JobStatus) -> bool {
        self.rank() >= prev.rank()
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Queued => "Queued",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }

    #[test]
    fn lifecycle_is_monotonic() {
        assert!(JobStatus::Processing.may_follow(JobStatus::Pending));
        assert!(JobStatus::Completed.may_follow(JobStatus::Processing));
        assert!(JobStatus::Failed.may_follow(JobStatus::Queued));
    }

    #[test]
    fn backward_transitions_rejected() {
        assert!(!JobStatus::Pending.may_follow(JobStatus::Processing));
        assert!(!JobStatus::Processing.may_follow(JobStatus::Completed));
        assert!(!JobStatus::Queued.may_follow(JobStatus::Failed));
    }

    #[test]
    fn pending_and_queued_interchangeable() {
        assert!(JobStatus::Queued.may_follow(JobStatus::Pending));
        assert!(JobStatus::Pending.may_follow(JobStatus::Queued));
    }

    #[test]
    fn same_status_may_repeat() {
        assert!(JobStatus::Processing.may_follow(JobStatus::Processing));
    }

    #[test]
    fn wire_format_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Processing).unwrap(),
            "\"processing\""
        );
        let s: JobStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(s, JobStatus::Completed);
    }
}
