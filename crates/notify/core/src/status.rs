//! Persisted notification status.

use std::fmt;
use std::str::FromStr;

/// Lifecycle of a persisted job record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum JobStatus {
    Pending,
    Done,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::Done => "Done",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = color_eyre::eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(JobStatus::Pending),
            "Done" => Ok(JobStatus::Done),
            other => Err(color_eyre::eyre::eyre!("unknown job status: {}", other)),
        }
    }
}

/// Write-of-record for a job's outcome.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NotificationStatus {
    pub job_id: String,
    pub title: String,
    pub body: String,
    pub category: String,
    /// Recipients at submission time.
    pub total_count: i64,
    pub successful_count: i64,
    pub failed_count: i64,
    pub status: JobStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl NotificationStatus {
    /// Build the Pending record for a freshly submitted job.
    pub fn pending(job: &crate::NotificationJob) -> Self {
        let now = chrono::Utc::now();
        let payload = job.payload();

        Self {
            job_id: job.id().to_string(),
            title: payload.title.clone(),
            body: payload.body.clone(),
            category: payload.category().unwrap_or_default().to_string(),
            total_count: job.tokens().len() as i64,
            successful_count: 0,
            failed_count: 0,
            status: JobStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
