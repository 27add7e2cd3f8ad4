use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// An asynchronous unit of work on a submit-and-poll provider.
///
/// Only status observations move the job forward, and a terminal job never
/// changes again.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationJob<T> {
    pub job_id: String,
    status: JobStatus,
    result: Option<T>,
    polls: u32,
}

impl<T> GenerationJob<T> {
    pub fn submitted(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Pending,
            result: None,
            polls: 0,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Record one status observation. Returns `false` when the job was
    /// already terminal and the observation was ignored.
    pub fn observe(&mut self, status: JobStatus, result: Option<T>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.polls += 1;
        self.status = status;
        if status == JobStatus::Succeeded {
            self.result = result;
        }
        true
    }

    pub fn into_result(self) -> Option<T> {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_stays_terminal() {
        let mut job = GenerationJob::submitted("job-1");
        assert!(job.observe(JobStatus::Pending, None));
        assert!(job.observe(JobStatus::Succeeded, Some("https://img/1.png")));
        assert!(!job.observe(JobStatus::Failed, None));

        assert_eq!(job.status(), JobStatus::Succeeded);
        assert_eq!(job.polls(), 2);
        assert_eq!(job.into_result(), Some("https://img/1.png"));
    }

    #[test]
    fn test_failed_job_has_no_result() {
        let mut job: GenerationJob<String> = GenerationJob::submitted("job-2");
        job.observe(JobStatus::Failed, Some("ignored".into()));
        assert!(job.status().is_terminal());
        assert_eq!(job.into_result(), None);
    }
}
