use std::future::Future;
use tokio::time::{sleep, Instant};
use tracing::debug;
use mg_core::{Error, GenerationJob, JobStatus, Result};
use crate::config::PollConfig;

/// One status observation from a provider
#[derive(Debug, Clone, PartialEq)]
pub enum PollState<T> {
    Pending,
    Succeeded(T),
    Failed(String),
}

/// Query `check` until the job reaches a terminal status.
///
/// The first check happens immediately. After each pending observation the
/// wait doubles, capped at `max_interval`, and the job fails with
/// `DeadlineExceeded` once the next wait would cross `deadline`.
pub async fn poll_until_terminal<T, F, Fut>(
    service: &str,
    config: &PollConfig,
    mut job: GenerationJob<T>,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollState<T>>>,
{
    let started = Instant::now();
    let mut interval = config.initial_interval;

    loop {
        match check().await? {
            PollState::Succeeded(result) => {
                job.observe(JobStatus::Succeeded, Some(result));
                debug!(service, job_id = %job.job_id, polls = job.polls(), "job succeeded");
                let job_id = job.job_id.clone();
                return job.into_result().ok_or_else(|| {
                    Error::parse(format!("{service} job {job_id} succeeded without a result"))
                });
            }
            PollState::Failed(reason) => {
                job.observe(JobStatus::Failed, None);
                return Err(Error::JobFailed {
                    service: service.to_string(),
                    job_id: job.job_id,
                    reason,
                });
            }
            PollState::Pending => {
                job.observe(JobStatus::Pending, None);
                debug!(service, job_id = %job.job_id, polls = job.polls(), "job pending");
            }
        }

        let waited = started.elapsed();
        if waited + interval > config.deadline {
            return Err(Error::DeadlineExceeded {
                service: service.to_string(),
                job_id: job.job_id,
                waited,
            });
        }

        sleep(interval).await;
        interval = (interval * 2).min(config.max_interval);
    }
}
