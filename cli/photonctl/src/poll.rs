//! Task polling: drive a server-side task to a terminal outcome.
//!
//! Mutating controller operations return a task id immediately; this module
//! tracks the task until it completes, fails, exhausts the fetch retry
//! budget, or outlives the wall-clock timeout. Interactive runs animate a
//! progress line while polling; scripting runs delegate to the controller's
//! blocking wait endpoint instead.

use std::sync::Arc;
use std::time::Duration;

use photon_api::{api_error_list, ApiError, Task};
use photon_sdk::{ApiClientError, Tasks};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::output::{print_success, OutputMode};
use crate::progress::{ProgressAnimator, ProgressTracker};

/// Fixed delay between task fetches. No backoff: observable timing stays
/// flat at one fetch per interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Wall-clock budget for a polled task.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Consecutive fetch failures tolerated before giving up.
pub const DEFAULT_RETRY_LIMIT: u32 = 3;

/// Terminal outcomes of a tracked task, other than success.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The controller marked the task ERROR.
    #[error("task {task_id} ({operation}) failed: {}", format_api_errors(.errors))]
    Failed {
        task_id: String,
        operation: String,
        errors: Vec<ApiError>,
    },

    /// Fetching the task failed more than the retry budget in a row.
    #[error("giving up on task {task_id} after {attempts} consecutive fetch failures: {source}")]
    Transport {
        task_id: String,
        attempts: u32,
        errors: Vec<ApiError>,
        #[source]
        source: ApiClientError,
    },

    /// No terminal state within the wall-clock budget.
    #[error("timed out after {timeout:?} waiting for task {task_id}")]
    Timeout { task_id: String, timeout: Duration },
}

impl TaskError {
    fn failed(task: &Task) -> Self {
        Self::Failed {
            task_id: task.id.clone(),
            operation: task.operation.clone(),
            errors: task.api_errors(),
        }
    }
}

fn format_api_errors(errors: &[ApiError]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Polls one task to a terminal outcome.
pub struct TaskPoller<C> {
    client: C,
    poll_interval: Duration,
    retry_limit: u32,
    animate: bool,
}

impl<C: Tasks> TaskPoller<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry_limit: DEFAULT_RETRY_LIMIT,
            animate: true,
        }
    }

    #[cfg(test)]
    fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Disable the progress line (scripting callers and tests).
    pub fn without_animation(mut self) -> Self {
        self.animate = false;
        self
    }

    /// Poll with the default 30-minute timeout.
    pub async fn poll_task(&self, task_id: &str) -> Result<Task, TaskError> {
        self.poll_task_with_timeout(task_id, DEFAULT_TIMEOUT).await
    }

    /// Poll until the task is terminal, the retry budget is exhausted, or
    /// `timeout` elapses.
    pub async fn poll_task_with_timeout(
        &self,
        task_id: &str,
        timeout: Duration,
    ) -> Result<Task, TaskError> {
        let tracker = Arc::new(ProgressTracker::new());
        let animator = self
            .animate
            .then(|| ProgressAnimator::spawn(Arc::clone(&tracker)));

        let outcome = self.poll_loop(task_id, timeout, &tracker).await;

        // Join the animator before returning so its final line clear lands
        // ahead of whatever the caller prints next.
        if let Some(handle) = animator {
            handle.finish().await;
        }

        outcome
    }

    async fn poll_loop(
        &self,
        task_id: &str,
        timeout: Duration,
        tracker: &ProgressTracker,
    ) -> Result<Task, TaskError> {
        let deadline = Instant::now() + timeout;
        let mut consecutive_failures = 0u32;

        loop {
            match self.client.get_task(task_id).await {
                Ok(task) => {
                    consecutive_failures = 0;
                    tracker.publish(task.clone());
                    debug!(task_id, state = %task.state, "fetched task");

                    if task.is_completed() {
                        return Ok(task);
                    }
                    if task.is_failed() {
                        return Err(TaskError::failed(&task));
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    warn!(task_id, consecutive_failures, error = %e, "task fetch failed");

                    if consecutive_failures > self.retry_limit {
                        return Err(TaskError::Transport {
                            task_id: task_id.to_string(),
                            attempts: consecutive_failures,
                            errors: api_error_list(e.task()),
                            source: e,
                        });
                    }
                }
            }

            tokio::time::sleep(self.poll_interval).await;

            if Instant::now() >= deadline {
                return Err(TaskError::Timeout {
                    task_id: task_id.to_string(),
                    timeout,
                });
            }
        }
    }
}

/// Wait for a task submitted by a mutating command and print the outcome.
///
/// Scripting mode makes one blocking-wait call against the controller and
/// emits only the affected entity id, one line, machine-parseable.
/// Interactive mode polls with the default timeout, animating progress, and
/// prints a human-readable confirmation. Both modes map failures into the
/// same [`TaskError`] taxonomy.
pub async fn wait_on_task_operation<C: Tasks>(
    client: C,
    task_id: &str,
    mode: OutputMode,
) -> Result<Task, TaskError> {
    match mode {
        OutputMode::Scripting => {
            let task = client
                .wait_task(task_id)
                .await
                .map_err(|e| wait_failure(task_id, e))?;

            if task.is_failed() {
                return Err(TaskError::failed(&task));
            }

            match &task.entity {
                Some(entity) => println!("{}", entity.id),
                None => println!("{}", task.id),
            }
            Ok(task)
        }
        OutputMode::Interactive => {
            let task = TaskPoller::new(client).poll_task(task_id).await?;

            match &task.entity {
                Some(entity) => print_success(&format!(
                    "{} completed for '{}' entity {}",
                    task.operation, entity.kind, entity.id
                )),
                None => print_success(&format!("{} completed", task.operation)),
            }
            Ok(task)
        }
    }
}

/// Map a failed blocking-wait call into the task error taxonomy.
fn wait_failure(task_id: &str, e: ApiClientError) -> TaskError {
    if let Some(task) = e.task() {
        if task.is_failed() {
            return TaskError::failed(task);
        }
    }

    TaskError::Transport {
        task_id: task_id.to_string(),
        attempts: 1,
        errors: api_error_list(e.task()),
        source: e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use photon_api::{task_states, EntityRef, Step};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Clone)]
    enum Canned {
        Ok(Task),
        Err { status: u16, task: Option<Task> },
    }

    impl Canned {
        fn into_result(self) -> Result<Task, ApiClientError> {
            match self {
                Canned::Ok(task) => Ok(task),
                Canned::Err { status, task } => Err(ApiClientError::api(status, vec![], task)),
            }
        }
    }

    /// Plays back a fixed response script, then repeats the fallback.
    struct ScriptedTasks {
        script: Mutex<VecDeque<Canned>>,
        fallback: Canned,
    }

    impl ScriptedTasks {
        fn new(script: Vec<Canned>, fallback: Canned) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback,
            }
        }

        fn next(&self) -> Result<Task, ApiClientError> {
            let canned = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());
            canned.into_result()
        }
    }

    #[async_trait]
    impl Tasks for ScriptedTasks {
        async fn get_task(&self, _id: &str) -> Result<Task, ApiClientError> {
            self.next()
        }

        async fn wait_task(&self, _id: &str) -> Result<Task, ApiClientError> {
            self.next()
        }
    }

    fn task(state: &str) -> Task {
        Task {
            id: "t-1".to_string(),
            operation: "CREATE_DISK".to_string(),
            state: state.to_string(),
            entity: Some(EntityRef {
                id: "disk-9".to_string(),
                kind: "persistent-disk".to_string(),
            }),
            ..Default::default()
        }
    }

    fn failed_task() -> Task {
        let mut failed = task(task_states::ERROR);
        failed.steps = vec![
            Step {
                sequence: 0,
                operation: "RESERVE_RESOURCE".to_string(),
                state: task_states::ERROR.to_string(),
                errors: vec![ApiError {
                    code: "QuotaError".to_string(),
                    message: "quota exceeded".to_string(),
                    data: None,
                }],
                ..Default::default()
            },
            Step {
                sequence: 1,
                operation: "CREATE_DISK".to_string(),
                state: task_states::ERROR.to_string(),
                errors: vec![ApiError {
                    code: "Rollback".to_string(),
                    message: "reservation released".to_string(),
                    data: None,
                }],
                ..Default::default()
            },
        ];
        failed
    }

    fn poller(client: ScriptedTasks) -> TaskPoller<ScriptedTasks> {
        TaskPoller::new(client).without_animation()
    }

    #[tokio::test(start_paused = true)]
    async fn returns_completed_task_after_two_polls() {
        let client = ScriptedTasks::new(
            vec![Canned::Ok(task(task_states::QUEUED))],
            Canned::Ok(task(task_states::COMPLETED)),
        );

        let start = Instant::now();
        let result = poller(client).poll_task("t-1").await.unwrap();

        assert!(result.is_completed());
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_task_reports_all_step_errors_in_order() {
        let client = ScriptedTasks::new(vec![], Canned::Ok(failed_task()));

        let err = poller(client).poll_task("t-1").await.unwrap_err();

        match &err {
            TaskError::Failed { errors, .. } => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].code, "QuotaError");
                assert_eq!(errors[1].code, "Rollback");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(err.to_string().contains("quota exceeded"));
        assert!(err.to_string().contains("reservation released"));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_success_resets_consecutive_failure_budget() {
        // Four failures total, but never more than two in a row: polling
        // continues past the budget boundary and still succeeds.
        let transient = Canned::Err {
            status: 503,
            task: None,
        };
        let client = ScriptedTasks::new(
            vec![
                transient.clone(),
                transient.clone(),
                Canned::Ok(task(task_states::QUEUED)),
                transient.clone(),
                transient.clone(),
            ],
            Canned::Ok(task(task_states::COMPLETED)),
        );

        let result = poller(client).poll_task("t-1").await.unwrap();
        assert!(result.is_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn aborts_on_fourth_consecutive_failure_before_timeout() {
        let client = ScriptedTasks::new(
            vec![],
            Canned::Err {
                status: 503,
                task: None,
            },
        );

        let start = Instant::now();
        let err = poller(client).poll_task("t-1").await.unwrap_err();

        match err {
            TaskError::Transport { attempts, .. } => assert_eq!(attempts, 4),
            other => panic!("expected Transport, got {other:?}"),
        }
        // Three retries at 500 ms each, then the aborting fetch: well under
        // the 30-minute default timeout.
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_extracts_partial_task_errors() {
        let client = ScriptedTasks::new(
            vec![],
            Canned::Err {
                status: 500,
                task: Some(failed_task()),
            },
        );

        let err = poller(client).poll_task("t-1").await.unwrap_err();

        match err {
            TaskError::Transport { errors, .. } => {
                assert_eq!(errors[0].message, "quota exceeded");
                assert_eq!(errors[1].message, "reservation released");
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_no_terminal_state() {
        let client = ScriptedTasks::new(vec![], Canned::Ok(task(task_states::QUEUED)));

        let start = Instant::now();
        let err = poller(client)
            .poll_task_with_timeout("t-1", Duration::from_secs(2))
            .await
            .unwrap_err();

        assert!(matches!(err, TaskError::Timeout { .. }));
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_interval_is_configurable() {
        let client = ScriptedTasks::new(
            vec![Canned::Ok(task(task_states::QUEUED))],
            Canned::Ok(task(task_states::COMPLETED)),
        );

        let start = Instant::now();
        let result = poller(client)
            .with_poll_interval(Duration::from_millis(50))
            .poll_task("t-1")
            .await
            .unwrap();

        assert!(result.is_completed());
        assert_eq!(start.elapsed(), Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn animated_poll_joins_animator_before_returning() {
        // Animation on: exercises the spawn/finish path end to end.
        let client = ScriptedTasks::new(
            vec![Canned::Ok(task(task_states::QUEUED))],
            Canned::Ok(task(task_states::COMPLETED)),
        );

        let result = TaskPoller::new(client).poll_task("t-1").await.unwrap();
        assert!(result.is_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn scripting_wait_returns_terminal_task() {
        let client = ScriptedTasks::new(vec![], Canned::Ok(task(task_states::COMPLETED)));

        let result = wait_on_task_operation(&client, "t-1", OutputMode::Scripting)
            .await
            .unwrap();

        assert_eq!(result.entity.unwrap().id, "disk-9");
    }

    #[tokio::test(start_paused = true)]
    async fn scripting_wait_surfaces_failed_task() {
        let client = ScriptedTasks::new(vec![], Canned::Ok(failed_task()));

        let err = wait_on_task_operation(&client, "t-1", OutputMode::Scripting)
            .await
            .unwrap_err();

        assert!(matches!(err, TaskError::Failed { .. }));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test(start_paused = true)]
    async fn interactive_wait_polls_to_completion() {
        let client = ScriptedTasks::new(
            vec![Canned::Ok(task(task_states::QUEUED))],
            Canned::Ok(task(task_states::COMPLETED)),
        );

        let result = wait_on_task_operation(&client, "t-1", OutputMode::Interactive)
            .await
            .unwrap();

        assert!(result.is_completed());
    }
}
