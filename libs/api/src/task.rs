//! Asynchronous task model.
//!
//! Every mutating controller operation (create/delete/start/stop) is tracked
//! server-side as a task with ordered steps. The client re-fetches the task
//! until it reaches a terminal state; task records are never mutated locally.

use serde::{Deserialize, Serialize};

// =============================================================================
// State Constants
// =============================================================================

/// Task and step states the client compares against.
///
/// The state vocabulary is owned by the controller. States not listed here
/// deserialize fine and are treated as in-flight.
pub mod task_states {
    pub const QUEUED: &str = "QUEUED";
    pub const STARTED: &str = "STARTED";
    pub const COMPLETED: &str = "COMPLETED";
    pub const ERROR: &str = "ERROR";
}

/// Entity kinds referenced by tasks.
pub mod entity_kinds {
    pub const TENANT: &str = "tenant";
    pub const PROJECT: &str = "project";
    pub const PERSISTENT_DISK: &str = "persistent-disk";
    pub const VM: &str = "vm";
    pub const HOST: &str = "host";
}

// =============================================================================
// Task Model
// =============================================================================

/// Server-tracked asynchronous operation record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Task {
    pub id: String,

    /// Symbolic operation name, e.g. `CREATE_DISK`.
    #[serde(default)]
    pub operation: String,

    /// Server-defined state string.
    #[serde(default)]
    pub state: String,

    /// Reference to the affected resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityRef>,

    /// Ordered execution steps.
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Millisecond epoch timestamps; `end_time` is 0 while in flight.
    #[serde(default)]
    pub started_time: i64,
    #[serde(default)]
    pub end_time: i64,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.state == task_states::COMPLETED
    }

    pub fn is_failed(&self) -> bool {
        self.state == task_states::ERROR
    }

    /// A terminal task never goes back in flight.
    pub fn is_terminal(&self) -> bool {
        self.is_completed() || self.is_failed()
    }

    /// The currently executing step, if any.
    ///
    /// The controller guarantees at most one step is STARTED at a time.
    pub fn started_step(&self) -> Option<&Step> {
        self.steps
            .iter()
            .find(|step| step.state == task_states::STARTED)
    }

    /// Task duration in milliseconds, 0 while in flight.
    pub fn duration_ms(&self) -> i64 {
        if self.end_time > 0 {
            self.end_time - self.started_time
        } else {
            0
        }
    }

    /// All step errors flattened, step order then within-step order.
    pub fn api_errors(&self) -> Vec<ApiError> {
        self.steps
            .iter()
            .flat_map(|step| step.errors.iter().cloned())
            .collect()
    }
}

/// Flatten every step error of `task` into one ordered list.
///
/// Tolerates a missing task (and tasks with no steps) by returning an empty
/// list; this never fails.
pub fn api_error_list(task: Option<&Task>) -> Vec<ApiError> {
    task.map(Task::api_errors).unwrap_or_default()
}

/// Ordered sub-unit of a task's execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Step {
    /// Zero-based position within the task.
    #[serde(default)]
    pub sequence: usize,

    #[serde(default)]
    pub operation: String,

    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub errors: Vec<ApiError>,

    #[serde(default)]
    pub started_time: i64,
    #[serde(default)]
    pub end_time: i64,
}

/// Reference to the resource a task operates on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    pub kind: String,
}

/// Structured error attached to a failed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: String,

    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.code.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(sequence: usize, state: &str, errors: Vec<ApiError>) -> Step {
        Step {
            sequence,
            operation: format!("STEP_{sequence}"),
            state: state.to_string(),
            errors,
            ..Default::default()
        }
    }

    fn api_error(code: &str, message: &str) -> ApiError {
        ApiError {
            code: code.to_string(),
            message: message.to_string(),
            data: None,
        }
    }

    #[test]
    fn test_terminal_predicates() {
        let mut task = Task {
            state: task_states::QUEUED.to_string(),
            ..Default::default()
        };
        assert!(!task.is_terminal());

        task.state = task_states::COMPLETED.to_string();
        assert!(task.is_completed());
        assert!(task.is_terminal());

        task.state = task_states::ERROR.to_string();
        assert!(task.is_failed());
        assert!(task.is_terminal());

        // Unknown server states are in flight, not terminal.
        task.state = "CANCELLING".to_string();
        assert!(!task.is_terminal());
    }

    #[test]
    fn test_started_step() {
        let task = Task {
            steps: vec![
                step(0, task_states::COMPLETED, vec![]),
                step(1, task_states::STARTED, vec![]),
                step(2, task_states::QUEUED, vec![]),
            ],
            ..Default::default()
        };

        assert_eq!(task.started_step().unwrap().sequence, 1);
    }

    #[test]
    fn test_api_errors_preserve_order() {
        let task = Task {
            steps: vec![
                step(0, task_states::ERROR, vec![
                    api_error("QuotaError", "quota exceeded"),
                    api_error("InternalError", "please retry"),
                ]),
                step(1, task_states::ERROR, vec![api_error("DiskNotFound", "no such disk")]),
            ],
            ..Default::default()
        };

        let errors = task.api_errors();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].code, "QuotaError");
        assert_eq!(errors[1].code, "InternalError");
        assert_eq!(errors[2].code, "DiskNotFound");
    }

    #[test]
    fn test_api_error_list_tolerates_missing_task() {
        assert!(api_error_list(None).is_empty());

        let task = Task::default();
        assert!(api_error_list(Some(&task)).is_empty());
    }

    #[test]
    fn test_duration_in_flight_is_zero() {
        let mut task = Task {
            started_time: 1_700_000_000_000,
            ..Default::default()
        };
        assert_eq!(task.duration_ms(), 0);

        task.end_time = 1_700_000_004_500;
        assert_eq!(task.duration_ms(), 4_500);
    }

    #[test]
    fn test_partial_task_deserializes() {
        // The controller may return a sparse task inside an error body.
        let task: Task = serde_json::from_str(r#"{"id": "t-1", "state": "ERROR"}"#).unwrap();
        assert_eq!(task.id, "t-1");
        assert!(task.is_failed());
        assert!(task.steps.is_empty());
        assert!(task.entity.is_none());
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            api_error("QuotaError", "quota exceeded").to_string(),
            "QuotaError: quota exceeded"
        );
        assert_eq!(api_error("", "bare message").to_string(), "bare message");
    }
}
