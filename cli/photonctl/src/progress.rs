//! Live progress display for in-flight tasks.
//!
//! One animator runs per polled task. The poll loop publishes each fetched
//! task snapshot into a [`ProgressTracker`]; the animator repaints a single
//! terminal line from the latest snapshot on its own cadence, so the display
//! keeps moving even while a fetch is in flight.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use photon_api::Task;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Redraw cadence, decoupled from the poll interval.
pub const REDRAW_INTERVAL: Duration = Duration::from_millis(500);

/// Shared slot holding the most recently fetched task.
///
/// Written only by the poll loop, read only by the animator. The value is
/// replaced wholesale on every publish; task fields are never mutated in
/// place. Constructed fresh for every poll call.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    current: Mutex<Option<Task>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, task: Task) {
        *self.current.lock().unwrap() = Some(task);
    }

    pub fn snapshot(&self) -> Option<Task> {
        self.current.lock().unwrap().clone()
    }
}

/// Handle to a running animator.
pub struct AnimatorHandle {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl AnimatorHandle {
    /// Stop the animator and wait for its final line clear.
    ///
    /// Callers must await this before printing anything else; the join is
    /// what keeps the cleared line ordered ahead of subsequent output.
    pub async fn finish(self) {
        let _ = self.stop.send(true);
        let _ = self.handle.await;
    }
}

/// Single-line progress animator.
pub struct ProgressAnimator;

impl ProgressAnimator {
    /// Spawn an animator repainting to stdout until stopped.
    pub fn spawn(tracker: Arc<ProgressTracker>) -> AnimatorHandle {
        Self::spawn_with_writer(tracker, io::stdout())
    }

    /// Spawn an animator repainting to an arbitrary writer (used by tests).
    pub fn spawn_with_writer<W>(tracker: Arc<ProgressTracker>, writer: W) -> AnimatorHandle
    where
        W: Write + Send + 'static,
    {
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run(tracker, writer, stop_rx));
        AnimatorHandle {
            stop: stop_tx,
            handle,
        }
    }
}

async fn run<W: Write>(tracker: Arc<ProgressTracker>, mut out: W, mut stop: watch::Receiver<bool>) {
    let started = Instant::now();
    let mut ticker = tokio::time::interval(REDRAW_INTERVAL);
    let mut last_width = 0usize;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(task) = tracker.snapshot() {
                    let line = render_line(&task, started.elapsed());
                    repaint(&mut out, &mut last_width, &line);
                }
            }
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
        }
    }

    // Leave no animation residue behind.
    clear_line(&mut out, &mut last_width);
}

/// Overwrite the previous line with spaces, then draw the new one.
fn repaint<W: Write>(out: &mut W, last_width: &mut usize, line: &str) {
    let _ = write!(out, "\r{}\r{}", " ".repeat(*last_width), line);
    let _ = out.flush();
    *last_width = line.chars().count();
}

fn clear_line<W: Write>(out: &mut W, last_width: &mut usize) {
    let _ = write!(out, "\r{}\r", " ".repeat(*last_width));
    let _ = out.flush();
    *last_width = 0;
}

/// Render the progress line for a task snapshot.
///
/// With a step in flight: elapsed clock, progress bar, task and step
/// operations, and the step counter. Without one the display falls back to
/// the task's own state.
pub(crate) fn render_line(task: &Task, elapsed: Duration) -> String {
    match task.started_step() {
        Some(step) => {
            let total = task.steps.len();
            format!(
                "{} [{}] {} : {} | Step {}/{}",
                format_elapsed(elapsed),
                progress_bar(progress_cursor(task), total),
                task.operation,
                step.operation,
                step.sequence + 1,
                total,
            )
        }
        None => format!("... : {}", task.state),
    }
}

/// Bar position: one past the started step's sequence, clamped to the bar.
pub(crate) fn progress_cursor(task: &Task) -> usize {
    match task.started_step() {
        Some(step) => (step.sequence + 1).min(task.steps.len()),
        None => 0,
    }
}

/// `cursor` filled segments out of `total + 1`.
pub(crate) fn progress_bar(cursor: usize, total: usize) -> String {
    let width = total + 1;
    let cursor = cursor.min(width);
    format!("{}{}", "=".repeat(cursor), " ".repeat(width - cursor))
}

pub(crate) fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}h{}m{}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use photon_api::{task_states, Step};

    fn task_with_steps(steps: Vec<(usize, &str, &str)>) -> Task {
        Task {
            id: "t-1".to_string(),
            operation: "CREATE_VM".to_string(),
            state: task_states::STARTED.to_string(),
            steps: steps
                .into_iter()
                .map(|(sequence, operation, state)| Step {
                    sequence,
                    operation: operation.to_string(),
                    state: state.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_cursor_is_one_past_started_step() {
        let task = task_with_steps(vec![
            (0, "RESERVE", task_states::COMPLETED),
            (1, "PLACE", task_states::STARTED),
            (2, "ATTACH", task_states::QUEUED),
        ]);
        assert_eq!(progress_cursor(&task), 2);
    }

    #[test]
    fn test_cursor_zero_without_started_step() {
        let task = task_with_steps(vec![(0, "RESERVE", task_states::QUEUED)]);
        assert_eq!(progress_cursor(&task), 0);
    }

    #[test]
    fn test_cursor_clamps_to_step_count() {
        // A sequence past the end of the list must not overrun the bar.
        let task = task_with_steps(vec![(7, "PLACE", task_states::STARTED)]);
        assert_eq!(progress_cursor(&task), 1);
    }

    #[test]
    fn test_bar_width_is_total_plus_one() {
        assert_eq!(progress_bar(0, 3), "    ");
        assert_eq!(progress_bar(2, 3), "==  ");
        assert_eq!(progress_bar(3, 3), "=== ");
        assert_eq!(progress_bar(9, 3), "====");
    }

    #[test]
    fn test_render_line_with_started_step() {
        let task = task_with_steps(vec![
            (0, "RESERVE", task_states::COMPLETED),
            (1, "PLACE", task_states::STARTED),
        ]);
        let line = render_line(&task, Duration::from_secs(65));
        assert_eq!(line, "0h1m5s [== ] CREATE_VM : PLACE | Step 2/2");
    }

    #[test]
    fn test_render_line_falls_back_to_task_state() {
        let task = Task {
            state: task_states::QUEUED.to_string(),
            ..Default::default()
        };
        assert_eq!(render_line(&task, Duration::ZERO), "... : QUEUED");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "0h0m0s");
        assert_eq!(format_elapsed(Duration::from_secs(59)), "0h0m59s");
        assert_eq!(format_elapsed(Duration::from_secs(3661)), "1h1m1s");
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_animator_repaints_and_clears_on_stop() {
        let tracker = Arc::new(ProgressTracker::new());
        tracker.publish(task_with_steps(vec![(0, "RESERVE", task_states::STARTED)]));

        let buf = SharedBuf::default();
        let handle = ProgressAnimator::spawn_with_writer(Arc::clone(&tracker), buf.clone());

        tokio::time::sleep(Duration::from_millis(600)).await;
        handle.finish().await;

        let out = buf.contents();
        assert!(out.contains("CREATE_VM : RESERVE | Step 1/1"));
        // The final write is the line clear: spaces then carriage return.
        assert!(out.ends_with('\r'));
    }

    #[tokio::test(start_paused = true)]
    async fn test_animator_draws_nothing_before_first_publish() {
        let tracker = Arc::new(ProgressTracker::new());
        let buf = SharedBuf::default();
        let handle = ProgressAnimator::spawn_with_writer(Arc::clone(&tracker), buf.clone());

        tokio::time::sleep(Duration::from_millis(600)).await;
        handle.finish().await;

        // Only the final clear, which collapses to a bare carriage return.
        assert_eq!(buf.contents(), "\r\r");
    }
}
