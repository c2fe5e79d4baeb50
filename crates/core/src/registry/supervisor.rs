//! Per-job supervising task.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use super::job_registry::JobRegistry;
use crate::job::{JobError, JobId, JobStatus};
use crate::metrics;
use crate::parser::{parse_line, ParsedEvent, PhaseMarker};
use crate::runner::{CommandSpec, ExitOutcome, RunningProcess};

/// How long output may stay open after the process was reaped.
const EXIT_DRAIN: Duration = Duration::from_secs(2);

/// What happened during one process run.
#[derive(Debug)]
pub(super) struct RunSummary {
    pub outcome: ExitOutcome,
    pub stalled: bool,
    /// Last `ERROR:` message the tool printed.
    pub last_error: Option<String>,
    pub diagnostics: Vec<String>,
}

impl RunSummary {
    /// Final status of a job whose run ended on its own.
    pub(super) fn resolve(self, stall_timeout_secs: u64) -> (JobStatus, Option<JobError>) {
        if self.stalled {
            return (
                JobStatus::Failed,
                Some(JobError::stall_timeout(stall_timeout_secs, self.diagnostics)),
            );
        }
        if self.outcome.success {
            return (JobStatus::Completed, None);
        }

        let message = self.last_error.unwrap_or_else(|| match self.outcome.code {
            Some(code) => format!("yt-dlp exited with code {code}"),
            None => "yt-dlp was terminated by a signal".to_string(),
        });
        (
            JobStatus::Failed,
            Some(JobError::process_exit(
                message,
                self.outcome.code,
                self.diagnostics,
            )),
        )
    }
}

/// Runs one job's process to completion.
///
/// Holds the job's slot for its whole lifetime; `finish_run` or
/// `fail_spawn` releases it.
pub(super) async fn supervise(registry: JobRegistry, id: JobId, command: CommandSpec) {
    debug!(job_id = %id, program = %command.program.display(), "Starting job process");

    let RunningProcess { mut lines, handle } = match registry.runner().run(command).await {
        Ok(process) => process,
        Err(e) => {
            registry.fail_spawn(&id, e).await;
            return;
        }
    };

    if !registry.attach_handle(&id, &handle).await {
        debug!(job_id = %id, "Job finished before its process started, killing");
        handle.kill();
    }

    let stall_timeout = registry.config().stall_timeout();
    let keep = registry.config().diagnostic_lines;
    let mut diagnostics: VecDeque<String> = VecDeque::with_capacity(keep);
    let mut last_error = None;
    let mut stalled = false;
    let mut processing = false;
    let mut stall_deadline = Instant::now() + stall_timeout;
    let mut drain_deadline: Option<Instant> = None;

    loop {
        let stall_armed = !stalled && !processing && drain_deadline.is_none();
        let wake_at = drain_deadline.unwrap_or(stall_deadline);

        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else { break };
                debug!(job_id = %id, stream = %line.stream, line = %line.text, "Tool output");

                if keep > 0 {
                    if diagnostics.len() == keep {
                        diagnostics.pop_front();
                    }
                    diagnostics.push_back(line.text.clone());
                }

                let Some(event) = parse_line(&line.text) else { continue };
                stall_deadline = Instant::now() + stall_timeout;
                match &event {
                    ParsedEvent::ToolError { message } => last_error = Some(message.clone()),
                    ParsedEvent::Phase { phase: PhaseMarker::Processing, .. } => processing = true,
                    // A new transfer (next format or playlist item) re-arms the watchdog.
                    ParsedEvent::Progress(_)
                    | ParsedEvent::Destination { .. }
                    | ParsedEvent::Phase { .. } => processing = false,
                }
                registry.apply_event(&id, event).await;
            }
            _ = handle.wait(), if drain_deadline.is_none() => {
                drain_deadline = Some(Instant::now() + EXIT_DRAIN);
            }
            _ = sleep_until(wake_at), if stall_armed || drain_deadline.is_some() => {
                if drain_deadline.is_some() {
                    debug!(job_id = %id, "Output still open after exit, detaching");
                    break;
                }
                warn!(job_id = %id, timeout_secs = stall_timeout.as_secs(), "Job stalled, killing");
                metrics::STALL_DETECTIONS.inc();
                stalled = true;
                handle.kill();
            }
        }
    }

    let outcome = handle.wait().await;
    registry
        .finish_run(
            &id,
            RunSummary {
                outcome,
                stalled,
                last_error,
                diagnostics: diagnostics.into(),
            },
        )
        .await;
}
