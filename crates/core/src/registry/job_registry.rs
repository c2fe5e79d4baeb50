//! The job registry.

use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::config::RegistryConfig;
use super::error::RegistryError;
use super::supervisor::{self, RunSummary};
use super::types::RegistryStatus;
use crate::job::{build_args, DownloadRequest, Job, JobError, JobEvent, JobId, JobStatus};
use crate::metrics;
use crate::parser::{ParsedEvent, PhaseMarker};
use crate::runner::{CommandSpec, ProcessHandle, ProcessRunner, RunnerError};
use crate::toolchain::Toolchain;

/// Owns every job and its process.
///
/// Cheap to clone; clones share the same table. All state transitions happen
/// under a single write lock, and events are broadcast while that lock is
/// held, so every subscriber sees a job's events in the order they happened.
#[derive(Clone)]
pub struct JobRegistry {
    inner: Arc<Inner>,
}

struct Inner {
    config: RegistryConfig,
    toolchain: Arc<dyn Toolchain>,
    runner: Arc<dyn ProcessRunner>,
    table: RwLock<JobTable>,
    events: broadcast::Sender<JobEvent>,
}

#[derive(Default)]
struct JobTable {
    jobs: HashMap<JobId, JobEntry>,
    /// Submission order.
    order: Vec<JobId>,
    /// Pending jobs waiting for a slot, FIFO.
    queue: VecDeque<JobId>,
    /// Slots held by jobs whose process has not been reaped yet.
    running: usize,
}

struct JobEntry {
    job: Job,
    /// Command to launch, consumed on dispatch.
    command: Option<CommandSpec>,
    handle: Option<ProcessHandle>,
}

impl JobEntry {
    /// Moves the job to a terminal status and drops its process handle.
    fn finish(&mut self, status: JobStatus, error: Option<JobError>) {
        let now = Utc::now();
        self.job.status = status;
        self.job.error = error;
        self.job.finished_at = Some(now);
        self.command = None;
        self.handle = None;

        metrics::JOBS_FINISHED
            .with_label_values(&[status.as_str()])
            .inc();
        if let Some(started) = self.job.started_at {
            let secs = (now - started).num_milliseconds().max(0) as f64 / 1000.0;
            metrics::JOB_DURATION
                .with_label_values(&[status.as_str()])
                .observe(secs);
        }
    }
}

/// Applies a non-terminal transition if the state machine allows it.
fn advance(job: &mut Job, next: JobStatus) -> bool {
    if job.status.can_transition_to(next) {
        job.status = next;
        true
    } else {
        false
    }
}

impl JobRegistry {
    pub fn new(
        config: RegistryConfig,
        toolchain: Arc<dyn Toolchain>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                config,
                toolchain,
                runner,
                table: RwLock::new(JobTable::default()),
                events,
            }),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Validates and enqueues a download.
    ///
    /// Returns once the job is in the table. The process is started in the
    /// background as soon as a slot is free.
    pub async fn submit(&self, request: DownloadRequest) -> Result<JobId, RegistryError> {
        let tools = self.inner.toolchain.ensure_ready().await;
        if !tools.tool_installed {
            metrics::JOBS_REJECTED
                .with_label_values(&["not_ready"])
                .inc();
            return Err(RegistryError::NotReady {
                tool_path: tools.tool_path,
            });
        }

        let request = request.validated().map_err(|e| {
            metrics::JOBS_REJECTED
                .with_label_values(&["validation"])
                .inc();
            debug!(error = %e, "Rejected download request");
            RegistryError::from(e)
        })?;

        let command = CommandSpec::new(&tools.tool_path)
            .with_args(build_args(&request, tools.av_tool_path.as_deref()))
            .with_working_dir(&request.output_dir);
        let job = Job::new(request);
        let id = job.id.clone();

        let mut guard = self.inner.table.write().await;
        let table = &mut *guard;
        info!(job_id = %id, url = %job.url, "Job submitted");
        self.emit(&job);
        table.order.push(id.clone());
        table.queue.push_back(id.clone());
        table.jobs.insert(
            id.clone(),
            JobEntry {
                job,
                command: Some(command),
                handle: None,
            },
        );
        metrics::JOBS_SUBMITTED.inc();

        self.dispatch(table);
        Ok(id)
    }

    /// Cancels a job.
    ///
    /// The status flips to `Cancelled` immediately. For a running job the
    /// process is then killed and this call waits (bounded by
    /// `cancel_wait_ms`) until it has exited. Cancelling a job that already
    /// finished is a no-op.
    pub async fn cancel(&self, id: &JobId) -> Result<(), RegistryError> {
        let handle = {
            let mut guard = self.inner.table.write().await;
            let table = &mut *guard;
            let entry = table
                .jobs
                .get_mut(id)
                .ok_or_else(|| RegistryError::not_found(id))?;

            if entry.job.status.is_terminal() {
                debug!(job_id = %id, status = %entry.job.status, "Cancel ignored, job already finished");
                return Ok(());
            }

            let was_pending = entry.job.status == JobStatus::Pending;
            let handle = entry.handle.take();
            entry.finish(JobStatus::Cancelled, None);
            self.emit(&entry.job);
            info!(job_id = %id, was_pending, "Job cancelled");

            if was_pending {
                table.queue.retain(|queued| queued != id);
                metrics::JOBS_QUEUED.set(table.queue.len() as i64);
            }
            handle
        };

        if let Some(handle) = handle {
            self.terminate(id, handle).await;
        }
        Ok(())
    }

    /// Cancels every job that has not finished. Returns how many were
    /// cancelled.
    pub async fn cancel_all(&self) -> usize {
        let mut handles = Vec::new();
        let mut cancelled = 0;
        {
            let mut guard = self.inner.table.write().await;
            let table = &mut *guard;
            for id in &table.order {
                let Some(entry) = table.jobs.get_mut(id) else {
                    continue;
                };
                if entry.job.status.is_terminal() {
                    continue;
                }
                if let Some(handle) = entry.handle.take() {
                    handles.push((id.clone(), handle));
                }
                entry.finish(JobStatus::Cancelled, None);
                self.emit(&entry.job);
                cancelled += 1;
            }
            table.queue.clear();
            metrics::JOBS_QUEUED.set(0);
        }

        if cancelled > 0 {
            info!(cancelled, "Cancelled all jobs");
        }
        for (_, handle) in &handles {
            handle.kill();
        }
        for (id, handle) in handles {
            self.terminate(&id, handle).await;
        }
        cancelled
    }

    /// Subscribes to job events. Each subscriber gets its own copy of every
    /// event; one that falls behind loses events instead of blocking others.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.inner.events.subscribe()
    }

    /// Copies of all jobs in submission order.
    pub async fn snapshot(&self) -> Vec<Job> {
        let table = self.inner.table.read().await;
        table
            .order
            .iter()
            .filter_map(|id| table.jobs.get(id))
            .map(|entry| entry.job.clone())
            .collect()
    }

    /// Copy of one job.
    pub async fn get(&self, id: &JobId) -> Option<Job> {
        let table = self.inner.table.read().await;
        table.jobs.get(id).map(|entry| entry.job.clone())
    }

    /// Counts of jobs per status and slot usage.
    pub async fn status(&self) -> RegistryStatus {
        let table = self.inner.table.read().await;
        RegistryStatus::count(
            table.jobs.values().map(|entry| &entry.job),
            table.running,
            self.inner.config.max_concurrent_jobs,
        )
    }

    pub(super) fn runner(&self) -> &Arc<dyn ProcessRunner> {
        &self.inner.runner
    }

    /// Stores the handle of a freshly spawned process. Returns false if the
    /// job finished in the meantime, in which case the caller kills it.
    pub(super) async fn attach_handle(&self, id: &JobId, handle: &ProcessHandle) -> bool {
        let mut table = self.inner.table.write().await;
        match table.jobs.get_mut(id) {
            Some(entry) if !entry.job.status.is_terminal() => {
                entry.handle = Some(handle.clone());
                true
            }
            _ => false,
        }
    }

    /// Applies one parsed output event to a job. Events for finished jobs are
    /// ignored. Never settles a final status; the exit outcome does.
    pub(super) async fn apply_event(&self, id: &JobId, event: ParsedEvent) {
        let mut table = self.inner.table.write().await;
        let Some(entry) = table.jobs.get_mut(id) else {
            return;
        };
        if entry.job.status.is_terminal() {
            return;
        }

        let changed = match event {
            ParsedEvent::Progress(sample) => {
                advance(&mut entry.job, JobStatus::Downloading);
                entry.job.progress.apply(&sample);
                true
            }
            ParsedEvent::Destination { filename } => {
                entry.job.progress.filename = Some(filename);
                true
            }
            ParsedEvent::Phase {
                phase: PhaseMarker::Extracting,
                ..
            } => advance(&mut entry.job, JobStatus::Probing),
            ParsedEvent::Phase {
                phase: PhaseMarker::Processing,
                filename,
            } => {
                let moved = advance(&mut entry.job, JobStatus::Processing);
                let renamed = filename.is_some();
                if renamed {
                    entry.job.progress.filename = filename;
                }
                moved || renamed
            }
            ParsedEvent::Phase {
                phase: PhaseMarker::AlreadyDownloaded,
                filename,
            } => {
                if filename.is_some() {
                    entry.job.progress.filename = filename;
                }
                // The exit status still decides; other formats or items may follow.
                debug!(job_id = %id, "File already downloaded");
                advance(&mut entry.job, JobStatus::Downloading);
                entry.job.progress.mark_transferred();
                true
            }
            ParsedEvent::ToolError { .. } => false,
        };

        if changed {
            self.emit(&entry.job);
        }
    }

    /// Releases the slot of a reaped process and settles the job's final
    /// status, unless it already reached one.
    pub(super) async fn finish_run(&self, id: &JobId, run: RunSummary) {
        let mut guard = self.inner.table.write().await;
        let table = &mut *guard;
        table.running = table.running.saturating_sub(1);

        if let Some(entry) = table.jobs.get_mut(id) {
            entry.handle = None;
            if !entry.job.status.is_terminal() {
                let (status, error) = run.resolve(self.inner.config.stall_timeout_secs);
                match &error {
                    Some(e) => warn!(job_id = %id, kind = ?e.kind, error = %e.message, "Job failed"),
                    None => info!(job_id = %id, "Job completed"),
                }
                entry.finish(status, error);
                self.emit(&entry.job);
            }
        }

        self.dispatch(table);
    }

    /// Fails a job whose process could not be started.
    pub(super) async fn fail_spawn(&self, id: &JobId, error: RunnerError) {
        metrics::SPAWN_FAILURES.inc();
        let mut guard = self.inner.table.write().await;
        let table = &mut *guard;
        table.running = table.running.saturating_sub(1);

        if let Some(entry) = table.jobs.get_mut(id) {
            if !entry.job.status.is_terminal() {
                warn!(job_id = %id, error = %error, "Job failed to start");
                entry.finish(JobStatus::Failed, Some(JobError::spawn(error.to_string())));
                self.emit(&entry.job);
            }
        }

        self.dispatch(table);
    }

    /// Starts queued jobs while slots are free.
    fn dispatch(&self, table: &mut JobTable) {
        let max = self.inner.config.max_concurrent_jobs.max(1);
        while table.running < max {
            let Some(id) = table.queue.pop_front() else {
                break;
            };
            let Some(entry) = table.jobs.get_mut(&id) else {
                continue;
            };
            if entry.job.status != JobStatus::Pending {
                continue;
            }
            let Some(command) = entry.command.take() else {
                continue;
            };

            advance(&mut entry.job, JobStatus::Starting);
            entry.job.started_at = Some(Utc::now());
            self.emit(&entry.job);
            table.running += 1;
            info!(job_id = %id, running = table.running, "Job dispatched");

            tokio::spawn(supervisor::supervise(self.clone(), id, command));
        }

        metrics::JOBS_RUNNING.set(table.running as i64);
        metrics::JOBS_QUEUED.set(table.queue.len() as i64);
    }

    async fn terminate(&self, id: &JobId, handle: ProcessHandle) {
        handle.kill();
        if timeout(self.inner.config.cancel_wait(), handle.wait())
            .await
            .is_err()
        {
            warn!(job_id = %id, "Process still running after cancel wait");
        }
    }

    fn emit(&self, job: &Job) {
        // No receivers is fine.
        let _ = self.inner.events.send(JobEvent::from_job(job));
    }
}
