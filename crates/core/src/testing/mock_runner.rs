//! Mock process runner for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use crate::runner::{
    CommandSpec, ExitOutcome, OutputLine, ProcessControl, ProcessHandle, ProcessRunner,
    RunnerError, RunningProcess,
};

/// One step of a scripted process.
#[derive(Debug, Clone)]
pub enum MockStep {
    /// Emit an output line.
    Line(OutputLine),
    /// Sleep. A kill request interrupts the sleep.
    Delay(Duration),
    /// Exit with the given code. Remaining steps are skipped.
    Exit(i32),
    /// Print nothing and stay alive until killed.
    HangUntilKilled,
}

/// What a scripted `run` call does.
#[derive(Debug, Clone)]
pub enum MockScript {
    /// Start a fake process that plays the steps in order. A script without
    /// an `Exit` step exits with code 0 after its last step.
    Steps(Vec<MockStep>),
    /// Fail to start, as if the executable did not exist.
    SpawnError,
}

impl MockScript {
    /// A process that prints the given stdout lines and exits with `code`.
    pub fn lines<I, S>(lines: I, code: i32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut steps: Vec<MockStep> = lines
            .into_iter()
            .map(|line| MockStep::Line(OutputLine::stdout(line)))
            .collect();
        steps.push(MockStep::Exit(code));
        Self::Steps(steps)
    }

    /// A process that never prints and never exits on its own.
    pub fn hang() -> Self {
        Self::Steps(vec![MockStep::HangUntilKilled])
    }
}

impl Default for MockScript {
    fn default() -> Self {
        Self::Steps(vec![MockStep::Exit(0)])
    }
}

/// Mock implementation of the ProcessRunner trait.
///
/// Every `run` call consumes the next queued script, falling back to the
/// default script when the queue is empty. Commands are recorded, and the
/// number of fake processes alive at once is tracked so tests can assert on
/// the concurrency limit.
///
/// # Example
///
/// ```rust,ignore
/// use clipfetch_core::testing::{fixtures, MockProcessRunner, MockScript};
///
/// let runner = MockProcessRunner::new();
/// runner.push_script(MockScript::lines(fixtures::download_lines("clip.mp4"), 0)).await;
/// runner.set_default_script(MockScript::hang()).await;
///
/// // Use in a JobRegistry...
///
/// assert_eq!(runner.recorded_commands().await.len(), 1);
/// assert!(runner.max_concurrent() <= 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockProcessRunner {
    /// Scripts for upcoming runs, in order.
    scripts: Arc<RwLock<VecDeque<MockScript>>>,
    /// Script used when the queue is empty.
    default_script: Arc<RwLock<MockScript>>,
    /// Recorded commands.
    commands: Arc<RwLock<Vec<CommandSpec>>>,
    /// Fake processes currently alive.
    running: Arc<AtomicUsize>,
    /// Highest value `running` has reached.
    max_running: Arc<AtomicUsize>,
    next_pid: Arc<AtomicU32>,
    line_buffer: usize,
}

impl Default for MockProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(RwLock::new(VecDeque::new())),
            default_script: Arc::new(RwLock::new(MockScript::default())),
            commands: Arc::new(RwLock::new(Vec::new())),
            running: Arc::new(AtomicUsize::new(0)),
            max_running: Arc::new(AtomicUsize::new(0)),
            next_pid: Arc::new(AtomicU32::new(1000)),
            line_buffer: 64,
        }
    }

    /// Queue a script for the next unscripted run.
    pub async fn push_script(&self, script: MockScript) {
        self.scripts.write().await.push_back(script);
    }

    /// Set the script used once the queue is empty.
    pub async fn set_default_script(&self, script: MockScript) {
        *self.default_script.write().await = script;
    }

    /// All commands passed to `run`, in call order.
    pub async fn recorded_commands(&self) -> Vec<CommandSpec> {
        self.commands.read().await.clone()
    }

    /// Number of `run` calls so far.
    pub async fn run_count(&self) -> usize {
        self.commands.read().await.len()
    }

    /// Fake processes currently alive.
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Highest number of fake processes alive at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    async fn next_script(&self) -> MockScript {
        if let Some(script) = self.scripts.write().await.pop_front() {
            return script;
        }
        self.default_script.read().await.clone()
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(&self, command: CommandSpec) -> Result<RunningProcess, RunnerError> {
        let program = command.program.clone();
        self.commands.write().await.push(command);

        let steps = match self.next_script().await {
            MockScript::Steps(steps) => steps,
            MockScript::SpawnError => return Err(RunnerError::NotFound { path: program }),
        };

        let now_running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now_running, Ordering::SeqCst);

        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        let (handle, control) = ProcessHandle::new(Some(pid));
        let (tx, rx) = mpsc::channel(self.line_buffer);
        let running = Arc::clone(&self.running);

        tokio::spawn(async move {
            let (control, outcome) = play(steps, tx, control).await;
            running.fetch_sub(1, Ordering::SeqCst);
            control.finish(outcome);
        });

        Ok(RunningProcess { lines: rx, handle })
    }
}

/// Plays a script and returns the control together with the exit outcome.
/// The line sender is dropped before returning, closing the output stream.
async fn play(
    steps: Vec<MockStep>,
    tx: mpsc::Sender<OutputLine>,
    mut control: ProcessControl,
) -> (ProcessControl, ExitOutcome) {
    for step in steps {
        match step {
            MockStep::Line(line) => {
                tokio::select! {
                    _ = tx.send(line) => {}
                    _ = control.kill_requested() => return (control, ExitOutcome::killed()),
                }
            }
            MockStep::Delay(duration) => {
                tokio::select! {
                    _ = tokio::time::sleep(duration) => {}
                    _ = control.kill_requested() => return (control, ExitOutcome::killed()),
                }
            }
            MockStep::Exit(code) => return (control, ExitOutcome::from_code(code)),
            MockStep::HangUntilKilled => {
                control.kill_requested().await;
                return (control, ExitOutcome::killed());
            }
        }
    }
    (control, ExitOutcome::from_code(0))
}
