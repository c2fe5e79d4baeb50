//! Tokio-based process runner.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::config::RunnerConfig;
use super::error::RunnerError;
use super::handle::ProcessHandle;
use super::traits::ProcessRunner;
use super::types::{CommandSpec, ExitOutcome, OutputLine, RunningProcess, StreamKind};

/// Runs commands as child processes of the current process.
///
/// Each child is placed in its own process group so that a kill also reaches
/// helpers it spawned (yt-dlp runs ffmpeg as a grandchild).
pub struct TokioProcessRunner {
    config: RunnerConfig,
}

impl TokioProcessRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }
}

impl Default for TokioProcessRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    fn name(&self) -> &str {
        "tokio"
    }

    async fn run(&self, command: CommandSpec) -> Result<RunningProcess, RunnerError> {
        let program = command.program_name();

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd
            .spawn()
            .map_err(|e| RunnerError::from_spawn(&command.program, e))?;

        let stdout = child.stdout.take().ok_or_else(|| RunnerError::MissingPipe {
            program: program.clone(),
            stream: "stdout",
        })?;
        let stderr = child.stderr.take().ok_or_else(|| RunnerError::MissingPipe {
            program: program.clone(),
            stream: "stderr",
        })?;

        let pid = child.id();
        debug!(program = %program, pid = ?pid, args = ?command.args, "Spawned process");

        let (tx, rx) = mpsc::channel(self.config.line_buffer.max(1));
        tokio::spawn(forward_lines(stdout, StreamKind::Stdout, tx.clone()));
        tokio::spawn(forward_lines(stderr, StreamKind::Stderr, tx));

        let (handle, mut control) = ProcessHandle::new(pid);
        let grace = self.config.kill_grace();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                status = child.wait() => ExitOutcome::from_status(status, false),
                _ = control.kill_requested() => terminate(&mut child, grace).await,
            };
            debug!(
                program = %program,
                pid = ?pid,
                code = ?outcome.code,
                killed = outcome.killed,
                "Process exited"
            );
            control.finish(outcome);
        });

        Ok(RunningProcess { lines: rx, handle })
    }
}

/// Longest line forwarded in one piece; longer output is split.
const MAX_LINE_BYTES: usize = 64 * 1024;

/// Reads a pipe and forwards each line to `tx`.
///
/// Both `\n` and `\r` end a line, since progress bars redraw with a bare
/// carriage return. Once the receiver is gone the pipe is still drained so
/// the child never blocks on a full pipe.
async fn forward_lines<R>(reader: R, stream: StreamKind, tx: mpsc::Sender<OutputLine>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut partial: Vec<u8> = Vec::new();
    let mut receiver_open = true;

    loop {
        let mut complete = Vec::new();
        let consumed = match reader.fill_buf().await {
            Ok([]) => break,
            Ok(buf) => {
                for &byte in buf {
                    if byte == b'\n' || byte == b'\r' {
                        complete.push(std::mem::take(&mut partial));
                    } else {
                        partial.push(byte);
                        if partial.len() >= MAX_LINE_BYTES {
                            complete.push(std::mem::take(&mut partial));
                        }
                    }
                }
                buf.len()
            }
            Err(e) => {
                debug!(stream = %stream, error = %e, "Pipe read failed");
                break;
            }
        };
        reader.consume(consumed);

        for raw in complete {
            if receiver_open {
                receiver_open = send_line(&tx, stream, &raw).await;
            }
        }
    }

    if receiver_open && !partial.is_empty() {
        send_line(&tx, stream, &partial).await;
    }
}

/// Sends one decoded line. Returns false once the receiver is gone.
async fn send_line(tx: &mpsc::Sender<OutputLine>, stream: StreamKind, raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim_end();
    if text.is_empty() {
        return true;
    }
    tx.send(OutputLine {
        stream,
        text: text.to_string(),
    })
    .await
    .is_ok()
}

/// Asks the process group to stop, escalating to SIGKILL after `grace`.
async fn terminate(child: &mut Child, grace: Duration) -> ExitOutcome {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            signal_group(pid, libc::SIGTERM);
            match timeout(grace, child.wait()).await {
                Ok(status) => return ExitOutcome::from_status(status, true),
                Err(_) => {
                    warn!(
                        pid,
                        grace_ms = grace.as_millis() as u64,
                        "Process ignored SIGTERM, killing"
                    );
                    signal_group(pid, libc::SIGKILL);
                }
            }
        }
    }

    #[cfg(not(unix))]
    let _ = grace;

    if let Err(e) = child.kill().await {
        debug!(error = %e, "Kill failed, process likely already gone");
    }
    ExitOutcome::from_status(child.wait().await, true)
}

#[cfg(unix)]
fn signal_group(pid: u32, signal: libc::c_int) {
    // The child leads its own group, so the group id equals its pid.
    let rc = unsafe { libc::kill(-(pid as libc::pid_t), signal) };
    if rc != 0 {
        debug!(pid, signal, "Signalling process group failed");
    }
}
