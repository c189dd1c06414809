// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job runner task: owns the child process end to end.
//!
//! One task per job. It spawns the interpreter in its own process group,
//! writes the pre-supplied stdin answers and closes stdin, drains stdout
//! and stderr line by line through the progress parser into the
//! broadcaster and the log sink, and is the sole writer of the job's
//! terminal transition. Cancellation signals the whole process group and
//! escalates to SIGKILL after a bounded grace period.

use crate::broadcast::JobEvent;
use crate::registry::JobHandle;
use crate::sink::LogSink;
use crate::store::ResolvedSource;
use rp_core::progress::{parse_progress_line, ProgressSignal};
use rp_core::Clock;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Funnel capacity between the two stream readers and the runner loop.
const LINE_FUNNEL_CAPACITY: usize = 256;

pub(crate) async fn run_job<C: Clock>(
    handle: Arc<JobHandle>,
    source: ResolvedSource,
    inputs: Vec<String>,
    mut sink: LogSink,
    grace: Duration,
    clock: C,
) {
    // Cancelled before we ever spawned: no process, no exit code.
    if handle.cancel.is_cancelled() {
        let state = handle.job.lock().finish(None, clock.epoch_ms());
        handle.broadcaster.close(state, None);
        return;
    }

    let mut command = Command::new(source.kind.interpreter());
    command
        .arg(&source.path)
        .current_dir(&source.workdir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    // Own process group so cancellation reaches grandchildren too.
    #[cfg(unix)]
    command.process_group(0);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            let line = format!("runpad: failed to start {}: {e}", source.label);
            tracing::error!(job_id = %handle.id, source = %source.label, error = %e, "spawn failed");
            handle.broadcaster.publish(JobEvent::Line { line: line.clone() });
            sink.append(&line);

            let state = handle.job.lock().spawn_failed(clock.epoch_ms());
            handle.broadcaster.close(state, Some(rp_core::job::SPAWN_FAILURE_EXIT_CODE));
            return;
        }
    };

    let pid = child.id();

    // All pre-supplied answers go in now, then stdin closes for good.
    // Fewer answers than the script wants is the operator's call; the
    // child sees EOF on the next read.
    if let Some(mut stdin) = child.stdin.take() {
        for input in &inputs {
            let payload = format!("{input}\n");
            if let Err(e) = stdin.write_all(payload.as_bytes()).await {
                tracing::warn!(job_id = %handle.id, error = %e, "stdin write failed");
                break;
            }
        }
        drop(stdin);
    }

    handle.job.lock().mark_running(clock.epoch_ms());
    tracing::info!(job_id = %handle.id, source = %source.label, pid, "job running");

    let (line_tx, mut line_rx) = mpsc::channel::<String>(LINE_FUNNEL_CAPACITY);
    if let Some(stdout) = child.stdout.take() {
        spawn_line_reader(stdout, line_tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_line_reader(stderr, line_tx.clone());
    }
    drop(line_tx);

    let cancel = handle.cancel.clone();
    let mut signalled = false;
    loop {
        tokio::select! {
            maybe_line = line_rx.recv() => match maybe_line {
                Some(line) => process_line(&handle, &mut sink, line),
                None => break,
            },
            _ = cancel.cancelled(), if !signalled => {
                signalled = true;
                tracing::info!(job_id = %handle.id, pid, "cancelling, signalling process group");
                signal_group(pid, TERM_SIGNAL);
                spawn_kill_watchdog(handle.clone(), pid, grace);
            }
        }
    }

    // Readers hit EOF; reap the process.
    let exit_code = match child.wait().await {
        Ok(status) => Some(status.code().unwrap_or(-1)),
        Err(e) => {
            tracing::warn!(job_id = %handle.id, error = %e, "wait on child failed");
            Some(-1)
        }
    };

    let state = handle.job.lock().finish(exit_code, clock.epoch_ms());
    handle.broadcaster.close(state, exit_code);
    tracing::info!(job_id = %handle.id, %state, ?exit_code, "job finished");
}

/// Route one line of child output: progress parse first, then the live
/// broadcast, then the durable log.
fn process_line(handle: &JobHandle, sink: &mut LogSink, line: String) {
    let signal = parse_progress_line(&line);
    let progress = {
        let mut job = handle.job.lock();
        job.apply_progress(&signal);
        match signal {
            ProgressSignal::NoMatch => None,
            _ => Some((job.progress_percent, job.progress_message.clone())),
        }
    };

    handle.broadcaster.publish(JobEvent::Line { line: line.clone() });
    if let Some((percent, message)) = progress {
        handle.broadcaster.publish(JobEvent::Progress { percent, message });
    }
    sink.append(&line);
}

fn spawn_line_reader<R>(reader: R, tx: mpsc::Sender<String>)
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(error = %e, "child output read error");
                    break;
                }
            }
        }
    });
}

/// After the grace period, force-kill the group if the job is still not
/// terminal. Checked against the job record so a process that exited in
/// time is never re-signalled.
fn spawn_kill_watchdog(handle: Arc<JobHandle>, pid: Option<u32>, grace: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        if !handle.job.lock().state.is_terminal() {
            tracing::warn!(job_id = %handle.id, pid, "cancel grace expired, sending SIGKILL");
            signal_group(pid, KILL_SIGNAL);
        }
    });
}

#[cfg(unix)]
use nix::sys::signal::Signal;

#[cfg(unix)]
const TERM_SIGNAL: Signal = Signal::SIGTERM;
#[cfg(unix)]
const KILL_SIGNAL: Signal = Signal::SIGKILL;

/// Signal the child's whole process group (negative pid).
#[cfg(unix)]
fn signal_group(pid: Option<u32>, signal: Signal) {
    use nix::errno::Errno;
    use nix::unistd::Pid;

    let Some(pid) = pid else { return };
    let pgid = Pid::from_raw(-(pid as i32));
    match nix::sys::signal::kill(pgid, signal) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => tracing::warn!(pid, %signal, error = %e, "failed to signal process group"),
    }
}

#[cfg(not(unix))]
const TERM_SIGNAL: i32 = 0;
#[cfg(not(unix))]
const KILL_SIGNAL: i32 = 0;

#[cfg(not(unix))]
fn signal_group(_pid: Option<u32>, _signal: i32) {}
