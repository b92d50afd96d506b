//! Subprocess execution with bounded waits.
//!
//! All external collaborators (yt-dlp, ollama) run through here. The timeout
//! variants poll the child and kill it once the budget is spent, so an
//! unresponsive external process cannot hang the pipeline when a bound is
//! configured.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{TsError, TsResult};

#[must_use]
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}

pub fn run_command(program: &str, args: &[String], cwd: Option<&Path>) -> TsResult<Output> {
    run_command_with_timeout(program, args, cwd, None)
}

pub fn run_command_with_timeout(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
    timeout: Option<Duration>,
) -> TsResult<Output> {
    if !command_exists(program) {
        return Err(TsError::CommandMissing {
            command: program.to_owned(),
        });
    }

    let rendered = format!("{} {}", program, args.join(" "));
    let mut command = Command::new(program);
    command.args(args);
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    match timeout {
        Some(limit) => {
            let child = command.spawn()?;
            wait_with_deadline(child, &rendered, limit)
        }
        None => {
            let output = command.output()?;
            validate_command_output(&rendered, output)
        }
    }
}

/// Run a subprocess with `input` piped to its stdin.
///
/// Used for the text-generation call, which takes its prompt on standard
/// input and answers on standard output.
pub fn run_command_with_input(
    program: &str,
    args: &[String],
    input: &[u8],
    timeout: Option<Duration>,
) -> TsResult<Output> {
    if !command_exists(program) {
        return Err(TsError::CommandMissing {
            command: program.to_owned(),
        });
    }

    let rendered = format!("{} {}", program, args.join(" "));
    let mut command = Command::new(program);
    command.args(args);
    command.stdin(Stdio::piped());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let mut child = command.spawn()?;

    // Feed stdin from a helper thread so a child that fills its output pipes
    // before reading input cannot deadlock us.
    let mut stdin_pipe = child.stdin.take().ok_or_else(|| {
        TsError::InvalidRequest(format!("stdin pipe unavailable for `{rendered}`"))
    })?;
    let payload = input.to_vec();
    thread::spawn(move || {
        let _ = stdin_pipe.write_all(&payload);
        // Dropping the handle closes the pipe and signals EOF.
    });

    match timeout {
        Some(limit) => wait_with_deadline(child, &rendered, limit),
        None => {
            let output = child.wait_with_output()?;
            validate_command_output(&rendered, output)
        }
    }
}

/// Poll `child` until it exits or `limit` elapses; kill it on expiry.
fn wait_with_deadline(
    mut child: std::process::Child,
    rendered: &str,
    limit: Duration,
) -> TsResult<Output> {
    let started_at = Instant::now();

    let mut stdout_pipe = child.stdout.take().ok_or_else(|| {
        TsError::InvalidRequest(format!("stdout pipe unavailable for `{rendered}`"))
    })?;
    let mut stderr_pipe = child.stderr.take().ok_or_else(|| {
        TsError::InvalidRequest(format!("stderr pipe unavailable for `{rendered}`"))
    })?;

    let (stdout_tx, stdout_rx) = std::sync::mpsc::channel();
    let (stderr_tx, stderr_rx) = std::sync::mpsc::channel();

    thread::spawn(move || {
        use std::io::Read;
        let mut buf = Vec::new();
        let _ = stdout_pipe.read_to_end(&mut buf);
        let _ = stdout_tx.send(buf);
    });

    thread::spawn(move || {
        use std::io::Read;
        let mut buf = Vec::new();
        let _ = stderr_pipe.read_to_end(&mut buf);
        let _ = stderr_tx.send(buf);
    });

    loop {
        if let Some(status) = child.try_wait()? {
            let stdout = stdout_rx
                .recv_timeout(Duration::from_millis(100))
                .unwrap_or_default();
            let stderr = stderr_rx
                .recv_timeout(Duration::from_millis(100))
                .unwrap_or_default();
            return validate_command_output(
                rendered,
                Output {
                    status,
                    stdout,
                    stderr,
                },
            );
        }

        if started_at.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            let stderr = stderr_rx
                .recv_timeout(Duration::from_millis(100))
                .unwrap_or_default();
            let stderr_str = String::from_utf8_lossy(&stderr).into_owned();
            return Err(TsError::from_command_timeout(
                rendered.to_owned(),
                saturating_duration_ms(limit),
                stderr_str,
            ));
        }

        thread::sleep(Duration::from_millis(20));
    }
}

fn validate_command_output(rendered: &str, output: Output) -> TsResult<Output> {
    if output.status.success() {
        return Ok(output);
    }

    let status = output.status.code().unwrap_or(-1);
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    Err(TsError::from_command_failure(
        rendered.to_owned(),
        status,
        stderr,
    ))
}

fn saturating_duration_ms(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}
