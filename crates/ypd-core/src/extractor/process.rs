//! Run an external tool with captured output and an optional deadline.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use super::FetchError;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Captured result of a finished child process.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

fn program_name(cmd: &Command) -> String {
    cmd.get_program().to_string_lossy().into_owned()
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Spawns `cmd`, collects stdout/stderr on reader threads, and waits for it.
/// With a `timeout`, the child is killed once the deadline passes and
/// `FetchError::TimedOut` is returned; the readers are then detached since a
/// grandchild may still hold the pipes open.
pub fn run_with_timeout(
    cmd: &mut Command,
    timeout: Option<Duration>,
) -> Result<CommandOutput, FetchError> {
    let program = program_name(cmd);
    let mut child: Child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| FetchError::Spawn {
            program: program.clone(),
            source,
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match timeout {
        None => child.wait()?,
        Some(timeout) => {
            let deadline = Instant::now() + timeout;
            loop {
                if let Some(status) = child.try_wait()? {
                    break status;
                }
                if Instant::now() >= deadline {
                    tracing::warn!(program = %program, "killing process after {}s", timeout.as_secs());
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(FetchError::TimedOut { program, timeout });
                }
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    };

    Ok(CommandOutput {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

/// Last `n` non-empty lines of tool output, for error messages.
pub(crate) fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
