use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::error::ParserError;
use crate::message::{LogSink, Message, MessageStream};
use crate::payload::RequestPayload;

pub const MAX_OUTPUT_BYTES: usize = 2 * 1024 * 1024; // 2MB

#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    /// Cancelling kills the parser's whole process group and fails the run
    /// with [`ParserError::Cancelled`].
    pub cancellation: Option<CancellationToken>,
}

/// Everything observed from one finished parser process.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// -1 when the process was killed by a signal.
    pub exit_code: i32,
    pub stdout: String,
    /// Unstructured stderr text, in arrival order.
    pub diagnostics: String,
    pub messages: Vec<Message>,
    pub has_errors: bool,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Request file that only lives as long as one parser run.
struct TempInput {
    path: PathBuf,
}

impl TempInput {
    async fn write(path: &Path, contents: &str) -> Result<Self, ParserError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Guard first so a failed write still removes whatever was created.
        let guard = Self {
            path: path.to_path_buf(),
        };
        tokio::fs::write(&guard.path, contents).await?;
        Ok(guard)
    }
}

impl Drop for TempInput {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), "failed to remove parser input file: {e}");
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessInvoker;

impl ProcessInvoker {
    pub fn new() -> Self {
        Self
    }

    /// Run one parser command to completion.
    ///
    /// - The command line is split on whitespace into program and arguments.
    /// - The payload goes to `input_file` when given, otherwise to stdin,
    ///   which is closed once written.
    /// - stderr is interpreted line by line while the process runs.
    /// - stdout is captured (capped at [`MAX_OUTPUT_BYTES`]) and left for the
    ///   caller to interpret.
    /// - `input_file` is removed before this returns, on every path.
    ///
    /// A non-zero exit is not an error here; it is reported in the outcome.
    pub async fn run(
        &self,
        command: &str,
        cwd: &Path,
        payload: &RequestPayload,
        input_file: Option<&Path>,
        sink: &dyn LogSink,
        options: &InvokeOptions,
    ) -> Result<ProcessOutcome, ParserError> {
        let json = payload.to_json().map_err(ParserError::Serialize)?;

        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            return Err(ParserError::Spawn(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "parser command is empty",
            )));
        };
        let args: Vec<&str> = parts.collect();

        let _input_guard = match input_file {
            Some(path) => Some(TempInput::write(path, &json).await?),
            None => None,
        };

        tracing::debug!(command, cwd = %cwd.display(), "Running parser");

        let mut cmd = Command::new(program);
        cmd.args(&args)
            .current_dir(cwd)
            .stdin(if input_file.is_some() {
                Stdio::null()
            } else {
                Stdio::piped()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0); // so cancellation and the output cap reach grandchildren

        let mut child = cmd.spawn().map_err(ParserError::Spawn)?;
        let child_pid = child.id();

        let stdin_pipe = child.stdin.take();
        let stdout_pipe = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("parser stdout was not piped"))?;
        let stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("parser stderr was not piped"))?;

        let mut stream = MessageStream::new(sink);

        // All three pipes are driven concurrently: a child blocked writing a
        // full stdout pipe would otherwise never drain its stdin.
        let write_stdin = async move {
            if let Some(mut stdin) = stdin_pipe
                && let Err(e) = stdin.write_all(json.as_bytes()).await
            {
                tracing::debug!("parser stdin write failed: {e}");
            }
            // stdin dropped here, child sees EOF
        };

        let read_stdout = async {
            let mut buf = Vec::with_capacity(64 * 1024);
            let mut capped = stdout_pipe.take(MAX_OUTPUT_BYTES as u64 + 1);
            if let Err(e) = capped.read_to_end(&mut buf).await {
                tracing::warn!("stdout pipe read error: {e}");
            }
            if buf.len() > MAX_OUTPUT_BYTES {
                // Child may be blocked on a full pipe; nothing else will stop it.
                kill_process_group(child_pid);
            }
            buf
        };

        let read_stderr = async {
            let mut reader = BufReader::new(stderr_pipe);
            let mut line = Vec::new();
            loop {
                line.clear();
                match reader.read_until(b'\n', &mut line).await {
                    Ok(0) => break,
                    Ok(_) => stream.accept(&String::from_utf8_lossy(&line)),
                    Err(e) => {
                        tracing::warn!("stderr pipe read error: {e}");
                        break;
                    }
                }
            }
        };

        let run = async {
            let (stdout, (), ()) = tokio::join!(read_stdout, read_stderr, write_stdin);
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((stdout, status))
        };

        let cancelled = async {
            match &options.cancellation {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };

        let (stdout, status) = tokio::select! {
            result = run => result?,
            () = cancelled => {
                kill_process_group(child_pid);
                tracing::info!(command, "parser run cancelled");
                return Err(ParserError::Cancelled);
            }
        };

        if stdout.len() > MAX_OUTPUT_BYTES {
            return Err(ParserError::OutputTooLarge {
                limit: MAX_OUTPUT_BYTES,
            });
        }

        let exit_code = status.code().unwrap_or(-1);
        let (messages, diagnostics, has_errors) = stream.finish();
        tracing::debug!(command, exit_code, messages = messages.len(), "parser exited");

        Ok(ProcessOutcome {
            exit_code,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            diagnostics,
            messages,
            has_errors,
        })
    }
}

/// Kill the child's whole process group, not just the leader. Grandchildren
/// holding the pipes open would otherwise keep the readers waiting.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    if let Some(pid) = pid {
        unsafe {
            libc::kill(-(pid as i32), libc::SIGKILL);
        }
    }
}

// Elsewhere the child is killed when it is dropped.
#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
