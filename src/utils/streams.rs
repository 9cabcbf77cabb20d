// src/utils/streams.rs
use std::process::{ExitStatus, Stdio};

use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;

use crate::config::defs::PipelineError;
use crate::utils::command::CommandLine;


#[derive(Debug, Clone, PartialEq)]
pub struct ExecOutcome {
    pub exit_code: i32,
    pub stderr: Vec<u8>,
}


/// Spawns a command and forwards its stdout line by line into `sink` as it is
/// produced. Stderr is drained concurrently and handed back once the child has
/// exited.
///
/// # Arguments
///
/// * `cmd` - Program and arguments; no shell is involved.
/// * `sink` - Destination for the child's stdout, flushed after every line.
///
/// # Returns
/// ExecOutcome with exit code and captured stderr.
pub async fn stream_child_output<W>(cmd: &CommandLine, sink: &mut W) -> Result<ExecOutcome, PipelineError>
where
    W: AsyncWrite + Unpin,
{
    let mut child = Command::new(&cmd.program)
        .args(&cmd.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| PipelineError::ToolExecution {
            tool: cmd.program.clone(),
            error: format!("Failed to spawn: {}. Is {} installed?", e, cmd.program),
        })?;
    debug!("Spawned {} (pid {:?})", cmd.program, child.id());

    let stdout = child.stdout.take().ok_or_else(|| PipelineError::ToolExecution {
        tool: cmd.program.clone(),
        error: "Failed to get stdout".to_string(),
    })?;
    let mut stderr = child.stderr.take().ok_or_else(|| PipelineError::ToolExecution {
        tool: cmd.program.clone(),
        error: "Failed to get stderr".to_string(),
    })?;

    // Separate task so a full stderr pipe cannot stall the child while stdout is read.
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf).await.map(|_| buf)
    });

    // lines are forwarded byte for byte; a final unterminated line stays unterminated
    let mut reader = BufReader::new(stdout);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        sink.write_all(&line).await?;
        sink.flush().await?;
    }

    let status = child.wait().await?;
    let stderr = stderr_task
        .await
        .map_err(|e| PipelineError::Other(e.into()))??;

    let exit_code = exit_code(status);
    debug!("{} exited with code {}", cmd.program, exit_code);
    Ok(ExecOutcome { exit_code, stderr })
}


/// Runs a command with its stdout streamed into `sink`, then writes whatever it
/// printed to stderr after it exits.
///
/// # Arguments
///
/// * `cmd` - Command to run.
/// * `sink` - Launcher output, normally `tokio::io::stdout()`.
///
/// # Returns
/// Exit code of the command.
pub async fn execute<W>(cmd: &CommandLine, sink: &mut W) -> Result<i32, PipelineError>
where
    W: AsyncWrite + Unpin,
{
    sink.write_all(format!("RUNNING...\n {} \n\n", cmd).as_bytes()).await?;
    sink.flush().await?;

    let outcome = stream_child_output(cmd, sink).await?;

    if !outcome.stderr.is_empty() {
        sink.write_all(&outcome.stderr).await?;
        sink.write_all(b"\n").await?;
        sink.flush().await?;
    }
    Ok(outcome.exit_code)
}


/// Exit code of a finished child; signal deaths map to 128 + signal.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
