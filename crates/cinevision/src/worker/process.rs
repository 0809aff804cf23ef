//! External analyzer processes.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tracing::{debug, warn};

use super::{AnalyzerWorker, EventSink, ProgressEvent, WorkerInput, WorkerKind, WorkerOutcome};
use crate::config::WorkerCommand;
use crate::error::WorkerError;

pub const SCRIPT_PLACEHOLDER: &str = "$script";
pub const OUTPUT_PLACEHOLDER: &str = "$output";

/// Runs a configured program and turns its output into progress events.
///
/// Stdout lines starting with `{` are progress events. Every stderr line is
/// reported as an error event. A non-zero exit without an earlier terminal
/// event produces one.
#[derive(Debug, Clone)]
pub struct ProcessWorker {
    kind: WorkerKind,
    command: WorkerCommand,
}

impl ProcessWorker {
    pub fn new(kind: WorkerKind, command: WorkerCommand) -> Self {
        Self { kind, command }
    }

    /// Substitutes placeholders, appending the paths when `$script` is absent.
    pub fn build_args(&self, input: &WorkerInput) -> Vec<String> {
        let script = input.script_path.to_string_lossy();
        let output = input
            .output_dir
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut args: Vec<String> = self
            .command
            .args
            .iter()
            .map(|arg| {
                arg.replace(SCRIPT_PLACEHOLDER, &script)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect();

        let has_script = self
            .command
            .args
            .iter()
            .any(|arg| arg.contains(SCRIPT_PLACEHOLDER));
        if !has_script {
            args.push(script.into_owned());
            if let Some(dir) = &input.output_dir {
                args.push(dir.to_string_lossy().into_owned());
            }
        }

        args
    }
}

/// Reads one line, decoding invalid UTF-8 lossily. `None` at end of stream.
async fn read_line_lossy<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

#[async_trait]
impl AnalyzerWorker for ProcessWorker {
    async fn run(
        &self,
        input: &WorkerInput,
        events: EventSink,
    ) -> Result<WorkerOutcome, WorkerError> {
        let args = self.build_args(input);
        debug!(kind = %self.kind, program = %self.command.program, ?args, "Spawning worker");

        let mut cmd = TokioCommand::new(&self.command.program);
        cmd.args(&args)
            .envs(&self.command.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = input.script_path.parent() {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| WorkerError::SpawnFailed {
            program: self.command.program.clone(),
            source: e,
        })?;

        let stdout = child.stdout.take().ok_or(WorkerError::ChannelClosed)?;
        let stderr = child.stderr.take().ok_or(WorkerError::ChannelClosed)?;

        let parse_events = events.is_listening();
        let terminal_seen = AtomicBool::new(false);

        // Both pipes are drained together so neither can fill up and stall
        // the child. The readers outlive the drain so the pipes stay open
        // until the child has exited.
        let mut stdout = BufReader::new(stdout);
        let mut stderr = BufReader::new(stderr);

        let read_stdout = async {
            let mut captured = String::new();
            let mut buf = Vec::new();
            loop {
                let line = match read_line_lossy(&mut stdout, &mut buf).await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(kind = %self.kind, error = %e, "Stopped reading worker stdout");
                        break;
                    }
                };
                captured.push_str(&line);
                captured.push('\n');
                if !parse_events {
                    continue;
                }
                match ProgressEvent::from_line(&line) {
                    Ok(Some(event)) => {
                        if event.is_terminal() {
                            terminal_seen.store(true, Ordering::SeqCst);
                        }
                        events.send(event);
                    }
                    Ok(None) => debug!(kind = %self.kind, line = %line, "Worker output"),
                    Err(e) => warn!(kind = %self.kind, error = %e, line = %line, "Ignoring malformed worker output"),
                }
            }
            captured
        };

        let read_stderr = async {
            let mut captured = String::new();
            let mut buf = Vec::new();
            loop {
                let line = match read_line_lossy(&mut stderr, &mut buf).await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(kind = %self.kind, error = %e, "Stopped reading worker stderr");
                        break;
                    }
                };
                captured.push_str(&line);
                captured.push('\n');
                if line.trim().is_empty() {
                    continue;
                }
                warn!(kind = %self.kind, line = %line, "Worker stderr");
                if parse_events {
                    terminal_seen.store(true, Ordering::SeqCst);
                    events.send(ProgressEvent::error(line));
                }
            }
            captured
        };

        let (stdout_text, stderr_text) = tokio::join!(read_stdout, read_stderr);
        let status = child.wait().await?;

        let outcome = WorkerOutcome {
            exit_code: status.code(),
            stdout: stdout_text,
            stderr: stderr_text,
        };

        if !outcome.succeeded() && parse_events && !terminal_seen.load(Ordering::SeqCst) {
            events.send(ProgressEvent::error(format!(
                "{} worker failed with code {}",
                self.kind,
                outcome.code_label()
            )));
        }

        debug!(kind = %self.kind, code = %outcome.code_label(), "Worker exited");
        Ok(outcome)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::worker::JobStatus;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn sh(script: &str) -> ProcessWorker {
        ProcessWorker::new(
            WorkerKind::Storyboard,
            WorkerCommand {
                program: "sh".to_string(),
                args: vec!["-c".to_string(), script.to_string(), "worker".to_string()],
                env: HashMap::new(),
            },
        )
    }

    fn input() -> WorkerInput {
        WorkerInput {
            kind: WorkerKind::Storyboard,
            script_path: std::env::temp_dir().join("script.txt"),
            output_dir: None,
        }
    }

    async fn run_collecting(worker: &ProcessWorker) -> (WorkerOutcome, Vec<ProgressEvent>) {
        let (sink, mut rx) = EventSink::channel();
        let outcome = worker.run(&input(), sink).await.unwrap();
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (outcome, events)
    }

    #[test]
    fn test_placeholders_substituted() {
        let worker = ProcessWorker::new(
            WorkerKind::Storyboard,
            WorkerCommand {
                program: "python3".to_string(),
                args: vec![
                    "gen.py".to_string(),
                    "--script".to_string(),
                    "$script".to_string(),
                    "--output=$output".to_string(),
                ],
                env: HashMap::new(),
            },
        );
        let args = worker.build_args(&WorkerInput {
            kind: WorkerKind::Storyboard,
            script_path: PathBuf::from("/tmp/s/script.txt"),
            output_dir: Some(PathBuf::from("/tmp/s/output")),
        });
        assert_eq!(
            args,
            vec!["gen.py", "--script", "/tmp/s/script.txt", "--output=/tmp/s/output"]
        );
    }

    #[test]
    fn test_paths_appended_without_placeholder() {
        let worker = ProcessWorker::new(
            WorkerKind::Storyboard,
            WorkerCommand {
                program: "gen".to_string(),
                args: vec!["-v".to_string()],
                env: HashMap::new(),
            },
        );
        let args = worker.build_args(&WorkerInput {
            kind: WorkerKind::Storyboard,
            script_path: PathBuf::from("/s/script.txt"),
            output_dir: Some(PathBuf::from("/s/output")),
        });
        assert_eq!(args, vec!["-v", "/s/script.txt", "/s/output"]);
    }

    #[tokio::test]
    async fn test_stdout_events_in_order() {
        let worker = sh(r#"echo '{"status":"processing","message":"one","progress":50}'
echo 'plain text is ignored'
echo '{broken'
echo '{"status":"complete","message":"done"}'"#);
        let (outcome, events) = run_collecting(&worker).await;

        assert!(outcome.succeeded());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message.as_deref(), Some("one"));
        assert_eq!(events[0].extra["progress"], 50);
        assert_eq!(events[1].status, JobStatus::Completed);
        assert!(outcome.stdout.contains("plain text is ignored"));
    }

    #[tokio::test]
    async fn test_stderr_becomes_error_event() {
        let worker = sh("echo 'boom' >&2");
        let (outcome, events) = run_collecting(&worker).await;

        assert!(outcome.succeeded());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, JobStatus::Error);
        assert_eq!(events[0].message.as_deref(), Some("boom"));
        assert_eq!(outcome.stderr, "boom\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit_synthesizes_error() {
        let worker = sh(r#"echo '{"status":"processing"}'; exit 3"#);
        let (outcome, events) = run_collecting(&worker).await;

        assert_eq!(outcome.exit_code, Some(3));
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].status, JobStatus::Error);
        assert_eq!(
            events[1].message.as_deref(),
            Some("storyboard worker failed with code 3")
        );
    }

    #[tokio::test]
    async fn test_nonzero_exit_after_terminal_event_adds_nothing() {
        let worker = sh(r#"echo '{"status":"error","message":"bad input"}'; exit 1"#);
        let (_, events) = run_collecting(&worker).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message.as_deref(), Some("bad input"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_abort_run() {
        let worker = sh(r#"printf 'caf\351 log line\n'
echo '{"status":"processing","message":"halfway"}'
printf 'bad \377 byte\n' >&2
echo '{"status":"complete","message":"done"}'"#);
        let (outcome, events) = run_collecting(&worker).await;

        assert!(outcome.succeeded());
        assert!(outcome.stdout.starts_with("caf\u{FFFD} log line\n"));
        assert_eq!(outcome.stderr, "bad \u{FFFD} byte\n");

        let messages: Vec<_> = events.iter().map(|e| e.message.as_deref()).collect();
        assert!(messages.contains(&Some("halfway")));
        assert!(messages.contains(&Some("bad \u{FFFD} byte")));
        assert!(events.iter().any(|e| e.status == JobStatus::Completed));
    }

    #[tokio::test]
    async fn test_env_is_passed() {
        let mut env = HashMap::new();
        env.insert("CINEVISION_TEST_VALUE".to_string(), "42".to_string());
        let worker = ProcessWorker::new(
            WorkerKind::Budget,
            WorkerCommand {
                program: "sh".to_string(),
                args: vec![
                    "-c".to_string(),
                    "printf '%s' \"$CINEVISION_TEST_VALUE\"".to_string(),
                    "worker".to_string(),
                ],
                env,
            },
        );
        let outcome = worker.run(&input(), EventSink::discard()).await.unwrap();
        assert_eq!(outcome.stdout, "42\n");
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let worker = ProcessWorker::new(
            WorkerKind::Budget,
            WorkerCommand {
                program: "/definitely/not/a/worker".to_string(),
                args: vec![],
                env: HashMap::new(),
            },
        );
        let err = worker.run(&input(), EventSink::discard()).await.unwrap_err();
        assert!(matches!(err, WorkerError::SpawnFailed { .. }));
    }
}
