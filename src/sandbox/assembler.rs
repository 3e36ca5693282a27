//! Result assembler
//!
//! Pure conversion from a [`RawOutcome`] into the [`ExecutionResult`] handed to
//! callers. Runner-level failures become readable `stderr` text.

use std::time::Duration;

use uuid::Uuid;

use crate::models::ExecutionResult;

use super::runner::{RawOutcome, RunnerErrorKind};

/// Package a raw outcome for the caller
pub fn assemble(
    execution_id: Uuid,
    language_id: &str,
    outcome: RawOutcome,
    elapsed: Duration,
) -> ExecutionResult {
    let (stdout, stderr) = match &outcome.error {
        Some(RunnerErrorKind::Infrastructure(message)) => (
            String::new(),
            format!("Execution environment error: {}", message),
        ),
        error => {
            let mut stderr = decode(&outcome.stderr);
            if outcome.truncated {
                stderr = append_line(stderr, "Output truncated: capture limit reached");
            }

            match error {
                Some(RunnerErrorKind::Timeout(limit)) => {
                    let notice = format!(
                        "Execution timed out after {} seconds",
                        limit.as_secs_f64()
                    );
                    stderr = append_line(stderr, &notice);
                }
                _ => {
                    // Signals and OOM kills otherwise leave no trace
                    if let Some(code) = outcome.exit_code.filter(|code| *code != 0) {
                        if stderr.is_empty() {
                            stderr = format!("Process exited with code {}", code);
                        }
                    }
                }
            }

            (decode(&outcome.stdout), stderr)
        }
    };

    ExecutionResult {
        execution_id,
        language_id: language_id.to_string(),
        stdout,
        stderr,
        elapsed_seconds: round_millis(elapsed),
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn append_line(mut text: String, line: &str) -> String {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(line);
    text
}

/// Seconds rounded to millisecond precision
fn round_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::runtime::SandboxLogs;

    fn logs(stdout: &[u8], stderr: &[u8]) -> SandboxLogs {
        SandboxLogs {
            stdout: stdout.to_vec(),
            stderr: stderr.to_vec(),
            truncated: false,
        }
    }

    #[test]
    fn test_successful_run_passes_streams_through() {
        let id = Uuid::new_v4();
        let outcome = RawOutcome::completed(logs(b"hello\n", b""), 0);

        let result = assemble(id, "python", outcome, Duration::from_millis(1234));

        assert_eq!(result.execution_id, id);
        assert_eq!(result.language_id, "python");
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "");
        assert_eq!(result.elapsed_seconds, 1.234);
    }

    #[test]
    fn test_user_code_failure_keeps_stderr_verbatim() {
        let outcome = RawOutcome::completed(logs(b"", b"ZeroDivisionError: division by zero\n"), 1);

        let result = assemble(Uuid::new_v4(), "python", outcome, Duration::ZERO);

        assert_eq!(result.stderr, "ZeroDivisionError: division by zero\n");
    }

    #[test]
    fn test_timeout_keeps_partial_stdout_and_reports_limit() {
        let outcome = RawOutcome::timed_out(logs(b"tick\ntick\n", b"warn"), Duration::from_secs(30));

        let result = assemble(Uuid::new_v4(), "javascript", outcome, Duration::from_secs(30));

        assert_eq!(result.stdout, "tick\ntick\n");
        assert_eq!(result.stderr, "warn\nExecution timed out after 30 seconds");
    }

    #[test]
    fn test_timeout_without_output() {
        let outcome = RawOutcome::timed_out(SandboxLogs::default(), Duration::from_millis(250));

        let result = assemble(Uuid::new_v4(), "python", outcome, Duration::from_millis(260));

        assert_eq!(result.stdout, "");
        assert_eq!(result.stderr, "Execution timed out after 0.25 seconds");
    }

    #[test]
    fn test_infrastructure_error_empties_stdout() {
        let mut outcome = RawOutcome::infrastructure("failed to create sandbox: no such image");
        outcome.stdout = b"stale".to_vec();

        let result = assemble(Uuid::new_v4(), "java", outcome, Duration::ZERO);

        assert_eq!(result.stdout, "");
        assert_eq!(
            result.stderr,
            "Execution environment error: failed to create sandbox: no such image"
        );
        assert_eq!(result.elapsed_seconds, 0.0);
    }

    #[test]
    fn test_silent_crash_reports_exit_code() {
        let outcome = RawOutcome::completed(logs(b"", b""), 137);

        let result = assemble(Uuid::new_v4(), "cpp", outcome, Duration::ZERO);

        assert_eq!(result.stderr, "Process exited with code 137");
    }

    #[test]
    fn test_exit_code_not_added_when_program_wrote_stderr() {
        let outcome = RawOutcome::completed(logs(b"", b"Segmentation fault\n"), 139);

        let result = assemble(Uuid::new_v4(), "c", outcome, Duration::ZERO);

        assert_eq!(result.stderr, "Segmentation fault\n");
    }

    #[test]
    fn test_truncated_output_is_flagged() {
        let mut captured = logs(b"xxxx", b"");
        captured.truncated = true;

        let completed = assemble(
            Uuid::new_v4(),
            "python",
            RawOutcome::completed(captured.clone(), 0),
            Duration::ZERO,
        );
        assert_eq!(completed.stdout, "xxxx");
        assert_eq!(completed.stderr, "Output truncated: capture limit reached");

        let timed_out = assemble(
            Uuid::new_v4(),
            "python",
            RawOutcome::timed_out(captured, Duration::from_secs(2)),
            Duration::from_secs(2),
        );
        assert_eq!(
            timed_out.stderr,
            "Output truncated: capture limit reached\nExecution timed out after 2 seconds"
        );
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let outcome = RawOutcome::completed(logs(&[0x66, 0x6f, 0xff, 0x6f], b""), 0);

        let result = assemble(Uuid::new_v4(), "c", outcome, Duration::ZERO);

        assert_eq!(result.stdout, "fo\u{fffd}o");
    }

    #[test]
    fn test_elapsed_rounding() {
        assert_eq!(round_millis(Duration::from_micros(1_234_567)), 1.235);
        assert_eq!(round_millis(Duration::from_micros(499)), 0.0);
    }
}
