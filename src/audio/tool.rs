use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use crate::error::{RipscribeError, ToolError};

/// An external media tool that takes an ffmpeg-style argument list.
///
/// Implementations block until the tool exits. Success means exit code 0;
/// a non-zero exit or a launch failure is reported as a [`ToolError`].
pub trait MediaTool: Send + Sync {
    fn run(&self, args: &[OsString]) -> std::result::Result<(), ToolError>;

    fn name(&self) -> &str;
}

/// How many trailing stderr lines are kept when ffmpeg fails.
const STDERR_TAIL_LINES: usize = 5;

/// Last `max_lines` non-blank lines of `stderr`, joined with newlines.
///
/// ffmpeg prints its banner and stream info first and the reason for a
/// failure last.
fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect();
    lines[lines.len().saturating_sub(max_lines)..].join("\n")
}

/// Interface for the [ffmpeg](https://ffmpeg.org) program.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: PathBuf,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Verify that the binary is reachable and runs.
    pub fn check(&self) -> crate::Result<()> {
        let output = Command::new(&self.program)
            .arg("-version")
            .output()
            .map_err(|e| {
                RipscribeError::AudioExtraction(format!(
                    "FFmpeg not found at '{}'. Please install FFmpeg and ensure it's in your PATH. Error: {e}",
                    self.program.display()
                ))
            })?;

        if !output.status.success() {
            return Err(RipscribeError::AudioExtraction(
                "FFmpeg check failed".to_string(),
            ));
        }

        debug!("FFmpeg is available");
        Ok(())
    }
}

impl MediaTool for Ffmpeg {
    fn run(&self, args: &[OsString]) -> std::result::Result<(), ToolError> {
        let program = self.program.display().to_string();
        let mut cmd = Command::new(&self.program);
        cmd.args(args).stdin(Stdio::null());

        debug!("Executing command: {cmd:?}");
        let output = cmd.output().map_err(|source| ToolError::Launch {
            program: program.clone(),
            source,
        })?;
        trace!("{program} finished with {}", output.status);

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("{program} stderr:\n{}", stderr.trim_end());
        }

        if output.status.success() {
            Ok(())
        } else {
            Err(ToolError::Exit {
                program,
                status: output.status.to_string(),
                stderr: stderr_tail(&stderr, STDERR_TAIL_LINES),
            })
        }
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_check_ffmpeg() {
        let result = Ffmpeg::default().check();
        if !ffmpeg_available() {
            eprintln!("Skipping test: FFmpeg not available or broken");
            return;
        }
        assert!(result.is_ok(), "FFmpeg check failed: {:?}", result.err());
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let tool = Ffmpeg::new("/nonexistent/bin/ffmpeg");
        match tool.run(&[OsString::from("-version")]) {
            Err(ToolError::Launch { program, .. }) => assert!(program.contains("nonexistent")),
            other => panic!("Expected launch error, got: {other:?}"),
        }
        assert!(tool.check().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_exit_error() {
        let tool = Ffmpeg::new("false");
        match tool.run(&[]) {
            Err(ToolError::Exit { program, .. }) => assert_eq!(program, "false"),
            other => panic!("Expected exit error, got: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_error_keeps_stderr_reason() {
        let tool = Ffmpeg::new("sh");
        let args: Vec<OsString> = [
            "-c",
            "echo 'ffmpeg version n6.1' >&2; echo 'talk.mp4: Invalid data found when processing input' >&2; exit 1",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        let err = tool.run(&args).unwrap_err();
        match &err {
            ToolError::Exit { stderr, .. } => {
                assert!(stderr.ends_with("talk.mp4: Invalid data found when processing input"));
            }
            other => panic!("Expected exit error, got: {other:?}"),
        }
        assert!(err.to_string().contains("Invalid data found"));
    }

    #[test]
    fn test_stderr_tail() {
        let stderr = "banner\n\n  Stream #0:0: Audio\nline a\nline b\n\n";
        assert_eq!(stderr_tail(stderr, 2), "line a\nline b");
        assert_eq!(stderr_tail(stderr, 10), "banner\n  Stream #0:0: Audio\nline a\nline b");
        assert_eq!(stderr_tail("", 3), "");
    }
}
