use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::error::{RipscribeError, Result};

use super::chunk::{chunk_path, ChunkPlan, ChunkSpec};
use super::tool::MediaTool;
use super::{AudioAsset, OverwritePolicy};

/// Arguments for a stream-copy cut of one chunk out of `input`.
pub fn split_args(
    input: &Path,
    chunk: &ChunkSpec,
    output: &Path,
    overwrite: OverwritePolicy,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        overwrite.ffmpeg_flag().into(),
        "-i".into(),
        input.as_os_str().to_owned(),
    ];
    args.extend(
        [
            "-ss".to_string(),
            chunk.offset_secs.to_string(),
            "-t".to_string(),
            chunk.duration_secs.to_string(),
            "-c".to_string(),
            "copy".to_string(),
        ]
        .map(OsString::from),
    );
    args.push(output.as_os_str().to_owned());
    args
}

/// Cut `whole` into one file per plan entry, in plan order.
///
/// Stops at the first failing chunk. Chunk files written before the failure
/// stay on disk.
pub fn split_audio(
    tool: &dyn MediaTool,
    whole: &AudioAsset,
    plan: &ChunkPlan,
    overwrite: OverwritePolicy,
) -> Result<Vec<PathBuf>> {
    info!(
        "Splitting {} into {} chunks",
        whole.path.display(),
        plan.len()
    );

    let mut paths = Vec::with_capacity(plan.len());

    for chunk in plan.iter() {
        let output = chunk_path(&whole.path, chunk.index);
        let args = split_args(&whole.path, chunk, &output, overwrite);

        debug!(
            "Creating chunk {}: {}s + {}s",
            chunk.index, chunk.offset_secs, chunk.duration_secs
        );

        if let Err(e) = tool.run(&args) {
            error!("Could not split audio file: {e}");
            return Err(RipscribeError::AudioSplit(format!(
                "chunk {} ({}): {e}",
                chunk.index,
                output.display()
            )));
        }

        info!("Wrote {}", output.display());
        paths.push(output);
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::chunk::plan_chunks;
    use crate::error::ToolError;
    use std::sync::Mutex;

    struct CountingTool {
        calls: Mutex<Vec<Vec<OsString>>>,
        fail_on_call: Option<usize>,
    }

    impl CountingTool {
        fn new(fail_on_call: Option<usize>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on_call,
            }
        }
    }

    impl MediaTool for CountingTool {
        fn run(&self, args: &[OsString]) -> std::result::Result<(), ToolError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(args.to_vec());
            if self.fail_on_call == Some(calls.len()) {
                return Err(ToolError::Exit {
                    program: "ffmpeg".to_string(),
                    status: "exit status: 234".to_string(),
                    stderr: String::new(),
                });
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn whole() -> AudioAsset {
        AudioAsset {
            path: PathBuf::from("/videos/lecture.wav"),
            size_bytes: 60_000_000,
        }
    }

    #[test]
    fn test_split_args() {
        let chunk = ChunkSpec {
            index: 2,
            offset_secs: 34,
            duration_secs: 34,
        };
        let args = split_args(
            Path::new("/videos/lecture.wav"),
            &chunk,
            Path::new("/videos/lecture2.wav"),
            OverwritePolicy::Overwrite,
        );
        let args: Vec<&str> = args.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "/videos/lecture.wav",
                "-ss",
                "34",
                "-t",
                "34",
                "-c",
                "copy",
                "/videos/lecture2.wav"
            ]
        );
    }

    #[test]
    fn test_split_audio_returns_paths_in_plan_order() {
        let tool = CountingTool::new(None);
        let plan = plan_chunks(100.0, 3);

        let paths = split_audio(&tool, &whole(), &plan, OverwritePolicy::Overwrite).unwrap();

        assert_eq!(
            paths,
            vec![
                PathBuf::from("/videos/lecture1.wav"),
                PathBuf::from("/videos/lecture2.wav"),
                PathBuf::from("/videos/lecture3.wav"),
            ]
        );

        let calls = tool.calls.lock().unwrap();
        let offsets: Vec<&str> = calls.iter().map(|c| c[4].to_str().unwrap()).collect();
        assert_eq!(offsets, vec!["0", "34", "68"]);
    }

    #[test]
    fn test_split_audio_aborts_on_first_failure() {
        let tool = CountingTool::new(Some(2));
        let plan = plan_chunks(100.0, 3);

        let result = split_audio(&tool, &whole(), &plan, OverwritePolicy::Overwrite);

        match result {
            Err(RipscribeError::AudioSplit(msg)) => {
                assert!(msg.contains("chunk 2"));
                assert!(msg.contains("lecture2.wav"));
            }
            other => panic!("Expected AudioSplit error, got: {other:?}"),
        }
        assert_eq!(tool.calls.lock().unwrap().len(), 2);
    }
}
