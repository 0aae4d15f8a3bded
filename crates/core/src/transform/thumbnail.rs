//! ImageMagick `convert` thumbnailer.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::config::TransformConfig;
use super::traits::Transform;
use crate::pipeline::PipelineError;

/// Arguments preceding the width slot. `-` reads the image from stdin.
const LEADING_ARGS: &[&str] = &[
    "-",
    "-filter",
    "Triangle",
    "-define",
    "filter:support=2",
    "-thumbnail",
];

/// Arguments following the width slot. The final `-` writes to stdout.
const TRAILING_ARGS: &[&str] = &[
    "-unsharp",
    "0.25x0.25+8+0.065",
    "-dither",
    "None",
    "-posterize",
    "136",
    "-quality",
    "82",
    "-define",
    "jpeg:fancy-upsampling=off",
    "-define",
    "png:compression-filter=5",
    "-define",
    "png:compression-level=9",
    "-define",
    "png:compression-strategy=1",
    "-define",
    "png:exclude-chunk=all",
    "-interlace",
    "line",
    "-colorspace",
    "sRGB",
    "-",
];

/// Builds the fixed `convert` argument vector with `width` substituted.
///
/// The width is passed through uninterpreted; a bad value makes the
/// process fail, not the construction.
pub fn thumbnail_args(width: &str) -> Vec<String> {
    LEADING_ARGS
        .iter()
        .copied()
        .chain(std::iter::once(width))
        .chain(TRAILING_ARGS.iter().copied())
        .map(str::to_string)
        .collect()
}

/// Thumbnail transform for one target width.
#[derive(Debug, Clone)]
pub struct Thumbnailer {
    program: PathBuf,
    width: String,
}

impl Thumbnailer {
    /// Creates a thumbnailer for `width` using the configured binary.
    pub fn new(config: &TransformConfig, width: impl Into<String>) -> Self {
        Self {
            program: config.program.clone(),
            width: width.into(),
        }
    }

    /// The requested width, verbatim.
    pub fn width(&self) -> &str {
        &self.width
    }

    /// Checks that `program` can be executed, returning its first version line.
    pub async fn validate(program: &Path) -> Result<String, PipelineError> {
        let output = Command::new(program)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| PipelineError::Spawn {
                program: program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(PipelineError::TransformFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}

impl Transform for Thumbnailer {
    fn name(&self) -> &str {
        "thumbnail"
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(thumbnail_args(&self.width));
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_fills_thumbnail_slot() {
        let args = thumbnail_args("200");
        let slot = args.iter().position(|a| a == "-thumbnail").unwrap();
        assert_eq!(args[slot + 1], "200");
        assert_eq!(args.iter().filter(|a| *a == "200").count(), 1);
    }

    #[test]
    fn test_reads_stdin_and_writes_stdout() {
        let args = thumbnail_args("64x64");
        assert_eq!(args.first().map(String::as_str), Some("-"));
        assert_eq!(args.last().map(String::as_str), Some("-"));
        assert_eq!(args.len(), LEADING_ARGS.len() + 1 + TRAILING_ARGS.len());
    }

    #[test]
    fn test_fixed_filter_settings() {
        let args = thumbnail_args("100");
        for expected in ["Triangle", "0.25x0.25+8+0.065", "136", "82", "sRGB", "line"] {
            assert!(args.contains(&expected.to_string()), "missing {}", expected);
        }
    }

    #[test]
    fn test_width_is_not_interpreted() {
        let args = thumbnail_args("not-a-number");
        assert!(args.contains(&"not-a-number".to_string()));
    }

    #[test]
    fn test_command_uses_configured_program() {
        let config = TransformConfig::with_program("/opt/bin/convert");
        let thumbnailer = Thumbnailer::new(&config, "300");
        assert_eq!(thumbnailer.program(), "/opt/bin/convert");
        assert_eq!(thumbnailer.width(), "300");

        let command = thumbnailer.command();
        let args: Vec<String> = command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, thumbnail_args("300"));
    }

    #[tokio::test]
    async fn test_validate_missing_program() {
        let result = Thumbnailer::validate(Path::new("/nonexistent/convert")).await;
        assert!(matches!(result, Err(PipelineError::Spawn { .. })));
    }
}
