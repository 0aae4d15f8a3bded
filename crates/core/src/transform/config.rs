//! Configuration for the transform module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the ImageMagick-based thumbnailer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Path to the `convert` binary.
    #[serde(default = "default_program")]
    pub program: PathBuf,
}

fn default_program() -> PathBuf {
    PathBuf::from("convert")
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
        }
    }
}

impl TransformConfig {
    /// Creates a config pointing at a custom binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransformConfig::default();
        assert_eq!(config.program, PathBuf::from("convert"));
    }

    #[test]
    fn test_with_program() {
        let config = TransformConfig::with_program("/opt/im/bin/convert");
        assert_eq!(config.program, PathBuf::from("/opt/im/bin/convert"));
    }
}
