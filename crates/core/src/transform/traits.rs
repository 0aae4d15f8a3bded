//! Trait definitions for the transform module.

use tokio::process::Command;

/// An external byte-stream filter: raw bytes on stdin, transformed bytes on stdout.
///
/// Implementations are stateless descriptors. Every call to [`Transform::command`]
/// returns a fresh, unstarted command so one descriptor can back any number of
/// independent runs.
pub trait Transform: Send + Sync {
    /// Returns the name of this transform, used in logs.
    fn name(&self) -> &str;

    /// Builds the unstarted process invocation.
    ///
    /// Stdio is configured by the caller.
    fn command(&self) -> Command;

    /// Returns the program the command will execute.
    fn program(&self) -> String {
        self.command()
            .as_std()
            .get_program()
            .to_string_lossy()
            .into_owned()
    }
}
