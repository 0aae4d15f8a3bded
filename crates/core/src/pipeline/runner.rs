//! Pipeline orchestrator.

use std::io::ErrorKind;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::types::{PipelineReport, PipelineState, Stage};
use crate::metrics;
use crate::sink::{ByteSink, StagedUpload};
use crate::source::ByteSource;
use crate::transform::Transform;

/// Upper bound on captured transform stderr. The rest is read and dropped.
const MAX_STDERR_BYTES: usize = 64 * 1024;

/// How long to wait for stderr to close after the process exited.
const STDERR_GRACE: Duration = Duration::from_secs(1);

/// Runs one source -> transform -> sink wiring per call.
///
/// A `Pipeline` holds no per-run state; any number of runs may share one
/// instance concurrently.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a new pipeline.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Creates a pipeline with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PipelineConfig::default())
    }

    /// The configuration in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Streams `source` through `transform` into `sink`.
    ///
    /// The source and sink each run on their own task while this future waits
    /// for both, then for the process to exit. The first failure kills the
    /// process, discards the staged output and is returned; later failures it
    /// caused are only logged. When this returns, every pipe is closed and the
    /// process has been reaped. Dropping the future aborts both stage tasks
    /// and kills the process.
    pub async fn run<T, S, K>(
        &self,
        transform: &T,
        source: S,
        sink: K,
    ) -> Result<PipelineReport, PipelineError>
    where
        T: Transform + ?Sized,
        S: ByteSource + 'static,
        K: ByteSink + 'static,
    {
        let start = Instant::now();
        let mut run = RunState::new(transform.name(), source.describe(), sink.describe());
        info!(
            run_id = %run.id,
            transform = %run.transform,
            source = %run.source,
            destination = %run.destination,
            "Pipeline starting"
        );

        let result = self.execute(&mut run, transform, source, sink, start).await;

        let elapsed = start.elapsed();
        match &result {
            Ok(report) => {
                metrics::record_success(elapsed, report.bytes_in, report.bytes_out);
                info!(
                    run_id = %run.id,
                    bytes_in = report.bytes_in,
                    bytes_out = report.bytes_out,
                    elapsed_ms = report.elapsed_ms,
                    "Pipeline finished"
                );
            }
            Err(e) => {
                metrics::record_failure(elapsed, e.stage());
                warn!(
                    run_id = %run.id,
                    stage = %e.stage(),
                    destination = %run.destination,
                    error = %e,
                    "Pipeline failed"
                );
            }
        }

        result
    }

    async fn execute<T, S, K>(
        &self,
        run: &mut RunState,
        transform: &T,
        source: S,
        sink: K,
        start: Instant,
    ) -> Result<PipelineReport, PipelineError>
    where
        T: Transform + ?Sized,
        S: ByteSource + 'static,
        K: ByteSink + 'static,
    {
        let mut command = transform.command();
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(source) => {
                run.transition(PipelineState::Failed);
                return Err(PipelineError::Spawn {
                    program: transform.program(),
                    source,
                });
            }
        };

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            (stdin, _) => {
                let error = if stdin.is_none() {
                    PipelineError::StdinUnavailable
                } else {
                    PipelineError::StdoutUnavailable
                };
                drop(stdin);
                reap(&mut child).await;
                run.transition(PipelineState::Failed);
                return Err(error);
            }
        };

        let stderr = child
            .stderr
            .take()
            .map(|e| StageTask(tokio::spawn(capture_stderr(e))));
        run.transition(PipelineState::Piping);

        let mut producer: StageTask<Result<u64, PipelineError>> =
            StageTask(tokio::spawn(async move { source.produce(Box::new(stdin)).await }));
        let mut consumer: StageTask<Result<Box<dyn StagedUpload>, PipelineError>> =
            StageTask(tokio::spawn(async move { sink.consume(Box::new(stdout)).await }));

        let deadline = tokio::time::sleep(self.config.timeout());
        tokio::pin!(deadline);

        let mut outcome = Outcome::default();
        let mut producer_done = false;
        let mut consumer_done = false;
        let mut timed_out = false;
        let mut abandoned = (false, false);

        // Completion barrier: release only once both stage tasks are finished.
        while !(producer_done && consumer_done) {
            tokio::select! {
                joined = &mut producer.0, if !producer_done => {
                    producer_done = true;
                    match flatten(joined, Stage::Source) {
                        Ok(bytes) => {
                            outcome.bytes_in = bytes;
                            if outcome.failure.is_none() {
                                run.transition(PipelineState::Draining);
                            }
                        }
                        // The transform stopped reading; its exit status explains why.
                        Err(PipelineError::SourceIo(e)) if e.kind() == ErrorKind::BrokenPipe => {
                            outcome.broken_pipe = Some(PipelineError::SourceIo(e));
                        }
                        Err(e) => outcome.fail(run, &mut child, e),
                    }
                }
                joined = &mut consumer.0, if !consumer_done => {
                    consumer_done = true;
                    match flatten(joined, Stage::Sink) {
                        Ok(upload) => outcome.staged = Some(upload),
                        Err(e) => outcome.fail(run, &mut child, e),
                    }
                }
                _ = &mut deadline, if !timed_out => {
                    timed_out = true;
                    outcome.fail(run, &mut child, self.timeout_error());
                }
            }

            // A failed run stops the surviving stage too.
            if outcome.failure.is_some() {
                if !producer_done {
                    producer.0.abort();
                    producer_done = true;
                    abandoned.0 = true;
                }
                if !consumer_done {
                    consumer.0.abort();
                    consumer_done = true;
                    abandoned.1 = true;
                }
            }
        }

        // Aborted tasks stop at their next suspension point; wait for that.
        if abandoned.0 {
            let _ = (&mut producer.0).await;
        }
        if abandoned.1 {
            if let Ok(Ok(upload)) = (&mut consumer.0).await {
                outcome.staged = Some(upload);
            }
        }

        let status = if timed_out {
            child.wait().await
        } else {
            tokio::select! {
                status = child.wait() => status,
                _ = &mut deadline => {
                    outcome.fail(run, &mut child, self.timeout_error());
                    child.wait().await
                }
            }
        };

        let stderr = match stderr {
            Some(mut task) => tokio::time::timeout(STDERR_GRACE, &mut task.0)
                .await
                .ok()
                .and_then(Result::ok)
                .unwrap_or_default(),
            None => String::new(),
        };

        match status {
            Ok(status) => outcome.check_exit(run, &mut child, status, stderr),
            Err(e) => outcome.fail(run, &mut child, PipelineError::Wait(e)),
        }
        if let Some(error) = outcome.broken_pipe.take() {
            outcome.fail(run, &mut child, error);
        }

        if let Some(error) = outcome.failure {
            if let Some(upload) = outcome.staged {
                if let Err(e) = upload.abort().await {
                    warn!(run_id = %run.id, error = %e, "Failed to discard staged output");
                }
            }
            return Err(error);
        }

        run.transition(PipelineState::Exited);

        let upload = outcome.staged.ok_or(PipelineError::StageAborted { stage: Stage::Sink })?;
        // The commit is where a small upload actually reaches the store.
        let bytes_out = tokio::select! {
            committed = upload.commit() => committed?,
            _ = &mut deadline => return Err(self.timeout_error()),
        };

        Ok(PipelineReport {
            bytes_in: outcome.bytes_in,
            bytes_out,
            elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }

    fn timeout_error(&self) -> PipelineError {
        PipelineError::Timeout {
            timeout_secs: self.config.timeout_secs,
        }
    }
}

/// A spawned stage that is aborted when dropped, so dropping the run future
/// leaves no stage behind.
struct StageTask<T>(JoinHandle<T>);

impl<T> Drop for StageTask<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Per-run bookkeeping: identity for logs plus the lifecycle state.
struct RunState {
    id: Uuid,
    transform: String,
    source: String,
    destination: String,
    state: PipelineState,
}

impl RunState {
    fn new(transform: &str, source: String, destination: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            transform: transform.to_string(),
            source,
            destination,
            state: PipelineState::Unstarted,
        }
    }

    fn transition(&mut self, next: PipelineState) {
        if self.state.can_transition_to(next) {
            debug!(run_id = %self.id, from = %self.state, to = %next, "Pipeline state change");
            self.state = next;
        }
    }
}

/// What the stages have produced so far.
#[derive(Default)]
struct Outcome {
    bytes_in: u64,
    staged: Option<Box<dyn StagedUpload>>,
    failure: Option<PipelineError>,
    broken_pipe: Option<PipelineError>,
}

impl Outcome {
    /// Records `error` if it is the first one and kills the process so that
    /// blocked peers see their pipes close.
    fn fail(&mut self, run: &mut RunState, child: &mut Child, error: PipelineError) {
        if self.failure.is_some() {
            debug!(run_id = %run.id, error = %error, "Ignoring follow-up failure");
            return;
        }

        if let Err(e) = child.start_kill() {
            debug!(run_id = %run.id, error = %e, "Transform already gone");
        }
        run.transition(PipelineState::Failed);
        self.failure = Some(error);
    }

    fn check_exit(
        &mut self,
        run: &mut RunState,
        child: &mut Child,
        status: ExitStatus,
        stderr: String,
    ) {
        if status.success() {
            return;
        }
        self.fail(
            run,
            child,
            PipelineError::TransformFailed {
                code: status.code(),
                stderr,
            },
        );
    }
}

fn flatten<T>(
    joined: Result<Result<T, PipelineError>, JoinError>,
    stage: Stage,
) -> Result<T, PipelineError> {
    match joined {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(PipelineError::StagePanicked { stage }),
        Err(_) => Err(PipelineError::StageAborted { stage }),
    }
}

async fn reap(child: &mut Child) {
    if let Err(e) = child.kill().await {
        debug!(error = %e, "Failed to kill transform");
    }
}

async fn capture_stderr(mut stderr: ChildStderr) -> String {
    let mut captured = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        match stderr.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let room = MAX_STDERR_BYTES.saturating_sub(captured.len());
                captured.extend_from_slice(&chunk[..n.min(room)]);
            }
        }
    }

    String::from_utf8_lossy(&captured).trim_end().to_string()
}
