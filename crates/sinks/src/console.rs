//! Console sink
//!
//! Formats each drained batch and writes it to the standard streams in one
//! buffered write per stream. Messages at or above the severity threshold
//! (numerically lower level ids) go to stderr.

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use scribe_levels::LevelId;
use scribe_message::{LogMessage, PooledMessage};
use scribe_pipeline::{PipelineError, Result, Stage, SyncDecision};

use crate::format::{LineFormatter, TextFormatter};

/// Terminal stage writing formatted lines to stdout/stderr
pub struct ConsoleSink {
    name: String,
    formatter: Box<dyn LineFormatter>,

    /// Levels with `id <= threshold` are written to stderr
    stderr_threshold: Option<LevelId>,
}

impl ConsoleSink {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            formatter: Box::new(TextFormatter::new()),
            stderr_threshold: None,
        }
    }

    /// Replace the line formatter
    #[must_use]
    pub fn with_formatter(mut self, formatter: impl LineFormatter) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Send messages at `threshold` severity or worse to stderr
    #[must_use]
    pub fn with_stderr_threshold(mut self, threshold: LevelId) -> Self {
        self.stderr_threshold = Some(threshold);
        self
    }

    fn goes_to_stderr(&self, msg: &LogMessage) -> bool {
        self.stderr_threshold
            .is_some_and(|threshold| msg.level.as_u8() <= threshold.as_u8())
    }
}

#[async_trait]
impl Stage for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_async(&self) -> bool {
        true
    }

    fn process_sync(&self, _msg: &LogMessage) -> Result<SyncDecision> {
        Ok(SyncDecision::ENQUEUE)
    }

    async fn process_async(
        &self,
        batch: &[PooledMessage],
        _cancel: &CancellationToken,
    ) -> Result<()> {
        let mut out = String::new();
        let mut err = String::new();
        for msg in batch {
            let target = if self.goes_to_stderr(msg) {
                &mut err
            } else {
                &mut out
            };
            target.push_str(&self.formatter.format(msg));
            target.push('\n');
        }

        if !out.is_empty() {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(out.as_bytes())
                .await
                .map_err(|e| PipelineError::stage(&self.name, e.to_string()))?;
            stdout
                .flush()
                .await
                .map_err(|e| PipelineError::stage(&self.name, e.to_string()))?;
        }
        if !err.is_empty() {
            let mut stderr = tokio::io::stderr();
            stderr
                .write_all(err.as_bytes())
                .await
                .map_err(|e| PipelineError::stage(&self.name, e.to_string()))?;
            stderr
                .flush()
                .await
                .map_err(|e| PipelineError::stage(&self.name, e.to_string()))?;
        }
        Ok(())
    }
}
