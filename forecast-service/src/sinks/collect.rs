use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::Mutex;

use crate::pipeline::{Envelope, PipelineError, Sink};

/// Sink that buffers every envelope in memory.
///
/// Used by the read path: the dataset is bounded, so collecting it
/// wholesale before smoothing and forecasting is the intended mode of
/// operation, not a shortcut. The buffer is behind a shared handle so a
/// clone can be handed to `Pipeline` (which consumes its sink) while the
/// caller keeps one to drain afterwards. Upstream errors abort the run;
/// a dataset with holes would silently skew the daily peaks.
pub struct VecSink<T> {
    buffer: Arc<Mutex<Vec<Envelope<T>>>>,
}

impl<T> Clone for VecSink<T> {
    fn clone(&self) -> Self {
        Self {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

impl<T> Default for VecSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> VecSink<T> {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Drain everything collected so far.
    pub async fn take_payloads(&self) -> Vec<T> {
        let mut buffer = self.buffer.lock().await;
        std::mem::take(&mut *buffer)
            .into_iter()
            .map(|env| env.payload)
            .collect()
    }
}

#[async_trait::async_trait]
impl<T: Send + Sync> Sink<T> for VecSink<T> {
    async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin + 'static,
    {
        let mut buffer = self.buffer.lock().await;
        while let Some(item) = input.next().await {
            buffer.push(item?);
        }
        Ok(())
    }
}
