// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::Path;
use std::time::Duration;

use serde_json::Value;

use super::backpressure::{
    BackpressureReport, ChunkMonitor, ChunkedSource, DelayTransform, RecordingSink,
};
use super::interop::pull_source_from;
use super::runner::{PipelineSummary, StreamPipeline};
use super::stages::{CollectSink, IterSource, LineSink, LineSource, MapTransform, StreamSource};
use crate::config::consts::{DEFAULT_BACKPRESSURE_CHUNK_SIZE, DEFAULT_CHUNK_DELAY_MS};
use crate::config::PipelineSettings;
use crate::errors::{BoxError, PipelineError, StageKind};
use crate::observability::messages::pipeline::StreamInteropCompleted;
use crate::observability::messages::StructuredLog;

const INTEROP_WORDS: [&str; 5] = ["Hello", "World", "from", "Web", "Streams"];

/// Entry points that wire common pipelines end to end.
#[derive(Debug, Clone)]
pub struct StreamProcessor {
    chunk_size: usize,
    chunk_delay: Duration,
}

impl Default for StreamProcessor {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_BACKPRESSURE_CHUNK_SIZE,
            chunk_delay: Duration::from_millis(DEFAULT_CHUNK_DELAY_MS),
        }
    }
}

impl StreamProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self {
            chunk_size: settings.backpressure_chunk_size.max(1),
            chunk_delay: settings.chunk_delay(),
        }
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Run `items` through `transform` in memory and collect the output in order.
    ///
    /// # Example
    /// ```
    /// use the_conveyor::pipeline::StreamProcessor;
    ///
    /// let rt = tokio::runtime::Runtime::new().unwrap();
    /// let out = rt
    ///     .block_on(StreamProcessor::new().process_in_memory_stream(
    ///         vec!["hello", "world"],
    ///         |s: &str| Ok(s.to_uppercase()),
    ///     ))
    ///     .unwrap();
    /// assert_eq!(out, vec!["HELLO", "WORLD"]);
    /// ```
    pub async fn process_in_memory_stream<T, U, F>(
        &self,
        items: Vec<T>,
        transform: F,
    ) -> Result<Vec<U>, PipelineError>
    where
        T: Send + 'static,
        U: Send + 'static,
        F: FnMut(T) -> Result<U, BoxError> + Send,
    {
        let sink = CollectSink::new();
        let output = sink.handle();

        StreamPipeline::new(IterSource::new(items), MapTransform::new(transform), sink)
            .run()
            .await?;

        Ok(output.take())
    }

    /// Drain a callback-driven pull source through a native stream, upper-casing
    /// each word.
    pub async fn demonstrate_stream_interop(&self) -> Result<Vec<String>, PipelineError> {
        let words = INTEROP_WORDS.iter().map(|word| word.to_string()).collect();
        let stream = pull_source_from(words).into_stream();

        let sink = CollectSink::new();
        let output = sink.handle();
        StreamPipeline::new(
            StreamSource::new(stream),
            MapTransform::new(|word: String| Ok(word.to_uppercase())),
            sink,
        )
        .run()
        .await?;

        let results = output.take();
        StreamInteropCompleted { results: &results }.log();
        Ok(results)
    }

    /// Push `items` through the chunked pipeline using the configured chunk size.
    pub async fn handle_backpressure(
        &self,
        items: Vec<Value>,
    ) -> Result<BackpressureReport, PipelineError> {
        self.handle_backpressure_with(items, self.chunk_size).await
    }

    /// Push `items` through the chunked pipeline in chunks of `chunk_size`.
    pub async fn handle_backpressure_with(
        &self,
        items: Vec<Value>,
        chunk_size: usize,
    ) -> Result<BackpressureReport, PipelineError> {
        let monitor = ChunkMonitor::new();
        let sink = RecordingSink::new(monitor.clone());
        let sunk = sink.items();

        StreamPipeline::new(
            ChunkedSource::new(items, chunk_size, monitor.clone()),
            DelayTransform::new(self.chunk_delay),
            sink,
        )
        .run()
        .await?;

        let items = std::mem::take(
            &mut *sunk
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        Ok(BackpressureReport {
            items,
            chunks: monitor.consumed(),
            max_chunks_in_flight: monitor.max_in_flight(),
        })
    }

    /// Stream a text file line by line through `transform` into `output`.
    ///
    /// Without a transform each line is upper-cased. Failing to open either file is
    /// reported as a source or sink failure.
    pub async fn process_file<F>(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        transform: Option<F>,
    ) -> Result<PipelineSummary, PipelineError>
    where
        F: FnMut(String) -> Result<String, BoxError> + Send,
    {
        let input = input.as_ref();
        let output = output.as_ref();

        let source = LineSource::open(input)
            .await
            .map_err(|error| open_failure(StageKind::Source, input, error))?;
        let sink = LineSink::create(output)
            .await
            .map_err(|error| open_failure(StageKind::Sink, output, error))?;

        let mut transform = transform;
        let map = move |line: String| match transform.as_mut() {
            Some(f) => f(line),
            None => Ok(line.to_uppercase()),
        };

        let summary = StreamPipeline::new(source, MapTransform::new(map), sink)
            .run()
            .await?;

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            lines = summary.items,
            "File processing completed"
        );
        Ok(summary)
    }
}

fn open_failure(stage: StageKind, path: &Path, error: std::io::Error) -> PipelineError {
    let error = PipelineError::StageFailed {
        stage,
        delivered: 0,
        source: format!("{}: {}", path.display(), error).into(),
    };
    tracing::error!(stage = %stage, error = %error, "File processing failed");
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_in_memory_uppercase() {
        let out = StreamProcessor::new()
            .process_in_memory_stream(vec!["hello", "world"], |s: &str| Ok(s.to_uppercase()))
            .await
            .unwrap();

        assert_eq!(out, vec!["HELLO", "WORLD"]);
    }

    #[tokio::test]
    async fn test_in_memory_empty() {
        let out: Vec<i32> = StreamProcessor::new()
            .process_in_memory_stream(Vec::<i32>::new(), Ok::<i32, BoxError>)
            .await
            .unwrap();

        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_transform_failure() {
        let error = StreamProcessor::new()
            .process_in_memory_stream(vec![1, 2, 3], |n: i32| {
                if n == 2 {
                    Err("two".into())
                } else {
                    Ok(n)
                }
            })
            .await
            .unwrap_err();

        assert_eq!(error.stage(), StageKind::Transform);
        assert_eq!(error.code(), "PIPELINE_STAGE_FAILURE");
    }

    #[tokio::test]
    async fn test_stream_interop() {
        let results = StreamProcessor::new()
            .demonstrate_stream_interop()
            .await
            .unwrap();

        assert_eq!(results, vec!["HELLO", "WORLD", "FROM", "WEB", "STREAMS"]);
    }

    #[tokio::test]
    async fn test_backpressure_keeps_one_chunk_in_flight() {
        let items: Vec<Value> = (0..250).map(|n| json!({"n": n})).collect();
        let processor = StreamProcessor::new().with_chunk_delay(Duration::from_millis(1));

        let report = processor.handle_backpressure(items).await.unwrap();

        assert_eq!(report.items.len(), 250);
        assert_eq!(report.chunks, 3);
        assert!(report.max_chunks_in_flight <= 1);
        assert_eq!(report.items[249]["n"], json!(249));
        assert!(report.items.iter().all(|item| item["processed"] == json!(true)));
    }

    #[tokio::test]
    async fn test_backpressure_with_custom_chunk() {
        let items: Vec<Value> = (0..10).map(|n| json!(n)).collect();
        let processor = StreamProcessor::from_settings(&PipelineSettings {
            backpressure_chunk_size: 4,
            chunk_delay_ms: 0,
        });

        let report = processor.handle_backpressure(items).await.unwrap();
        assert_eq!(report.chunks, 3);
        assert_eq!(report.items.len(), 10);

        let report = processor
            .handle_backpressure_with(vec![json!(1)], 5)
            .await
            .unwrap();
        assert_eq!(report.chunks, 1);
        assert_eq!(report.max_chunks_in_flight, 1);
    }

    #[tokio::test]
    async fn test_process_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.txt");
        let output = dir.path().join("output.txt");
        tokio::fs::write(&input, "alpha\nbeta\n").await.unwrap();

        let summary = StreamProcessor::new()
            .process_file(&input, &output, None::<fn(String) -> Result<String, BoxError>>)
            .await
            .unwrap();

        assert_eq!(summary.items, 2);
        let written = tokio::fs::read_to_string(&output).await.unwrap();
        assert_eq!(written, "ALPHA\nBETA\n");
    }

    #[tokio::test]
    async fn test_process_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();

        let error = StreamProcessor::new()
            .process_file(
                dir.path().join("missing.txt"),
                dir.path().join("out.txt"),
                Some(|line: String| -> Result<String, BoxError> { Ok(line) }),
            )
            .await
            .unwrap_err();

        assert_eq!(error.stage(), StageKind::Source);
    }
}
