// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Callback-driven pull sources and their adaptation into native streams.
//!
//! A [`PullSource`] is built from a `pull(controller)` callback, the same shape as a
//! browser `ReadableStream`: whenever its queue is empty the callback is asked to
//! enqueue more elements or close. [`PullSource::into_stream`] turns it into a
//! `futures::Stream`, and it can be used directly as a pipeline [`Source`].

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use crate::errors::BoxError;
use crate::observability::messages::pipeline::PullSourceLifecycle;
use crate::observability::messages::StructuredLog;
use crate::traits::Source;

type Hook = Box<dyn FnOnce() + Send>;

/// Handle given to the pull callback for producing elements.
#[derive(Debug)]
pub struct PullController<T> {
    queue: VecDeque<T>,
    closed: bool,
}

impl<T> PullController<T> {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            closed: false,
        }
    }

    pub fn enqueue(&mut self, item: T) {
        if !self.closed {
            self.queue.push_back(item);
        }
    }

    /// Signal end of data. Queued elements are still delivered.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

/// Source driven by a `pull(controller)` callback.
///
/// The callback runs only when the consumer asks for an element and the queue is
/// empty. A callback that neither enqueues nor closes is treated as an error.
pub struct PullSource<T, P> {
    pull: P,
    controller: PullController<T>,
    started: bool,
    finished: bool,
    on_start: Option<Hook>,
    on_cancel: Option<Hook>,
}

impl<T, P> PullSource<T, P>
where
    T: Send + 'static,
    P: FnMut(&mut PullController<T>) -> Result<(), BoxError> + Send + 'static,
{
    pub fn new(pull: P) -> Self {
        Self {
            pull,
            controller: PullController::new(),
            started: false,
            finished: false,
            on_start: None,
            on_cancel: None,
        }
    }

    pub fn on_start(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    pub fn on_cancel(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(hook));
        self
    }

    /// Next element, pulling from the callback when the queue runs dry.
    pub async fn read(&mut self) -> Result<Option<T>, BoxError> {
        if !self.started {
            self.started = true;
            PullSourceLifecycle { hook: "start" }.log();
            if let Some(hook) = self.on_start.take() {
                hook();
            }
        }

        loop {
            if let Some(item) = self.controller.queue.pop_front() {
                return Ok(Some(item));
            }
            if self.finished || self.controller.closed {
                self.finished = true;
                return Ok(None);
            }

            if let Err(error) = (self.pull)(&mut self.controller) {
                self.finished = true;
                return Err(error);
            }

            if self.controller.queue.is_empty() && !self.controller.closed {
                self.finished = true;
                return Err("pull callback neither enqueued nor closed".into());
            }
        }
    }

    /// Adapt into a native stream. The stream ends after the first error.
    pub fn into_stream(self) -> BoxStream<'static, Result<T, BoxError>> {
        stream::unfold(Some(self), |source| async move {
            let mut source = source?;
            match source.read().await {
                Ok(Some(item)) => Some((Ok(item), Some(source))),
                Ok(None) => None,
                Err(error) => Some((Err(error), None)),
            }
        })
        .boxed()
    }
}

impl<T, P> PullSource<T, P> {
    /// Stop early. Fires the cancel hook if the source started and was not exhausted.
    pub fn cancel(&mut self) {
        if self.started && !self.finished {
            self.finished = true;
            self.controller.queue.clear();
            PullSourceLifecycle { hook: "cancel" }.log();
            if let Some(hook) = self.on_cancel.take() {
                hook();
            }
        }
    }
}

impl<T, P> Drop for PullSource<T, P> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Pull source that yields the given elements in order, one per pull.
pub fn pull_source_from<T>(
    items: Vec<T>,
) -> PullSource<T, impl FnMut(&mut PullController<T>) -> Result<(), BoxError> + Send + 'static>
where
    T: Send + 'static,
{
    let mut remaining = items.into_iter();
    PullSource::new(move |controller: &mut PullController<T>| {
        match remaining.next() {
            Some(item) => controller.enqueue(item),
            None => controller.close(),
        }
        Ok(())
    })
}

#[async_trait]
impl<T, P> Source for PullSource<T, P>
where
    T: Send + 'static,
    P: FnMut(&mut PullController<T>) -> Result<(), BoxError> + Send + 'static,
{
    type Item = T;

    async fn pull(&mut self) -> Result<Option<T>, BoxError> {
        self.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_into_stream_drains_in_order() {
        let words = vec!["a", "b", "c"];

        let drained: Vec<&str> = pull_source_from(words.clone())
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(drained, words);
    }

    #[tokio::test]
    async fn test_pull_only_on_demand() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut next = 0;
        let mut source = PullSource::new(move |controller: &mut PullController<i32>| {
            counter.fetch_add(1, Ordering::SeqCst);
            next += 1;
            controller.enqueue(next);
            Ok(())
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(source.read().await.unwrap(), Some(1));
        assert_eq!(source.read().await.unwrap(), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_queued_items_survive_close() {
        let mut source = PullSource::new(|controller: &mut PullController<i32>| {
            controller.enqueue(1);
            controller.enqueue(2);
            controller.close();
            controller.enqueue(3);
            Ok(())
        });

        assert_eq!(source.read().await.unwrap(), Some(1));
        assert_eq!(source.read().await.unwrap(), Some(2));
        assert_eq!(source.read().await.unwrap(), None);
        assert_eq!(source.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_hooks() {
        let started = Arc::new(AtomicUsize::new(0));
        let cancelled = Arc::new(AtomicUsize::new(0));
        let (s, c) = (started.clone(), cancelled.clone());

        let mut source = pull_source_from(vec![1, 2, 3])
            .on_start(move || {
                s.fetch_add(1, Ordering::SeqCst);
            })
            .on_cancel(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(source.read().await.unwrap(), Some(1));
        source.cancel();
        source.cancel();
        assert_eq!(source.read().await.unwrap(), None);
        drop(source);

        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropping_started_stream_cancels() {
        let cancelled = Arc::new(AtomicUsize::new(0));
        let c = cancelled.clone();

        let mut stream = pull_source_from(vec![1, 2, 3])
            .on_cancel(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .into_stream();
        assert_eq!(stream.try_next().await.unwrap(), Some(1));
        drop(stream);

        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausted_source_does_not_cancel() {
        let cancelled = Arc::new(AtomicUsize::new(0));
        let c = cancelled.clone();

        let drained: Vec<i32> = pull_source_from(vec![1])
            .on_cancel(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(drained, vec![1]);
        assert_eq!(cancelled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_idle_callback_is_an_error() {
        let mut source = PullSource::new(|_: &mut PullController<i32>| Ok(()));

        assert!(source.read().await.is_err());
        assert_eq!(source.read().await.unwrap(), None);
    }
}
