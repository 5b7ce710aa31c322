// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! General-purpose pipeline stages.

use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines};

use crate::errors::BoxError;
use crate::traits::{Sink, Source, Transform};

/// Source over any iterator. The next element is taken only when pulled.
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    pub fn new<T>(items: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            iter: items.into_iter(),
        }
    }
}

#[async_trait]
impl<I> Source for IterSource<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    type Item = I::Item;

    async fn pull(&mut self) -> Result<Option<Self::Item>, BoxError> {
        Ok(self.iter.next())
    }
}

/// Source over any `futures::Stream` of fallible elements.
pub struct StreamSource<St> {
    stream: St,
}

impl<St> StreamSource<St> {
    pub fn new(stream: St) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl<St, T> Source for StreamSource<St>
where
    St: Stream<Item = Result<T, BoxError>> + Unpin + Send,
    T: Send,
{
    type Item = T;

    async fn pull(&mut self) -> Result<Option<T>, BoxError> {
        self.stream.next().await.transpose()
    }
}

/// One-to-one mapping through a caller-supplied closure.
pub struct MapTransform<F, I, O> {
    map: F,
    _marker: PhantomData<fn(I) -> O>,
}

impl<F, I, O> MapTransform<F, I, O>
where
    F: FnMut(I) -> Result<O, BoxError> + Send,
{
    pub fn new(map: F) -> Self {
        Self {
            map,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<F, I, O> Transform for MapTransform<F, I, O>
where
    F: FnMut(I) -> Result<O, BoxError> + Send,
    I: Send + 'static,
    O: Send + 'static,
{
    type Input = I;
    type Output = O;

    async fn apply(&mut self, input: I) -> Result<O, BoxError> {
        (self.map)(input)
    }
}

/// Sink that appends every element to a shared buffer.
pub struct CollectSink<T> {
    buffer: Arc<Mutex<Vec<T>>>,
}

/// Read side of a [`CollectSink`], usable after the sink moved into a pipeline.
#[derive(Clone)]
pub struct CollectHandle<T> {
    buffer: Arc<Mutex<Vec<T>>>,
}

impl<T> CollectSink<T> {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn handle(&self) -> CollectHandle<T> {
        CollectHandle {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

impl<T> Default for CollectSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CollectHandle<T> {
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take everything collected so far, leaving the buffer empty.
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Clone> CollectHandle<T> {
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().clone()
    }
}

#[async_trait]
impl<T: Send + 'static> Sink for CollectSink<T> {
    type Item = T;

    async fn consume(&mut self, item: T) -> Result<(), BoxError> {
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(item);
        Ok(())
    }
}

/// Source reading a text file one line at a time, without line terminators.
pub struct LineSource {
    lines: Lines<BufReader<File>>,
}

impl LineSource {
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::open(path).await?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
        })
    }
}

#[async_trait]
impl Source for LineSource {
    type Item = String;

    async fn pull(&mut self) -> Result<Option<String>, BoxError> {
        Ok(self.lines.next_line().await?)
    }
}

/// Sink writing each element as one line of a text file. Flushed on close.
pub struct LineSink {
    writer: BufWriter<File>,
}

impl LineSink {
    /// Create or truncate the file at `path`.
    pub async fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::create(path).await?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

#[async_trait]
impl Sink for LineSink {
    type Item = String;

    async fn consume(&mut self, line: String) -> Result<(), BoxError> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BoxError> {
        self.writer.flush().await?;
        Ok(())
    }
}
