// src/output/sink.rs
// =============================================================================
// The result sink: one consumer task that owns the output writer, fed by a
// bounded channel that every check task sends its finished line into.
//
// Lifecycle:
// 1. `ResultSink::start(writer, capacity)` spawns the consumer
// 2. tasks call `LineEmitter::emit(line)` as their checks complete
// 3. `ResultSink::stop()` runs once every task is done: it drains what is
//    queued, flushes, and hands the writer back
//
// Only the consumer ever touches the writer, and it writes a whole line at
// a time, so lines from different tasks can never interleave.
// Emitting after `stop()` is a bug in the caller and panics.
//
// Rust concepts:
// - mpsc channel: many senders, one receiver
// - Generics (W: AsyncWrite): the same sink writes to stdout or a Vec<u8>
// - AtomicBool: a flag shared between tasks without a lock
// =============================================================================

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{trace, warn};

enum SinkMessage {
    Line(String),
    // Queued behind every line already sent
    Stop,
}

pub struct ResultSink<W> {
    tx: mpsc::Sender<SinkMessage>,
    stopped: Arc<AtomicBool>,
    consumer: JoinHandle<io::Result<W>>,
}

// A cloneable handle for sending lines into the sink.
#[derive(Debug, Clone)]
pub struct LineEmitter {
    tx: mpsc::Sender<SinkMessage>,
    stopped: Arc<AtomicBool>,
}

impl<W> ResultSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    // Starts the consumer task. `capacity` bounds how many lines may wait in
    // the queue; senders wait for room once it is full.
    //
    // The bounded channel is built on a semaphore, so the capacity is
    // clamped into the range that semaphore accepts.
    pub fn start(writer: W, capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
        let (tx, rx) = mpsc::channel(capacity);
        let consumer = tokio::spawn(consume(writer, rx));

        Self {
            tx,
            stopped: Arc::new(AtomicBool::new(false)),
            consumer,
        }
    }

    // Every emitter is another sender on the same channel
    pub fn emitter(&self) -> LineEmitter {
        LineEmitter {
            tx: self.tx.clone(),
            stopped: Arc::clone(&self.stopped),
        }
    }

    // Writes out every queued line, flushes, and returns the writer.
    //
    // Returns the first write error, if any line failed to write.
    pub async fn stop(self) -> io::Result<W> {
        // Flip the flag first so a late emit panics instead of queueing
        self.stopped.store(true, Ordering::Release);

        if self.tx.send(SinkMessage::Stop).await.is_err() {
            warn!("result sink consumer ended before stop");
        }

        // The consumer hands the writer back when it exits
        match self.consumer.await {
            Ok(result) => result,
            Err(e) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("result sink consumer failed: {}", e),
            )),
        }
    }
}

impl LineEmitter {
    // Queues one line (without its trailing newline).
    //
    // Panics if the sink has already been stopped.
    pub async fn emit(&self, line: String) {
        if self.stopped.load(Ordering::Acquire) {
            panic!("result line emitted after the sink was stopped: {}", line);
        }
        if self.tx.send(SinkMessage::Line(line)).await.is_err() {
            panic!("result line emitted after the sink was stopped");
        }
    }
}

async fn consume<W>(mut writer: W, mut rx: mpsc::Receiver<SinkMessage>) -> io::Result<W>
where
    W: AsyncWrite + Unpin,
{
    let mut first_error: Option<io::Error> = None;
    let mut written = 0usize;

    while let Some(message) = rx.recv().await {
        let line = match message {
            SinkMessage::Line(line) => line,
            SinkMessage::Stop => break,
        };

        // After a failed write keep draining so senders never block, but
        // stop touching the writer
        if first_error.is_some() {
            continue;
        }

        // Line and newline go out in one write
        let mut buf = line.into_bytes();
        buf.push(b'\n');
        let result = match writer.write_all(&buf).await {
            Ok(()) => writer.flush().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => written += 1,
            Err(e) => {
                warn!(error = %e, "failed to write result line");
                first_error = Some(e);
            }
        }
    }

    // Any send racing with stop now fails instead of waiting forever
    rx.close();
    trace!(written, "result sink stopped");

    match first_error {
        Some(e) => Err(e),
        None => {
            writer.flush().await?;
            Ok(writer)
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a channel instead of a Mutex around stdout?
//    - A mutex would work, but every task would wait on the lock to write
//    - With a channel, tasks just queue their line and carry on
//    - Only one task owns the writer, so no locking is needed at all
//
// 2. What does a bounded channel do when it is full?
//    - send().await waits until the consumer takes a message out
//    - That keeps memory use flat even when writing is slow
//    - The capacity must be at least 1 and at most Semaphore::MAX_PERMITS,
//      which is why start() clamps it
//
// 3. What is Ordering::Release / Ordering::Acquire?
//    - Memory ordering rules for atomics
//    - A store with Release is seen by a later load with Acquire
//    - Here it simply means: once stop() has run, emitters see the flag
//
// 4. Why return io::Result<W>?
//    - The caller gets its writer back, which is handy in tests
//      (we read the Vec<u8> to check what was written)
//    - The first write error is kept and returned instead of being lost
// -----------------------------------------------------------------------------
