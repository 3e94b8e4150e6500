//! Structured logger handed to every request.
//!
//! A [`Logger`] is an immutable value: it carries a shared sink, the fields
//! bound so far and a minimum level. Deriving (`with_field`, `with_fields`)
//! produces a new handle that shares the sink, so per-request fields never
//! leak back into the base logger.
//!
//! Sinks shipped here:
//! - [`StdoutSink`]: one JSON object per line on stdout (the default).
//! - [`WriterSink`]: the same line format into any `io::Write`.
//! - [`MemorySink`]: keeps records in memory, handy in tests.
//! - [`BackgroundSink`]: hands records to a worker thread through a channel.
//! - [`TracingSink`]: re-emits records as `tracing` events.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::generalkey;

/// Field map bound to a logger or attached to a record.
pub type LogFields = Map<String, Value>;

/// Severity of a record. Ordered from the most to the least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One emitted event: level, message, timestamp and every bound field.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
    pub time: DateTime<Utc>,
    pub fields: LogFields,
}

impl LogRecord {
    /// Look up a bound field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Flatten the record into the JSON object written by the line sinks.
    pub fn to_json(&self) -> LogFields {
        let mut out = self.fields.clone();
        out.insert(
            generalkey::LEVEL.to_string(),
            Value::String(self.level.as_str().to_string()),
        );
        out.insert(
            generalkey::MESSAGE.to_string(),
            Value::String(self.message.clone()),
        );
        out.insert(
            generalkey::TIME.to_string(),
            Value::String(self.time.to_rfc3339_opts(SecondsFormat::Nanos, true)),
        );
        out
    }
}

/// Destination for records. Implementations must tolerate concurrent writes.
pub trait LogSink: Send + Sync {
    fn write(&self, record: &LogRecord);
}

/// Immutable structured logger handle.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
    fields: Arc<LogFields>,
    level: Level,
}

impl Logger {
    pub fn new<S: LogSink + 'static>(sink: S) -> Self {
        Self::from_sink(Arc::new(sink))
    }

    pub fn from_sink(sink: Arc<dyn LogSink>) -> Self {
        Logger {
            sink,
            fields: Arc::new(LogFields::new()),
            level: Level::Trace,
        }
    }

    /// Logger writing JSON lines to standard output.
    pub fn stdout() -> Self {
        Self::new(StdoutSink)
    }

    /// Minimum level this handle emits.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Derive a handle that drops records below `level`.
    pub fn with_level(&self, level: Level) -> Logger {
        Logger {
            sink: self.sink.clone(),
            fields: self.fields.clone(),
            level,
        }
    }

    /// Fields bound to this handle.
    pub fn fields(&self) -> &LogFields {
        &self.fields
    }

    /// Derive a handle with one more field. A field already bound under `key` is replaced.
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Logger {
        let mut fields = (*self.fields).clone();
        fields.insert(key.into(), value.into());
        self.derive(fields)
    }

    /// Derive a handle with every entry of `extra` bound on top of the current fields.
    pub fn with_fields(&self, extra: LogFields) -> Logger {
        if extra.is_empty() {
            return self.clone();
        }

        let mut fields = (*self.fields).clone();
        fields.extend(extra);
        self.derive(fields)
    }

    fn derive(&self, fields: LogFields) -> Logger {
        Logger {
            sink: self.sink.clone(),
            fields: Arc::new(fields),
            level: self.level,
        }
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    pub fn log(&self, level: Level, message: impl Into<String>) {
        self.emit(level, message.into(), None);
    }

    pub fn trace(&self, message: impl Into<String>) {
        self.log(Level::Trace, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warn, message);
    }

    /// Emit an error record with `err` rendered under the `error` field.
    pub fn error(&self, err: impl fmt::Display, message: impl Into<String>) {
        self.emit(Level::Error, message.into(), Some(err.to_string()));
    }

    fn emit(&self, level: Level, message: String, err: Option<String>) {
        if !self.enabled(level) {
            return;
        }

        let mut fields = (*self.fields).clone();
        if let Some(err) = err {
            fields.insert(generalkey::ERROR.to_string(), Value::String(err));
        }

        self.sink.write(&LogRecord {
            level,
            message,
            time: Utc::now(),
            fields,
        });
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::stdout()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Writes each record as one JSON line on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write(&self, record: &LogRecord) {
        if let Err(err) = write_line(&mut io::stdout().lock(), record) {
            eprintln!("grpclog_rs: failed to write log to stdout: {err}");
        }
    }
}

// One JSON object followed by a newline, flushed.
fn write_line<W: Write>(writer: &mut W, record: &LogRecord) -> io::Result<()> {
    let json = serde_json::to_string(&record.to_json())?;
    writeln!(writer, "{json}")?;
    writer.flush()
}

/// Writes each record as one JSON line into the wrapped writer.
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write(&self, record: &LogRecord) {
        if let Err(err) = write_line(&mut *self.writer.lock(), record) {
            eprintln!("grpclog_rs: failed to write log record: {err}");
        }
    }
}

/// Keeps every record in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logger writing into this sink.
    pub fn logger(&self) -> Logger {
        Logger::new(self.clone())
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Records whose message equals `message`, in emission order.
    pub fn with_message(&self, message: &str) -> Vec<LogRecord> {
        self.records
            .lock()
            .iter()
            .filter(|record| record.message == message)
            .cloned()
            .collect()
    }

    /// Drain the buffer.
    pub fn take(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.records.lock())
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &LogRecord) {
        self.records.lock().push(record.clone());
    }
}

/// Moves writes off the request path: records are queued on a channel and a
/// worker thread writes them into the target sink.
///
/// Dropping the sink (for instance when the last [`Logger`] sharing it goes
/// away) closes the queue and waits for the worker to write what is left.
pub struct BackgroundSink {
    sender: Option<Sender<LogRecord>>,
    worker: Option<JoinHandle<()>>,
}

impl BackgroundSink {
    pub fn spawn(target: Arc<dyn LogSink>) -> Self {
        let (sender, receiver) = channel::<LogRecord>();
        let worker = thread::spawn(move || worker_loop(target, receiver));

        BackgroundSink {
            sender: Some(sender),
            worker: Some(worker),
        }
    }

    /// Close the queue and wait until every queued record has been written.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl LogSink for BackgroundSink {
    fn write(&self, record: &LogRecord) {
        let Some(sender) = &self.sender else {
            return;
        };
        if let Err(err) = sender.send(record.clone()) {
            eprintln!("grpclog_rs: failed to enqueue log to worker: {err}");
        }
    }
}

impl Drop for BackgroundSink {
    fn drop(&mut self) {
        self.sender.take();

        let Some(worker) = self.worker.take() else {
            return;
        };
        // The worker itself may hold the last handle through its target sink.
        if worker.thread().id() == thread::current().id() {
            return;
        }
        if worker.join().is_err() {
            eprintln!("grpclog_rs: log worker panicked");
        }
    }
}

fn worker_loop(target: Arc<dyn LogSink>, receiver: Receiver<LogRecord>) {
    for record in receiver {
        target.write(&record);
    }
}

/// Forwards records to the active `tracing` subscriber.
///
/// Events use the `grpclog_rs` target. Bound fields are rendered as one JSON
/// string under the `fields` attribute, since `tracing` field names are static.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, record: &LogRecord) {
        let fields = serde_json::to_string(&record.fields).unwrap_or_default();
        let message = record.message.as_str();

        match record.level {
            Level::Trace => tracing::trace!(target: "grpclog_rs", fields = %fields, "{message}"),
            Level::Debug => tracing::debug!(target: "grpclog_rs", fields = %fields, "{message}"),
            Level::Info => tracing::info!(target: "grpclog_rs", fields = %fields, "{message}"),
            Level::Warn => tracing::warn!(target: "grpclog_rs", fields = %fields, "{message}"),
            Level::Error => tracing::error!(target: "grpclog_rs", fields = %fields, "{message}"),
        }
    }
}
