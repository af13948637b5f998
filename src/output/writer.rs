//! Message sinks
//!
//! The tap writes an append-only, order-sensitive message sequence: a
//! stream's SCHEMA precedes its RECORDs, and STATE follows them.

use super::types::Message;
use crate::error::{Error, Result};
use crate::state::State;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::io::Write;

/// Destination for protocol messages
pub trait Sink {
    /// Write one message
    fn write_message(&mut self, message: Message) -> Result<()>;

    /// Announce a stream's schema
    fn emit_schema(
        &mut self,
        stream: &str,
        schema: &Value,
        key_properties: &[String],
        bookmark_properties: &[String],
    ) -> Result<()> {
        self.write_message(Message::schema(
            stream,
            schema.clone(),
            key_properties.to_vec(),
            bookmark_properties.to_vec(),
        ))
    }

    /// Emit one record
    fn emit_record(&mut self, stream: &str, record: Value, extracted_at: DateTime<Utc>) -> Result<()> {
        self.write_message(Message::record(stream, record, extracted_at))
    }

    /// Emit a state checkpoint
    fn emit_state(&mut self, state: &State) -> Result<()> {
        self.write_message(Message::state(state.clone()))
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write_message(&mut self, message: Message) -> Result<()> {
        (**self).write_message(message)
    }
}

/// Writes one JSON object per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
    messages_written: usize,
}

impl JsonLinesSink<std::io::Stdout> {
    /// Sink on standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            messages_written: 0,
        }
    }

    /// Number of messages written so far
    pub fn messages_written(&self) -> usize {
        self.messages_written
    }

    /// Unwrap the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for JsonLinesSink<W> {
    fn write_message(&mut self, message: Message) -> Result<()> {
        let line = serde_json::to_string(&message)?;
        writeln!(self.writer, "{line}")
            .map_err(|e| Error::output(format!("Failed to write message: {e}")))?;
        // Downstream loaders checkpoint on STATE, so it must not sit in a buffer
        if message.is_state() {
            self.writer.flush()?;
        }
        self.messages_written += 1;
        Ok(())
    }
}

/// Keeps messages in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: Vec<Message>,
}

impl CollectingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written, in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Records emitted for `stream`, in order
    pub fn records(&self, stream: &str) -> Vec<&Value> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Record {
                    stream: s, record, ..
                } if s == stream => Some(record),
                _ => None,
            })
            .collect()
    }

    /// States emitted, in order
    pub fn states(&self) -> Vec<&State> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::State { value } => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Number of schema messages for `stream`
    pub fn schema_count(&self, stream: &str) -> usize {
        self.messages
            .iter()
            .filter(|m| m.is_schema() && m.stream() == Some(stream))
            .count()
    }

    /// Consume the sink, returning the messages
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl Sink for CollectingSink {
    fn write_message(&mut self, message: Message) -> Result<()> {
        self.messages.push(message);
        Ok(())
    }
}
