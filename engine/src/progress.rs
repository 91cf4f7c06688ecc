//! Pipeline Progress Events
//!
//! The engine reports each finished stage to a caller-supplied sink instead
//! of holding callbacks.

use serde::Serialize;
use std::sync::mpsc::Sender;
use tracing::trace;

/// Engine stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    /// Identifier and timestamp decoding
    Decode,
    /// Tower lookup and branch split
    Resolve,
    /// Two-stage per-tower aggregation
    AggregateResolved,
    /// Per-eNodeB aggregation of records without a tower
    AggregateUnresolved,
    /// KQI derivation and column assembly
    Assemble,
}

impl Stage {
    /// All stages in order
    pub const ALL: [Stage; 5] = [
        Stage::Decode,
        Stage::Resolve,
        Stage::AggregateResolved,
        Stage::AggregateUnresolved,
        Stage::Assemble,
    ];

    /// 1-based position of the stage
    pub fn step(self) -> usize {
        self as usize + 1
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Decode => "decode",
            Stage::Resolve => "resolve",
            Stage::AggregateResolved => "aggregate resolved",
            Stage::AggregateUnresolved => "aggregate unresolved",
            Stage::Assemble => "assemble",
        }
    }
}

/// A finished stage and what it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub step: usize,
    pub total_steps: usize,
    pub message: String,
}

impl ProgressEvent {
    pub fn completed(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            step: stage.step(),
            total_steps: Stage::ALL.len(),
            message: message.into(),
        }
    }
}

/// Receiver of progress events
pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&mut self, _event: ProgressEvent) {}
}

impl ProgressSink for Vec<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

impl ProgressSink for Sender<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        if self.send(event).is_err() {
            trace!("Progress receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_steps() {
        assert_eq!(Stage::Decode.step(), 1);
        assert_eq!(Stage::Assemble.step(), Stage::ALL.len());
    }

    #[test]
    fn test_channel_sink() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut sink = tx;
        sink.emit(ProgressEvent::completed(Stage::Resolve, "done"));
        let event = rx.recv().unwrap();
        assert_eq!(event.stage, Stage::Resolve);
        assert_eq!(event.step, 2);
        assert_eq!(event.total_steps, 5);
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (tx, rx) = std::sync::mpsc::channel();
        drop(rx);
        let mut sink = tx;
        sink.emit(ProgressEvent::completed(Stage::Decode, "done"));
    }
}
