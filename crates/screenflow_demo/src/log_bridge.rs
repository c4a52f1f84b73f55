// SPDX-License-Identifier: MIT OR Apache-2.0
//! Captures warnings emitted while a scenario runs.

use std::sync::mpsc;

/// A warning or error captured by the [`WarningBridge`] layer.
#[derive(Debug, Clone)]
pub struct CapturedWarning {
    /// The log level.
    pub level: tracing::Level,
    /// The formatted message.
    pub message: String,
    /// Module path that emitted the event.
    pub target: String,
}

/// A `tracing_subscriber::Layer` that forwards warnings and errors over an
/// `mpsc` channel so the run can be summarised at the end.
pub struct WarningBridge {
    sender: mpsc::Sender<CapturedWarning>,
}

impl WarningBridge {
    /// Create a new bridge and return `(layer, receiver)`.
    pub fn new() -> (Self, mpsc::Receiver<CapturedWarning>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl<S> tracing_subscriber::Layer<S> for WarningBridge
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let meta = event.metadata();
        // More verbose levels compare greater
        if *meta.level() > tracing::Level::WARN {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let _ = self.sender.send(CapturedWarning {
            level: *meta.level(),
            message: visitor.message,
            target: meta.target().to_string(),
        });
    }
}

/// Keeps only the formatted `message` of an event; structured fields are not
/// part of the summary.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}
