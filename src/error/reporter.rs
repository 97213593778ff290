//! Exception-capture sink for failures that must not kill the service.

/// Structured log + exception-capture sink.
///
/// The listener and sequencer report cycle failures here in addition to
/// logging them; the host wires this to its error-tracking backend.
pub trait ErrorReporter: Send + Sync {
    fn capture(&self, context: &str, error: &(dyn std::error::Error + 'static));
}

/// Default reporter: emits the failure on the `tracing` error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn capture(&self, context: &str, error: &(dyn std::error::Error + 'static)) {
        tracing::error!(context, error = %error, "captured failure");
    }
}
