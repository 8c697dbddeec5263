//! Structured logging for the Lambda function.
//!
//! Every line is a single JSON object with the event fields flattened to
//! the top level. Work done for one invocation runs inside an
//! [`invocation_span`], so its `request_id` is attached to each line under
//! `span`.

use tracing::{info_span, Span, Subscriber};
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Span name wrapping one invocation.
pub const INVOCATION_SPAN: &str = "invocation";

/// Level used when `RUST_LOG` is unset or invalid.
const DEFAULT_LEVEL: &str = "info";

/// Install the JSON subscriber on stdout.
///
/// Call once at the start of the Lambda `main` function, before
/// `lambda_runtime::run()`.
///
/// # Example
///
/// ```no_run
/// use catalyst_gateway::init_tracing;
///
/// #[tokio::main]
/// async fn main() -> Result<(), lambda_runtime::Error> {
///     init_tracing();
///     // ... rest of Lambda setup
///     Ok(())
/// }
/// ```
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));
    json_subscriber(filter, std::io::stdout).init();
}

/// Span carrying the platform request id for one invocation.
pub fn invocation_span(request_id: &str) -> Span {
    info_span!("invocation", request_id = %request_id)
}

fn json_subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    // CloudWatch stamps ingestion time itself.
    let fmt_layer = fmt::layer()
        .json()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_current_span(true)
        .with_span_list(false)
        .without_time()
        .flatten_event(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Ok(mut inner) = self.0.lock() {
                inner.extend_from_slice(buf);
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn lines(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    fn capture<F: FnOnce()>(f: F) -> Vec<Value> {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = json_subscriber(EnvFilter::new("debug"), move || writer.clone());
        tracing::subscriber::with_default(subscriber, f);
        captured.lines()
    }

    #[test]
    fn test_lines_carry_request_id_from_invocation_span() {
        let lines = capture(|| {
            invocation_span("req-42").in_scope(|| tracing::info!(status = 200, "request handled"));
        });

        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["message"], "request handled");
        assert_eq!(line["status"], 200);
        assert_eq!(line["level"], "INFO");
        assert_eq!(line["span"]["name"], INVOCATION_SPAN);
        assert_eq!(line["span"]["request_id"], "req-42");
        assert!(line.get("timestamp").is_none());
    }

    #[test]
    fn test_lines_outside_invocation_have_no_span() {
        let lines = capture(|| tracing::warn!("cold start"));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].get("span").is_none());
    }
}
