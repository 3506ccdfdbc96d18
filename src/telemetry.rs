use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::TelemetryConfig;
use crate::error::{CoachError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub kind: String,
    pub timestamp: SystemTime,
    pub detail: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub context: String,
    pub error: String,
    pub timestamp: SystemTime,
}

/// In-process sink for tool dispatch events. Cheap to clone; clones share storage.
#[derive(Default, Clone, Debug)]
pub struct TelemetryCollector {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
    failures: Arc<Mutex<Vec<FailureRecord>>>,
}

impl TelemetryCollector {
    pub fn record(&self, kind: impl Into<String>, detail: serde_json::Value) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(TelemetryEvent {
                kind: kind.into(),
                timestamp: SystemTime::now(),
                detail,
            });
    }

    pub fn record_failure(&self, context: impl Into<String>, error: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FailureRecord {
                context: context.into(),
                error: error.into(),
                timestamp: SystemTime::now(),
            });
    }

    pub fn drain(&self) -> (Vec<TelemetryEvent>, Vec<FailureRecord>) {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        (std::mem::take(&mut *events), std::mem::take(&mut *failures))
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Logs go to stderr;
/// stdout carries tool output only. Calling this twice returns a configuration
/// error instead of panicking.
pub fn init_tracing(config: &TelemetryConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .map_err(|err| CoachError::Config(format!("invalid log filter: {err}")))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .try_init()
    };
    installed.map_err(|err| CoachError::Config(format!("tracing already initialised: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_events_and_failures() {
        let telemetry = TelemetryCollector::default();
        telemetry.record("tool_call", serde_json::json!({"tool": "get_weather"}));
        telemetry.clone().record_failure("tool::get_weather", "bad days");

        let (events, failures) = telemetry.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].detail["tool"], "get_weather");
        assert_eq!(failures[0].error, "bad days");

        let (events, failures) = telemetry.drain();
        assert!(events.is_empty() && failures.is_empty());
    }
}
