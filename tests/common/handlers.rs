use action_router::plugin::{handler_fn, ActionHandler};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counts handler invocations.
#[derive(Debug, Default)]
pub struct CallCounter {
    count: AtomicUsize,
}

impl CallCounter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    fn increment(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Ordered record of handler start/finish events across concurrent branches.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<String>>,
}

impl EventRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn position(&self, event: &str) -> usize {
        self.events()
            .iter()
            .position(|recorded| recorded == event)
            .unwrap_or_else(|| panic!("event {event} was never recorded"))
    }
}

/// Always returns `value`.
pub fn static_handler(value: Value) -> Arc<dyn ActionHandler> {
    handler_fn(move |_input| {
        let value = value.clone();
        async move { Ok(Some(value)) }
    })
}

/// Returns `value` and counts calls.
pub fn counting_handler(counter: Arc<CallCounter>, value: Value) -> Arc<dyn ActionHandler> {
    handler_fn(move |_input| {
        let counter = counter.clone();
        let value = value.clone();
        async move {
            counter.increment();
            Ok(Some(value))
        }
    })
}

/// Produces no value at all.
pub fn empty_handler() -> Arc<dyn ActionHandler> {
    handler_fn(|_input| async { Ok(None) })
}

/// Fails with `message`.
pub fn failing_handler(message: &'static str) -> Arc<dyn ActionHandler> {
    handler_fn(move |_input| async move { Err(anyhow::anyhow!(message)) })
}

/// Records `start:<label>`, waits `delay`, records `end:<label>` and returns `value`.
///
/// When the input targets a service the label gets the service name appended
/// (`<label>:<service>`).
pub fn recording_handler(
    recorder: Arc<EventRecorder>,
    label: &'static str,
    delay: Duration,
    value: Value,
) -> Arc<dyn ActionHandler> {
    handler_fn(move |input| {
        let recorder = recorder.clone();
        let value = value.clone();
        async move {
            let label = match input.service() {
                Some(service) => format!("{label}:{}", service.name),
                None => format!("{label}:{}", input.ctx.provider.name),
            };
            recorder.record(format!("start:{label}"));
            tokio::time::sleep(delay).await;
            recorder.record(format!("end:{label}"));
            Ok(Some(value))
        }
    })
}
