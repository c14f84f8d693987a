use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CounterStatus {
    Success,
    Error,
}

/// One backend attempt, labeled for diagnosis.
#[derive(Clone, Debug)]
pub struct CounterEvent {
    pub backend: &'static str,
    pub status: CounterStatus,
    pub error: Option<&'static str>,
    pub status_code: Option<u16>,
}

/// Observer sink for backend attempt counters.
///
/// Backends never talk to a metrics system directly; they emit events into
/// whatever sink the `AppState` carries. The default is a no-op.
pub trait CounterSink: Send + Sync {
    fn record(&self, event: CounterEvent);
}

pub struct NoopCounter;

impl CounterSink for NoopCounter {
    fn record(&self, _event: CounterEvent) {}
}

/// In-memory sink retaining every event, plus per-backend totals.
/// Used by the CLI for its end-of-run report and by tests for assertions.
#[derive(Default)]
pub struct MemoryCounter {
    events: Mutex<Vec<CounterEvent>>,
}

impl MemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CounterEvent> {
        self.events.lock().unwrap().clone()
    }

    /// (successes, errors) per backend name.
    pub fn totals(&self) -> HashMap<&'static str, (usize, usize)> {
        let mut totals: HashMap<&'static str, (usize, usize)> = HashMap::new();
        for event in self.events.lock().unwrap().iter() {
            let entry = totals.entry(event.backend).or_default();
            match event.status {
                CounterStatus::Success => entry.0 += 1,
                CounterStatus::Error => entry.1 += 1,
            }
        }
        totals
    }
}

impl CounterSink for MemoryCounter {
    fn record(&self, event: CounterEvent) {
        self.events.lock().unwrap().push(event);
    }
}
