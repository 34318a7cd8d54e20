//! Statistics stage
//!
//! Counts requests per command name and the bytes their text form occupies.
//! Session control and debug barriers are counted by name but add no bytes.
//! Never fails. Other code reads the numbers through [`Statistics::snapshot`].

use crate::rib::error::Result;
use crate::rib::pipeline::Stage;
use crate::rib::request::Request;
use serde::Serialize;
use std::any::Any;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Read-only copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub requests: BTreeMap<String, usize>,
    pub total_requests: usize,
    pub total_bytes: usize,
    #[serde(serialize_with = "serialize_duration_ms")]
    pub duration: Duration,
}

impl StatsSnapshot {
    pub fn count(&self, name: &str) -> usize {
        self.requests.get(name).copied().unwrap_or(0)
    }
}

fn serialize_duration_ms<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

#[derive(Debug, Default)]
pub struct Statistics {
    stats: StatsSnapshot,
    first_seen: Option<Instant>,
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.clone()
    }
}

impl Stage for Statistics {
    fn name(&self) -> &'static str {
        "statistics"
    }

    fn process(&mut self, request: Request) -> Result<Request> {
        let first_seen = *self.first_seen.get_or_insert_with(Instant::now);

        *self.stats.requests.entry(request.name.clone()).or_insert(0) += 1;
        self.stats.total_requests += 1;
        // Line plus its terminator, for requests the sink actually writes
        if !request.is_session_control() && !request.is_debug_barrier() {
            self.stats.total_bytes += request.serialise().len() + 1;
        }
        // Prefer the timer's clock when it runs ahead of us in the chain
        self.stats.duration = request.elapsed.unwrap_or_else(|| first_seen.elapsed());

        Ok(request)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
