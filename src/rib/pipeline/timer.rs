//! Timer stage
//!
//! Records a start instant on the first request and stamps every request with
//! the time elapsed since then, so later stages (statistics) can pick it up
//! without reaching into this stage. Debug-barrier requests become named
//! checkpoints.

use crate::rib::error::Result;
use crate::rib::pipeline::Stage;
use crate::rib::request::Request;
use crate::rib::values::Value;
use std::any::Any;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A manual timing mark set by a debug-barrier request
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub label: String,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
pub struct Timer {
    started: Option<Instant>,
    checkpoints: Vec<Checkpoint>,
    total: Option<Duration>,
}

impl Timer {
    pub fn new() -> Self {
        Timer::default()
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Time since the first request; frozen once the pipeline closes
    pub fn elapsed(&self) -> Option<Duration> {
        self.total
            .or_else(|| self.started.map(|start| start.elapsed()))
    }
}

impl Stage for Timer {
    fn name(&self) -> &'static str {
        "timer"
    }

    fn process(&mut self, mut request: Request) -> Result<Request> {
        let start = *self.started.get_or_insert_with(Instant::now);
        let elapsed = start.elapsed();
        request.elapsed = Some(elapsed);

        if request.is_debug_barrier() {
            let label = request
                .required
                .first()
                .map(barrier_label)
                .unwrap_or_default();
            debug!(label = %label, elapsed_us = elapsed.as_micros() as u64, "Checkpoint");
            self.checkpoints.push(Checkpoint { label, elapsed });
        }
        Ok(request)
    }

    fn close(&mut self) -> Result<()> {
        if let Some(start) = self.started {
            let total = start.elapsed();
            self.total = Some(total);
            info!(
                total_ms = total.as_secs_f64() * 1000.0,
                checkpoints = self.checkpoints.len(),
                "Pipeline timing"
            );
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn barrier_label(value: &Value) -> String {
    match value {
        Value::Name(s) | Value::String(s) | Value::Token(s) => s.clone(),
        other => other.serialise(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rib::request::DEBUG_BARRIER;

    #[test]
    fn test_stamps_elapsed_on_every_request() {
        let mut timer = Timer::new();
        assert!(timer.elapsed().is_none());

        let first = timer.process(Request::new("WorldBegin")).unwrap();
        let second = timer.process(Request::new("WorldEnd")).unwrap();

        let first = first.elapsed.expect("first stamped");
        let second = second.elapsed.expect("second stamped");
        assert!(second >= first);
        assert!(timer.elapsed().is_some());
    }

    #[test]
    fn test_debug_barrier_records_checkpoint() {
        let mut timer = Timer::new();
        timer.process(Request::new("WorldBegin")).unwrap();
        let barrier = Request::new(DEBUG_BARRIER).arg(Value::name("after world"));
        let passed = timer.process(barrier).unwrap();

        // The barrier still flows on; the sink is the one that drops it
        assert!(passed.is_debug_barrier());
        assert_eq!(timer.checkpoints().len(), 1);
        assert_eq!(timer.checkpoints()[0].label, "after world");
    }

    #[test]
    fn test_close_freezes_total() {
        let mut timer = Timer::new();
        timer.process(Request::new("WorldBegin")).unwrap();
        timer.close().unwrap();
        let frozen = timer.elapsed().unwrap();
        assert_eq!(timer.elapsed().unwrap(), frozen);
    }

    #[test]
    fn test_close_without_requests() {
        let mut timer = Timer::new();
        timer.close().unwrap();
        assert!(timer.elapsed().is_none());
    }
}
