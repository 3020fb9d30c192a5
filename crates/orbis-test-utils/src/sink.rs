//! In-memory trajectory sink.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use orbis_core::{SimError, TrajectorySink, Vec3};

#[derive(Debug, Default)]
struct Recorded {
    samples: HashMap<String, Vec<Vec3>>,
    order: Vec<String>,
    flushes: usize,
}

/// Collects every flushed sample in memory.
///
/// Clones share storage, so a test can hand one clone to the engine and
/// inspect another.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Recorded>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every sample written for `name`, across all flushes.
    pub fn samples(&self, name: &str) -> Vec<Vec3> {
        self.lock().samples.get(name).cloned().unwrap_or_default()
    }

    /// Body names in the order they were first written.
    pub fn names(&self) -> Vec<String> {
        self.lock().order.clone()
    }

    /// Number of completed flushes.
    pub fn flushes(&self) -> usize {
        self.lock().flushes
    }
}

impl TrajectorySink for MemorySink {
    fn write_samples(&mut self, name: &str, samples: &[Vec3]) -> Result<(), SimError> {
        let mut rec = self.lock();
        if !rec.samples.contains_key(name) {
            rec.order.push(name.to_string());
        }
        rec.samples
            .entry(name.to_string())
            .or_default()
            .extend_from_slice(samples);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SimError> {
        self.lock().flushes += 1;
        Ok(())
    }
}
