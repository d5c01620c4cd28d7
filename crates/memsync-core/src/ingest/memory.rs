//! In-memory ingestor (testing only)
//!
//! Records every accepted batch and can be scripted to fail upcoming sends
//! or the health check.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{Episode, EpisodeBatch, Ingestor};
use crate::{Error, Result};

/// Ingestor that keeps accepted batches in memory
#[derive(Debug, Default)]
pub struct MemoryIngestor {
    accepted: Mutex<Vec<EpisodeBatch>>,
    /// One entry per upcoming send; `true` fails that send
    script: Mutex<VecDeque<bool>>,
    healthy: Mutex<bool>,
    attempts: Mutex<usize>,
}

impl MemoryIngestor {
    /// A healthy ingestor that accepts everything
    pub fn new() -> Self {
        Self {
            healthy: Mutex::new(true),
            ..Self::default()
        }
    }

    /// An ingestor whose health check fails
    pub fn unhealthy() -> Self {
        Self::default()
    }

    /// Fail the next `n` sends, then accept again.
    pub fn fail_next(&self, n: usize) {
        let mut script = self.script.lock().unwrap();
        script.extend(std::iter::repeat_n(true, n));
    }

    /// Fail the send after `ok` successful ones.
    pub fn fail_after(&self, ok: usize) {
        let mut script = self.script.lock().unwrap();
        script.extend(std::iter::repeat_n(false, ok));
        script.push_back(true);
    }

    /// Accepted batches, in order
    pub fn batches(&self) -> Vec<EpisodeBatch> {
        self.accepted.lock().unwrap().clone()
    }

    /// Accepted episodes, flattened
    pub fn episodes(&self) -> Vec<Episode> {
        self.batches()
            .into_iter()
            .flat_map(|b| b.messages)
            .collect()
    }

    /// Sends attempted, including failed ones
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl Ingestor for MemoryIngestor {
    fn health_check(&self) -> Result<()> {
        if *self.healthy.lock().unwrap() {
            Ok(())
        } else {
            Err(Error::EndpointUnavailable {
                url: "memory://".to_string(),
                reason: "marked unhealthy".to_string(),
            })
        }
    }

    fn send(&self, batch: &EpisodeBatch) -> Result<()> {
        *self.attempts.lock().unwrap() += 1;
        let fail = self.script.lock().unwrap().pop_front().unwrap_or(false);
        if fail {
            return Err(Error::ingest("scripted failure"));
        }
        self.accepted.lock().unwrap().push(batch.clone());
        Ok(())
    }
}
