//! Shared helpers for the battle state machine tests.

use crate::battle::controller::{NarrativeEvent, NarrativeSink, TurnController};
use crate::battle::resolver::{AlwaysHit, HitDecider};
use crate::combatant::Combatant;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A 30 HP combatant swinging a 1d8+3 basic die.
pub fn test_combatant(name: &str) -> Combatant {
    Combatant::new(name, 30, 12, 3, "1d8+3")
}

pub fn controller_with(
    sink: impl NarrativeSink + 'static,
    hit_decider: impl HitDecider + 'static,
) -> TurnController {
    TurnController::new(Box::new(sink), Box::new(hit_decider))
}

pub fn always_hit_controller(sink: impl NarrativeSink + 'static) -> TurnController {
    controller_with(sink, AlwaysHit)
}

/// Sink that records every flush it receives.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub flushes: Arc<Mutex<Vec<Vec<NarrativeEvent>>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.lock().unwrap().len()
    }

    pub fn flushed_events(&self) -> Vec<Vec<NarrativeEvent>> {
        self.flushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl NarrativeSink for RecordingSink {
    async fn flush_round(&self, events: Vec<NarrativeEvent>) -> Result<(), String> {
        self.flushes.lock().unwrap().push(events);
        Ok(())
    }
}

/// Sink whose flush never resolves. Models a hung narrative collaborator.
#[derive(Debug, Default, Clone, Copy)]
pub struct StallingSink;

#[async_trait]
impl NarrativeSink for StallingSink {
    async fn flush_round(&self, _events: Vec<NarrativeEvent>) -> Result<(), String> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Sink that always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingSink;

#[async_trait]
impl NarrativeSink for FailingSink {
    async fn flush_round(&self, _events: Vec<NarrativeEvent>) -> Result<(), String> {
        Err("narrative generator offline".to_string())
    }
}
