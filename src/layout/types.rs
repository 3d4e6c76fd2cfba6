use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;

use crate::config::Strategy;
use crate::model::{Envelope, Footprint, RoomTemplate, SpatialUnit, UnitKind};

/// Caller limits on one generation run. Unset fields fall back to the
/// layout config, so a finite step cap always applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct Budget {
    pub max_steps: Option<usize>,
    pub max_rooms: Option<usize>,
    /// Best-effort cancellation: checked once per iteration.
    pub deadline: Option<Instant>,
}

impl Budget {
    pub fn steps(max_steps: usize) -> Self {
        Self {
            max_steps: Some(max_steps),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct FloorRequest {
    pub envelope: Envelope,
    pub room: Footprint,
    pub corridor_width: f32,
    pub template: RoomTemplate,
    pub budget: Budget,
}

impl FloorRequest {
    pub fn new(envelope: Envelope, room: Footprint, corridor_width: f32) -> Self {
        Self {
            envelope,
            room,
            corridor_width,
            template: RoomTemplate::default(),
            budget: Budget::default(),
        }
    }

    pub fn with_template(mut self, template: RoomTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// Every candidate was tried.
    Completed,
    StepBudget,
    RoomCap,
    Deadline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStats {
    pub steps: usize,
    pub rooms: usize,
    pub stop: StopReason,
}

/// Accepted units of one floor, in insertion order.
#[derive(Debug, Clone)]
pub struct FloorLayout {
    pub envelope: Envelope,
    pub room: Footprint,
    pub strategy: Strategy,
    pub units: Vec<SpatialUnit>,
    pub stats: GenerationStats,
}

impl FloorLayout {
    pub fn rooms(&self) -> impl Iterator<Item = &SpatialUnit> {
        self.units.iter().filter(|unit| unit.is_room())
    }

    pub fn units_of(&self, kind: UnitKind) -> impl Iterator<Item = &SpatialUnit> {
        self.units.iter().filter(move |unit| unit.kind() == kind)
    }

    pub fn counts(&self) -> BTreeMap<UnitKind, usize> {
        let mut counts = BTreeMap::new();
        for unit in &self.units {
            *counts.entry(unit.kind()).or_insert(0) += 1;
        }
        counts
    }
}
