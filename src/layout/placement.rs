use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, info, trace};

use super::occupancy::OccupancyIndex;
use super::types::{FloorLayout, FloorRequest, GenerationStats, StopReason};
use crate::config::{LayoutConfig, Strategy, WindowRule};
use crate::model::{Envelope, Openings, Rect, Rotation, SpatialUnit, UnitId, UnitKind, Wall};

/// Resolved budget of one run.
#[derive(Debug, Clone, Copy)]
pub(super) struct Limits {
    pub max_steps: usize,
    pub max_rooms: usize,
    pub deadline: Option<Instant>,
}

/// Assigns ids and labels. The only place `SpatialUnit`s are built.
#[derive(Debug, Default)]
struct UnitFactory {
    next_id: u32,
    per_kind: BTreeMap<UnitKind, u32>,
}

impl UnitFactory {
    fn build(
        &mut self,
        kind: UnitKind,
        rect: Rect,
        rotation: Rotation,
        openings: Option<Openings>,
    ) -> SpatialUnit {
        self.next_id += 1;
        let ordinal = self.per_kind.entry(kind).or_insert(0);
        *ordinal += 1;
        let label = format!("{}-{}", kind.label_prefix(), ordinal);
        SpatialUnit::new(UnitId(self.next_id), kind, rect, rotation, openings, label)
    }
}

/// Progress sink that never reports a smaller fraction than before.
struct Progress<'a> {
    sink: &'a mut dyn FnMut(f32),
    last: f32,
}

impl Progress<'_> {
    fn report(&mut self, fraction: f32) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            return;
        };
        if fraction > self.last {
            self.last = fraction;
            (self.sink)(fraction);
        }
    }
}

/// Mutable state of one generation run: the occupancy index, the accepted
/// units and the budget counters. Shared by every strategy.
pub(super) struct Placer<'a> {
    request: &'a FloorRequest,
    config: &'a LayoutConfig,
    index: OccupancyIndex,
    factory: UnitFactory,
    units: Vec<SpatialUnit>,
    limits: Limits,
    steps: usize,
    rooms: usize,
    stop: Option<StopReason>,
    progress: Progress<'a>,
}

impl<'a> Placer<'a> {
    pub fn new(
        request: &'a FloorRequest,
        config: &'a LayoutConfig,
        limits: Limits,
        sink: &'a mut dyn FnMut(f32),
    ) -> Self {
        Self {
            request,
            config,
            index: OccupancyIndex::new(request.envelope, config.epsilon, config.index_cell_size),
            factory: UnitFactory::default(),
            units: Vec::new(),
            limits,
            steps: 0,
            rooms: 0,
            stop: None,
            progress: Progress { sink, last: 0.0 },
        }
    }

    pub fn request(&self) -> &FloorRequest {
        self.request
    }

    pub fn config(&self) -> &LayoutConfig {
        self.config
    }

    pub fn envelope(&self) -> Envelope {
        self.request.envelope
    }

    pub fn epsilon(&self) -> f32 {
        self.config.epsilon
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn rooms(&self) -> usize {
        self.rooms
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn report(&mut self, fraction: f32) {
        self.progress.report(fraction);
    }

    /// True once the step budget or the deadline is spent, or the room cap is
    /// reached. The first reason recorded sticks.
    pub fn exhausted(&mut self) -> bool {
        self.halted() || self.room_cap_reached()
    }

    /// Step budget or deadline. Ends every kind of placement.
    fn halted(&mut self) -> bool {
        let reason = if self.steps >= self.limits.max_steps {
            StopReason::StepBudget
        } else if self
            .limits
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            StopReason::Deadline
        } else {
            return false;
        };
        self.record_stop(reason);
        true
    }

    /// Room cap. Ends room placement only; corridors and the core still go in.
    fn room_cap_reached(&mut self) -> bool {
        if self.rooms < self.limits.max_rooms {
            return false;
        }
        self.record_stop(StopReason::RoomCap);
        true
    }

    fn record_stop(&mut self, reason: StopReason) {
        if self.stop.is_none() {
            debug!(?reason, steps = self.steps, rooms = self.rooms, "placement budget exhausted");
            self.stop = Some(reason);
        }
    }

    fn admit(&mut self) -> bool {
        if self.halted() {
            return false;
        }
        self.steps += 1;
        true
    }

    /// Places a non-room unit if it fits.
    pub fn try_place(&mut self, kind: UnitKind, rect: Rect) -> bool {
        if !self.admit() {
            return false;
        }
        if !self.index.can_place(&rect) {
            trace!(%kind, ?rect, "candidate rejected: occupied or outside envelope");
            return false;
        }
        self.accept(kind, rect, Rotation::Deg0, None);
        true
    }

    /// Room candidate on the `side` of `host`, with its door facing `host`.
    /// `along` is the candidate's x (top/bottom sides) or y (left/right sides).
    pub fn room_beside(&self, host: &Rect, side: Wall, along: f32) -> (Rect, Wall) {
        let door = side.opposite();
        let (w, h) = self.request.room.oriented(door);
        let rect = match side {
            Wall::Top => Rect::new(along, host.top(), w, h),
            Wall::Bottom => Rect::new(along, host.y - h, w, h),
            Wall::Right => Rect::new(host.right(), along, w, h),
            Wall::Left => Rect::new(host.x - w, along, w, h),
        };
        (rect, door)
    }

    /// Places a room whose `door` side opens onto `host` (a corridor or the
    /// lobby), subject to the window rule. Rejections are skipped silently.
    pub fn try_room(&mut self, rect: Rect, door: Wall, host: &Rect) -> bool {
        if self.room_cap_reached() || !self.admit() {
            return false;
        }
        let eps = self.config.epsilon;
        if !self.index.can_place(&rect) {
            trace!(?rect, "room rejected: occupied or outside envelope");
            return false;
        }
        if !rect.shares_edge(door, host, eps) {
            trace!(?rect, %door, "room rejected: door does not face circulation");
            return false;
        }

        let template = self.request.template;
        let rotation = Rotation::between(template.door_wall, door);
        let window = template.window_wall.rotated(rotation);
        let envelope = self.request.envelope;
        let window_ok = match self.config.window_rule {
            WindowRule::BackClearance => {
                let back = door.opposite();
                rect.wall_on_boundary(back, &envelope, eps)
                    || !self.index.wall_touches_kind(&rect, back, UnitKind::Room)
            }
            WindowRule::Exterior => rect.wall_on_boundary(window, &envelope, eps),
        };
        if !window_ok {
            trace!(?rect, %window, "room rejected: window rule");
            return false;
        }

        let openings = Openings {
            door_wall: door,
            window_wall: window,
        };
        self.accept(UnitKind::Room, rect, rotation, Some(openings));
        self.rooms += 1;
        true
    }

    fn accept(&mut self, kind: UnitKind, rect: Rect, rotation: Rotation, openings: Option<Openings>) {
        self.index.commit(rect, kind);
        let unit = self.factory.build(kind, rect, rotation, openings);
        trace!(id = %unit.id(), label = unit.label(), "unit accepted");
        self.units.push(unit);
    }

    /// Lobby footprint centred on the floor: `lobby_width` wide and one
    /// corridor width deep.
    pub fn seed_lobby(&self) -> Rect {
        let envelope = self.request.envelope;
        let corridor_width = self.request.corridor_width;
        let lobby_width = self.config.lobby_width;
        Rect::new(
            (envelope.width - lobby_width) / 2.0,
            (envelope.height - corridor_width) / 2.0,
            lobby_width,
            corridor_width,
        )
    }

    /// Lobby, two lifts flush above it either side of its centerline, and an
    /// optional stairwell above the lifts. Returns the lobby when it fits.
    pub fn place_core(&mut self, lobby: Rect) -> Option<Rect> {
        if !self.try_place(UnitKind::Lobby, lobby) {
            debug!(?lobby, "lobby does not fit");
            return None;
        }
        let (cx, _) = lobby.center();
        let lift_w = self.config.lift_width;
        let lift_d = self.config.lift_depth;
        let left = Rect::new(cx - lift_w, lobby.top(), lift_w, lift_d);
        let right = Rect::new(cx, lobby.top(), lift_w, lift_d);
        let mut lifts = 0;
        for lift in [left, right] {
            if self.try_place(UnitKind::Lift, lift) {
                lifts += 1;
            }
        }

        if let Some(depth) = self.config.stairwell_depth
            && lifts == 2
        {
            let stair = Rect::new(lobby.x, lobby.top() + lift_d, lobby.width, depth);
            self.try_place(UnitKind::Stairwell, stair);
        }
        debug!(lifts, units = self.units.len(), "core placed");
        Some(lobby)
    }

    pub fn finish(mut self, strategy: Strategy) -> FloorLayout {
        self.progress.report(1.0);
        let stats = GenerationStats {
            steps: self.steps,
            rooms: self.rooms,
            stop: self.stop.unwrap_or(StopReason::Completed),
        };
        info!(
            ?strategy,
            units = self.units.len(),
            rooms = stats.rooms,
            steps = stats.steps,
            stop = ?stats.stop,
            "floor layout generated"
        );
        FloorLayout {
            envelope: self.request.envelope,
            room: self.request.room,
            strategy,
            units: self.units,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Footprint, RoomTemplate};

    fn request() -> FloorRequest {
        FloorRequest::new(Envelope::new(30.0, 20.0), Footprint::new(3.0, 5.0), 2.0)
    }

    fn limits() -> Limits {
        Limits {
            max_steps: 100,
            max_rooms: 100,
            deadline: None,
        }
    }

    #[test]
    fn room_beside_orients_footprint() {
        let req = request();
        let config = LayoutConfig::default();
        let mut sink = |_: f32| {};
        let placer = Placer::new(&req, &config, limits(), &mut sink);
        let host = Rect::new(10.0, 9.0, 2.0, 2.0);

        let (rect, door) = placer.room_beside(&host, Wall::Top, host.x);
        assert_eq!(door, Wall::Bottom);
        assert_eq!(rect, Rect::new(10.0, 11.0, 3.0, 5.0));

        let (rect, door) = placer.room_beside(&host, Wall::Left, host.y);
        assert_eq!(door, Wall::Right);
        assert_eq!(rect, Rect::new(5.0, 9.0, 5.0, 3.0));
    }

    #[test]
    fn room_rotation_follows_template() {
        let req = request().with_template(RoomTemplate {
            door_wall: Wall::Bottom,
            window_wall: Wall::Top,
        });
        let config = LayoutConfig::default();
        let mut sink = |_: f32| {};
        let mut placer = Placer::new(&req, &config, limits(), &mut sink);
        let corridor = Rect::new(0.0, 9.0, 30.0, 2.0);
        assert!(placer.try_place(UnitKind::Corridor, corridor));

        let (rect, door) = placer.room_beside(&corridor, Wall::Bottom, 0.0);
        assert!(placer.try_room(rect, door, &corridor));
        let layout = placer.finish(Strategy::RowAndCorridor);
        let room = &layout.units[1];
        assert_eq!(room.door_wall(), Some(Wall::Top));
        assert_eq!(room.window_wall(), Some(Wall::Bottom));
        assert_eq!(room.rotation(), Rotation::Deg180);
        assert_eq!(room.label(), "Room-1");
    }

    #[test]
    fn back_to_back_rooms_are_rejected() {
        let req = request();
        let config = LayoutConfig::default();
        let mut sink = |_: f32| {};
        let mut placer = Placer::new(&req, &config, limits(), &mut sink);
        let lower = Rect::new(0.0, 2.0, 2.0, 2.0);
        assert!(placer.try_place(UnitKind::Corridor, lower));

        // room above the lower corridor: y 4..9
        let (first, door) = placer.room_beside(&lower, Wall::Top, 0.0);
        assert!(placer.try_room(first, door, &lower));

        // a room hanging below this corridor would rest its back on the first room
        let mid = Rect::new(1.0, 14.0, 2.0, 2.0);
        assert!(placer.try_place(UnitKind::Corridor, mid));
        let back_to_back = Rect::new(0.0, 9.0, 3.0, 5.0);
        assert!(!placer.try_room(back_to_back, Wall::Top, &mid));
    }

    #[test]
    fn exterior_rule_requires_boundary_window() {
        let req = request();
        let config = LayoutConfig {
            window_rule: WindowRule::Exterior,
            ..LayoutConfig::default()
        };
        let mut sink = |_: f32| {};
        let mut placer = Placer::new(&req, &config, limits(), &mut sink);
        let corridor = Rect::new(0.0, 5.0, 30.0, 2.0);
        assert!(placer.try_place(UnitKind::Corridor, corridor));
        let (below, door) = placer.room_beside(&corridor, Wall::Bottom, 0.0);
        assert!(placer.try_room(below, door, &corridor));
        let (above, door) = placer.room_beside(&corridor, Wall::Top, 0.0);
        assert!(!placer.try_room(above, door, &corridor));
    }

    #[test]
    fn step_budget_stops_admission() {
        let req = request();
        let config = LayoutConfig::default();
        let mut sink = |_: f32| {};
        let tight = Limits {
            max_steps: 1,
            ..limits()
        };
        let mut placer = Placer::new(&req, &config, tight, &mut sink);
        assert!(placer.try_place(UnitKind::Corridor, Rect::new(0.0, 0.0, 2.0, 2.0)));
        assert!(!placer.try_place(UnitKind::Corridor, Rect::new(5.0, 0.0, 2.0, 2.0)));
        let layout = placer.finish(Strategy::FrontierGrowth);
        assert_eq!(layout.stats.stop, StopReason::StepBudget);
        assert_eq!(layout.stats.steps, 1);
    }

    #[test]
    fn progress_is_monotonic() {
        let mut seen = Vec::new();
        {
            let mut sink = |f: f32| seen.push(f);
            let mut progress = Progress {
                sink: &mut sink,
                last: 0.0,
            };
            progress.report(0.5);
            progress.report(0.2);
            progress.report(f32::NAN);
            progress.report(2.0);
        }
        assert_eq!(seen, vec![0.5, 1.0]);
    }
}
