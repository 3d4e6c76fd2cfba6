//! Frontier growth: corridor segments spread breadth-first from a lobby at the
//! centre of the floor, and rooms are hung off each segment as it is laid.

use std::collections::VecDeque;

use tracing::debug;

use super::placement::Placer;
use crate::model::{Rect, UnitKind, Wall};

#[derive(Debug, Clone, Copy)]
struct FrontierCell {
    rect: Rect,
    /// Direction this segment was grown in; `None` for the lobby.
    grown: Option<Wall>,
}

pub(super) fn grow(placer: &mut Placer<'_>) {
    let corridor_width = placer.request().corridor_width;
    let seed = placer.seed_lobby();
    let Some(lobby) = placer.place_core(seed) else {
        return;
    };

    let mut frontier = VecDeque::from([FrontierCell {
        rect: lobby,
        grown: None,
    }]);
    let mut segments = 0usize;

    while let Some(cell) = frontier.pop_front() {
        for dir in Wall::ALL {
            if placer.exhausted() {
                debug!(segments, pending = frontier.len(), "frontier growth stopped early");
                return;
            }
            if cell.grown == Some(dir.opposite()) {
                continue;
            }
            let segment = segment_beside(&cell.rect, dir, corridor_width);
            if placer.try_place(UnitKind::Corridor, segment) {
                segments += 1;
                frontier.push_back(FrontierCell {
                    rect: segment,
                    grown: Some(dir),
                });
                for side in lateral(dir) {
                    let (rect, door) = placer.room_beside(&segment, side, along(&segment, side));
                    placer.try_room(rect, door, &segment);
                }
            } else {
                // The corridor cannot continue this way: cap it with a room.
                let (rect, door) = placer.room_beside(&cell.rect, dir, along(&cell.rect, dir));
                placer.try_room(rect, door, &cell.rect);
            }
        }
        report(placer);
    }
    debug!(segments, rooms = placer.rooms(), "frontier exhausted");
}

fn report(placer: &mut Placer<'_>) {
    let limits = placer.limits();
    let by_steps = placer.steps() as f32 / limits.max_steps.max(1) as f32;
    let by_rooms = placer.rooms() as f32 / limits.max_rooms.max(1) as f32;
    placer.report(by_steps.max(by_rooms));
}

/// Square corridor segment adjacent to `rect` on `dir`, centred on that side.
fn segment_beside(rect: &Rect, dir: Wall, size: f32) -> Rect {
    let (cx, cy) = rect.center();
    match dir {
        Wall::Top => Rect::new(cx - size / 2.0, rect.top(), size, size),
        Wall::Bottom => Rect::new(cx - size / 2.0, rect.y - size, size, size),
        Wall::Right => Rect::new(rect.right(), cy - size / 2.0, size, size),
        Wall::Left => Rect::new(rect.x - size, cy - size / 2.0, size, size),
    }
}

fn lateral(dir: Wall) -> [Wall; 2] {
    if dir.is_vertical() {
        [Wall::Top, Wall::Bottom]
    } else {
        [Wall::Left, Wall::Right]
    }
}

fn along(host: &Rect, side: Wall) -> f32 {
    if side.is_vertical() { host.y } else { host.x }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutConfig, Strategy};
    use crate::layout::{Budget, FloorRequest, StopReason, generate};
    use crate::model::{Envelope, Footprint};

    fn frontier_config() -> LayoutConfig {
        LayoutConfig {
            strategy: Strategy::FrontierGrowth,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn segments_are_centred_on_the_side() {
        let lobby = Rect::new(13.0, 9.0, 4.0, 2.0);
        assert_eq!(segment_beside(&lobby, Wall::Bottom, 2.0), Rect::new(14.0, 7.0, 2.0, 2.0));
        assert_eq!(segment_beside(&lobby, Wall::Right, 2.0), Rect::new(17.0, 9.0, 2.0, 2.0));
        assert_eq!(segment_beside(&lobby, Wall::Left, 2.0), Rect::new(11.0, 9.0, 2.0, 2.0));
    }

    #[test]
    fn seeds_lobby_at_the_centre() {
        let request = FloorRequest::new(Envelope::new(30.0, 20.0), Footprint::new(3.0, 5.0), 2.0);
        let layout = generate(&request, &frontier_config()).unwrap();
        assert_eq!(layout.units[0].kind(), UnitKind::Lobby);
        assert_eq!(layout.units[0].rect(), Rect::new(13.0, 9.0, 4.0, 2.0));
        assert!(layout.rooms().count() > 0);
        assert!(layout.units_of(UnitKind::Corridor).count() > 0);
    }

    #[test]
    fn every_room_door_faces_circulation() {
        let request = FloorRequest::new(Envelope::new(40.0, 30.0), Footprint::new(3.0, 4.0), 1.5);
        let layout = generate(&request, &frontier_config()).unwrap();
        let circulation: Vec<Rect> = layout
            .units
            .iter()
            .filter(|u| u.kind().is_circulation())
            .map(|u| u.rect())
            .collect();
        for room in layout.rooms() {
            let door = room.door_wall().unwrap();
            assert!(
                circulation.iter().any(|c| room.rect().shares_edge(door, c, 0.01)),
                "{} door does not face a corridor",
                room.label()
            );
        }
    }

    #[test]
    fn corridor_wider_than_floor_stops_at_seed() {
        let request = FloorRequest::new(Envelope::new(10.0, 10.0), Footprint::new(3.0, 5.0), 8.0);
        let layout = generate(&request, &frontier_config()).unwrap();
        assert_eq!(layout.rooms().count(), 0);
        assert_eq!(layout.units_of(UnitKind::Corridor).count(), 0);
        assert_eq!(layout.units_of(UnitKind::Lobby).count(), 1);
        assert_eq!(layout.stats.stop, StopReason::Completed);

        let request = FloorRequest::new(Envelope::new(10.0, 10.0), Footprint::new(3.0, 5.0), 12.0);
        let layout = generate(&request, &frontier_config()).unwrap();
        assert!(layout.units.is_empty());
    }

    #[test]
    fn room_cap_bounds_growth() {
        let request = FloorRequest::new(Envelope::new(60.0, 40.0), Footprint::new(3.0, 5.0), 2.0)
            .with_budget(Budget {
                max_rooms: Some(3),
                ..Budget::default()
            });
        let layout = generate(&request, &frontier_config()).unwrap();
        assert_eq!(layout.rooms().count(), 3);
        assert_eq!(layout.stats.stop, StopReason::RoomCap);
    }

    #[test]
    fn seed_core_survives_a_zero_room_cap() {
        // 16 m2 / 15 m2 * 0.8 floors to a cap of zero rooms
        let request = FloorRequest::new(Envelope::new(4.0, 4.0), Footprint::new(3.0, 5.0), 1.0);
        let layout = generate(&request, &frontier_config()).unwrap();
        assert_eq!(layout.units_of(UnitKind::Lobby).count(), 1);
        assert_eq!(layout.units[0].rect(), Rect::new(0.0, 1.5, 4.0, 1.0));
        assert_eq!(layout.rooms().count(), 0);
        assert_eq!(layout.units_of(UnitKind::Corridor).count(), 0);
        assert_eq!(layout.stats.stop, StopReason::RoomCap);
    }

    #[test]
    fn step_budget_bounds_growth() {
        let request = FloorRequest::new(Envelope::new(60.0, 40.0), Footprint::new(3.0, 5.0), 2.0)
            .with_budget(Budget::steps(12));
        let layout = generate(&request, &frontier_config()).unwrap();
        assert_eq!(layout.stats.steps, 12);
        assert_eq!(layout.stats.stop, StopReason::StepBudget);
        assert!(layout.units.len() <= 12);
    }
}
