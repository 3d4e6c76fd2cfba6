//! Row-and-corridor placement: one corridor across the full width, the core
//! stacked above it at the centre, and a single row of rooms on each side.

use tracing::debug;

use super::placement::Placer;
use crate::model::{Rect, UnitKind, Wall};

pub(super) fn place_rows(placer: &mut Placer<'_>) {
    let envelope = placer.envelope();
    let corridor_width = placer.request().corridor_width;
    let room = placer.request().room;
    let eps = placer.epsilon();

    let corridor_y = (envelope.height - corridor_width) / 2.0;
    let corridor = Rect::new(0.0, corridor_y, envelope.width, corridor_width);
    if !placer.try_place(UnitKind::Corridor, corridor) {
        debug!(corridor_width, "corridor does not fit the envelope");
        return;
    }

    let lobby_width = placer.config().lobby_width;
    let lobby = Rect::new(
        (envelope.width - lobby_width) / 2.0,
        corridor.top(),
        lobby_width,
        corridor_width,
    );
    placer.place_core(lobby);

    let cols = ((envelope.width + eps) / room.width).floor().max(0.0) as usize;
    // cols saturates for tiny rooms; the step budget bounds the sweep.
    let total = (cols as f32 * 2.0).max(1.0);
    let mut tried = 0usize;

    // Lower row first, each swept left to right. Columns blocked by the core
    // fail the occupancy check and are skipped.
    for side in [Wall::Bottom, Wall::Top] {
        let mut placed = 0usize;
        for col in 0..cols {
            if placer.exhausted() {
                return;
            }
            let (rect, door) = placer.room_beside(&corridor, side, col as f32 * room.width);
            if placer.try_room(rect, door, &corridor) {
                placed += 1;
            }
            tried += 1;
            placer.report(tried as f32 / total);
        }
        debug!(%side, cols, placed, "room row tiled");
    }
}
