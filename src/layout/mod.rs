mod error;
mod frontier;
pub mod occupancy;
mod placement;
mod row_corridor;
pub(crate) mod types;

pub use error::LayoutError;
pub use occupancy::OccupancyIndex;
pub use types::*;

use tracing::debug;

use crate::config::{LayoutConfig, Strategy};
use placement::{Limits, Placer};

/// Generates one floor. Equivalent to [`generate_with_progress`] without a
/// progress sink.
pub fn generate(request: &FloorRequest, config: &LayoutConfig) -> Result<FloorLayout, LayoutError> {
    generate_with_progress(request, config, &mut |_: f32| {})
}

/// Generates one floor with the strategy selected in `config`.
///
/// Only malformed input is an error. Candidates that do not fit are skipped,
/// and a run that hits its budget returns the units accepted so far.
/// `progress` receives non-decreasing fractions in `[0, 1]`, ending at 1.
pub fn generate_with_progress(
    request: &FloorRequest,
    config: &LayoutConfig,
    progress: &mut dyn FnMut(f32),
) -> Result<FloorLayout, LayoutError> {
    validate(request, config)?;
    let limits = resolve_limits(request, config);
    let mut placer = Placer::new(request, config, limits, progress);
    if corridor_spans_floor(request) {
        // No room can sit beside a corridor that fills the short axis.
        debug!(
            corridor_width = request.corridor_width,
            "corridor spans the floor, placing the core only"
        );
        let seed = placer.seed_lobby();
        placer.place_core(seed);
    } else {
        match config.strategy {
            Strategy::RowAndCorridor => row_corridor::place_rows(&mut placer),
            Strategy::FrontierGrowth => frontier::grow(&mut placer),
        }
    }
    Ok(placer.finish(config.strategy))
}

fn corridor_spans_floor(request: &FloorRequest) -> bool {
    let envelope = request.envelope;
    request.corridor_width >= envelope.width.min(envelope.height)
}

fn resolve_limits(request: &FloorRequest, config: &LayoutConfig) -> Limits {
    let max_steps = request.budget.max_steps.unwrap_or(config.max_steps);
    let requested_rooms = request.budget.max_rooms.unwrap_or(usize::MAX);
    let max_rooms = match config.strategy {
        Strategy::RowAndCorridor => requested_rooms,
        Strategy::FrontierGrowth => {
            let capacity = request.envelope.area() / request.room.area();
            let cap = (capacity * config.room_cap_ratio).floor().max(0.0) as usize;
            cap.min(requested_rooms)
        }
    };
    Limits {
        max_steps,
        max_rooms,
        deadline: request.budget.deadline,
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn validate(request: &FloorRequest, config: &LayoutConfig) -> Result<(), LayoutError> {
    let envelope = request.envelope;
    if !positive(envelope.width) || !positive(envelope.height) {
        return Err(LayoutError::InvalidEnvelope {
            width: envelope.width,
            height: envelope.height,
        });
    }
    let room = request.room;
    if !positive(room.width) || !positive(room.depth) {
        return Err(LayoutError::InvalidFootprint {
            width: room.width,
            depth: room.depth,
        });
    }
    if !positive(request.corridor_width) {
        return Err(LayoutError::InvalidCorridorWidth(request.corridor_width));
    }
    if request.template.door_wall == request.template.window_wall {
        return Err(LayoutError::InvalidConfig(format!(
            "room template has door and window on the same wall ({})",
            request.template.door_wall
        )));
    }

    let checks = [
        ("lobbyWidth", config.lobby_width),
        ("liftWidth", config.lift_width),
        ("liftDepth", config.lift_depth),
        ("indexCellSize", config.index_cell_size),
    ];
    for (name, value) in checks {
        if !positive(value) {
            return Err(LayoutError::InvalidConfig(format!(
                "{name} must be positive, got {value}"
            )));
        }
    }
    if let Some(depth) = config.stairwell_depth
        && !positive(depth)
    {
        return Err(LayoutError::InvalidConfig(format!(
            "stairwellDepth must be positive, got {depth}"
        )));
    }
    if !(config.room_cap_ratio > 0.0 && config.room_cap_ratio <= 1.0) {
        return Err(LayoutError::InvalidConfig(format!(
            "roomCapRatio must be in (0, 1], got {}",
            config.room_cap_ratio
        )));
    }
    if !(config.epsilon.is_finite() && config.epsilon >= 0.0) {
        return Err(LayoutError::InvalidConfig(format!(
            "epsilon must be non-negative, got {}",
            config.epsilon
        )));
    }
    Ok(())
}
