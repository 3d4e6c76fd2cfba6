#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod render;
pub mod texture;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, Strategy, TextureFit, WindowRule};
pub use layout::{
    Budget, FloorLayout, FloorRequest, GenerationStats, LayoutError, StopReason, generate,
    generate_with_progress,
};
pub use model::{
    Envelope, Footprint, Rect, RoomTemplate, Rotation, SpatialUnit, UnitId, UnitKind, Wall,
};
pub use render::{FloorTransform, render_svg, render_units};
pub use texture::{ImageFormat, Texture};
pub use theme::Theme;

/// Everything needed to turn a request into a diagram in one call.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self::default()
    }

    pub fn modern() -> Self {
        Self {
            theme: Theme::modern(),
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.layout.strategy = strategy;
        self
    }
}

/// Generates a floor and renders it to SVG.
pub fn render_floorplan(
    request: &FloorRequest,
    options: &RenderOptions,
    texture: Option<&Texture>,
) -> Result<String, LayoutError> {
    let layout = generate(request, &options.layout)?;
    Ok(render_svg(&layout, &options.theme, &options.render, texture))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_both_strategies() {
        let request = FloorRequest::new(Envelope::new(30.0, 20.0), Footprint::new(3.0, 5.0), 2.0);
        for strategy in [Strategy::RowAndCorridor, Strategy::FrontierGrowth] {
            let options = RenderOptions::modern().with_strategy(strategy);
            let svg = render_floorplan(&request, &options, None).unwrap();
            assert!(svg.starts_with("<svg"));
            assert!(svg.contains(&options.theme.room_fill));
        }
    }

    #[test]
    fn invalid_request_surfaces_error() {
        let request = FloorRequest::new(Envelope::new(-1.0, 20.0), Footprint::new(3.0, 5.0), 2.0);
        assert!(render_floorplan(&request, &RenderOptions::classic(), None).is_err());
    }
}
