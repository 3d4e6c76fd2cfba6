use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placement strategy used by the layout generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
    /// Central corridor with one row of rooms on each side.
    #[default]
    RowAndCorridor,
    /// Breadth-first corridor growth outward from the lobby.
    FrontierGrowth,
}

impl Strategy {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "row" | "rows" | "rowandcorridor" | "row-and-corridor" => Some(Self::RowAndCorridor),
            "frontier" | "growth" | "frontiergrowth" | "frontier-growth" => {
                Some(Self::FrontierGrowth)
            }
            _ => None,
        }
    }
}

/// Constraint applied to the window side of every room candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowRule {
    /// The window side must not rest against another room unless it lies on
    /// the envelope edge.
    #[default]
    BackClearance,
    /// The window side must lie on the envelope edge.
    Exterior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextureFit {
    /// Stretch the template to exactly fill the room.
    #[default]
    Stretch,
    /// Scale to cover the room, cropping the overflow.
    Slice,
}

impl TextureFit {
    pub fn preserve_aspect_ratio(self) -> &'static str {
        match self {
            TextureFit::Stretch => "none",
            TextureFit::Slice => "xMidYMid slice",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub strategy: Strategy,
    pub lobby_width: f32,
    pub lift_width: f32,
    pub lift_depth: f32,
    pub stairwell_depth: Option<f32>,
    /// Upper bound on rooms as a share of `envelope area / room area`.
    pub room_cap_ratio: f32,
    pub max_steps: usize,
    pub window_rule: WindowRule,
    pub epsilon: f32,
    /// Bucket size of the occupancy index, meters.
    pub index_cell_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::RowAndCorridor,
            lobby_width: 4.0,
            lift_width: 2.0,
            lift_depth: 2.0,
            stairwell_depth: Some(3.0),
            room_cap_ratio: 0.8,
            max_steps: 20_000,
            window_rule: WindowRule::BackClearance,
            epsilon: 0.01,
            index_cell_size: 4.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Pixels per meter.
    pub scale: f32,
    pub texture_fit: TextureFit,
    pub show_walls: bool,
    pub show_labels: bool,
    pub min_font_size: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 20.0,
            texture_fit: TextureFit::Stretch,
            show_walls: true,
            show_labels: true,
            min_font_size: 4.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    text_color: Option<String>,
    stroke_color: Option<String>,
    stroke_width: Option<NumberOrString>,
    background: Option<String>,
    room_fill: Option<String>,
    corridor_fill: Option<String>,
    lobby_fill: Option<String>,
    lift_fill: Option<String>,
    stairwell_fill: Option<String>,
    door_color: Option<String>,
    window_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").parse::<f32>().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    strategy: Option<String>,
    lobby_width: Option<f32>,
    lift_width: Option<f32>,
    lift_depth: Option<f32>,
    // `null` removes the stairwell, absence keeps the default.
    #[serde(default, deserialize_with = "deserialize_explicit_null")]
    stairwell_depth: Option<Option<f32>>,
    room_cap_ratio: Option<f32>,
    max_steps: Option<usize>,
    window_rule: Option<WindowRule>,
    epsilon: Option<f32>,
    index_cell_size: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    scale: Option<f32>,
    texture_fit: Option<TextureFit>,
    show_walls: Option<bool>,
    show_labels: Option<bool>,
    min_font_size: Option<f32>,
}

fn deserialize_explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<f32>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<f32>::deserialize(deserializer).map(Some)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON (or JSON5) config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" | "base" => config.theme = Theme::classic(),
            other => return Err(anyhow::anyhow!("unknown theme '{other}'")),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        apply_theme_variables(&mut config.theme, vars);
    }

    if let Some(layout) = parsed.layout {
        apply_layout(&mut config.layout, layout)?;
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.scale {
            config.render.scale = v;
        }
        if let Some(v) = render.texture_fit {
            config.render.texture_fit = v;
        }
        if let Some(v) = render.show_walls {
            config.render.show_walls = v;
        }
        if let Some(v) = render.show_labels {
            config.render.show_labels = v;
        }
        if let Some(v) = render.min_font_size {
            config.render.min_font_size = v;
        }
    }

    Ok(config)
}

fn apply_theme_variables(theme: &mut Theme, vars: ThemeVariables) {
    if let Some(v) = vars.font_family {
        theme.font_family = v;
    }
    if let Some(v) = vars.font_size.as_ref().and_then(NumberOrString::as_f32) {
        theme.font_size = v;
    }
    if let Some(v) = vars.text_color {
        theme.text_color = v;
    }
    if let Some(v) = vars.stroke_color {
        theme.stroke_color = v;
    }
    if let Some(v) = vars.stroke_width.as_ref().and_then(NumberOrString::as_f32) {
        theme.stroke_width = v;
    }
    if let Some(v) = vars.background {
        theme.background = v;
    }
    if let Some(v) = vars.room_fill {
        theme.room_fill = v;
    }
    if let Some(v) = vars.corridor_fill {
        theme.corridor_fill = v;
    }
    if let Some(v) = vars.lobby_fill {
        theme.lobby_fill = v;
    }
    if let Some(v) = vars.lift_fill {
        theme.lift_fill = v;
    }
    if let Some(v) = vars.stairwell_fill {
        theme.stairwell_fill = v;
    }
    if let Some(v) = vars.door_color {
        theme.door_color = v;
    }
    if let Some(v) = vars.window_color {
        theme.window_color = v;
    }
}

fn apply_layout(config: &mut LayoutConfig, file: LayoutConfigFile) -> anyhow::Result<()> {
    if let Some(token) = file.strategy.as_deref() {
        config.strategy = Strategy::from_token(token)
            .ok_or_else(|| anyhow::anyhow!("unknown layout strategy '{token}'"))?;
    }
    if let Some(v) = file.lobby_width {
        config.lobby_width = v;
    }
    if let Some(v) = file.lift_width {
        config.lift_width = v;
    }
    if let Some(v) = file.lift_depth {
        config.lift_depth = v;
    }
    if let Some(v) = file.stairwell_depth {
        config.stairwell_depth = v;
    }
    if let Some(v) = file.room_cap_ratio {
        config.room_cap_ratio = v;
    }
    if let Some(v) = file.max_steps {
        config.max_steps = v;
    }
    if let Some(v) = file.window_rule {
        config.window_rule = v;
    }
    if let Some(v) = file.epsilon {
        config.epsilon = v;
    }
    if let Some(v) = file.index_cell_size {
        config.index_cell_size = v;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_keeps_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.layout.strategy, Strategy::RowAndCorridor);
        assert_eq!(config.render.scale, 20.0);
        assert_eq!(config.layout.stairwell_depth, Some(3.0));
    }

    #[test]
    fn parses_layout_and_theme_overrides() {
        let doc = r##"{
            // json5 allows comments
            theme: "modern",
            themeVariables: { roomFill: "#abcdef", fontSize: "10px" },
            layout: { strategy: "frontier", windowRule: "exterior", maxSteps: 500, stairwellDepth: null },
            render: { scale: 10, textureFit: "slice", showWalls: false },
        }"##;
        let config = parse_config(doc).unwrap();
        assert_eq!(config.theme.room_fill, "#abcdef");
        assert_eq!(config.theme.font_size, 10.0);
        assert_eq!(config.layout.strategy, Strategy::FrontierGrowth);
        assert_eq!(config.layout.window_rule, WindowRule::Exterior);
        assert_eq!(config.layout.max_steps, 500);
        assert_eq!(config.layout.stairwell_depth, None);
        assert_eq!(config.render.scale, 10.0);
        assert_eq!(config.render.texture_fit, TextureFit::Slice);
        assert!(!config.render.show_walls);
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!(parse_config(r#"{"layout": {"strategy": "spiral"}}"#).is_err());
    }

    #[test]
    fn strategy_tokens() {
        assert_eq!(Strategy::from_token("Row"), Some(Strategy::RowAndCorridor));
        assert_eq!(Strategy::from_token("frontier-growth"), Some(Strategy::FrontierGrowth));
        assert_eq!(Strategy::from_token("nope"), None);
    }
}
