use floorplan_rs::{
    Budget, Envelope, FloorRequest, Footprint, RenderOptions, RoomTemplate, Strategy, Texture,
    Wall, WindowRule, render_floorplan,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FloorplanRenderRequest {
    width: f32,
    height: f32,
    room_width: f32,
    room_depth: f32,
    corridor_width: f32,
    strategy: Option<Strategy>,
    window_rule: Option<WindowRule>,
    door_wall: Option<Wall>,
    window_wall: Option<Wall>,
    max_steps: Option<usize>,
    max_rooms: Option<usize>,
    /// Data URI or http(s) URL of the room template image.
    texture: Option<String>,
    theme: Option<String>,
    font_family: Option<String>,
    scale: Option<f32>,
}

fn build_request(raw: &FloorplanRenderRequest) -> FloorRequest {
    let defaults = RoomTemplate::default();
    FloorRequest::new(
        Envelope::new(raw.width, raw.height),
        Footprint::new(raw.room_width, raw.room_depth),
        raw.corridor_width,
    )
    .with_template(RoomTemplate {
        door_wall: raw.door_wall.unwrap_or(defaults.door_wall),
        window_wall: raw.window_wall.unwrap_or(defaults.window_wall),
    })
    .with_budget(Budget {
        max_steps: raw.max_steps,
        max_rooms: raw.max_rooms,
        deadline: None,
    })
}

fn build_render_options(raw: &FloorplanRenderRequest) -> RenderOptions {
    let mut options = if raw.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::classic()
    };
    if let Some(strategy) = raw.strategy {
        options.layout.strategy = strategy;
    }
    if let Some(rule) = raw.window_rule {
        options.layout.window_rule = rule;
    }
    if let Some(font_family) = &raw.font_family {
        options.theme.font_family = font_family.clone();
    }
    if let Some(scale) = raw.scale {
        options.render.scale = scale;
    }
    options
}

fn render_request(request_json: &str) -> Result<String, String> {
    let raw: FloorplanRenderRequest =
        serde_json::from_str(request_json).map_err(|error| error.to_string())?;
    let request = build_request(&raw);
    let options = build_render_options(&raw);
    let texture = raw.texture.clone().map(Texture::from_data_uri);
    render_floorplan(&request, &options, texture.as_ref()).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn render_floorplan_svg(request_json: &str) -> Result<String, JsValue> {
    render_request(request_json).map_err(|error| JsValue::from_str(&error))
}

#[cfg(test)]
mod tests {
    use crate::render_request;

    #[test]
    fn renders_frontier_floor_with_texture() {
        let json = r#"{
            "width": 30,
            "height": 20,
            "roomWidth": 3,
            "roomDepth": 5,
            "corridorWidth": 2,
            "strategy": "frontierGrowth",
            "doorWall": "left",
            "windowWall": "right",
            "texture": "data:image/png;base64,iVBORw0KGgo=",
            "theme": "modern"
        }"#;
        let svg = render_request(json).expect("floor should render");
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Lobby-1"));
        assert!(svg.contains("<image"));
    }

    #[test]
    fn reports_invalid_floor() {
        let json = r#"{"width": 0, "height": 20, "roomWidth": 3, "roomDepth": 5, "corridorWidth": 2}"#;
        let err = render_request(json).unwrap_err();
        assert!(err.contains("envelope"));
    }
}
