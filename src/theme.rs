use crate::model::UnitKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub stroke_color: String,
    pub stroke_width: f32,
    pub background: String,
    pub room_fill: String,
    pub corridor_fill: String,
    pub lobby_fill: String,
    pub lift_fill: String,
    pub stairwell_fill: String,
    pub door_color: String,
    pub window_color: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "arial, sans-serif".to_string(),
            font_size: 8.0,
            text_color: "black".to_string(),
            stroke_color: "black".to_string(),
            stroke_width: 1.0,
            background: "#FFFFFF".to_string(),
            room_fill: "lightblue".to_string(),
            corridor_fill: "#cccccc".to_string(),
            lobby_fill: "orange".to_string(),
            lift_fill: "red".to_string(),
            stairwell_fill: "red".to_string(),
            door_color: "#8B4513".to_string(),
            window_color: "#1E90FF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 9.0,
            text_color: "#1C2430".to_string(),
            stroke_color: "#7A8AA6".to_string(),
            stroke_width: 1.0,
            background: "#FFFFFF".to_string(),
            room_fill: "#E3EEFF".to_string(),
            corridor_fill: "#EEF2F8".to_string(),
            lobby_fill: "#FFE2B8".to_string(),
            lift_fill: "#F6B3B3".to_string(),
            stairwell_fill: "#E89A9A".to_string(),
            door_color: "#9A6B3F".to_string(),
            window_color: "#4A90E2".to_string(),
        }
    }

    pub fn fill_for(&self, kind: UnitKind) -> &str {
        match kind {
            UnitKind::Room => &self.room_fill,
            UnitKind::Corridor => &self.corridor_fill,
            UnitKind::Lobby => &self.lobby_fill,
            UnitKind::Lift => &self.lift_fill,
            UnitKind::Stairwell => &self.stairwell_fill,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
