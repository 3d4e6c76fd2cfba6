use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Axis-aligned rectangle in floor space: meters, origin bottom-left, y-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Area of the intersection with `other`; zero when the rectangles only touch.
    pub fn intersection_area(&self, other: &Rect) -> f32 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.top().min(other.top()) - self.y.max(other.y);
        if w <= 0.0 || h <= 0.0 { 0.0 } else { w * h }
    }

    /// True when the rectangles share positive area beyond `eps` on both axes.
    /// Shared edges and corners are not overlaps.
    pub fn overlaps(&self, other: &Rect, eps: f32) -> bool {
        self.x < other.right() - eps
            && other.x < self.right() - eps
            && self.y < other.top() - eps
            && other.y < self.top() - eps
    }

    pub fn within(&self, envelope: &Envelope, eps: f32) -> bool {
        self.x >= -eps
            && self.y >= -eps
            && self.right() <= envelope.width + eps
            && self.top() <= envelope.height + eps
    }

    /// True when this rectangle's `wall` edge lies on the matching edge of
    /// `other` from the outside, with a positive-length overlap along it.
    pub fn shares_edge(&self, wall: Wall, other: &Rect, eps: f32) -> bool {
        match wall {
            Wall::Top => {
                (self.top() - other.y).abs() <= eps
                    && span_overlap(self.x, self.right(), other.x, other.right()) > eps
            }
            Wall::Bottom => {
                (self.y - other.top()).abs() <= eps
                    && span_overlap(self.x, self.right(), other.x, other.right()) > eps
            }
            Wall::Left => {
                (self.x - other.right()).abs() <= eps
                    && span_overlap(self.y, self.top(), other.y, other.top()) > eps
            }
            Wall::Right => {
                (self.right() - other.x).abs() <= eps
                    && span_overlap(self.y, self.top(), other.y, other.top()) > eps
            }
        }
    }

    /// True when the `wall` edge coincides with the envelope edge on the same side.
    pub fn wall_on_boundary(&self, wall: Wall, envelope: &Envelope, eps: f32) -> bool {
        match wall {
            Wall::Top => (self.top() - envelope.height).abs() <= eps,
            Wall::Bottom => self.y.abs() <= eps,
            Wall::Left => self.x.abs() <= eps,
            Wall::Right => (self.right() - envelope.width).abs() <= eps,
        }
    }
}

fn span_overlap(a0: f32, a1: f32, b0: f32, b1: f32) -> f32 {
    a1.min(b1) - a0.max(b0)
}

/// Outer boundary of the floor, `[0, width] x [0, height]` in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub width: f32,
    pub height: f32,
}

impl Envelope {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Repeatable room size. `width` is the frontage along the door wall,
/// `depth` runs from the door wall to the window wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: f32,
    pub depth: f32,
}

impl Footprint {
    pub fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }

    pub fn area(&self) -> f32 {
        self.width * self.depth
    }

    /// Floor-space extent of a room whose door sits on `door`.
    pub fn oriented(&self, door: Wall) -> (f32, f32) {
        if door.is_vertical() {
            (self.depth, self.width)
        } else {
            (self.width, self.depth)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Room,
    Corridor,
    Lobby,
    Lift,
    Stairwell,
}

impl UnitKind {
    pub const ALL: [UnitKind; 5] = [
        UnitKind::Room,
        UnitKind::Corridor,
        UnitKind::Lobby,
        UnitKind::Lift,
        UnitKind::Stairwell,
    ];

    pub fn label_prefix(self) -> &'static str {
        match self {
            UnitKind::Room => "Room",
            UnitKind::Corridor => "Corridor",
            UnitKind::Lobby => "Lobby",
            UnitKind::Lift => "Lift",
            UnitKind::Stairwell => "Stairwell",
        }
    }

    /// Circulation space a room door may open onto.
    pub fn is_circulation(self) -> bool {
        matches!(self, UnitKind::Corridor | UnitKind::Lobby)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label_prefix())
    }
}

/// One side of an axis-aligned rectangle. `Top` is the high-y side in floor
/// space, which is also the upper side of the rendered diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wall {
    Top,
    Right,
    Bottom,
    Left,
}

impl Wall {
    /// Clockwise order as seen on the rendered diagram.
    pub const ALL: [Wall; 4] = [Wall::Top, Wall::Right, Wall::Bottom, Wall::Left];

    pub fn opposite(self) -> Wall {
        match self {
            Wall::Top => Wall::Bottom,
            Wall::Bottom => Wall::Top,
            Wall::Left => Wall::Right,
            Wall::Right => Wall::Left,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Wall::Left | Wall::Right)
    }

    fn index(self) -> u8 {
        match self {
            Wall::Top => 0,
            Wall::Right => 1,
            Wall::Bottom => 2,
            Wall::Left => 3,
        }
    }

    fn from_index(index: u8) -> Wall {
        Wall::ALL[(index % 4) as usize]
    }

    /// The side this wall ends up on after a clockwise `rotation`.
    pub fn rotated(self, rotation: Rotation) -> Wall {
        Wall::from_index(self.index() + rotation.quarter_turns())
    }
}

impl fmt::Display for Wall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Wall::Top => "top",
            Wall::Right => "right",
            Wall::Bottom => "bottom",
            Wall::Left => "left",
        };
        f.write_str(name)
    }
}

impl FromStr for Wall {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" | "north" => Ok(Wall::Top),
            "bottom" | "south" => Ok(Wall::Bottom),
            "left" | "west" => Ok(Wall::Left),
            "right" | "east" => Ok(Wall::Right),
            other => Err(format!("unknown wall '{other}'")),
        }
    }
}

/// Clockwise quarter turn applied to a room template, in diagram space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn quarter_turns(self) -> u8 {
        (self.degrees() / 90) as u8
    }

    /// True for 90 and 270, where the template frame is transposed.
    pub fn swaps_axes(self) -> bool {
        self.quarter_turns() % 2 == 1
    }

    /// Rotation that carries the `from` side of a template onto `to`.
    pub fn between(from: Wall, to: Wall) -> Rotation {
        let turns = (to.index() + 4 - from.index()) % 4;
        match turns {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }
}

impl From<Rotation> for u16 {
    fn from(value: Rotation) -> Self {
        value.degrees()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Rotation::from_degrees(value).ok_or_else(|| format!("rotation must be a multiple of 90, got {value}"))
    }
}

/// Where the door and window sit on the room template image, before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTemplate {
    pub door_wall: Wall,
    pub window_wall: Wall,
}

impl Default for RoomTemplate {
    fn default() -> Self {
        Self {
            door_wall: Wall::Bottom,
            window_wall: Wall::Top,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Door and window placement of a room unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Openings {
    pub door_wall: Wall,
    pub window_wall: Wall,
}

/// One placed rectangle of a floor layout. Built once by the generator and
/// never changed afterwards; only read accessors are exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialUnit {
    id: UnitId,
    kind: UnitKind,
    rect: Rect,
    rotation: Rotation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    openings: Option<Openings>,
    label: String,
}

impl SpatialUnit {
    pub(crate) fn new(
        id: UnitId,
        kind: UnitKind,
        rect: Rect,
        rotation: Rotation,
        openings: Option<Openings>,
        label: String,
    ) -> Self {
        Self {
            id,
            kind,
            rect,
            rotation,
            openings: if kind == UnitKind::Room { openings } else { None },
            label,
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn origin(&self) -> (f32, f32) {
        (self.rect.x, self.rect.y)
    }

    pub fn size(&self) -> (f32, f32) {
        (self.rect.width, self.rect.height)
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn door_wall(&self) -> Option<Wall> {
        self.openings.map(|o| o.door_wall)
    }

    pub fn window_wall(&self) -> Option<Wall> {
        self.openings.map(|o| o.window_wall)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_room(&self) -> bool {
        self.kind == UnitKind::Room
    }
}
