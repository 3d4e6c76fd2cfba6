use crate::config::RenderConfig;
use crate::layout::FloorLayout;
use crate::model::{Envelope, Rect, SpatialUnit, Wall};
use crate::texture::Texture;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;
use tracing::warn;

// Average glyph advance as a share of the font size.
const CHAR_WIDTH_RATIO: f32 = 0.56;
const LABEL_FILL_RATIO: f32 = 0.9;
const DOOR_WIDTH_M: f32 = 0.9;
const MARKER_STROKE: f32 = 3.0;

/// Rectangle in diagram space: pixels, origin top-left, y-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Endpoints of the `wall` edge in diagram space.
    fn edge(&self, wall: Wall) -> ((f32, f32), (f32, f32)) {
        let (x0, y0) = (self.x, self.y);
        let (x1, y1) = (self.x + self.width, self.y + self.height);
        match wall {
            Wall::Top => ((x0, y0), (x1, y0)),
            Wall::Bottom => ((x0, y1), (x1, y1)),
            Wall::Left => ((x0, y0), (x0, y1)),
            Wall::Right => ((x1, y0), (x1, y1)),
        }
    }
}

/// Floor space (meters, y-up) to diagram space (pixels, y-down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorTransform {
    scale: f32,
    total_height: f32,
}

impl FloorTransform {
    pub fn new(envelope: Envelope, scale: f32) -> Self {
        Self {
            scale,
            total_height: envelope.height,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn to_pixels(&self, rect: &Rect) -> PixelRect {
        PixelRect {
            x: rect.x * self.scale,
            y: (self.total_height - rect.top()) * self.scale,
            width: rect.width * self.scale,
            height: rect.height * self.scale,
        }
    }

    pub fn to_floor(&self, px: &PixelRect) -> Rect {
        let width = px.width / self.scale;
        let height = px.height / self.scale;
        Rect::new(px.x / self.scale, self.total_height - px.y / self.scale - height, width, height)
    }
}

pub fn render_svg(
    layout: &FloorLayout,
    theme: &Theme,
    config: &RenderConfig,
    texture: Option<&Texture>,
) -> String {
    render_units(&layout.units, layout.envelope, theme, config, texture)
}

/// Draws `units` inside `envelope`. Never fails: an unusable texture falls
/// back to the flat fill of each room.
pub fn render_units(
    units: &[SpatialUnit],
    envelope: Envelope,
    theme: &Theme,
    config: &RenderConfig,
    texture: Option<&Texture>,
) -> String {
    let scale = if config.scale.is_finite() && config.scale > 0.0 {
        config.scale
    } else {
        warn!(scale = config.scale, "invalid render scale, using default");
        RenderConfig::default().scale
    };
    let transform = FloorTransform::new(envelope, scale);
    let width = (envelope.width.max(0.0)) * scale;
    let height = (envelope.height.max(0.0)) * scale;

    let texture = texture.filter(|texture| {
        let usable = texture.is_usable();
        if !usable {
            warn!("room texture is not a usable image reference, drawing flat fill");
        }
        usable
    });

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    for unit in units {
        let px = transform.to_pixels(&unit.rect());
        let textured = unit.is_room() && texture.is_some();

        if let Some(texture) = texture.filter(|_| unit.is_room()) {
            svg.push_str(&texture_svg(unit, &px, texture, config));
        }

        let fill = if textured { "none" } else { theme.fill_for(unit.kind()) };
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            px.x, px.y, px.width, px.height, fill, theme.stroke_color, theme.stroke_width
        ));

        if config.show_walls && unit.is_room() {
            svg.push_str(&openings_svg(unit, &px, theme, scale));
        }

        if config.show_labels {
            svg.push_str(&label_svg(unit.label(), &px, theme, config));
        }
    }

    svg.push_str("</svg>");
    svg
}

/// The template is laid out in an unrotated frame (width and height swapped
/// for quarter turns) and rotated about the room centre, so its door side
/// lands on the room's door wall.
fn texture_svg(unit: &SpatialUnit, px: &PixelRect, texture: &Texture, config: &RenderConfig) -> String {
    let rotation = unit.rotation();
    let (cx, cy) = px.center();
    let (frame_w, frame_h) = if rotation.swaps_axes() {
        (px.height, px.width)
    } else {
        (px.width, px.height)
    };
    let image = format!(
        "<image x=\"{:.2}\" y=\"{:.2}\" width=\"{frame_w:.2}\" height=\"{frame_h:.2}\" preserveAspectRatio=\"{}\" xlink:href=\"{}\"/>",
        cx - frame_w / 2.0,
        cy - frame_h / 2.0,
        config.texture_fit.preserve_aspect_ratio(),
        escape_xml(texture.href())
    );
    if rotation.degrees() == 0 {
        image
    } else {
        format!(
            "<g transform=\"rotate({} {cx:.2} {cy:.2})\">{image}</g>",
            rotation.degrees()
        )
    }
}

fn openings_svg(unit: &SpatialUnit, px: &PixelRect, theme: &Theme, scale: f32) -> String {
    let mut out = String::new();
    if let Some(wall) = unit.window_wall() {
        let ((x0, y0), (x1, y1)) = px.edge(wall);
        let inset = 0.15;
        out.push_str(&line_svg(
            x0 + (x1 - x0) * inset,
            y0 + (y1 - y0) * inset,
            x1 - (x1 - x0) * inset,
            y1 - (y1 - y0) * inset,
            &theme.window_color,
        ));
    }
    if let Some(wall) = unit.door_wall() {
        let ((x0, y0), (x1, y1)) = px.edge(wall);
        let length = ((x1 - x0).abs() + (y1 - y0).abs()).max(f32::EPSILON);
        let door = (DOOR_WIDTH_M * scale).min(length * 0.6);
        let t = (1.0 - door / length) / 2.0;
        out.push_str(&line_svg(
            x0 + (x1 - x0) * t,
            y0 + (y1 - y0) * t,
            x1 - (x1 - x0) * t,
            y1 - (y1 - y0) * t,
            &theme.door_color,
        ));
    }
    out
}

fn line_svg(x1: f32, y1: f32, x2: f32, y2: f32, color: &str) -> String {
    format!(
        "<line x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\" stroke=\"{color}\" stroke-width=\"{MARKER_STROKE}\" stroke-linecap=\"butt\"/>"
    )
}

fn label_svg(label: &str, px: &PixelRect, theme: &Theme, config: &RenderConfig) -> String {
    let (x, y) = px.center();
    let font_size = fit_font_size(label, px.width, theme.font_size, config.min_font_size);
    format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{font_size:.2}\" fill=\"{}\">{}</text>",
        escape_xml(&theme.font_family),
        theme.text_color,
        escape_xml(label)
    )
}

fn fit_font_size(label: &str, available: f32, preferred: f32, min: f32) -> f32 {
    let chars = label.chars().count().max(1) as f32;
    let fitted = available * LABEL_FILL_RATIO / (chars * CHAR_WIDTH_RATIO);
    preferred.min(fitted).max(min)
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn rasterize_png(svg: &str, theme: &Theme) -> Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    if let Some(family) = theme
        .font_family
        .split(',')
        .map(|part| part.trim().trim_matches('"').trim_matches('\''))
        .find(|part| !part.is_empty())
    {
        opt.font_family = family.to_string();
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    Ok(pixmap.encode_png()?)
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, theme: &Theme) -> Result<()> {
    let bytes = rasterize_png(svg, theme)?;
    std::fs::write(output, bytes)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
