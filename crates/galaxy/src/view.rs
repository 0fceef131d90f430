//! Terminal rendering of the scene's draw list.
//!
//! Every drawable is projected through the scene camera into character
//! cells. A per-cell depth buffer keeps near things in front; glow shells
//! blend into the background colour instead of writing depth.

use galaxy_core::{CursorKind, Rgb};
use galaxy_scene::{Camera, Drawable, Lighting, PointLayer, Scene, SphereKind};
use glam::{Mat4, Quat, Vec2, Vec3};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

/// Terminal cells are roughly twice as tall as they are wide.
pub const CELL_ASPECT: f32 = 2.0;

/// Deep space behind everything.
pub const SPACE: Rgb = Rgb(0x06, 0x01, 0x12);

/// Characters used for stars, dimmest first.
const STAR_CHARS: &[char] = &['.', '·', '+', '*', '✧', '✦'];

const POINTER_GLYPH: char = '◎';
const TRAIL_SEGMENTS: usize = 12;

/// Viewport aspect ratio in pixels for an area of cells.
pub fn aspect(area: Rect) -> f32 {
    area.width.max(1) as f32 / (area.height.max(1) as f32 * CELL_ASPECT)
}

/// Normalized device coordinates of the centre of a cell, if it lies in `area`.
pub fn cell_to_ndc(area: Rect, column: u16, row: u16) -> Option<Vec2> {
    if !area.contains((column, row).into()) {
        return None;
    }
    let x = (column - area.x) as f32 + 0.5;
    let y = (row - area.y) as f32 + 0.5;
    Some(Vec2::new(
        x / area.width as f32 * 2.0 - 1.0,
        1.0 - y / area.height as f32 * 2.0,
    ))
}

/// Maps world positions to fractional cell coordinates.
#[derive(Debug, Clone)]
pub struct Projector {
    camera: Camera,
    view_projection: Mat4,
    width: f32,
    height: f32,
    tan_half_fov: f32,
    right: Vec3,
    up: Vec3,
    back: Vec3,
}

impl Projector {
    pub fn new(camera: &Camera, area: Rect) -> Self {
        let back = camera.position.normalize_or(Vec3::Z);
        let right = Vec3::Y.cross(back).normalize_or(Vec3::X);
        let up = back.cross(right);
        Self {
            camera: *camera,
            view_projection: camera.view_projection(aspect(area)),
            width: area.width as f32,
            height: area.height as f32,
            tan_half_fov: (camera.fov_y / 2.0).tan(),
            right,
            up,
            back,
        }
    }

    /// `(column, row, view distance)` relative to the area origin.
    pub fn project(&self, world: Vec3) -> Option<(f32, f32, f32)> {
        let ndc = self.camera.project(&self.view_projection, world)?;
        let column = (ndc.x + 1.0) / 2.0 * self.width;
        let row = (1.0 - ndc.y) / 2.0 * self.height;
        Some((column, row, ndc.z))
    }

    /// Rows spanned by a world-space length seen at `distance`.
    pub fn rows_for(&self, length: f32, distance: f32) -> f32 {
        length / (distance * self.tan_half_fov) * self.height / 2.0
    }

    /// Rotate a view-space direction (x right, y up, z towards the viewer)
    /// into world space.
    fn to_world(&self, view: Vec3) -> Vec3 {
        self.right * view.x + self.up * view.y + self.back * view.z
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Texel {
    glyph: char,
    fg: Rgb,
    bg: Rgb,
    bold: bool,
}

impl Default for Texel {
    fn default() -> Self {
        Self {
            glyph: ' ',
            fg: Rgb::WHITE,
            bg: SPACE,
            bold: false,
        }
    }
}

struct Canvas {
    width: usize,
    height: usize,
    texels: Vec<Texel>,
    depth: Vec<f32>,
}

impl Canvas {
    fn new(area: Rect) -> Self {
        let len = area.width as usize * area.height as usize;
        Self {
            width: area.width as usize,
            height: area.height as usize,
            texels: vec![Texel::default(); len],
            depth: vec![f32::INFINITY; len],
        }
    }

    fn index(&self, column: f32, row: f32) -> Option<usize> {
        if !(column >= 0.0 && row >= 0.0) {
            return None;
        }
        let (x, y) = (column as usize, row as usize);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Depth-tested glyph write. Keeps the background colour.
    fn plot(&mut self, column: f32, row: f32, depth: f32, glyph: char, fg: Rgb, bold: bool) {
        let Some(i) = self.index(column, row) else {
            return;
        };
        if depth < self.depth[i] {
            self.depth[i] = depth;
            let texel = &mut self.texels[i];
            texel.glyph = glyph;
            texel.fg = fg;
            texel.bold = bold;
        }
    }

    /// Depth-tested solid fill.
    fn fill(&mut self, column: f32, row: f32, depth: f32, bg: Rgb) {
        let Some(i) = self.index(column, row) else {
            return;
        };
        if depth < self.depth[i] {
            self.depth[i] = depth;
            self.texels[i] = Texel {
                glyph: ' ',
                bg,
                ..Texel::default()
            };
        }
    }

    /// Additive blend onto the background. Does not write depth.
    fn glow(&mut self, column: f32, row: f32, depth: f32, color: Rgb) {
        let Some(i) = self.index(column, row) else {
            return;
        };
        if depth < self.depth[i] || self.texels[i].glyph == ' ' {
            let texel = &mut self.texels[i];
            texel.bg = texel.bg.add(color);
        }
    }

    fn flush(&self, area: Rect, buf: &mut Buffer) {
        for (i, texel) in self.texels.iter().enumerate() {
            let x = area.x + (i % self.width) as u16;
            let y = area.y + (i / self.width) as u16;
            if let Some(cell) = buf.cell_mut((x, y)) {
                let mut style = Style::new().fg(texel.fg.into()).bg(texel.bg.into());
                if texel.bold {
                    style = style.add_modifier(Modifier::BOLD);
                }
                cell.set_char(texel.glyph).set_style(style);
            }
        }
    }
}

/// Dim colours with distance so the field reads as volume.
fn fade(color: Rgb, distance: f32) -> Rgb {
    color.scale((1.2 - distance / 50.0).clamp(0.25, 1.0))
}

fn star_glyph(distance: f32) -> char {
    let nearness = (1.0 - distance / 45.0).clamp(0.0, 0.999);
    STAR_CHARS[(nearness * 4.0) as usize]
}

fn sparkle(seed: u32, elapsed: f32) -> (char, f32) {
    let twinkle = 0.5 + 0.5 * (elapsed * 3.0 + seed as f32 * 1.7).sin();
    let glyph = match twinkle {
        t if t > 0.8 => '✦',
        t if t > 0.4 => '✧',
        _ => '·',
    };
    (glyph, 0.4 + 0.6 * twinkle)
}

/// Widget drawing one frame of the scene.
pub struct SceneView<'a> {
    scene: &'a Scene,
    pointer: Option<(u16, u16)>,
    cursor: CursorKind,
}

impl<'a> SceneView<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            pointer: None,
            cursor: CursorKind::Default,
        }
    }

    /// Mouse position and cursor kind, drawn as a marker when pointing.
    pub fn pointer(mut self, position: Option<(u16, u16)>, cursor: CursorKind) -> Self {
        self.pointer = position;
        self.cursor = cursor;
        self
    }

    fn draw_sphere(
        canvas: &mut Canvas,
        projector: &Projector,
        lighting: &Lighting,
        drawable: (Vec3, f32, Rgb, SphereKind),
    ) {
        let (center, radius, color, kind) = drawable;
        let Some((cx, cy, distance)) = projector.project(center) else {
            return;
        };
        let rows = projector.rows_for(radius, distance);
        if !(rows.is_finite() && rows > 0.0) {
            return;
        }
        let columns = rows * CELL_ASPECT;
        let spin = match kind {
            SphereKind::Surface { spin, .. } | SphereKind::Glow { spin, .. } => {
                Quat::from_rotation_y(-spin)
            }
        };

        let top = (cy - rows).floor().max(0.0) as usize;
        let bottom = ((cy + rows).ceil().max(0.0) as usize).min(canvas.height);
        let left = (cx - columns).floor().max(0.0) as usize;
        let right = ((cx + columns).ceil().max(0.0) as usize).min(canvas.width);

        for row in top..bottom {
            for column in left..right {
                let (x, y) = (column as f32 + 0.5, row as f32 + 0.5);
                let dx = (x - cx) / columns;
                let dy = (cy - y) / rows;
                let d2 = dx * dx + dy * dy;
                if d2 > 1.0 {
                    continue;
                }
                let dz = (1.0 - d2).sqrt();
                let depth = distance - dz * radius;
                match kind {
                    SphereKind::Surface { emissive, .. } => {
                        let normal = projector.to_world(Vec3::new(dx, dy, dz));
                        let local = spin * normal;
                        let band = 0.85 + 0.15 * (local.z.atan2(local.x) * 6.0).sin();
                        let shaded = lighting.shade(
                            color.scale(band),
                            emissive.scale(0.5),
                            center + normal * radius,
                            normal,
                        );
                        canvas.fill(x, y, depth, shaded);
                    }
                    SphereKind::Glow { opacity, .. } => {
                        let local = spin * projector.to_world(Vec3::new(dx, dy, dz));
                        let band = 0.8 + 0.2 * (local.z.atan2(local.x) * 4.0).sin();
                        let rim = 1.0 - 0.5 * dz;
                        canvas.glow(x, y, depth, color.scale(opacity * rim * band * 0.5));
                    }
                }
            }
        }
    }

    fn draw_comet(
        canvas: &mut Canvas,
        projector: &Projector,
        position: Vec3,
        scale: f32,
        color: Rgb,
        hovered: bool,
    ) {
        let Some((cx, cy, distance)) = projector.project(position) else {
            return;
        };
        let half_rows = projector.rows_for(scale, distance) / 2.0;
        if half_rows < 0.5 {
            let glyph = if hovered { '◈' } else { '◆' };
            canvas.plot(cx, cy, distance, glyph, color, hovered);
            return;
        }
        let half_columns = half_rows * CELL_ASPECT;
        let glyph = if hovered { '█' } else { '▓' };
        let mut row = (cy - half_rows).floor();
        while row < cy + half_rows {
            let mut column = (cx - half_columns).floor();
            while column < cx + half_columns {
                canvas.plot(column, row, distance, glyph, color, hovered);
                column += 1.0;
            }
            row += 1.0;
        }
    }

    fn draw_meteor(
        canvas: &mut Canvas,
        projector: &Projector,
        drawable: (Vec3, Vec3, Rgb, Rgb, f32),
    ) {
        let (head, velocity, head_color, trail_color, trail_length) = drawable;
        let back = -velocity.normalize_or_zero();
        for i in (0..=TRAIL_SEGMENTS).rev() {
            let t = i as f32 / TRAIL_SEGMENTS as f32;
            let Some((x, y, distance)) = projector.project(head + back * trail_length * t) else {
                continue;
            };
            let glyph = match i {
                0 => '●',
                _ if t < 0.5 => '━',
                _ => '─',
            };
            let color = head_color.mix(trail_color, t).scale(1.0 - 0.8 * t);
            canvas.plot(x, y, distance, glyph, color, i == 0);
        }
    }
}

impl Widget for SceneView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let projector = Projector::new(self.scene.camera(), area);
        let lighting = self.scene.lighting();
        let elapsed = self.scene.time().elapsed;
        let camera_distance = self.scene.camera().position.length();
        let mut canvas = Canvas::new(area);

        // Opaque geometry first so glow shells can see what they cover.
        let mut list = self.scene.draw_list();
        list.sort_by_key(|d| matches!(d, Drawable::Sphere { kind: SphereKind::Glow { .. }, .. }));

        for drawable in list {
            match drawable {
                Drawable::Point {
                    position,
                    color,
                    layer,
                } => {
                    let Some((x, y, distance)) = projector.project(position) else {
                        continue;
                    };
                    let (glyph, color) = match layer {
                        PointLayer::Background => ('.', color.scale(0.45)),
                        PointLayer::StarField => (star_glyph(distance), fade(color, distance)),
                        PointLayer::Halo => ('•', color),
                        PointLayer::Sparkle { seed } => {
                            let (glyph, brightness) = sparkle(seed, elapsed);
                            (glyph, color.scale(brightness))
                        }
                    };
                    canvas.plot(x, y, distance, glyph, color, false);
                }
                Drawable::Glyph {
                    position,
                    glyph,
                    color,
                    outline,
                } => {
                    let Some((x, y, distance)) = projector.project(position) else {
                        continue;
                    };
                    // Far side of the ring reads in the outline colour.
                    let fg = if distance > camera_distance { outline } else { color };
                    canvas.plot(x, y, distance, glyph, fg, true);
                }
                Drawable::Sphere {
                    center,
                    radius,
                    color,
                    kind,
                } => Self::draw_sphere(
                    &mut canvas,
                    &projector,
                    lighting,
                    (center, radius, color, kind),
                ),
                Drawable::Comet {
                    position,
                    scale,
                    opacity,
                    hovered,
                    color,
                    ..
                } => Self::draw_comet(
                    &mut canvas,
                    &projector,
                    position,
                    scale,
                    color.scale(opacity),
                    hovered,
                ),
                Drawable::Meteor {
                    flight,
                    head,
                    trail,
                    trail_length,
                } => Self::draw_meteor(
                    &mut canvas,
                    &projector,
                    (flight.position, flight.velocity, head, trail, trail_length),
                ),
            }
        }

        if self.cursor.is_pointer()
            && let Some((column, row)) = self.pointer
            && area.contains((column, row).into())
        {
            let x = (column - area.x) as f32;
            let y = (row - area.y) as f32;
            canvas.plot(x, y, f32::NEG_INFINITY, POINTER_GLYPH, Rgb::WHITE, true);
        }

        canvas.flush(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_core::{FrameTime, Memory, SceneSettings};
    use galaxy_scene::ManualScheduler;
    use std::rc::Rc;

    fn scene() -> Scene {
        let settings = SceneSettings {
            seed: Some(99),
            comet_count: 30,
            star_field_count: 300,
            background_star_count: 100,
            ..SceneSettings::default()
        };
        let memories = vec![Memory::new("cp-1.jpeg", "one")];
        Scene::new(&settings, &memories, Rc::new(ManualScheduler::new())).unwrap()
    }

    #[test]
    fn test_cell_to_ndc() {
        let area = Rect::new(10, 5, 80, 24);
        let center = cell_to_ndc(area, 50, 17).unwrap();
        assert!(center.x.abs() < 0.05 && center.y.abs() < 0.1);

        let top_left = cell_to_ndc(area, 10, 5).unwrap();
        assert!(top_left.x < -0.95 && top_left.y > 0.9);

        assert_eq!(cell_to_ndc(area, 9, 5), None);
        assert_eq!(cell_to_ndc(area, 90, 5), None);
    }

    #[test]
    fn test_origin_projects_to_centre() {
        let area = Rect::new(0, 0, 80, 24);
        let projector = Projector::new(&Camera::at_z(16.0), area);
        let (x, y, distance) = projector.project(Vec3::ZERO).unwrap();
        assert!((x - 40.0).abs() < 0.01);
        assert!((y - 12.0).abs() < 0.01);
        assert!((distance - 16.0).abs() < 0.01);
        assert!(projector.project(Vec3::new(0.0, 0.0, 30.0)).is_none());
    }

    #[test]
    fn test_projector_agrees_with_cell_to_ndc() {
        let area = Rect::new(0, 0, 100, 30);
        let camera = Camera::at_z(12.0);
        let projector = Projector::new(&camera, area);
        let point = Vec3::new(2.0, 1.0, 0.0);

        let (x, y, _) = projector.project(point).unwrap();
        let ndc = cell_to_ndc(area, x as u16, y as u16).unwrap();
        let exact = camera
            .project(&camera.view_projection(aspect(area)), point)
            .unwrap();
        assert!((ndc.x - exact.x).abs() < 2.0 / 100.0 + 1e-3);
        assert!((ndc.y - exact.y).abs() < 2.0 / 30.0 + 1e-3);
    }

    #[test]
    fn test_planet_fills_centre() {
        let scene = scene();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        SceneView::new(&scene).render(area, &mut buf);

        let centre = &buf[(40, 12)];
        assert_ne!(centre.bg, ratatui::style::Color::from(SPACE));
    }

    #[test]
    fn test_pointer_marker_only_when_pointing() {
        let mut scene = scene();
        scene.tick(FrameTime::new(0.1, 0.1));
        let area = Rect::new(0, 0, 60, 20);

        let mut buf = Buffer::empty(area);
        SceneView::new(&scene)
            .pointer(Some((3, 3)), CursorKind::Default)
            .render(area, &mut buf);
        assert_ne!(buf[(3, 3)].symbol(), POINTER_GLYPH.to_string());

        let mut buf = Buffer::empty(area);
        SceneView::new(&scene)
            .pointer(Some((3, 3)), CursorKind::Pointer)
            .render(area, &mut buf);
        assert_eq!(buf[(3, 3)].symbol(), POINTER_GLYPH.to_string());
    }

    #[test]
    fn test_empty_area_is_noop() {
        let scene = scene();
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 10));
        SceneView::new(&scene).render(Rect::new(0, 0, 0, 0), &mut buf);
        assert_eq!(buf, Buffer::empty(Rect::new(0, 0, 10, 10)));
    }

    #[test]
    fn test_glow_banding_follows_spin() {
        let area = Rect::new(0, 0, 40, 20);
        let projector = Projector::new(&Camera::at_z(6.0), area);
        let shell = |spin| {
            let mut canvas = Canvas::new(area);
            let kind = SphereKind::Glow { opacity: 1.0, spin };
            SceneView::draw_sphere(
                &mut canvas,
                &projector,
                &Lighting::default(),
                (Vec3::ZERO, 1.8, Rgb(0xf0, 0x92, 0xc4), kind),
            );
            let mut buf = Buffer::empty(area);
            canvas.flush(area, &mut buf);
            buf
        };
        assert_eq!(shell(0.0), shell(0.0));
        assert_ne!(shell(0.0), shell(0.6));
    }

    #[test]
    fn test_sparkle_twinkles() {
        let (_, dim) = sparkle(0, -0.5236);
        let (glyph, bright) = sparkle(0, 0.5236);
        assert!(bright > dim);
        assert_eq!(glyph, '✦');
    }
}
