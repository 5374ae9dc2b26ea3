//! Shape generation for the liquid, its surface line and droplets
//!
//! Everything is tessellated on the CPU into a flat triangle list in
//! container pixels; the pipeline maps pixels to clip space.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::sim::{DropletSprite, FrameView};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Offset each channel, saturating at 0 and 255
    pub fn shade(self, dr: i16, dg: i16, db: i16) -> Self {
        let apply = |c: u8, d: i16| (c as i16 + d).clamp(0, 255) as u8;
        Self::new(apply(self.r, dr), apply(self.g, dg), apply(self.b, db))
    }

    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            alpha,
        ]
    }
}

/// Droplet body color
const DROPLET: [f32; 4] = [210.0 / 255.0, 240.0 / 255.0, 1.0, 0.92];

/// Position of the middle gradient stop (fraction of the liquid depth)
const MID_STOP: f32 = 0.55;
/// Glow line offset below the surface (px)
const GLOW_OFFSET: f32 = 12.0;
const GLOW_WIDTH: f32 = 12.0;
const HIGHLIGHT_WIDTH: f32 = 2.0;
const DROPLET_SEGMENTS: u32 = 12;

/// Three-stop vertical gradient derived from the liquid color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidGradient {
    pub top: [f32; 4],
    pub mid: [f32; 4],
    pub bottom: [f32; 4],
    /// y of the top stop
    pub y0: f32,
    /// y of the bottom stop
    pub y1: f32,
}

impl LiquidGradient {
    pub fn new(color: Rgb, y0: f32, y1: f32) -> Self {
        Self {
            top: color.shade(70, 90, 100).with_alpha(0.84),
            mid: color.shade(20, 40, 50).with_alpha(0.92),
            bottom: color.shade(-30, -30, -10).with_alpha(0.96),
            y0,
            y1,
        }
    }

    /// y of the middle stop
    pub fn mid_y(&self) -> f32 {
        self.y0 + (self.y1 - self.y0) * MID_STOP
    }

    /// Color at `y`, clamped to the end stops
    pub fn at(&self, y: f32) -> [f32; 4] {
        let span = self.y1 - self.y0;
        let t = if span.abs() > f32::EPSILON {
            ((y - self.y0) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        if t >= 1.0 {
            self.bottom
        } else if t <= MID_STOP {
            lerp_color(self.top, self.mid, t / MID_STOP)
        } else {
            lerp_color(self.mid, self.bottom, (t - MID_STOP) / (1.0 - MID_STOP))
        }
    }
}

fn lerp_color(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Quad corner: position and color
type Corner = (Vec2, [f32; 4]);

/// Two triangles; `a`-`b` is one edge and `c`-`d` the opposite one
fn push_quad(out: &mut Vec<Vertex>, a: Corner, b: Corner, c: Corner, d: Corner) {
    out.push(Vertex::new(a.0.x, a.0.y, a.1));
    out.push(Vertex::new(c.0.x, c.0.y, c.1));
    out.push(Vertex::new(b.0.x, b.0.y, b.1));

    out.push(Vertex::new(b.0.x, b.0.y, b.1));
    out.push(Vertex::new(c.0.x, c.0.y, c.1));
    out.push(Vertex::new(d.0.x, d.0.y, d.1));
}

/// Liquid body: columns from the surface down to the container floor.
///
/// Each column is split at the middle gradient stop so vertex interpolation
/// reproduces the three-stop gradient.
pub fn liquid_fill(points: &[Vec2], floor_y: f32, gradient: &LiquidGradient) -> Vec<Vertex> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mid_y = gradient.mid_y();
    let mut vertices = Vec::with_capacity((points.len() - 1) * 12);

    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        let m1 = Vec2::new(p1.x, mid_y.max(p1.y).min(floor_y));
        let m2 = Vec2::new(p2.x, mid_y.max(p2.y).min(floor_y));
        let f1 = Vec2::new(p1.x, floor_y);
        let f2 = Vec2::new(p2.x, floor_y);

        // Surface down to the mid stop
        if m1.y > p1.y || m2.y > p2.y {
            push_quad(
                &mut vertices,
                (p1, gradient.at(p1.y)),
                (p2, gradient.at(p2.y)),
                (m1, gradient.at(m1.y)),
                (m2, gradient.at(m2.y)),
            );
        }
        // Mid stop down to the floor
        push_quad(
            &mut vertices,
            (m1, gradient.at(m1.y)),
            (m2, gradient.at(m2.y)),
            (f1, gradient.bottom),
            (f2, gradient.bottom),
        );
    }

    vertices
}

/// Thick polyline as a strip of quads, optionally with round end caps
pub fn polyline(points: &[Vec2], width: f32, color: [f32; 4], round_caps: bool) -> Vec<Vertex> {
    if points.len() < 2 {
        return Vec::new();
    }

    let half = width * 0.5;
    let mut vertices = Vec::with_capacity((points.len() - 1) * 6);

    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        let dir = (p2 - p1).normalize_or_zero();
        let perp = Vec2::new(-dir.y, dir.x) * half;

        push_quad(
            &mut vertices,
            (p1 - perp, color),
            (p2 - perp, color),
            (p1 + perp, color),
            (p2 + perp, color),
        );
    }

    if round_caps {
        let first = points[0];
        let last = points[points.len() - 1];
        vertices.extend(circle(first, half, color, 8));
        vertices.extend(circle(last, half, color, 8));
    }

    vertices
}

/// Filled ellipse rotated by `angle` (radians) around `center`
pub fn ellipse(
    center: Vec2,
    radius_x: f32,
    radius_y: f32,
    angle: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);
    let rot = Vec2::from_angle(angle);
    let point = |theta: f32| {
        center + rot.rotate(Vec2::new(radius_x * theta.cos(), radius_y * theta.sin()))
    };

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let a = point(theta1);
        let b = point(theta2);

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(a.x, a.y, color));
        vertices.push(Vertex::new(b.x, b.y, color));
    }

    vertices
}

/// Filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    ellipse(center, radius, radius, 0.0, color, segments)
}

/// Droplet body plus a small offset highlight, aligned with its velocity
pub fn droplet(sprite: &DropletSprite) -> Vec<Vertex> {
    let mut vertices = ellipse(
        sprite.pos,
        sprite.length,
        sprite.width,
        sprite.angle,
        DROPLET,
        DROPLET_SEGMENTS,
    );
    let offset = Vec2::from_angle(sprite.angle).rotate(Vec2::new(
        -sprite.length * 0.25,
        -sprite.width * 0.25,
    ));
    vertices.extend(ellipse(
        sprite.pos + offset,
        sprite.length * 0.35,
        sprite.width * 0.35,
        sprite.angle,
        colors::DROPLET_HIGHLIGHT,
        DROPLET_SEGMENTS,
    ));
    vertices
}

/// Full frame: liquid body, highlight line, glow, droplets (back to front)
pub fn frame(view: &FrameView, liquid: Rgb) -> Vec<Vertex> {
    let gradient = LiquidGradient::new(liquid, view.base_y, view.height);
    let mut vertices = liquid_fill(&view.points, view.height, &gradient);

    vertices.extend(polyline(
        &view.points,
        HIGHLIGHT_WIDTH,
        colors::HIGHLIGHT,
        false,
    ));

    let glow: Vec<Vec2> = view
        .points
        .iter()
        .map(|p| *p + Vec2::new(0.0, GLOW_OFFSET))
        .collect();
    vertices.extend(polyline(&glow, GLOW_WIDTH, colors::GLOW, true));

    for sprite in &view.droplets {
        vertices.extend(droplet(sprite));
    }

    vertices
}
