// camera.rs
use egui::{Pos2, Rect};
use serde::Deserialize;

pub type V3 = [f32; 3];

pub fn add(a: V3, b: V3) -> V3 { [a[0]+b[0], a[1]+b[1], a[2]+b[2]] }
pub fn sub(a: V3, b: V3) -> V3 { [a[0]-b[0], a[1]-b[1], a[2]-b[2]] }
pub fn scale(a: V3, s: f32) -> V3 { [a[0]*s, a[1]*s, a[2]*s] }
pub fn dot(a: V3, b: V3) -> f32 { a[0]*b[0] + a[1]*b[1] + a[2]*b[2] }

pub fn normalize(a: V3) -> V3 {
    let len = dot(a, a).sqrt();
    if len > f32::EPSILON { scale(a, 1.0 / len) } else { a }
}

/// Right-handed rotation about +Y (three.js convention).
pub fn rotate_y(p: V3, angle: f32) -> V3 {
    let (s, c) = angle.sin_cos();
    [p[0]*c + p[2]*s, p[1], -p[0]*s + p[2]*c]
}

/// Right-handed rotation about +Z.
pub fn rotate_z(p: V3, angle: f32) -> V3 {
    let (s, c) = angle.sin_cos();
    [p[0]*c - p[1]*s, p[0]*s + p[1]*c, p[2]]
}

/// Normalized device coordinates: x right, y up, both in [-1, 1] inside the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ndc { pub x: f32, pub y: f32 }

impl Ndc {
    pub fn new(x: f32, y: f32) -> Self { Self { x, y } }

    pub fn from_pixel(pos: Pos2, rect: Rect) -> Self {
        let (w, h) = (rect.width().max(1.0), rect.height().max(1.0));
        Self { x: (pos.x - rect.left()) / w * 2.0 - 1.0, y: -(pos.y - rect.top()) / h * 2.0 + 1.0 }
    }

    pub fn to_pixel(self, rect: Rect) -> Pos2 {
        Pos2::new(rect.left() + (self.x + 1.0) * 0.5 * rect.width(),
                  rect.top() + (1.0 - self.y) * 0.5 * rect.height())
    }

    pub fn in_viewport(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x.abs() <= 1.0 && self.y.abs() <= 1.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig { pub fov_y_degrees: f32, pub eye: V3 }

impl Default for CameraConfig {
    fn default() -> Self { Self { fov_y_degrees: 50.0, eye: [0.0, 0.5, 6.0] } }
}

/// Fixed-orientation perspective camera looking down -Z from `eye`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera { pub eye: V3, pub fov_y: f32, pub aspect: f32 }

impl Camera {
    pub fn new(cfg: &CameraConfig) -> Self {
        Self { eye: cfg.eye, fov_y: cfg.fov_y_degrees.to_radians(), aspect: 1.0 }
    }

    fn half_extents(&self) -> (f32, f32) {
        let ty = (self.fov_y * 0.5).tan();
        (ty * self.aspect, ty)
    }
}

impl Default for Camera {
    fn default() -> Self { Self::new(&CameraConfig::default()) }
}

#[derive(Clone, Copy, Debug)]
pub struct Ray { pub origin: V3, pub dir: V3 }

impl Ray {
    pub fn at(&self, t: f32) -> V3 { add(self.origin, scale(self.dir, t)) }
}

/// Camera plus the figure's rotation. Mutated by drags and idle auto-rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform { pub rotation_y: f32, pub camera: Camera }

impl Default for ViewTransform {
    fn default() -> Self { Self { rotation_y: 0.0, camera: Camera::default() } }
}

impl ViewTransform {
    pub fn new(camera: Camera) -> Self { Self { rotation_y: 0.0, camera } }

    pub fn set_aspect_from(&mut self, rect: Rect) {
        if rect.height() > 0.0 && rect.width() > 0.0 {
            self.camera.aspect = rect.width() / rect.height();
        }
    }

    /// World-space pick ray through `ndc`.
    pub fn ray(&self, ndc: Ndc) -> Ray {
        let (hx, hy) = self.camera.half_extents();
        Ray { origin: self.camera.eye, dir: normalize([ndc.x * hx, ndc.y * hy, -1.0]) }
    }

    /// Same ray expressed in the rotated figure's frame.
    pub fn figure_ray(&self, ndc: Ndc) -> Ray {
        let r = self.ray(ndc);
        Ray { origin: rotate_y(r.origin, -self.rotation_y), dir: rotate_y(r.dir, -self.rotation_y) }
    }

    /// Projects a figure-space point; returns NDC and view depth, or None behind the eye.
    pub fn project(&self, p: V3) -> Option<(Ndc, f32)> {
        let c = sub(rotate_y(p, self.rotation_y), self.camera.eye);
        let depth = -c[2];
        if depth < 0.01 { return None; }
        let (hx, hy) = self.camera.half_extents();
        Some((Ndc::new(c[0] / (depth * hx), c[1] / (depth * hy)), depth))
    }
}
