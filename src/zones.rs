// zones.rs — static catalog of selectable body zones and their hit geometry.
//
// Axes: X = viewer's left→right, Y = up, Z = toward the camera. "left" zones sit at negative X.
// A catalog is owned by one widget instance and never changes after construction.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;

use crate::camera::{add, rotate_z, V3};
use crate::json_loader::{self, LoadError};

// Silhouette resolution. Round shapes hit-test analytically, so the drawn polygon must hug
// the true outline: 16 sides stay within 2% of the radius.
const SEGMENTS: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum ZoneError {
    #[error("unknown zone id '{0}'")]
    InvalidZoneId(String),
    #[error("zone catalog is empty")]
    Empty,
    #[error("zone id '{0}' appears more than once")]
    DuplicateId(String),
    #[error("zone id '{0}' must be lowercase tokens separated by '_'")]
    MalformedId(String),
    #[error("zone '{id}' has an invalid {what}")]
    InvalidDimension { id: String, what: &'static str },
    #[error(transparent)]
    Load(#[from] LoadError),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for ZoneId {
    fn as_ref(&self) -> &str { &self.0 }
}

impl PartialEq<str> for ZoneId {
    fn eq(&self, other: &str) -> bool { self.0 == other }
}

impl PartialEq<&str> for ZoneId {
    fn eq(&self, other: &&str) -> bool { self.0 == *other }
}

/// Hit primitive in the zone's local frame, centred on the origin.
/// Cylinders run along local +Y; `radius_top` is at +height/2.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HitShape {
    Sphere   { radius: f32 },
    Cylinder { radius_top: f32, radius_bottom: f32, height: f32 },
    Box      { width: f32, height: f32, depth: f32 },
}

impl HitShape {
    fn dimensions(&self) -> Vec<(&'static str, f32)> {
        match *self {
            HitShape::Sphere { radius } => vec![("radius", radius)],
            HitShape::Cylinder { radius_top, radius_bottom, height } =>
                vec![("radius_top", radius_top), ("radius_bottom", radius_bottom), ("height", height)],
            HitShape::Box { width, height, depth } =>
                vec![("width", width), ("height", height), ("depth", depth)],
        }
    }

    /// Low-poly vertices in the local frame; their projected hull is the silhouette.
    fn local_vertices(&self) -> Vec<V3> {
        use std::f32::consts::{FRAC_PI_2, TAU};
        let ring = |r: f32, y: f32| (0..SEGMENTS).map(move |i| {
            let a = i as f32 / SEGMENTS as f32 * TAU;
            [r * a.cos(), y, r * a.sin()]
        });
        match *self {
            HitShape::Sphere { radius } => {
                let mut v = vec![[0.0, radius, 0.0], [0.0, -radius, 0.0]];
                for k in 1..SEGMENTS / 2 {
                    let lat = -FRAC_PI_2 + k as f32 * TAU / SEGMENTS as f32;
                    v.extend(ring(radius * lat.cos(), radius * lat.sin()));
                }
                v
            }
            HitShape::Cylinder { radius_top, radius_bottom, height } =>
                ring(radius_top, height * 0.5).chain(ring(radius_bottom, -height * 0.5)).collect(),
            HitShape::Box { width, height, depth } => {
                let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);
                let mut v = Vec::with_capacity(8);
                for sx in [-hx, hx] { for sy in [-hy, hy] { for sz in [-hz, hz] { v.push([sx, sy, sz]); } } }
                v
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub shape: HitShape,
    pub position: V3,
    #[serde(default)]
    pub rotation_z: f32,
}

impl Zone {
    /// Figure-space point → zone-local point.
    pub fn to_local(&self, p: V3) -> V3 {
        let d = [p[0] - self.position[0], p[1] - self.position[1], p[2] - self.position[2]];
        rotate_z(d, -self.rotation_z)
    }

    /// Directions only rotate; translation does not apply.
    pub fn dir_to_local(&self, d: V3) -> V3 { rotate_z(d, -self.rotation_z) }

    pub fn to_figure(&self, p: V3) -> V3 { add(self.position, rotate_z(p, self.rotation_z)) }

    pub fn outline_vertices(&self) -> Vec<V3> {
        self.shape.local_vertices().into_iter().map(|p| self.to_figure(p)).collect()
    }

    fn validate(&self) -> Result<(), ZoneError> {
        let id = self.id.as_str();
        let well_formed = id.split('_').all(|tok| {
            !tok.is_empty() && tok.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        });
        if !well_formed { return Err(ZoneError::MalformedId(id.to_string())); }
        let bad = |what| ZoneError::InvalidDimension { id: id.to_string(), what };
        for (what, v) in self.shape.dimensions() {
            if !(v.is_finite() && v > 0.0) { return Err(bad(what)); }
        }
        if !self.position.iter().all(|c| c.is_finite()) { return Err(bad("position")); }
        if !self.rotation_z.is_finite() { return Err(bad("rotation_z")); }
        Ok(())
    }
}

#[derive(Deserialize)]
struct CatalogFile { zones: Vec<Zone> }

#[derive(Clone, Debug)]
pub struct ZoneCatalog { zones: Vec<Zone> }

impl ZoneCatalog {
    pub fn new(zones: Vec<Zone>) -> Result<Self, ZoneError> {
        if zones.is_empty() { return Err(ZoneError::Empty); }
        for (i, z) in zones.iter().enumerate() {
            z.validate()?;
            if zones[..i].iter().any(|other| other.id == z.id) {
                return Err(ZoneError::DuplicateId(z.id.to_string()));
            }
        }
        Ok(Self { zones })
    }

    /// The stylised figure shipped in `assets/zones.json`.
    pub fn builtin() -> Result<Self, ZoneError> {
        let file: CatalogFile = json_loader::load("zones.json")?;
        let catalog = Self::new(file.zones)?;
        info!(zones = catalog.len(), "loaded built-in zone catalog");
        Ok(catalog)
    }

    pub fn from_file(path: &Path) -> Result<Self, ZoneError> {
        let file: CatalogFile = json_loader::load_file(path)?;
        let catalog = Self::new(file.zones)?;
        info!(zones = catalog.len(), path = %path.display(), "loaded zone catalog");
        Ok(catalog)
    }

    /// Catalog order is also the last-resort hit-test tie-break.
    pub fn list_zones(&self) -> &[Zone] { &self.zones }

    pub fn len(&self) -> usize { self.zones.len() }

    pub fn is_empty(&self) -> bool { self.zones.is_empty() }

    pub fn contains(&self, id: &str) -> bool { self.zones.iter().any(|z| z.id == id) }

    pub fn get(&self, id: &str) -> Result<&Zone, ZoneError> {
        self.zones.iter().find(|z| z.id == id).ok_or_else(|| ZoneError::InvalidZoneId(id.to_string()))
    }

    pub fn display_name(&self, id: &str) -> Result<String, ZoneError> {
        self.get(id).map(|z| title_case(z.id.as_str()))
    }
}

/// `leg_lower_right` → `Leg Lower Right`.
pub fn title_case(id: &str) -> String {
    id.split('_')
        .filter(|t| !t.is_empty())
        .map(|t| {
            let mut c = t.chars();
            match c.next() {
                Some(first) => first.to_uppercase().chain(c).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
