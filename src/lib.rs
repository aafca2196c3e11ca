//! Interactive 3D body-zone picker for tattoo placement, plus the studio screen that hosts it.
//!
//! Embed [`widget::BodySelector`] in any egui UI: the host keeps the selected [`zones::ZoneId`],
//! hands it in every frame and gets clicks back through a callback.

pub mod app;
pub mod camera;
pub mod canned;
pub mod canvas3d;
pub mod config;
pub mod hit_test;
pub mod interaction;
pub mod json_loader;
pub mod selection;
pub mod studio;
pub mod widget;
pub mod zones;

pub use widget::BodySelector;
pub use zones::{ZoneCatalog, ZoneError, ZoneId};
