// selection.rs
// Per-zone visual state, derived from the host's selection and the current hover.
use egui::Color32;

use crate::zones::{ZoneCatalog, ZoneError, ZoneId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualState { Default, Hovered, Selected }

/// Read-only snapshot for one frame. Built fresh every frame from the host-owned selection;
/// nothing here outlives the frame.
pub struct SelectionView<'a> {
    catalog: &'a ZoneCatalog,
    selected: Option<&'a ZoneId>,
    hovered: Option<&'a ZoneId>,
}

impl<'a> SelectionView<'a> {
    pub fn new(catalog: &'a ZoneCatalog, selected: Option<&'a ZoneId>, hovered: Option<&'a ZoneId>) -> Self {
        Self { catalog, selected, hovered }
    }

    /// Selection outranks hover so a hovered selection still reads as selected.
    pub fn visual_state_of(&self, zone: &str) -> Result<VisualState, ZoneError> {
        if !self.catalog.contains(zone) {
            return Err(ZoneError::InvalidZoneId(zone.to_string()));
        }
        Ok(if self.selected.is_some_and(|s| s == zone) {
            VisualState::Selected
        } else if self.hovered.is_some_and(|h| h == zone) {
            VisualState::Hovered
        } else {
            VisualState::Default
        })
    }

    pub fn formatted_selection_label(&self) -> Result<Option<String>, ZoneError> {
        self.selected.map(|id| self.catalog.display_name(id.as_str())).transpose()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Palette { pub base: Color32, pub hovered: Color32, pub selected: Color32 }

impl Default for Palette {
    fn default() -> Self {
        Self {
            base:     Color32::from_rgb(0x27, 0x27, 0x2a), // zinc 800
            hovered:  Color32::from_rgb(0x4f, 0x46, 0xe5), // indigo 600
            selected: Color32::from_rgb(0x10, 0xb9, 0x81), // emerald 500
        }
    }
}

impl Palette {
    /// `time` in seconds; selected zones pulse.
    pub fn fill(&self, state: VisualState, time: f64) -> Color32 {
        match state {
            VisualState::Default  => self.base,
            VisualState::Hovered  => self.hovered,
            VisualState::Selected => {
                let glow = 0.8 + 0.2 * (time as f32 * 4.0).sin();
                self.selected.linear_multiply(glow)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_wins_over_hovered() {
        let cat = ZoneCatalog::builtin().unwrap();
        let chest = ZoneId::new("chest");
        let view = SelectionView::new(&cat, Some(&chest), Some(&chest));
        assert_eq!(view.visual_state_of("chest").unwrap(), VisualState::Selected);
        assert_eq!(view.visual_state_of("neck").unwrap(), VisualState::Default);
    }

    #[test]
    fn hover_only_and_nothing_at_all() {
        let cat = ZoneCatalog::builtin().unwrap();
        let neck = ZoneId::new("neck");
        let view = SelectionView::new(&cat, None, Some(&neck));
        assert_eq!(view.visual_state_of("neck").unwrap(), VisualState::Hovered);
        assert_eq!(view.formatted_selection_label().unwrap(), None);
    }

    #[test]
    fn label_uses_display_name() {
        let cat = ZoneCatalog::builtin().unwrap();
        let leg = ZoneId::new("leg_lower_right");
        let view = SelectionView::new(&cat, Some(&leg), None);
        assert_eq!(view.formatted_selection_label().unwrap().as_deref(), Some("Leg Lower Right"));
    }

    #[test]
    fn unknown_zones_are_programmer_errors() {
        let cat = ZoneCatalog::builtin().unwrap();
        let bogus = ZoneId::new("wing_left");
        let view = SelectionView::new(&cat, Some(&bogus), None);
        assert!(matches!(view.visual_state_of("wing_left"), Err(ZoneError::InvalidZoneId(_))));
        assert!(view.formatted_selection_label().is_err());
    }
}
