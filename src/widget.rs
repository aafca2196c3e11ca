// widget.rs — the body-zone selector handle a host embeds.
//
// Controlled widget: the host owns the selected zone and passes it in every frame; the widget
// only reports clicks through `on_select`. Gesture, hover and rotation live in the
// controller owned by this handle, so several selectors on one screen never share state.
use egui::{Response, Sense, Ui, Vec2};
use tracing::info;

use crate::canvas3d::draw_zone_canvas;
use crate::config::SelectorConfig;
use crate::interaction::{ControllerEvent, InteractionController, PointerEvent};
use crate::selection::Palette;
use crate::zones::{ZoneCatalog, ZoneId};

pub struct BodySelector {
    controller: InteractionController,
    palette: Palette,
}

fn dispatch(events: Vec<ControllerEvent>, on_select: &mut impl FnMut(&ZoneId)) {
    for ev in events {
        if let ControllerEvent::Commit(zone) = ev { on_select(&zone); }
    }
}

impl BodySelector {
    pub fn create(catalog: ZoneCatalog, config: SelectorConfig) -> Self {
        info!(zones = catalog.len(), threshold_px = config.click_threshold_px, "body selector created");
        Self { controller: InteractionController::new(catalog, config), palette: Palette::default() }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self { self.palette = palette; self }

    pub fn controller(&self) -> &InteractionController { &self.controller }
    pub fn hovered(&self) -> Option<&ZoneId> { self.controller.hovered() }
    pub fn is_alive(&self) -> bool { self.controller.is_alive() }

    /// Swapping the figure resets rotation, hover and any gesture in flight.
    pub fn set_catalog(&mut self, catalog: ZoneCatalog) { self.controller.set_catalog(catalog); }

    /// Draws one frame. `selected` is read, never stored.
    pub fn show(&mut self, ui: &mut Ui, size: Vec2, selected: Option<&ZoneId>,
                mut on_select: impl FnMut(&ZoneId)) -> Response {
        if !self.is_alive() {
            return ui.allocate_response(size, Sense::hover());
        }
        let (resp, events) = draw_zone_canvas(ui, &mut self.controller, selected, &self.palette, size);
        dispatch(events, &mut on_select);
        resp
    }

    /// Headless entry point for hosts that deliver their own pointer stream.
    pub fn handle_pointer(&mut self, event: PointerEvent, now: f64, mut on_select: impl FnMut(&ZoneId)) {
        let events = self.controller.handle(event, now);
        dispatch(events, &mut on_select);
    }

    pub fn tick(&mut self, now: f64, mut on_select: impl FnMut(&ZoneId)) {
        let events = self.controller.tick(now);
        dispatch(events, &mut on_select);
    }

    pub fn set_viewport(&mut self, rect: egui::Rect) { self.controller.set_viewport(rect); }

    pub fn destroy(&mut self) {
        if self.controller.is_alive() {
            self.controller.destroy();
            info!("body selector destroyed");
        }
    }
}

impl Drop for BodySelector {
    fn drop(&mut self) { self.destroy(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Pos2, Rect};

    fn selector() -> (BodySelector, Rect) {
        let rect = Rect::from_min_size(Pos2::ZERO, egui::vec2(300.0, 300.0));
        let mut s = BodySelector::create(ZoneCatalog::builtin().unwrap(), SelectorConfig::default());
        s.set_viewport(rect);
        (s, rect)
    }

    fn at(s: &BodySelector, rect: Rect, id: &str) -> Pos2 {
        let z = s.controller().catalog().get(id).unwrap();
        s.controller().view().project(z.position).unwrap().0.to_pixel(rect)
    }

    #[test]
    fn click_reaches_the_host_callback_once() {
        let (mut s, rect) = selector();
        let arm = at(&s, rect, "arm_upper_left");
        let mut picked: Vec<ZoneId> = Vec::new();
        s.handle_pointer(PointerEvent::Down(arm), 0.0, |z| picked.push(z.clone()));
        s.handle_pointer(PointerEvent::Up(arm), 0.05, |z| picked.push(z.clone()));
        s.tick(0.1, |z| picked.push(z.clone()));
        assert_eq!(picked, vec![ZoneId::new("arm_upper_left")]);
    }

    #[test]
    fn destroy_mid_drag_never_calls_back() {
        let (mut s, rect) = selector();
        let chest = at(&s, rect, "chest");
        let mut calls = 0;
        s.handle_pointer(PointerEvent::Down(chest), 0.0, |_| calls += 1);
        s.handle_pointer(PointerEvent::Move(chest + egui::vec2(30.0, 0.0)), 0.01, |_| calls += 1);
        s.destroy();
        s.handle_pointer(PointerEvent::Up(chest), 0.02, |_| calls += 1);
        s.handle_pointer(PointerEvent::Down(chest), 0.03, |_| calls += 1);
        s.handle_pointer(PointerEvent::Up(chest), 0.04, |_| calls += 1);
        s.tick(0.5, |_| calls += 1);
        assert_eq!(calls, 0);
        assert!(!s.is_alive());
    }

    #[test]
    fn instances_do_not_share_rotation() {
        let (mut a, _) = selector();
        let (b, _) = selector();
        a.tick(0.0, |_| {});
        a.tick(0.016, |_| {});
        assert!(a.controller().view().rotation_y > 0.0);
        assert_eq!(b.controller().view().rotation_y, 0.0);
    }
}
