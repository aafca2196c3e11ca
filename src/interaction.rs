// interaction.rs — pointer stream → rotation, hover, and click commits.
//
//   Idle --down--> PossibleClick --move >= threshold--> Dragging --up--> Idle (no commit, hover re-sampled)
//                  PossibleClick --up (< threshold)--> Idle, commits the zone pressed at *down*
//   Idle --move (no button)--> Hovering --move--> Hovering (throttled hit-tests)
//
// Events are consumed strictly in arrival order. Throttling only coalesces hover samples;
// down/up are never deferred.
use egui::{Pos2, Rect};
use tracing::{debug, info};

use crate::camera::{Camera, Ndc, ViewTransform};
use crate::config::SelectorConfig;
use crate::hit_test::hit_test;
use crate::zones::{ZoneCatalog, ZoneId};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Pos2),
    Move(Pos2),
    Up(Pos2),
    Leave,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ControllerEvent {
    Commit(ZoneId),
    HoverChanged(Option<ZoneId>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
    Idle,
    Hovering,
    PossibleClick { origin: Pos2, pressed: Option<ZoneId> },
    Dragging { last: Pos2 },
}

pub struct InteractionController {
    config: SelectorConfig,
    catalog: ZoneCatalog,
    view: ViewTransform,
    rect: Rect,
    gesture: Gesture,
    hovered: Option<ZoneId>,
    pointer: Option<Ndc>,
    last_sample: Option<f64>,
    pending: Option<Pos2>,
    alive: bool,
}

impl InteractionController {
    pub fn new(catalog: ZoneCatalog, config: SelectorConfig) -> Self {
        let view = ViewTransform::new(Camera::new(&config.camera));
        Self {
            config, catalog, view,
            rect: Rect::from_min_size(Pos2::ZERO, egui::vec2(1.0, 1.0)),
            gesture: Gesture::Idle, hovered: None, pointer: None,
            last_sample: None, pending: None, alive: true,
        }
    }

    pub fn catalog(&self) -> &ZoneCatalog { &self.catalog }
    pub fn config(&self) -> &SelectorConfig { &self.config }
    pub fn view(&self) -> &ViewTransform { &self.view }
    pub fn gesture(&self) -> &Gesture { &self.gesture }
    pub fn hovered(&self) -> Option<&ZoneId> { self.hovered.as_ref() }
    pub fn pointer(&self) -> Option<Ndc> { self.pointer }
    pub fn is_dragging(&self) -> bool { matches!(self.gesture, Gesture::Dragging { .. }) }
    pub fn is_alive(&self) -> bool { self.alive }

    pub fn set_click_threshold(&mut self, px: f32) { self.config.click_threshold_px = px.max(0.0); }

    /// Widget rectangle in pixels; drives NDC conversion and the camera aspect.
    pub fn set_viewport(&mut self, rect: Rect) {
        if rect.width() > 0.0 && rect.height() > 0.0 && rect != self.rect {
            self.rect = rect;
            self.view.set_aspect_from(rect);
        }
    }

    /// Back to mount-time state, keeping the viewport.
    pub fn reset(&mut self) {
        let rect = self.rect;
        self.view = ViewTransform::new(Camera::new(&self.config.camera));
        self.view.set_aspect_from(rect);
        self.gesture = Gesture::Idle;
        self.hovered = None;
        self.pointer = None;
        self.last_sample = None;
        self.pending = None;
    }

    pub fn set_catalog(&mut self, catalog: ZoneCatalog) {
        self.catalog = catalog;
        self.reset();
    }

    /// Stops everything; later events and ticks produce nothing.
    pub fn destroy(&mut self) {
        if !self.alive { return; }
        self.alive = false;
        self.pending = None;
        self.gesture = Gesture::Idle;
        self.hovered = None;
        debug!("interaction controller destroyed");
    }

    fn sample(&self, pos: Pos2) -> Option<ZoneId> {
        hit_test(Ndc::from_pixel(pos, self.rect), &self.view, self.catalog.list_zones())
    }

    fn set_hover(&mut self, zone: Option<ZoneId>, out: &mut Vec<ControllerEvent>) {
        if self.hovered != zone {
            debug!(zone = ?zone, "hover changed");
            self.hovered = zone.clone();
            out.push(ControllerEvent::HoverChanged(zone));
        }
    }

    /// Immediate, unthrottled hover sample.
    fn resample(&mut self, pos: Pos2, now: f64, out: &mut Vec<ControllerEvent>) {
        self.pending = None;
        self.last_sample = Some(now);
        let zone = self.sample(pos);
        self.set_hover(zone, out);
    }

    fn rotate_by(&mut self, dx: f32) {
        self.view.rotation_y += dx * self.config.drag_sensitivity;
    }

    fn past_threshold(&self, origin: Pos2, pos: Pos2) -> bool {
        origin.distance(pos) >= self.config.click_threshold_px
    }

    pub fn handle(&mut self, event: PointerEvent, now: f64) -> Vec<ControllerEvent> {
        let mut out = Vec::new();
        if !self.alive { return out; }
        match event {
            PointerEvent::Down(pos) => {
                self.pointer = Some(Ndc::from_pixel(pos, self.rect));
                self.resample(pos, now, &mut out);
                let pressed = self.hovered.clone();
                debug!(zone = ?pressed, "pointer down");
                self.gesture = Gesture::PossibleClick { origin: pos, pressed };
            }
            PointerEvent::Move(pos) => {
                self.pointer = Some(Ndc::from_pixel(pos, self.rect));
                match self.gesture.clone() {
                    Gesture::Idle | Gesture::Hovering => {
                        self.gesture = Gesture::Hovering;
                        let due = self.last_sample.map_or(true, |t| now - t >= self.config.hover_throttle_secs);
                        if due {
                            self.resample(pos, now, &mut out);
                        } else {
                            self.pending = Some(pos);
                        }
                    }
                    Gesture::PossibleClick { origin, .. } => {
                        if self.past_threshold(origin, pos) {
                            debug!("drag started");
                            self.rotate_by(pos.x - origin.x);
                            self.set_hover(None, &mut out);
                            self.gesture = Gesture::Dragging { last: pos };
                        }
                    }
                    Gesture::Dragging { last } => {
                        self.rotate_by(pos.x - last.x);
                        self.gesture = Gesture::Dragging { last: pos };
                    }
                }
            }
            PointerEvent::Up(pos) => {
                self.pointer = Some(Ndc::from_pixel(pos, self.rect));
                match std::mem::replace(&mut self.gesture, Gesture::Idle) {
                    Gesture::PossibleClick { origin, pressed } => {
                        if self.past_threshold(origin, pos) {
                            self.rotate_by(pos.x - origin.x);
                            self.resample(pos, now, &mut out);
                        } else if let Some(zone) = pressed {
                            info!(zone = %zone, "zone selected");
                            out.push(ControllerEvent::Commit(zone));
                        }
                    }
                    Gesture::Dragging { last } => {
                        self.rotate_by(pos.x - last.x);
                        debug!(rotation_y = self.view.rotation_y, "drag ended");
                        self.resample(pos, now, &mut out);
                    }
                    other => self.gesture = other,
                }
            }
            PointerEvent::Leave => {
                self.pointer = None;
                self.pending = None;
                self.gesture = Gesture::Idle;
                self.set_hover(None, &mut out);
            }
        }
        out
    }

    /// Once per animation frame: flushes a due hover sample, then auto-rotates if idle.
    pub fn tick(&mut self, now: f64) -> Vec<ControllerEvent> {
        let mut out = Vec::new();
        if !self.alive { return out; }
        if let Some(pos) = self.pending {
            if self.last_sample.map_or(true, |t| now - t >= self.config.hover_throttle_secs) {
                self.resample(pos, now, &mut out);
            }
        }
        if matches!(self.gesture, Gesture::Idle | Gesture::Hovering) && self.hovered.is_none() {
            self.view.rotation_y += self.config.auto_rotate_step;
        }
        out
    }
}
