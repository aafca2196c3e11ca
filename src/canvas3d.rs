// canvas3d.rs
use egui::{Color32, Event, FontId, Id, PointerButton, Pos2, Rect, Response, Sense, Shape, Stroke, Ui, Vec2};
use tracing::warn;

use crate::interaction::{ControllerEvent, Gesture, InteractionController, PointerEvent};
use crate::selection::{Palette, SelectionView};
use crate::zones::ZoneId;

const NEUTRAL_PROMPT: &str = "Select a placement zone";

/// Pointer bookkeeping that has to survive between egui events.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Bridge {
    /// Our own primary press is in progress.
    pressed: bool,
    inside: bool,
    /// Some button went down outside the widget (or wasn't ours) and is still held.
    foreign: bool,
}

/// Maps raw egui events, in arrival order, onto the widget rectangle.
/// Movement under a foreign press is neither hover nor drag, so it is dropped.
fn map_events(events: &[Event], rect: Rect, st: &mut Bridge) -> Vec<PointerEvent> {
    let mut out = Vec::new();
    for ev in events {
        match *ev {
            Event::PointerMoved(pos) => {
                if st.foreign { continue; }
                if st.pressed || rect.contains(pos) {
                    st.inside = true;
                    out.push(PointerEvent::Move(pos));
                } else if st.inside {
                    st.inside = false;
                    out.push(PointerEvent::Leave);
                }
            }
            Event::PointerButton { pos, button, pressed: down, .. } => {
                if down {
                    if button == PointerButton::Primary && !st.pressed && !st.foreign && rect.contains(pos) {
                        st.pressed = true;
                        out.push(PointerEvent::Down(pos));
                    } else if !st.pressed {
                        st.foreign = true;
                        if st.inside {
                            st.inside = false;
                            out.push(PointerEvent::Leave);
                        }
                    }
                } else if st.pressed && button == PointerButton::Primary {
                    st.pressed = false;
                    out.push(PointerEvent::Up(pos));
                } else if !st.pressed {
                    st.foreign = false;
                }
            }
            Event::PointerGone => {
                st.foreign = false;
                st.pressed = false;
                if st.inside {
                    st.inside = false;
                    out.push(PointerEvent::Leave);
                }
            }
            _ => {}
        }
    }
    out
}

fn pointer_events(ui: &Ui, id: Id, rect: Rect, controller: &InteractionController) -> Vec<PointerEvent> {
    let mut st = Bridge {
        pressed: matches!(controller.gesture(), Gesture::PossibleClick { .. } | Gesture::Dragging { .. }),
        inside: controller.pointer().is_some(),
        foreign: ui.ctx().data(|d| d.get_temp::<bool>(id)).unwrap_or(false),
    };
    let events = ui.input(|i| i.events.clone());
    let out = map_events(&events, rect, &mut st);
    ui.ctx().data_mut(|d| d.insert_temp(id, st.foreign));
    out
}

// Andrew's monotone chain; returns the hull counter-clockwise in screen space.
fn convex_hull(mut pts: Vec<Pos2>) -> Vec<Pos2> {
    if pts.len() < 3 { return pts; }
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    let cross = |o: Pos2, a: Pos2, b: Pos2| (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x);
    let mut hull: Vec<Pos2> = Vec::with_capacity(pts.len() * 2);
    for pass in 0..2 {
        let start = hull.len();
        let iter: Box<dyn Iterator<Item = &Pos2>> = if pass == 0 { Box::new(pts.iter()) } else { Box::new(pts.iter().rev()) };
        for &p in iter {
            while hull.len() >= start + 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();
    }
    hull
}

pub fn draw_zone_canvas(
    ui: &mut Ui, controller: &mut InteractionController, selected: Option<&ZoneId>,
    palette: &Palette, size: Vec2,
) -> (Response, Vec<ControllerEvent>) {
    let (resp, p) = ui.allocate_painter(size, Sense::click_and_drag());
    let dark = ui.visuals().dark_mode;
    p.rect_filled(resp.rect, 12.0, if dark { Color32::from_gray(14) } else { Color32::from_gray(70) });

    controller.set_viewport(resp.rect);
    let now = ui.input(|i| i.time);
    let mut events = Vec::new();
    for ev in pointer_events(ui, resp.id.with("foreign_press"), resp.rect, controller) {
        events.extend(controller.handle(ev, now));
    }
    events.extend(controller.tick(now));

    let view = controller.view();
    let selection = SelectionView::new(controller.catalog(), selected, controller.hovered());

    struct Draw { hull: Vec<Pos2>, depth: f32, fill: Color32 }
    let mut draws: Vec<Draw> = Vec::new();
    for zone in controller.catalog().list_zones() {
        let Some((_, depth)) = view.project(zone.position) else { continue };
        let pts: Vec<Pos2> = zone.outline_vertices().into_iter()
            .filter_map(|v| view.project(v))
            .map(|(ndc, _)| ndc.to_pixel(resp.rect))
            .collect();
        let state = match selection.visual_state_of(zone.id.as_str()) {
            Ok(s) => s,
            Err(e) => { warn!("{e}"); continue; }
        };
        draws.push(Draw { hull: convex_hull(pts), depth, fill: palette.fill(state, now) });
    }
    draws.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    let clip = p.with_clip_rect(resp.rect);
    for d in draws {
        clip.add(Shape::convex_polygon(d.hull, d.fill.gamma_multiply(0.92),
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(255, 255, 255, 40))));
    }

    // Overlay
    let faint = Color32::from_rgba_unmultiplied(200, 200, 200, 120);
    p.text(resp.rect.min + Vec2::new(12.0, 10.0), egui::Align2::LEFT_TOP, "HOLOGRAPHIC MODE",
        FontId::proportional(11.0), Color32::from_rgb(0x81, 0x8c, 0xf8));
    p.text(resp.rect.center_bottom() - Vec2::new(0.0, 48.0), egui::Align2::CENTER_BOTTOM,
        "Drag to rotate   ·   Click to select", FontId::proportional(11.0), faint);

    let label = match selection.formatted_selection_label() {
        Ok(l) => l,
        Err(e) => {
            debug_assert!(false, "host passed an unknown zone: {e}");
            warn!("{e}");
            None
        }
    };
    let anchor = resp.rect.center_bottom() - Vec2::new(0.0, 16.0);
    match label {
        Some(name) => {
            let galley = p.layout_no_wrap(format!("Target: {}", name.to_uppercase()),
                FontId::proportional(14.0), Color32::WHITE);
            let pill = Rect::from_center_size(anchor - Vec2::new(0.0, galley.size().y * 0.5),
                galley.size() + Vec2::new(28.0, 12.0));
            p.rect_filled(pill, pill.height() * 0.5, Color32::from_rgb(0x4f, 0x46, 0xe5));
            p.galley(pill.center() - galley.size() * 0.5, galley, Color32::WHITE);
        }
        None => {
            p.text(anchor, egui::Align2::CENTER_BOTTOM, NEUTRAL_PROMPT, FontId::proportional(13.0), faint);
        }
    }

    if resp.hovered() {
        ui.ctx().set_cursor_icon(match controller.gesture() {
            Gesture::Dragging { .. } => egui::CursorIcon::Grabbing,
            _ if controller.hovered().is_some() => egui::CursorIcon::PointingHand,
            _ => egui::CursorIcon::Grab,
        });
    }
    if controller.is_alive() { ui.ctx().request_repaint(); }
    (resp, events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hull_of_a_square_with_interior_points() {
        let pts = vec![
            Pos2::new(0.0, 0.0), Pos2::new(1.0, 0.0), Pos2::new(1.0, 1.0), Pos2::new(0.0, 1.0),
            Pos2::new(0.5, 0.5), Pos2::new(0.2, 0.7),
        ];
        let hull = convex_hull(pts);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&Pos2::new(0.5, 0.5)));
    }

    fn moved(x: f32, y: f32) -> Event { Event::PointerMoved(Pos2::new(x, y)) }

    fn button(x: f32, y: f32, button: PointerButton, pressed: bool) -> Event {
        Event::PointerButton { pos: Pos2::new(x, y), button, pressed, modifiers: egui::Modifiers::NONE }
    }

    fn widget() -> Rect { Rect::from_min_size(Pos2::new(100.0, 100.0), Vec2::new(200.0, 200.0)) }

    #[test]
    fn press_from_outside_dragged_in_is_not_hover() {
        let mut st = Bridge::default();
        let evs = [button(20.0, 20.0, PointerButton::Primary, true), moved(150.0, 150.0), moved(160.0, 150.0)];
        assert!(map_events(&evs, widget(), &mut st).is_empty());
        assert!(st.foreign);

        // Still held on the next frame: still ignored. Released: hover resumes.
        assert!(map_events(&[moved(170.0, 150.0)], widget(), &mut st).is_empty());
        let out = map_events(&[button(170.0, 150.0, PointerButton::Primary, false), moved(171.0, 150.0)],
            widget(), &mut st);
        assert_eq!(out, vec![PointerEvent::Move(Pos2::new(171.0, 150.0))]);
    }

    #[test]
    fn own_press_drags_outside_and_releases() {
        let mut st = Bridge::default();
        let evs = [moved(150.0, 150.0), button(150.0, 150.0, PointerButton::Primary, true),
            moved(400.0, 150.0), button(400.0, 150.0, PointerButton::Primary, false), moved(401.0, 150.0)];
        assert_eq!(map_events(&evs, widget(), &mut st), vec![
            PointerEvent::Move(Pos2::new(150.0, 150.0)),
            PointerEvent::Down(Pos2::new(150.0, 150.0)),
            PointerEvent::Move(Pos2::new(400.0, 150.0)),
            PointerEvent::Up(Pos2::new(400.0, 150.0)),
            PointerEvent::Leave,
        ]);
        assert!(!st.foreign && !st.pressed);
    }

    #[test]
    fn secondary_press_inside_ends_hover() {
        let mut st = Bridge::default();
        let evs = [moved(150.0, 150.0), button(150.0, 150.0, PointerButton::Secondary, true), moved(155.0, 150.0)];
        assert_eq!(map_events(&evs, widget(), &mut st),
            vec![PointerEvent::Move(Pos2::new(150.0, 150.0)), PointerEvent::Leave]);
    }

    #[test]
    fn hull_drops_collinear_points() {
        let pts = vec![Pos2::new(0.0, 0.0), Pos2::new(1.0, 0.0), Pos2::new(2.0, 0.0), Pos2::new(1.0, 1.0)];
        assert_eq!(convex_hull(pts).len(), 3);
    }
}
