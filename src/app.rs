use egui::{CentralPanel, Context, RichText, ScrollArea, SidePanel, TextureHandle, TopBottomPanel};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use tracing::{info, warn};

use crate::config::{get_app_dir, SelectorConfig};
use crate::studio::{run_studio, GenerativeService, StudioOutcome};
use crate::widget::BodySelector;
use crate::zones::{ZoneCatalog, ZoneId};

fn draft_file() -> PathBuf { get_app_dir().join("inkzone_draft.json") }
fn theme_file() -> PathBuf { get_app_dir().join("inkzone_theme.json") }

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct ThemePref { dark_mode: bool }

impl ThemePref {
    fn load() -> Option<Self> {
        std::fs::read_to_string(theme_file()).ok().and_then(|s| serde_json::from_str(&s).ok())
    }

    fn store(&self) {
        let _ = std::fs::create_dir_all(get_app_dir());
        match serde_json::to_string(self) {
            Ok(j) => if let Err(e) = std::fs::write(theme_file(), j) { warn!("could not save theme: {e}"); },
            Err(e) => warn!("could not encode theme: {e}"),
        }
    }
}

/// Work in progress, restored on the next launch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(default)] pub concept: String,
    #[serde(default)] pub zone:    Option<ZoneId>,
}

impl Draft {
    fn load() -> Self {
        std::fs::read_to_string(draft_file()).ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    fn store(&self) {
        let dir = get_app_dir();
        if let Err(e) = std::fs::create_dir_all(&dir) { warn!("cannot create {}: {e}", dir.display()); return; }
        match serde_json::to_string_pretty(self) {
            Ok(j) => if let Err(e) = std::fs::write(draft_file(), j) { warn!("could not save draft: {e}"); },
            Err(e) => warn!("could not encode draft: {e}"),
        }
    }

    /// A zone the current figure doesn't have is dropped.
    fn restore_against(mut self, catalog: &ZoneCatalog) -> Self {
        if self.zone.as_ref().is_some_and(|z| !catalog.contains(z.as_str())) {
            warn!(zone = ?self.zone, "draft zone not in catalog; clearing it");
            self.zone = None;
        }
        self
    }
}

struct StudioResults {
    description: String,
    stencil:     Option<TextureHandle>,
    report:      crate::studio::ProjectReport,
}

pub struct InkZoneApp {
    selector:       BodySelector,
    catalog:        ZoneCatalog,
    service:        Arc<dyn GenerativeService>,
    draft:          Draft,
    saved_draft:    Draft,
    results:        Option<StudioResults>,
    pending:        Option<mpsc::Receiver<StudioOutcome>>,
    dark_mode:      bool,
    status_message: String,
    status_timer:   f32,
}

impl InkZoneApp {
    pub fn new(cc: &eframe::CreationContext<'_>, catalog: ZoneCatalog, config: SelectorConfig,
               service: Arc<dyn GenerativeService>) -> Self {
        let dark_mode = ThemePref::load().map_or(true, |t| t.dark_mode);
        cc.egui_ctx.set_theme(if dark_mode { egui::Theme::Dark } else { egui::Theme::Light });
        let draft = Draft::load().restore_against(&catalog);
        Self {
            selector: BodySelector::create(catalog.clone(), config),
            catalog, service,
            saved_draft: draft.clone(), draft,
            results: None, pending: None, dark_mode,
            status_message: String::new(), status_timer: 0.0,
        }
    }

    pub fn set_status(&mut self, msg: &str, dur: f32) {
        self.status_message = msg.to_string(); self.status_timer = dur;
    }

    fn placement(&self) -> Option<String> {
        let zone = self.draft.zone.as_ref()?;
        self.catalog.display_name(zone.as_str()).ok()
    }

    fn start_generation(&mut self, ctx: &Context) {
        let concept = self.draft.concept.trim().to_string();
        if concept.is_empty() { self.set_status("Describe the idea first", 2.0); return; }
        let (tx, rx) = mpsc::channel();
        let (service, placement, ctx) = (self.service.clone(), self.placement(), ctx.clone());
        info!(zone = ?self.draft.zone, "generating design");
        std::thread::spawn(move || {
            let outcome = futures::executor::block_on(run_studio(service.as_ref(), &concept, placement.as_deref()));
            // The receiver is gone if the app closed mid-request.
            let _ = tx.send(outcome);
            ctx.request_repaint();
        });
        self.pending = Some(rx);
    }

    fn poll_generation(&mut self, ctx: &Context) {
        let Some(rx) = &self.pending else { return };
        match rx.try_recv() {
            Ok(outcome) => {
                self.pending = None;
                let stencil = outcome.stencil.map(|s| ctx.load_texture("stencil",
                    egui::ColorImage::from_rgba_unmultiplied([s.width as usize, s.height as usize], &s.rgba),
                    egui::TextureOptions::LINEAR));
                if stencil.is_none() { self.set_status("Stencil unavailable", 3.0); }
                self.results = Some(StudioResults { description: outcome.description, stencil, report: outcome.report });
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                warn!("generation worker vanished");
                self.pending = None;
                self.set_status("Generation failed", 3.0);
            }
        }
    }

    fn studio_panel(&mut self, ui: &mut egui::Ui, ctx: &Context) {
        ui.add_space(8.0);
        ui.heading("Concept");
        ui.add(egui::TextEdit::multiline(&mut self.draft.concept).desired_rows(4)
            .desired_width(f32::INFINITY).hint_text("e.g. A fox curled around a crescent moon"));
        ui.add_space(6.0);
        let placement = self.placement();
        ui.label(RichText::new(format!("Placement: {}", placement.as_deref().unwrap_or("not chosen"))).weak());
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let busy = self.pending.is_some();
            if ui.add_enabled(!busy, egui::Button::new("✨ Generate")).clicked() { self.start_generation(ctx); }
            if busy { ui.spinner(); }
            if ui.button("Clear").clicked() {
                self.draft = Draft::default();
                self.results = None;
            }
        });
        ui.separator();

        let Some(res) = &self.results else { return };
        ScrollArea::vertical().show(ui, |ui| {
            ui.label(RichText::new("Design").strong());
            ui.label(&res.description);
            ui.add_space(8.0);
            if let Some(tex) = &res.stencil {
                let w = ui.available_width().min(320.0);
                ui.add(egui::Image::new(tex).fit_to_exact_size(egui::vec2(w, w)));
            }
            ui.add_space(8.0);
            ui.label(RichText::new("Estimate").strong());
            let r = &res.report;
            ui.label(format!("{:.1} h  ·  ${:.0} – ${:.0}", r.estimated_hours, r.price_min, r.price_max));
            ui.label(RichText::new(&r.technical_notes).italics());
        });
    }
}

impl eframe::App for InkZoneApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_generation(ctx);

        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.add_space(8.0);
                ui.label(RichText::new("InkZone Studio").strong().size(16.0));
                ui.add_space(12.0);
                if !self.status_message.is_empty() { ui.label(RichText::new(&self.status_message).weak()); }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(8.0);
                    if ui.button(if self.dark_mode { "☀ Light" } else { "🌙 Dark" }).clicked() {
                        self.dark_mode = !self.dark_mode;
                        ctx.set_theme(if self.dark_mode { egui::Theme::Dark } else { egui::Theme::Light });
                        ThemePref { dark_mode: self.dark_mode }.store();
                    }
                });
            });
            ui.add_space(4.0);
        });

        SidePanel::left("studio").min_width(320.0).max_width(460.0).show(ctx, |ui| {
            self.studio_panel(ui, ctx);
        });

        CentralPanel::default().show(ctx, |ui| {
            let size = ui.available_size();
            let selected = self.draft.zone.clone();
            let mut picked = None;
            self.selector.show(ui, size, selected.as_ref(), |z| picked = Some(z.clone()));
            if let Some(z) = picked {
                info!(zone = %z, "placement chosen");
                self.draft.zone = Some(z);
            }
        });

        if self.draft != self.saved_draft {
            self.draft.store();
            self.saved_draft = self.draft.clone();
        }

        if self.status_timer > 0.0 {
            self.status_timer -= ctx.input(|i| i.stable_dt);
            if self.status_timer <= 0.0 { self.status_message.clear(); }
            ctx.request_repaint();
        }
    }
}
