// canned.rs — offline generative service. Deterministic answers so the studio runs without a network.
use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::BoxFuture;
use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::json;

use crate::studio::{GenerationError, GenerationRequest, Generated, GenerativeService, OutputKind};

const HOURLY_RATE: f32 = 150.0;
const STENCIL_SIZE: u32 = 256;

#[derive(Clone, Debug, Default)]
pub struct CannedService {
    offline: bool,
}

impl CannedService {
    pub fn new() -> Self { Self::default() }

    /// A service that refuses every request, for exercising fallbacks.
    pub fn unavailable() -> Self { Self { offline: true } }

    fn respond(&self, req: &GenerationRequest) -> Result<Generated, GenerationError> {
        if self.offline {
            return Err(GenerationError::Service("canned service is offline".into()));
        }
        Ok(match req.kind {
            OutputKind::Image => Generated::Image { mime: "image/png".into(), base64: stencil_png(&req.prompt)? },
            OutputKind::Text if req.json => Generated::Text(report_json(&req.prompt)),
            OutputKind::Text => Generated::Text(describe(&req.prompt)),
        })
    }
}

impl GenerativeService for CannedService {
    fn generate(&self, request: GenerationRequest) -> BoxFuture<'_, Result<Generated, GenerationError>> {
        Box::pin(futures::future::ready(self.respond(&request)))
    }
}

/// First double-quoted span of the prompt, which is where the client's words go.
fn quoted(prompt: &str) -> Option<&str> {
    let start = prompt.find('"')? + 1;
    let len = prompt[start..].find('"')?;
    Some(&prompt[start..start + len]).filter(|s| !s.trim().is_empty())
}

fn seed(text: &str) -> u64 {
    // FNV-1a
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |h, b| (h ^ b as u64).wrapping_mul(0x100_0000_01b3))
}

fn describe(prompt: &str) -> String {
    match quoted(prompt) {
        Some(idea) => format!("{idea}, drawn in bold single-weight linework with generous negative space; \
            a crisp silhouette that reads from across the room and ages cleanly on skin."),
        None => "A resident artist known for clean lines, steady hands and patient consultations.".into(),
    }
}

fn report_json(prompt: &str) -> String {
    let idea = quoted(prompt).unwrap_or("");
    let words = idea.split_whitespace().count() as f32;
    let hours = (2.0 + words / 4.0).clamp(1.0, 10.0).round();
    json!({
        "estimatedHours": hours,
        "priceMin": hours * HOURLY_RATE,
        "priceMax": (hours * HOURLY_RATE * 1.3).round(),
        "technicalNotes": "Keep linework open so it heals without blowouts; plan the layout around how the skin moves.",
    })
    .to_string()
}

/// Concentric rings and spokes, varied by the prompt, in black on white.
fn stencil_png(prompt: &str) -> Result<String, GenerationError> {
    let s = seed(prompt);
    let rings = 2 + (s % 4) as u32;
    let spokes = 5 + ((s >> 8) % 7) as u32;
    let c = STENCIL_SIZE as f32 / 2.0;
    let mut img = RgbaImage::from_pixel(STENCIL_SIZE, STENCIL_SIZE, Rgba([255, 255, 255, 255]));
    for (x, y, px) in img.enumerate_pixels_mut() {
        let (dx, dy) = (x as f32 - c, y as f32 - c);
        let r = (dx * dx + dy * dy).sqrt();
        if r > c - 8.0 { continue; }
        let band = c / (rings as f32 + 1.0);
        let on_ring = (r % band) < 2.5 && r > band * 0.5;
        let a = dy.atan2(dx).rem_euclid(std::f32::consts::TAU);
        let sector = std::f32::consts::TAU / spokes as f32;
        let on_spoke = r > band && (a % sector) * r < 2.0;
        if on_ring || on_spoke { *px = Rgba([0, 0, 0, 255]); }
    }
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| GenerationError::Decode(e.to_string()))?;
    Ok(STANDARD.encode(buf))
}
