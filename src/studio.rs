// studio.rs — generative design capability and the studio steps built on it.
//
// The service is injected; nothing here retries. Every helper turns a failure into the
// placeholder the studio screen shows instead, and logs why.
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::warn;

const ARTIST_SYSTEM_INSTRUCTION: &str = "Act as a veteran tattoo artist with 20 years of experience. \
Interpret client ideas into technical line-art or stencil descriptions. You value clean lines, high \
contrast, and anatomical flow. Avoid photorealism; focus on how the ink should look on skin.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind { Text, Image }

#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub kind: OutputKind,
    pub prompt: String,
    pub system_instruction: Option<String>,
    /// Ask for a JSON document instead of prose.
    pub json: bool,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self { kind: OutputKind::Text, prompt: prompt.into(), system_instruction: None, json: false }
    }
    pub fn image(prompt: impl Into<String>) -> Self {
        Self { kind: OutputKind::Image, ..Self::text(prompt) }
    }
    pub fn with_system(mut self, s: &str) -> Self { self.system_instruction = Some(s.to_string()); self }
    pub fn as_json(mut self) -> Self { self.json = true; self }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Generated {
    Text(String),
    Image { mime: String, base64: String },
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation service failed: {0}")]
    Service(String),
    #[error("service returned no content")]
    Empty,
    #[error("expected {expected:?} output")]
    WrongKind { expected: OutputKind },
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("could not decode image: {0}")]
    Decode(String),
}

/// Given a prompt, eventually yields text or an image, or says it could not.
pub trait GenerativeService: Send + Sync {
    fn generate(&self, request: GenerationRequest) -> BoxFuture<'_, Result<Generated, GenerationError>>;
}

async fn text(svc: &dyn GenerativeService, req: GenerationRequest) -> Result<String, GenerationError> {
    match svc.generate(req).await? {
        Generated::Text(t) if t.trim().is_empty() => Err(GenerationError::Empty),
        Generated::Text(t) => Ok(t.trim().to_string()),
        Generated::Image { .. } => Err(GenerationError::WrongKind { expected: OutputKind::Text }),
    }
}

pub async fn concept_description(svc: &dyn GenerativeService, idea: &str) -> String {
    let prompt = format!("Generate a vivid, artistic description of a tattoo design based on this \
        request: \"{idea}\". Keep it under 50 words. Focus on visual elements.");
    text(svc, GenerationRequest::text(prompt)).await.unwrap_or_else(|e| {
        warn!("concept description: {e}");
        "Could not generate concept.".into()
    })
}

pub async fn artist_bio(svc: &dyn GenerativeService, name: &str, styles: &[String], location: &str) -> String {
    let prompt = format!("Write a creative, professional, and unique tattoo artist biography for {name} \
        based in {location}. They specialize in: {}. Keep it under 60 words. Tone: artistic, modern, \
        and inviting.", styles.join(", "));
    text(svc, GenerationRequest::text(prompt)).await.unwrap_or_else(|e| {
        warn!("artist bio: {e}");
        "Biography temporarily unavailable.".into()
    })
}

/// A decoded stencil image, kept alongside its original encoding.
#[derive(Clone, Debug)]
pub struct Stencil {
    pub mime: String,
    pub encoded: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Stencil {
    pub fn from_base64(mime: &str, b64: &str) -> Result<Self, GenerationError> {
        let encoded = STANDARD.decode(b64.trim()).map_err(|e| GenerationError::Decode(e.to_string()))?;
        let img = image::load_from_memory(&encoded)
            .map_err(|e| GenerationError::Decode(e.to_string()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self { mime: mime.to_string(), encoded, width, height, rgba: img.into_raw() })
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.encoded))
    }
}

pub fn stencil_prompt(concept: &str, placement: Option<&str>) -> String {
    format!("Create a professional tattoo stencil design.\n\
        Subject: {concept}\n\
        Placement context: to be placed on the {}.\n\
        Style: high contrast black and white line art. Clean outlines. No shading, no grey wash.\n\
        Background: pure white.\n\
        Aesthetic: minimalist, crisp, ready for thermal transfer.", placement.unwrap_or("body"))
}

pub async fn tattoo_stencil(svc: &dyn GenerativeService, concept: &str, placement: Option<&str>) -> Option<Stencil> {
    let result = match svc.generate(GenerationRequest::image(stencil_prompt(concept, placement))).await {
        Ok(Generated::Image { mime, base64 }) => Stencil::from_base64(&mime, &base64),
        Ok(Generated::Text(_)) => Err(GenerationError::WrongKind { expected: OutputKind::Image }),
        Err(e) => Err(e),
    };
    result.map_err(|e| warn!("stencil generation: {e}")).ok()
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    pub estimated_hours: f32,
    pub price_min: f32,
    pub price_max: f32,
    pub technical_notes: String,
}

impl ProjectReport {
    pub fn fallback(notes: &str) -> Self {
        Self { estimated_hours: 3.0, price_min: 450.0, price_max: 600.0, technical_notes: notes.into() }
    }

    pub fn parse(text: &str) -> Result<Self, GenerationError> {
        // Models like to wrap JSON in a fenced block.
        let body = text.trim().trim_start_matches("```json").trim_start_matches("```").trim_end_matches("```");
        Ok(serde_json::from_str(body.trim())?)
    }
}

pub async fn project_report(svc: &dyn GenerativeService, concept: &str, placement: Option<&str>) -> ProjectReport {
    let prompt = format!("Analyze this tattoo project.\nRequest: \"{concept}\"\nZone: \"{}\"\n\
        Output JSON with:\n- estimatedHours (number)\n- priceMin (number, assuming $150/hr base)\n\
        - priceMax (number)\n- technicalNotes (string, advice for the artist regarding this placement \
        and design)", placement.unwrap_or("skin"));
    let req = GenerationRequest::text(prompt).with_system(ARTIST_SYSTEM_INSTRUCTION).as_json();
    match text(svc, req).await {
        Ok(body) => ProjectReport::parse(&body).unwrap_or_else(|e| {
            warn!("project report: {e}");
            ProjectReport::fallback("Consult artist.")
        }),
        Err(GenerationError::Empty) => ProjectReport::fallback("Consult artist."),
        Err(e) => {
            warn!("project report: {e}");
            ProjectReport::fallback("Error generating estimates.")
        }
    }
}

/// Everything one "Generate" press produces.
#[derive(Clone, Debug)]
pub struct StudioOutcome {
    pub description: String,
    pub stencil: Option<Stencil>,
    pub report: ProjectReport,
}

/// Runs the three studio requests; stencil and report go out together.
pub async fn run_studio(svc: &dyn GenerativeService, concept: &str, placement: Option<&str>) -> StudioOutcome {
    let description = concept_description(svc, concept).await;
    let (stencil, report) = futures::join!(
        tattoo_stencil(svc, concept, placement),
        project_report(svc, concept, placement)
    );
    StudioOutcome { description, stencil, report }
}
