//! PC game recommender front end.
//!
//! Builds the `/api/recommend` request from a preset or explicit specs and
//! turns the server's response into display-ready cards. Scoring happens on
//! the server; this module only classifies and filters what comes back.

use anyhow::Result;

use crate::client::{GameResult, RecommendBackend, RecommendResponse, SpecRequest, UserSpecs};

/// Shown when the server returns no results.
pub const NO_MATCHES: &str = "No matching games found for your specs.";

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Canned hardware tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Low,
    Mid,
    High,
}

impl Preset {
    pub fn parse(val: &str) -> Option<Self> {
        match val.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "mid" | "medium" => Some(Self::Mid),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn specs(self) -> SpecRequest {
        let (cpu, gpu, ram) = match self {
            Self::Low => ("i3-8100", "GTX 1050", "8"),
            Self::Mid => ("i5-10400", "GTX 1660", "16"),
            Self::High => ("Ryzen 7 3700X", "RTX 3070", "32"),
        };
        SpecRequest {
            cpu: cpu.to_string(),
            gpu: gpu.to_string(),
            ram: ram.to_string(),
        }
    }
}

/// Start from `preset` (or blank) and override individual fields.
pub fn build_request(
    preset: Option<Preset>,
    cpu: Option<String>,
    gpu: Option<String>,
    ram: Option<String>,
) -> SpecRequest {
    let mut specs = preset.map(Preset::specs).unwrap_or_default();
    if let Some(cpu) = cpu {
        specs.cpu = cpu;
    }
    if let Some(gpu) = gpu {
        specs.gpu = gpu;
    }
    if let Some(ram) = ram {
        specs.ram = ram;
    }
    specs
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// How well the hardware meets a game's requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreClass {
    Good,
    Ok,
    Poor,
}

impl ScoreClass {
    pub fn from_score(score: f64) -> Self {
        if score >= 1.0 {
            Self::Good
        } else if score >= 0.7 {
            Self::Ok
        } else {
            Self::Poor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Ok => "ok",
            Self::Poor => "poor",
        }
    }
}

/// Score as a percentage, clamped to `0..=120`.
pub fn score_percent(score: f64) -> u32 {
    if score.is_nan() {
        return 0;
    }
    (score * 100.0).round().clamp(0.0, 120.0) as u32
}

/// A display-ready game card.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: String,
    pub genre: String,
    pub score: f64,
    pub class: ScoreClass,
    pub percent: u32,
    /// `CPU x • GPU y • RAM zGB`
    pub minimum: String,
    pub recommended: String,
}

impl Card {
    fn from_result(result: &GameResult) -> Self {
        Self {
            title: result.title.clone(),
            genre: result.genre.clone().unwrap_or_default(),
            score: result.score,
            class: ScoreClass::from_score(result.score),
            percent: score_percent(result.score),
            minimum: spec_line(
                &result.minimum_specs.cpu,
                &result.minimum_specs.gpu,
                &result.minimum_specs.ram,
            ),
            recommended: spec_line(
                &result.recommended_specs.cpu,
                &result.recommended_specs.gpu,
                &result.recommended_specs.ram,
            ),
        }
    }
}

/// What to show for a recommend response.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// Server-provided error, shown verbatim.
    Error(String),
    /// No results at all.
    NoMatches,
    Cards {
        /// `CPU: a, GPU: b, RAM: cGB`
        header: String,
        cards: Vec<Card>,
        /// Distinct genres across all results, in first-seen order.
        genres: Vec<String>,
    },
}

/// Turn a response into cards, applying the preferred genre.
///
/// A preferred genre other than `any` keeps only matching results
/// (case-insensitive). If none match, every result is shown.
pub fn render(response: &RecommendResponse, preferred_genre: Option<&str>) -> Rendered {
    if let Some(error) = &response.error {
        return Rendered::Error(error.clone());
    }
    if response.results.is_empty() {
        return Rendered::NoMatches;
    }

    let mut filtered: Vec<&GameResult> = response.results.iter().collect();
    if let Some(wanted) = preferred_genre.filter(|g| !g.is_empty() && !g.eq_ignore_ascii_case("any"))
    {
        let matching: Vec<&GameResult> = response
            .results
            .iter()
            .filter(|r| r.genre.as_deref().unwrap_or("").eq_ignore_ascii_case(wanted))
            .collect();
        if !matching.is_empty() {
            filtered = matching;
        }
    }

    let mut genres: Vec<String> = Vec::new();
    for genre in response
        .results
        .iter()
        .filter_map(|r| r.genre.as_deref())
        .map(str::trim)
        .filter(|g| !g.is_empty())
    {
        if !genres.iter().any(|g| g == genre) {
            genres.push(genre.to_string());
        }
    }

    Rendered::Cards {
        header: header_line(response.user_specs.as_ref()),
        cards: filtered.into_iter().map(Card::from_result).collect(),
        genres,
    }
}

/// Post `specs` and render the response.
pub fn recommend<B: RecommendBackend + ?Sized>(
    backend: &mut B,
    specs: &SpecRequest,
    preferred_genre: Option<&str>,
) -> Result<Rendered> {
    let response = backend.recommend(specs)?;
    Ok(render(&response, preferred_genre))
}

fn header_line(specs: Option<&UserSpecs>) -> String {
    let default = UserSpecs::default();
    let specs = specs.unwrap_or(&default);
    format!(
        "CPU: {}, GPU: {}, RAM: {}GB",
        display_value(&specs.cpu_score),
        display_value(&specs.gpu_score),
        display_value(&specs.ram_gb)
    )
}

fn spec_line(cpu: &serde_json::Value, gpu: &serde_json::Value, ram: &serde_json::Value) -> String {
    format!(
        "CPU {} • GPU {} • RAM {}GB",
        display_value(cpu),
        display_value(gpu),
        display_value(ram)
    )
}

/// Render a JSON scalar without quotes.
fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "?".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn score_class_thresholds() {
        assert_eq!(ScoreClass::from_score(1.0), ScoreClass::Good);
        assert_eq!(ScoreClass::from_score(1.4), ScoreClass::Good);
        assert_eq!(ScoreClass::from_score(0.7), ScoreClass::Ok);
        assert_eq!(ScoreClass::from_score(0.69), ScoreClass::Poor);
    }

    #[test]
    fn score_percent_is_clamped() {
        assert_eq!(score_percent(0.86), 86);
        assert_eq!(score_percent(2.0), 120);
        assert_eq!(score_percent(-0.3), 0);
        assert_eq!(score_percent(f64::NAN), 0);
    }

    #[test]
    fn build_request_overrides_preset_fields() {
        let specs = build_request(Some(Preset::Mid), None, Some("RTX 4060".into()), None);
        assert_eq!(specs.cpu, "i5-10400");
        assert_eq!(specs.gpu, "RTX 4060");
        assert_eq!(specs.ram, "16");

        let blank = build_request(None, None, None, Some("8".into()));
        assert_eq!(blank.cpu, "");
        assert_eq!(blank.ram, "8");
    }

    #[test]
    fn preset_parse() {
        assert_eq!(Preset::parse("HIGH"), Some(Preset::High));
        assert_eq!(Preset::parse("medium"), Some(Preset::Mid));
        assert_eq!(Preset::parse("ultra"), None);
        assert_eq!(Preset::High.specs().gpu, "RTX 3070");
    }

    #[test]
    fn display_value_strips_quotes() {
        assert_eq!(display_value(&json!("i5")), "i5");
        assert_eq!(display_value(&json!(16)), "16");
        assert_eq!(display_value(&json!(null)), "?");
    }
}
