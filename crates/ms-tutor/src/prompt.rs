//! Topics, tutor configuration, and prompt construction.

use std::fmt;

use ms_core::SimulationState;

use crate::{TutorError, TutorResult};

// ── Topic ─────────────────────────────────────────────────────────────────────

/// What the user asked about.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topic {
    /// How to pull away smoothly from where the car is now.
    Launch,
    /// What the clutch is doing right now.
    ClutchState,
    /// Why a gearbox exists and what a ratio means.
    GearRatios,
    /// Free-form question.
    Custom(String),
}

impl Topic {
    pub const PRESETS: [Topic; 3] = [Topic::Launch, Topic::ClutchState, Topic::GearRatios];

    /// The question text sent to the provider.
    pub fn question(&self) -> &str {
        match self {
            Topic::Launch      => "What should I do right now to pull away smoothly?",
            Topic::ClutchState => "Explain what the clutch is doing at the moment.",
            Topic::GearRatios  => "Why do I need to change gear? What is a gear ratio?",
            Topic::Custom(q)   => q,
        }
    }

    /// Short key for menus and logs.
    pub fn key(&self) -> &str {
        match self {
            Topic::Launch      => "launch",
            Topic::ClutchState => "clutch",
            Topic::GearRatios  => "gears",
            Topic::Custom(_)   => "custom",
        }
    }
}

/// Preset keys map to their preset; anything else is a custom question.
impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        match s.trim() {
            "launch" => Topic::Launch,
            "clutch" => Topic::ClutchState,
            "gears"  => Topic::GearRatios,
            other    => Topic::Custom(other.to_owned()),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.question())
    }
}

// ── TutorConfig ───────────────────────────────────────────────────────────────

/// Model selection and the fixed texts around every request.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TutorConfig {
    /// Provider-specific model identifier.
    pub model: String,

    /// Sent separately from the user prompt, as the provider's system role.
    pub system_instruction: String,

    /// Language the answer should be written in.
    pub language: String,

    /// Upper bound on answer length, in sentences.
    pub max_sentences: u32,

    /// Shown while a request is in flight and nothing has been answered yet.
    pub placeholder_text: String,

    /// Shown when the provider fails or returns nothing.
    pub fallback_text: String,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            model:              "gemini-2.5-flash".to_owned(),
            system_instruction: "You are a helpful mechanical engineering tutor. \
                                 Keep explanations technical but accessible."
                .to_owned(),
            language:           "English".to_owned(),
            max_sentences:      3,
            placeholder_text:   "The tutor is thinking...".to_owned(),
            fallback_text:      "Could not get an explanation. Check your network settings."
                .to_owned(),
        }
    }
}

impl TutorConfig {
    pub fn validate(&self) -> TutorResult<()> {
        if self.model.trim().is_empty() {
            return Err(TutorError::Config("model must not be empty".into()));
        }
        if self.language.trim().is_empty() {
            return Err(TutorError::Config("language must not be empty".into()));
        }
        if self.max_sentences == 0 {
            return Err(TutorError::Config("max_sentences must be at least 1".into()));
        }
        if self.fallback_text.trim().is_empty() {
            return Err(TutorError::Config("fallback_text must not be empty".into()));
        }
        Ok(())
    }
}

// ── Prompt ────────────────────────────────────────────────────────────────────

/// One fully rendered request.
///
/// Carries its own copy of the state it describes; the simulation may have
/// moved on by the time the provider answers.
#[derive(Clone, Debug, PartialEq)]
pub struct Prompt {
    pub model: String,
    pub system: String,
    pub user: String,
    pub topic: Topic,
    pub state: SimulationState,
}

impl Prompt {
    pub fn build(topic: Topic, state: SimulationState, config: &TutorConfig) -> Self {
        let user = render(&topic, &state, config);
        Self {
            model: config.model.clone(),
            system: config.system_instruction.clone(),
            user,
            topic,
            state,
        }
    }
}

fn render(topic: &Topic, s: &SimulationState, config: &TutorConfig) -> String {
    let status = if s.engine_on { "Running" } else { "Off" };
    let stalled = if s.is_stalled { "YES" } else { "No" };
    let clutch_pct = (s.clutch_pedal.value() * 100.0).round();

    format!(
        "You are an expert automotive engineering instructor. \
         The user is driving a manual transmission simulator.\n\
         \n\
         Current simulation state:\n\
         - Engine Status: {status}\n\
         - RPM: {rpm}\n\
         - Speed: {speed} km/h\n\
         - Gear: {gear}\n\
         - Clutch Pedal: {clutch_pct}% pressed (100% means engine disconnected from wheels)\n\
         - Stalled: {stalled}\n\
         \n\
         User question: \"{question}\"\n\
         \n\
         Explain the physics and mechanics concisely (at most {n} sentences). \
         Focus on how the engine (power source), clutch (coupling), and \
         transmission (torque multiplication) are interacting right now. \
         Use simple analogies. Answer in {language}.",
        rpm = s.rpm.round(),
        speed = s.speed_kmh.round(),
        gear = s.gear,
        question = topic.question(),
        n = config.max_sentences,
        language = config.language,
    )
}
