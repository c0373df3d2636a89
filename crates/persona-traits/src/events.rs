//! Event payloads that drive trait evolution.
//!
//! Each payload names a category looked up in the rule tables and carries
//! the numbers that scale the table's base deltas. Every payload
//! deserializes from the camelCase JSON callers send, with `type` as the
//! category key.

use serde::{Deserialize, Serialize};

/// Intensity assumed when an experience does not state one.
pub const DEFAULT_INTENSITY: f64 = 0.5;

/// Duration assumed when an experience or interaction does not state one.
pub const DEFAULT_DURATION: f64 = 1.0;

/// Intimacy assumed when a social interaction does not state one.
pub const DEFAULT_INTIMACY: f64 = 0.5;

/// Scale applied to every social interaction on top of intimacy and duration.
pub const SOCIAL_DAMPING: f64 = 0.1;

const fn default_intensity() -> f64 {
    DEFAULT_INTENSITY
}

const fn default_duration() -> f64 {
    DEFAULT_DURATION
}

const fn default_intimacy() -> f64 {
    DEFAULT_INTIMACY
}

// ---------------------------------------------------------------------------
// Experience
// ---------------------------------------------------------------------------

/// A cultural value the character was steeped in during an experience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalInfluence {
    /// Key into the cultural table (e.g. `"honor"`).
    pub value: String,
    /// How strongly the value applied, in `[0, 1]`.
    pub strength: f64,
}

/// Something the character lived through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    /// Experience category (e.g. `"combat"`).
    #[serde(rename = "type")]
    pub category: String,
    /// How intense it was.
    #[serde(default = "default_intensity")]
    pub intensity: f64,
    /// How long it lasted, in caller-defined units.
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Cultural values that colour how the experience lands.
    #[serde(default)]
    pub cultural_context: Vec<CulturalInfluence>,
}

impl Experience {
    /// An experience at default intensity and duration.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            intensity: DEFAULT_INTENSITY,
            duration: DEFAULT_DURATION,
            cultural_context: Vec::new(),
        }
    }

    /// Set the intensity.
    #[must_use]
    pub const fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    /// Set the duration.
    #[must_use]
    pub const fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Add a cultural value.
    #[must_use]
    pub fn with_cultural_value(mut self, value: impl Into<String>, strength: f64) -> Self {
        self.cultural_context.push(CulturalInfluence {
            value: value.into(),
            strength,
        });
        self
    }

    /// `intensity × duration`.
    pub const fn multiplier(&self) -> f64 {
        self.intensity * self.duration
    }
}

// ---------------------------------------------------------------------------
// Historical event
// ---------------------------------------------------------------------------

/// How far an event's consequences reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventScale {
    /// A village or district.
    Local,
    /// A province or region.
    Regional,
    /// A whole realm.
    National,
    /// The known world.
    Global,
}

impl EventScale {
    /// Multiplier for this scale.
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Local => 0.5,
            Self::Regional => 0.75,
            Self::National => 1.0,
            Self::Global => 1.25,
        }
    }
}

/// How central the character was to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleImportance {
    /// A bystander.
    Minor,
    /// A participant.
    Moderate,
    /// A leading figure.
    Major,
    /// The figure the event turned on.
    Pivotal,
}

impl RoleImportance {
    /// Multiplier for this role.
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Minor => 0.5,
            Self::Moderate => 0.75,
            Self::Major => 1.0,
            Self::Pivotal => 1.5,
        }
    }
}

/// A world event the character took part in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEvent {
    /// Event category (e.g. `"war"`).
    #[serde(rename = "type")]
    pub category: String,
    /// Reach of the event.
    pub scale: EventScale,
    /// The character's part in it.
    pub role: RoleImportance,
}

impl HistoricalEvent {
    /// Create a historical event.
    pub fn new(category: impl Into<String>, scale: EventScale, role: RoleImportance) -> Self {
        Self {
            category: category.into(),
            scale,
            role,
        }
    }

    /// `scale × role`.
    pub const fn multiplier(&self) -> f64 {
        self.scale.multiplier() * self.role.multiplier()
    }
}

// ---------------------------------------------------------------------------
// Trauma
// ---------------------------------------------------------------------------

/// A traumatic event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trauma {
    /// Trauma category (e.g. `"grief"`).
    #[serde(rename = "type")]
    pub category: String,
    /// Severity in `[0, 1]`; values outside are clamped.
    pub severity: f64,
}

impl Trauma {
    /// Create a trauma.
    pub fn new(category: impl Into<String>, severity: f64) -> Self {
        Self {
            category: category.into(),
            severity,
        }
    }

    /// Severity clamped into `[0, 1]`. NaN counts as zero.
    pub fn multiplier(&self) -> f64 {
        if self.severity.is_nan() {
            0.0
        } else {
            self.severity.clamp(0.0, 1.0)
        }
    }
}

// ---------------------------------------------------------------------------
// Social interaction
// ---------------------------------------------------------------------------

/// An exchange with another character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialInteraction {
    /// Interaction type (e.g. `"mentorship"`).
    #[serde(rename = "type")]
    pub interaction_type: String,
    /// How it went (e.g. `"positive"`).
    pub outcome: String,
    /// Closeness of the relationship, in `[0, 1]`.
    #[serde(default = "default_intimacy")]
    pub intimacy: f64,
    /// How long it lasted, in caller-defined units.
    #[serde(default = "default_duration")]
    pub duration: f64,
}

impl SocialInteraction {
    /// An interaction at default intimacy and duration.
    pub fn new(interaction_type: impl Into<String>, outcome: impl Into<String>) -> Self {
        Self {
            interaction_type: interaction_type.into(),
            outcome: outcome.into(),
            intimacy: DEFAULT_INTIMACY,
            duration: DEFAULT_DURATION,
        }
    }

    /// Set the intimacy.
    #[must_use]
    pub const fn with_intimacy(mut self, intimacy: f64) -> Self {
        self.intimacy = intimacy;
        self
    }

    /// Set the duration.
    #[must_use]
    pub const fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// `intimacy × duration × 0.1`.
    pub const fn multiplier(&self) -> f64 {
        self.intimacy * self.duration * SOCIAL_DAMPING
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn experience_defaults_apply_when_omitted() {
        let experience: Experience = serde_json::from_value(json!({"type": "combat"})).unwrap();
        assert_eq!(experience, Experience::new("combat"));
        assert!((experience.multiplier() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn historical_multiplier_tables() {
        let event = HistoricalEvent::new("war", EventScale::Global, RoleImportance::Pivotal);
        assert!((event.multiplier() - 1.875).abs() < f64::EPSILON);

        let event: HistoricalEvent = serde_json::from_value(
            json!({"type": "plague", "scale": "regional", "role": "minor"}),
        )
        .unwrap();
        assert!((event.multiplier() - 0.375).abs() < f64::EPSILON);
    }

    #[test]
    fn trauma_severity_is_clamped() {
        assert!((Trauma::new("grief", 3.0).multiplier() - 1.0).abs() < f64::EPSILON);
        assert!(Trauma::new("grief", -1.0).multiplier().abs() < f64::EPSILON);
        assert!(Trauma::new("grief", f64::NAN).multiplier().abs() < f64::EPSILON);
    }

    #[test]
    fn social_multiplier_is_damped() {
        let interaction = SocialInteraction::new("mentorship", "positive")
            .with_intimacy(0.8)
            .with_duration(2.0);
        assert!((interaction.multiplier() - 0.16).abs() < 1e-12);
    }
}
