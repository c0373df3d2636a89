//! The rule-driven trait evolution engine.
//!
//! Every event goes through the same pipeline:
//!
//! 1. Look up the event category's base deltas in the [`RuleSet`]. An
//!    unknown category yields no effects and the profile comes back equal.
//! 2. Scale every delta by the event's multiplier.
//! 3. For experiences, amplify deltas of facets named by the experience's
//!    cultural values by `1 + strength × 0.2`.
//! 4. Apply each delta to the matching facet: the actual change is
//!    `delta × volatility` for traits and emotional tendencies, and
//!    `delta × adaptability` for cognitive traits. Intensity or complexity
//!    moves by the actual change, base level by a tenth of it, all clamped
//!    to `[0, 1]`.
//! 5. Leave an [`EvolutionNote`] on every facet that moved.
//!
//! Facets are never created or removed, and facets without a delta are
//! carried over unchanged.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use tracing::debug;

use persona_types::EvolutionNote;

use crate::events::{Experience, HistoricalEvent, SocialInteraction, Trauma};
use crate::profile::PersonalityProfile;
use crate::rules::{FacetEffects, RuleSet};

/// Maximum amplification a cultural value of strength 1 applies.
pub const CULTURAL_SWING: f64 = 0.2;

/// Share of an intensity change that also moves the base level.
pub const BASE_LEVEL_SHARE: f64 = 0.1;

static STANDARD_RULES: LazyLock<Arc<RuleSet>> = LazyLock::new(|| Arc::new(RuleSet::standard()));

// ---------------------------------------------------------------------------
// LifeEvent
// ---------------------------------------------------------------------------

/// Any of the four event kinds the engine understands.
#[derive(Debug, Clone, Copy)]
pub enum LifeEvent<'a> {
    /// Something the character lived through.
    Experience(&'a Experience),
    /// A world event the character took part in.
    Historical(&'a HistoricalEvent),
    /// A traumatic event.
    Trauma(&'a Trauma),
    /// An exchange with another character.
    Social(&'a SocialInteraction),
}

impl LifeEvent<'_> {
    /// The reason written into evolution notes, e.g. `"experience: combat"`.
    pub fn reason(&self) -> String {
        match self {
            Self::Experience(e) => format!("experience: {}", e.category),
            Self::Historical(e) => format!("historical event: {}", e.category),
            Self::Trauma(t) => format!("trauma: {}", t.category),
            Self::Social(s) => format!("social: {} ({})", s.interaction_type, s.outcome),
        }
    }

    /// The scalar applied to every base delta.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Experience(e) => e.multiplier(),
            Self::Historical(e) => e.multiplier(),
            Self::Trauma(t) => t.multiplier(),
            Self::Social(s) => s.multiplier(),
        }
    }
}

// ---------------------------------------------------------------------------
// TraitEvolutionEngine
// ---------------------------------------------------------------------------

/// Turns events into new profile snapshots using a shared [`RuleSet`].
///
/// The engine is cheap to clone; clones share the same tables.
#[derive(Debug, Clone)]
pub struct TraitEvolutionEngine {
    rules: Arc<RuleSet>,
}

impl Default for TraitEvolutionEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl TraitEvolutionEngine {
    /// An engine over custom tables.
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// An engine over the built-in tables.
    pub fn standard() -> Self {
        Self {
            rules: Arc::clone(&STANDARD_RULES),
        }
    }

    /// The tables this engine consults.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Evolve `profile` by an experience, timestamped now.
    pub fn with_experience_influence(
        &self,
        profile: &PersonalityProfile,
        experience: &Experience,
    ) -> PersonalityProfile {
        self.evolve_at(profile, LifeEvent::Experience(experience), Utc::now())
    }

    /// Evolve `profile` by a historical event, timestamped now.
    pub fn with_historical_event(
        &self,
        profile: &PersonalityProfile,
        event: &HistoricalEvent,
    ) -> PersonalityProfile {
        self.evolve_at(profile, LifeEvent::Historical(event), Utc::now())
    }

    /// Evolve `profile` by a trauma, timestamped now.
    pub fn with_trauma(&self, profile: &PersonalityProfile, trauma: &Trauma) -> PersonalityProfile {
        self.evolve_at(profile, LifeEvent::Trauma(trauma), Utc::now())
    }

    /// Evolve `profile` by a social interaction, timestamped now.
    pub fn with_social_interaction(
        &self,
        profile: &PersonalityProfile,
        interaction: &SocialInteraction,
    ) -> PersonalityProfile {
        self.evolve_at(profile, LifeEvent::Social(interaction), Utc::now())
    }

    /// Evolve `profile` by any event, stamping notes with `at`.
    ///
    /// Unknown categories, unmatched interaction outcomes, and non-finite
    /// multipliers produce a profile equal to the input.
    pub fn evolve_at(
        &self,
        profile: &PersonalityProfile,
        event: LifeEvent<'_>,
        at: DateTime<Utc>,
    ) -> PersonalityProfile {
        let Some(base) = self.effects(event) else {
            debug!(reason = %event.reason(), "no rule for event, profile unchanged");
            return profile.clone();
        };

        let multiplier = event.multiplier();
        if !multiplier.is_finite() {
            debug!(reason = %event.reason(), multiplier, "non-finite multiplier, profile unchanged");
            return profile.clone();
        }

        let mut deltas = base.scaled(multiplier);
        if let LifeEvent::Experience(experience) = event {
            self.amplify_cultural(&mut deltas, experience);
        }

        apply_deltas(profile, &deltas, &event.reason(), at)
    }

    fn effects(&self, event: LifeEvent<'_>) -> Option<&FacetEffects> {
        match event {
            LifeEvent::Experience(e) => self.rules.experience(&e.category),
            LifeEvent::Historical(e) => self.rules.historical_event(&e.category),
            LifeEvent::Trauma(t) => self.rules.trauma(&t.category),
            LifeEvent::Social(s) => self.rules.social_interaction(&s.interaction_type, &s.outcome),
        }
    }

    /// Multiply already non-zero deltas of culturally favoured facets.
    fn amplify_cultural(&self, deltas: &mut FacetEffects, experience: &Experience) {
        for influence in &experience.cultural_context {
            let strength = if influence.strength.is_nan() {
                0.0
            } else {
                influence.strength.clamp(0.0, 1.0)
            };
            let factor = strength.mul_add(CULTURAL_SWING, 1.0);
            for id in self.rules.cultural_facets(&influence.value) {
                for group in [
                    &mut deltas.traits,
                    &mut deltas.emotional_tendencies,
                    &mut deltas.cognitive_traits,
                ] {
                    if let Some(delta) = group.get_mut(id)
                        && *delta != 0.0
                    {
                        *delta *= factor;
                    }
                }
            }
        }
    }
}

/// Copy `profile` and move every facet named in `deltas`.
fn apply_deltas(
    profile: &PersonalityProfile,
    deltas: &FacetEffects,
    reason: &str,
    at: DateTime<Utc>,
) -> PersonalityProfile {
    let mut next = profile.clone();

    for (id, delta) in &deltas.traits {
        if let Some(facet) = next.traits.get_mut(id) {
            let change = delta * facet.volatility;
            if change != 0.0 {
                facet.intensity = unit(facet.intensity + change);
                facet.base_level = unit(change.mul_add(BASE_LEVEL_SHARE, facet.base_level));
                facet.notes.push(note(reason, change, at));
            }
        }
    }

    for (id, delta) in &deltas.emotional_tendencies {
        if let Some(facet) = next.emotional_tendencies.get_mut(id) {
            let change = delta * facet.volatility;
            if change != 0.0 {
                facet.intensity = unit(facet.intensity + change);
                facet.base_level = unit(change.mul_add(BASE_LEVEL_SHARE, facet.base_level));
                facet.notes.push(note(reason, change, at));
            }
        }
    }

    for (id, delta) in &deltas.cognitive_traits {
        if let Some(facet) = next.cognitive_traits.get_mut(id) {
            let change = delta * facet.adaptability;
            if change != 0.0 {
                facet.complexity = unit(facet.complexity + change);
                facet.notes.push(note(reason, change, at));
            }
        }
    }

    next
}

fn unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn note(reason: &str, change: f64, at: DateTime<Utc>) -> EvolutionNote {
    EvolutionNote {
        reason: reason.to_owned(),
        change,
        timestamp: at,
    }
}

// ---------------------------------------------------------------------------
// Profile conveniences
// ---------------------------------------------------------------------------

impl PersonalityProfile {
    /// Evolve by an experience using the built-in tables.
    pub fn with_experience_influence(&self, experience: &Experience) -> Self {
        TraitEvolutionEngine::standard().with_experience_influence(self, experience)
    }

    /// Evolve by a historical event using the built-in tables.
    pub fn with_historical_event(&self, event: &HistoricalEvent) -> Self {
        TraitEvolutionEngine::standard().with_historical_event(self, event)
    }

    /// Evolve by a trauma using the built-in tables.
    pub fn with_trauma(&self, trauma: &Trauma) -> Self {
        TraitEvolutionEngine::standard().with_trauma(self, trauma)
    }

    /// Evolve by a social interaction using the built-in tables.
    pub fn with_social_interaction(&self, interaction: &SocialInteraction) -> Self {
        TraitEvolutionEngine::standard().with_social_interaction(self, interaction)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;
    use persona_types::{Attribute, CognitiveTrait, EmotionalTendency, Trait};

    use super::*;
    use crate::events::{EventScale, RoleImportance};

    const EPS: f64 = 1e-12;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    fn profile() -> PersonalityProfile {
        PersonalityProfile::builder()
            .trait_facet(Trait::new("courage", "Courage", 0.5).with_volatility(1.0))
            .trait_facet(Trait::new("empathy", "Empathy", 0.5))
            .trait_facet(Trait::new("humor", "Humor", 0.5))
            .attribute(Attribute::new("strength", "Strength", 12))
            .emotional_tendency(EmotionalTendency::new("anxiety", "Anxiety", 0.2))
            .cognitive_trait(CognitiveTrait::new("strategic_thinking", "Strategy", 0.4))
            .build()
            .unwrap()
    }

    #[test]
    fn experience_scales_by_intensity_duration_and_volatility() {
        let engine = TraitEvolutionEngine::standard();
        let combat = Experience::new("combat").with_intensity(1.0).with_duration(2.0);
        let next = engine.evolve_at(&profile(), LifeEvent::Experience(&combat), at());

        // courage: 0.1 * 2.0 * volatility 1.0
        let courage = next.trait_facet("courage").unwrap();
        assert!((courage.intensity - 0.7).abs() < EPS);
        assert!((courage.base_level - 0.52).abs() < EPS);
        assert_eq!(courage.notes.len(), 1);
        assert_eq!(courage.notes[0].reason, "experience: combat");
        assert_eq!(courage.notes[0].timestamp, at());

        // empathy: -0.05 * 2.0 * 0.5
        let empathy = next.trait_facet("empathy").unwrap();
        assert!((empathy.intensity - 0.45).abs() < EPS);

        // anxiety: 0.08 * 2.0 * 0.5
        let anxiety = next.emotional_tendency("anxiety").unwrap();
        assert!((anxiety.intensity - 0.28).abs() < EPS);

        // strategic thinking: 0.05 * 2.0 * adaptability 0.5
        let strategy = next.cognitive_trait("strategic_thinking").unwrap();
        assert!((strategy.complexity - 0.45).abs() < EPS);
    }

    #[test]
    fn untouched_facets_are_carried_over() {
        let before = profile();
        let combat = Experience::new("combat");
        let next = TraitEvolutionEngine::standard().evolve_at(
            &before,
            LifeEvent::Experience(&combat),
            at(),
        );
        assert_eq!(next.trait_facet("humor").unwrap(), before.trait_facet("humor").unwrap());
        assert_eq!(next.attribute("strength").unwrap(), before.attribute("strength").unwrap());
        assert_eq!(next.count(persona_types::FacetKind::Trait), 3);
        // The input is not modified.
        assert!(before.trait_facet("courage").unwrap().notes.is_empty());
    }

    #[test]
    fn unknown_category_is_a_no_op() {
        let before = profile();
        let engine = TraitEvolutionEngine::standard();
        assert_eq!(
            engine.with_experience_influence(&before, &Experience::new("unheard_of")),
            before
        );
        assert_eq!(
            engine.with_social_interaction(&before, &SocialInteraction::new("mentorship", "neutral")),
            before
        );
        assert_eq!(engine.with_trauma(&before, &Trauma::new("paper_cut", 1.0)), before);
    }

    #[test]
    fn cultural_values_amplify_only_moved_facets() {
        let engine = TraitEvolutionEngine::standard();
        let plain = Experience::new("combat").with_intensity(1.0);
        let honoured = plain.clone().with_cultural_value("honor", 1.0);

        let a = engine.evolve_at(&profile(), LifeEvent::Experience(&plain), at());
        let b = engine.evolve_at(&profile(), LifeEvent::Experience(&honoured), at());

        let change_a = a.trait_facet("courage").unwrap().notes[0].change;
        let change_b = b.trait_facet("courage").unwrap().notes[0].change;
        assert!((change_b - change_a * 1.2).abs() < EPS);
        // discipline is favoured by honor but absent from the profile.
        assert!(b.trait_facet("discipline").is_err());
    }

    #[test]
    fn cultural_value_leaves_zero_delta_facets_alone() {
        let mut rules = RuleSet::default();
        rules.experiences.insert(
            "vigil".to_owned(),
            FacetEffects {
                traits: [("patience".to_owned(), 0.0), ("courage".to_owned(), 0.1)]
                    .into_iter()
                    .collect(),
                ..FacetEffects::default()
            },
        );
        rules.cultural_values.insert(
            "stoicism".to_owned(),
            vec!["patience".to_owned(), "courage".to_owned(), "humor".to_owned()],
        );
        let engine = TraitEvolutionEngine::new(rules);
        let before = PersonalityProfile::builder()
            .trait_facet(Trait::new("patience", "Patience", 0.5))
            .trait_facet(Trait::new("courage", "Courage", 0.5).with_volatility(1.0))
            .trait_facet(Trait::new("humor", "Humor", 0.5))
            .build()
            .unwrap();

        let vigil = Experience::new("vigil")
            .with_intensity(1.0)
            .with_cultural_value("stoicism", 1.0);
        let next = engine.evolve_at(&before, LifeEvent::Experience(&vigil), at());

        // courage: 0.1 * (1 + 1.0 * 0.2) * volatility 1.0
        assert!((next.trait_facet("courage").unwrap().intensity - 0.62).abs() < EPS);
        assert_eq!(next.trait_facet("patience"), before.trait_facet("patience"));
        assert_eq!(next.trait_facet("humor"), before.trait_facet("humor"));
    }

    #[test]
    fn cultural_value_skips_facets_the_event_does_not_name() {
        let engine = TraitEvolutionEngine::standard();
        let before = social_profile();
        let combat = Experience::new("combat")
            .with_intensity(1.0)
            .with_cultural_value("collectivism", 1.0);
        let next = engine.evolve_at(&before, LifeEvent::Experience(&combat), at());

        // combat has no trust delta, so collectivism has nothing to amplify.
        assert_eq!(next.trait_facet("trust"), before.trait_facet("trust"));
        // empathy: -0.05 * 1.2 * volatility 0.5
        let empathy = next.trait_facet("empathy").unwrap();
        assert!((empathy.intensity - 0.47).abs() < EPS);
    }

    fn social_profile() -> PersonalityProfile {
        PersonalityProfile::builder()
            .trait_facet(Trait::new("trust", "Trust", 0.5))
            .trait_facet(Trait::new("empathy", "Empathy", 0.5))
            .emotional_tendency(EmotionalTendency::new("joy", "Joy", 0.5))
            .build()
            .unwrap()
    }

    #[test]
    fn trauma_scales_by_severity_and_volatility() {
        let engine = TraitEvolutionEngine::standard();
        let grief = Trauma::new("grief", 0.8);
        let next = engine.evolve_at(&social_profile(), LifeEvent::Trauma(&grief), at());

        // joy: -0.1 * severity 0.8 * volatility 0.5
        let joy = next.emotional_tendency("joy").unwrap();
        assert!((joy.intensity - 0.46).abs() < EPS);
        assert!((joy.base_level - 0.496).abs() < EPS);
        assert_eq!(joy.notes.len(), 1);
        assert_eq!(joy.notes[0].reason, "trauma: grief");
        assert!((joy.notes[0].change + 0.04).abs() < EPS);

        // empathy: 0.05 * 0.8 * 0.5
        let empathy = next.trait_facet("empathy").unwrap();
        assert!((empathy.intensity - 0.52).abs() < EPS);

        // grief names no trust delta.
        assert!(next.trait_facet("trust").unwrap().notes.is_empty());
    }

    #[test]
    fn trauma_severity_is_clamped() {
        let engine = TraitEvolutionEngine::standard();
        let capped = engine.with_trauma(&social_profile(), &Trauma::new("grief", 3.0));
        let full = engine.with_trauma(&social_profile(), &Trauma::new("grief", 1.0));
        let a = capped.emotional_tendency("joy").unwrap().intensity;
        let b = full.emotional_tendency("joy").unwrap().intensity;
        assert!((a - b).abs() < EPS);
        assert!((a - 0.45).abs() < EPS);
    }

    #[test]
    fn social_interaction_scales_by_intimacy_and_duration() {
        let engine = TraitEvolutionEngine::standard();
        let talk = SocialInteraction::new("conversation", "positive")
            .with_intimacy(0.8)
            .with_duration(2.0);
        let next = engine.evolve_at(&social_profile(), LifeEvent::Social(&talk), at());

        // trust: 0.05 * (0.8 * 2.0 * 0.1) * volatility 0.5
        let trust = next.trait_facet("trust").unwrap();
        assert!((trust.intensity - 0.504).abs() < EPS);
        assert!((trust.base_level - 0.5004).abs() < EPS);
        assert_eq!(trust.notes.len(), 1);
        assert_eq!(trust.notes[0].reason, "social: conversation (positive)");
        assert!((trust.notes[0].change - 0.004).abs() < EPS);

        // joy: 0.04 * 0.16 * 0.5
        let joy = next.emotional_tendency("joy").unwrap();
        assert!((joy.intensity - 0.5032).abs() < EPS);
    }

    #[test]
    fn social_outcome_selects_the_table() {
        let engine = TraitEvolutionEngine::standard();
        let talk = SocialInteraction::new("conversation", "negative")
            .with_intimacy(0.8)
            .with_duration(2.0);
        let next = engine.evolve_at(&social_profile(), LifeEvent::Social(&talk), at());
        // trust: -0.04 * 0.16 * 0.5
        let trust = next.trait_facet("trust").unwrap();
        assert!((trust.intensity - 0.4968).abs() < EPS);
        assert_eq!(trust.notes[0].reason, "social: conversation (negative)");

        let shrug = SocialInteraction::new("conversation", "neutral");
        assert_eq!(engine.with_social_interaction(&social_profile(), &shrug), social_profile());
    }

    #[test]
    fn historical_event_uses_scale_and_role() {
        let engine = TraitEvolutionEngine::standard();
        let war = HistoricalEvent::new("war", EventScale::Local, RoleImportance::Minor);
        let next = engine.evolve_at(&profile(), LifeEvent::Historical(&war), at());
        // 0.08 * 0.25 * volatility 1.0
        assert!((next.trait_facet("courage").unwrap().intensity - 0.52).abs() < EPS);
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let engine = TraitEvolutionEngine::standard();
        let huge = Experience::new("combat").with_intensity(100.0).with_duration(100.0);
        let next = engine.evolve_at(&profile(), LifeEvent::Experience(&huge), at());
        let courage = next.trait_facet("courage").unwrap();
        assert!((courage.intensity - 1.0).abs() < EPS);
        assert!((courage.base_level - 1.0).abs() < EPS);
        let empathy = next.trait_facet("empathy").unwrap();
        assert!(empathy.intensity.abs() < EPS);
    }

    #[test]
    fn custom_rules_replace_tables() {
        let mut rules = RuleSet::default();
        rules.experiences.insert(
            "sailing".to_owned(),
            FacetEffects {
                traits: [("humor".to_owned(), 0.2)].into_iter().collect(),
                ..FacetEffects::default()
            },
        );
        let engine = TraitEvolutionEngine::new(rules);
        let before = profile();
        assert_eq!(engine.with_experience_influence(&before, &Experience::new("combat")), before);

        let sailing = Experience::new("sailing").with_intensity(1.0);
        let next = engine.evolve_at(&before, LifeEvent::Experience(&sailing), at());
        assert!((next.trait_facet("humor").unwrap().intensity - 0.6).abs() < EPS);
    }
}
