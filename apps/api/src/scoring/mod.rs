//! Fixed, auditable point table producing a 0 to 100 suitability score.
//!
//! Default: `RubricScorer`. The decision engine holds an `Arc<dyn ResumeScorer>`
//! and never names a concrete rubric.

pub mod category;

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extraction::fields::{ExtractedFields, EDUCATION_PLACEHOLDER, YEARS_OF_EXPERIENCE_RE};
use crate::extraction::vocabulary::Vocabulary;

pub const MAX_SCORE: u32 = 100;
const SKILL_POINTS: f64 = 3.0;
const SKILLS_CAP: f64 = 30.0;
const KEYWORD_POINTS: f64 = 2.0;
const KEYWORD_CAP: f64 = 15.0;
const SECTION_POINTS: f64 = 2.5;
const COMPLETENESS_CAP: f64 = 15.0;

const DOCTORATE_TERMS: &[&str] = &["phd", "doctorate"];
const MASTERS_TERMS: &[&str] = &["master", "m.tech", "m.sc", "m.e.", "mba", "mca"];
const BACHELORS_TERMS: &[&str] = &["bachelor", "b.tech", "b.e.", "b.sc", "bca"];
const DIPLOMA_TERMS: &[&str] = &["diploma"];

static YEARS_IN_SUMMARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)\+?\s*(?:years?|yrs?)").expect("years pattern"));

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

/// Per-criterion points plus the capped, rounded total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub contact: f64,     // max 10
    pub skills: f64,      // max 30
    pub experience: f64,  // max 25
    pub education: f64,   // max 20
    pub completeness: f64, // max 15
    pub total: u32,       // 0 – 100
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap the rubric without touching the decision engine.
pub trait ResumeScorer: Send + Sync {
    /// `role_category` is accepted for forward compatibility; the current rubric
    /// weighs every category the same.
    fn score(&self, fields: &ExtractedFields, raw_text: &str, role_category: &str)
        -> ScoreBreakdown;
}

/// The fixed weighted rubric.
pub struct RubricScorer {
    vocabulary: Arc<Vocabulary>,
}

impl RubricScorer {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }
}

impl ResumeScorer for RubricScorer {
    fn score(
        &self,
        fields: &ExtractedFields,
        raw_text: &str,
        role_category: &str,
    ) -> ScoreBreakdown {
        tracing::debug!(role_category, "scoring with fixed rubric");
        compute_score(fields, raw_text, &self.vocabulary)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rubric
// ────────────────────────────────────────────────────────────────────────────

pub fn compute_score(fields: &ExtractedFields, raw_text: &str, vocabulary: &Vocabulary) -> ScoreBreakdown {
    let lower_text = raw_text.to_lowercase();

    let contact = contact_points(fields);
    let skills = skills_points(fields.skills.len());
    let experience = experience_points(&fields.experience, raw_text, &lower_text, vocabulary);
    let education = education_points(&fields.education);
    let completeness = completeness_points(raw_text, &lower_text, vocabulary);

    let sum = contact + skills + experience + education + completeness;
    let total = (sum.round().max(0.0) as u32).min(MAX_SCORE);

    ScoreBreakdown {
        contact,
        skills,
        experience,
        education,
        completeness,
        total,
    }
}

fn contact_points(fields: &ExtractedFields) -> f64 {
    let mut points = 0.0;
    if !fields.email.is_empty() {
        points += 5.0;
    }
    if !fields.phone.is_empty() {
        points += 5.0;
    }
    points
}

fn skills_points(distinct_skills: usize) -> f64 {
    (distinct_skills as f64 * SKILL_POINTS).min(SKILLS_CAP)
}

/// Explicit years win; otherwise count distinct responsibility keywords in the text.
fn experience_points(
    experience_summary: &str,
    raw_text: &str,
    lower_text: &str,
    vocabulary: &Vocabulary,
) -> f64 {
    if let Some(years) = years_of_experience(experience_summary, raw_text) {
        return match years {
            y if y >= 5 => 25.0,
            y if y >= 3 => 20.0,
            y if y >= 1 => 15.0,
            _ => 10.0,
        };
    }

    let found = vocabulary
        .responsibility_keywords
        .iter()
        .filter(|k| lower_text.contains(&k.to_lowercase()))
        .count();
    (found as f64 * KEYWORD_POINTS).min(KEYWORD_CAP)
}

fn years_of_experience(experience_summary: &str, raw_text: &str) -> Option<u64> {
    YEARS_IN_SUMMARY_RE
        .captures(experience_summary)
        .or_else(|| YEARS_OF_EXPERIENCE_RE.captures(raw_text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
}

/// First matching tier wins: doctorate → master's → bachelor's → diploma → other.
fn education_points(education: &str) -> f64 {
    if education.trim().is_empty() || education == EDUCATION_PLACEHOLDER {
        return 5.0;
    }
    let lower = education.to_lowercase();
    let has_any = |terms: &[&str]| terms.iter().any(|t| lower.contains(t));

    if has_any(DOCTORATE_TERMS) {
        20.0
    } else if has_any(MASTERS_TERMS) {
        18.0
    } else if has_any(BACHELORS_TERMS) {
        15.0
    } else if has_any(DIPLOMA_TERMS) {
        12.0
    } else {
        10.0
    }
}

fn completeness_points(raw_text: &str, lower_text: &str, vocabulary: &Vocabulary) -> f64 {
    let word_count = raw_text.split_whitespace().count();
    let mut points = if (300..=2000).contains(&word_count) {
        5.0
    } else if word_count >= 200 {
        3.0
    } else {
        0.0
    };

    points += vocabulary
        .section_keywords
        .iter()
        .filter(|s| lower_text.contains(&s.to_lowercase()))
        .count() as f64
        * SECTION_POINTS;

    points.min(COMPLETENESS_CAP)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::fields::{extract_fields, EXPERIENCE_PLACEHOLDER};
    use std::collections::BTreeSet;

    fn fields_with_skills(n: usize) -> ExtractedFields {
        ExtractedFields {
            skills: (0..n).map(|i| format!("skill-{i}")).collect::<BTreeSet<_>>(),
            experience: EXPERIENCE_PLACEHOLDER.to_string(),
            education: EDUCATION_PLACEHOLDER.to_string(),
            ..ExtractedFields::default()
        }
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_contact_points() {
        let mut f = ExtractedFields::default();
        assert_eq!(contact_points(&f), 0.0);
        f.email = "a@b.com".to_string();
        assert_eq!(contact_points(&f), 5.0);
        f.phone = "9876543210".to_string();
        assert_eq!(contact_points(&f), 10.0);
    }

    #[test]
    fn test_skills_monotonic_and_capped() {
        let v = Vocabulary::default();
        let mut previous = 0;
        for n in 0..20 {
            let b = compute_score(&fields_with_skills(n), "", &v);
            assert!(b.total >= previous, "score dropped at {n} skills");
            assert!(b.skills <= 30.0);
            previous = b.total;
        }
        assert_eq!(skills_points(10), 30.0);
        assert_eq!(skills_points(11), 30.0);
        assert_eq!(skills_points(4), 12.0);
    }

    #[test]
    fn test_experience_year_bands() {
        let v = Vocabulary::default();
        assert_eq!(experience_points("7 years of experience", "", "", &v), 25.0);
        assert_eq!(experience_points("5 years of experience", "", "", &v), 25.0);
        assert_eq!(experience_points("3 yrs exp", "", "", &v), 20.0);
        assert_eq!(experience_points("1 year of experience", "", "", &v), 15.0);
        assert_eq!(experience_points("0 years of experience", "", "", &v), 10.0);
    }

    #[test]
    fn test_experience_years_recovered_from_raw_text() {
        let v = Vocabulary::default();
        let raw = "Over 4 Years of Experience in sales";
        assert_eq!(
            experience_points(EXPERIENCE_PLACEHOLDER, raw, &raw.to_lowercase(), &v),
            20.0
        );
    }

    #[test]
    fn test_experience_keywords_capped_at_15() {
        let v = Vocabulary::default();
        let raw = "worked developed managed led created designed implemented project team responsibility";
        assert_eq!(
            experience_points(EXPERIENCE_PLACEHOLDER, raw, raw, &v),
            15.0
        );
        let raw = "developed and designed";
        assert_eq!(experience_points(EXPERIENCE_PLACEHOLDER, raw, raw, &v), 4.0);
    }

    #[test]
    fn test_education_tiers_first_match_wins() {
        assert_eq!(education_points(EDUCATION_PLACEHOLDER), 5.0);
        assert_eq!(education_points(""), 5.0);
        assert_eq!(education_points("PhD, Master"), 20.0);
        assert_eq!(education_points("M.Tech, B.Tech"), 18.0);
        assert_eq!(education_points("MBA"), 18.0);
        assert_eq!(education_points("B.Tech"), 15.0);
        assert_eq!(education_points("BCA"), 15.0);
        assert_eq!(education_points("Diploma"), 12.0);
        assert_eq!(education_points("High School"), 10.0);
    }

    #[test]
    fn test_completeness_word_bands_and_sections() {
        let v = Vocabulary::default();
        let text = words(350);
        assert_eq!(completeness_points(&text, &text, &v), 5.0);
        let text = words(250);
        assert_eq!(completeness_points(&text, &text, &v), 3.0);
        let text = words(2500);
        assert_eq!(completeness_points(&text, &text, &v), 3.0);
        let text = "experience education skills project";
        assert_eq!(completeness_points(text, text, &v), 10.0);
        let text = format!("{} experience education skills project", words(400));
        assert_eq!(completeness_points(&text, &text, &v), 15.0);
    }

    #[test]
    fn test_total_clamped_to_100() {
        let v = Vocabulary::default();
        let text = format!(
            "{} experience education skills project 9 years of experience",
            words(500)
        );
        let mut f = fields_with_skills(40);
        f.email = "x@y.com".into();
        f.phone = "9876543210".into();
        f.education = "PhD".into();
        f.experience = "9 years of experience".into();
        let b = compute_score(&f, &text, &v);
        assert_eq!(b.total, 100);
    }

    #[test]
    fn test_empty_input_scores_minimum() {
        let v = Vocabulary::default();
        let b = compute_score(&ExtractedFields::default(), "", &v);
        // Only the empty-education floor contributes.
        assert_eq!(b.total, 5);
    }

    #[test]
    fn test_fractional_completeness_is_rounded() {
        let v = Vocabulary::default();
        // 1 section keyword → 2.5, plus empty-education floor 5 → 7.5 → 8
        let b = compute_score(&ExtractedFields::default(), "skills", &v);
        assert_eq!(b.total, 8);
    }

    #[test]
    fn test_role_category_does_not_change_score() {
        let v = Arc::new(Vocabulary::default());
        let scorer = RubricScorer::new(v.clone());
        let text = "Python developer, 2 years of experience, B.Sc";
        let f = extract_fields(text, &v);
        let a = scorer.score(&f, text, "Software Engineer");
        let b = scorer.score(&f, text, "Marketing");
        assert_eq!(a, b);
    }
}
