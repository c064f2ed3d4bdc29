//! Heuristic recovery of contact, skills, experience and education
//! from plain resume text.
//!
//! Pure and deterministic: the same text and vocabulary always yield the same fields.
//! Each rule runs independently; an empty result for one never affects another.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extraction::vocabulary::Vocabulary;

pub const EXPERIENCE_PLACEHOLDER: &str = "Experience details in resume";
pub const EDUCATION_PLACEHOLDER: &str = "Education details in resume";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email pattern")
});

// 10-digit mobile number, optional +91 or 0 prefix, leading digit 6-9.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\+91|0)?[6-9][0-9]{9}").expect("phone pattern"));

pub(crate) static YEARS_OF_EXPERIENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9]+)\+?\s*(?:years?|yrs?)\s*(?:of)?\s*(?:experience|exp)")
        .expect("years-of-experience pattern")
});

static DATE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[0-9]{4}\s*[-–—]\s*(?:[0-9]{4}|present|current)").expect("date range pattern")
});

/// Structured signals recovered from a resume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub email: String,
    pub phone: String,
    /// Canonical skill names; ordered only so output is stable.
    pub skills: BTreeSet<String>,
    pub experience: String,
    pub education: String,
}

/// Applies every extraction rule to `text`.
pub fn extract_fields(text: &str, vocabulary: &Vocabulary) -> ExtractedFields {
    let lower = text.to_lowercase();
    ExtractedFields {
        email: extract_email(text),
        phone: extract_phone(text),
        skills: extract_skills(&lower, vocabulary),
        experience: extract_experience(text),
        education: extract_education(&lower, vocabulary),
    }
}

fn extract_email(text: &str) -> String {
    EMAIL_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn extract_phone(text: &str) -> String {
    PHONE_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn extract_skills(lower_text: &str, vocabulary: &Vocabulary) -> BTreeSet<String> {
    vocabulary
        .skills
        .iter()
        .filter(|skill| lower_text.contains(&skill.to_lowercase()))
        .cloned()
        .collect()
}

/// Prefers an explicit "N years of experience" phrase. Otherwise collects the line
/// preceding each `YYYY - YYYY|present` range as an employer/role token.
fn extract_experience(text: &str) -> String {
    if let Some(m) = YEARS_OF_EXPERIENCE_RE.find(text) {
        return m.as_str().to_string();
    }

    let lines: Vec<&str> = text.lines().collect();
    let roles: Vec<&str> = lines
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| DATE_RANGE_RE.is_match(line))
        .map(|(i, _)| lines[i - 1].trim())
        .filter(|prev| !prev.is_empty())
        .collect();

    if roles.is_empty() {
        EXPERIENCE_PLACEHOLDER.to_string()
    } else {
        roles.join(", ")
    }
}

fn extract_education(lower_text: &str, vocabulary: &Vocabulary) -> String {
    let found: Vec<&str> = vocabulary
        .degrees
        .iter()
        .filter(|degree| lower_text.contains(&degree.to_lowercase()))
        .map(String::as_str)
        .collect();

    if found.is_empty() {
        EDUCATION_PLACEHOLDER.to_string()
    } else {
        found.join(", ")
    }
}
