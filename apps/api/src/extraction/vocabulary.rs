//! Curated keyword tables used by field extraction and scoring.
//!
//! Passed around as a `Vocabulary` value so tests and future tuning can swap lists
//! without touching the extraction rules.

use serde::{Deserialize, Serialize};

const SKILLS: &[&str] = &[
    // Programming languages
    "JavaScript", "Python", "Java", "C++", "C#", "Ruby", "PHP", "Go", "Rust", "Swift", "Kotlin",
    "TypeScript", "Perl", "Scala", "R", "MATLAB", "SQL",
    // Web
    "HTML", "CSS", "React", "Angular", "Vue", "Node.js", "Express", "Django", "Flask", "Spring",
    "ASP.NET", "Laravel", "Next.js", "Nuxt.js", "Svelte", "Bootstrap", "Tailwind",
    // Mobile
    "Android", "iOS", "React Native", "Flutter", "Xamarin",
    // Databases
    "MySQL", "PostgreSQL", "MongoDB", "Redis", "Oracle", "SQLite", "DynamoDB", "Cassandra",
    // Cloud & DevOps
    "AWS", "Azure", "GCP", "Docker", "Kubernetes", "Jenkins", "CI/CD", "Terraform", "Ansible",
    // AI / ML
    "Machine Learning", "Deep Learning", "TensorFlow", "PyTorch", "Scikit-learn", "NLP",
    "Computer Vision", "Data Science", "AI",
    // Data
    "Data Analysis", "Excel", "Power BI", "Tableau", "Pandas", "NumPy",
    // Business
    "Project Management", "Agile", "Scrum", "JIRA", "Leadership", "Communication",
    "Problem Solving", "Team Management", "Strategic Planning",
    // Domain
    "Astrology", "Vedic Astrology", "Numerology", "Kundli", "Horoscope", "Tarot",
    "Spiritual Guidance", "Vastu", "Palmistry",
];

const DEGREES: &[&str] = &[
    "B.Tech", "M.Tech", "B.E.", "M.E.", "B.Sc", "M.Sc", "BCA", "MCA", "MBA", "PhD", "Bachelor",
    "Master", "Diploma",
];

const RESPONSIBILITY_KEYWORDS: &[&str] = &[
    "worked",
    "developed",
    "managed",
    "led",
    "created",
    "designed",
    "implemented",
    "project",
    "team",
    "responsibility",
];

const SECTION_KEYWORDS: &[&str] = &["experience", "education", "skills", "project"];

/// Keyword tables consumed by the field extractor and the rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Canonical skill names, matched case-insensitively as substrings.
    pub skills: Vec<String>,
    /// Degree names and abbreviations.
    pub degrees: Vec<String>,
    /// Job-responsibility language used when no explicit years value exists.
    pub responsibility_keywords: Vec<String>,
    /// Canonical resume section headings.
    pub section_keywords: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            skills: to_owned(SKILLS),
            degrees: to_owned(DEGREES),
            responsibility_keywords: to_owned(RESPONSIBILITY_KEYWORDS),
            section_keywords: to_owned(SECTION_KEYWORDS),
        }
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
