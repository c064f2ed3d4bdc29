//! HTML bodies for outbound mail. All candidate-supplied text is escaped.

use std::fmt::Write as _;

use crate::models::application::{NewApplication, ScoringStatus};

/// Subject line for the recruitment-team notification.
pub fn hr_notification_subject(application: &NewApplication) -> String {
    let suffix = match (application.scoring_status, application.score) {
        (ScoringStatus::Skipped, _) => "(ATS Skipped)".to_string(),
        (ScoringStatus::Completed, Some(score)) => format!("(ATS Score: {score})"),
        (ScoringStatus::Completed, None) => "(ATS Score: n/a)".to_string(),
    };
    format!(
        "New Qualified Candidate - {} {suffix}",
        application.profile.full_name
    )
}

/// Candidate details, extracted signals and score as an HTML table.
pub fn hr_notification_body(application: &NewApplication) -> String {
    let p = &application.profile;
    let f = &application.fields;
    let score = match (application.scoring_status, application.score) {
        (ScoringStatus::Skipped, _) => "Skipped (manual review)".to_string(),
        (_, Some(s)) => format!("{s}/100"),
        (_, None) => "n/a".to_string(),
    };
    let skills = if f.skills.is_empty() {
        "None detected".to_string()
    } else {
        f.skills.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    let role = match &p.custom_role {
        Some(custom) if !custom.trim().is_empty() => format!("{} ({custom})", p.role_category),
        _ => p.role_category.clone(),
    };

    let rows: [(&str, String); 14] = [
        ("Application", application.reference.clone()),
        ("Decision", application.decision.as_str().to_string()),
        ("Score", score),
        ("Full Name", p.full_name.clone()),
        ("Email", p.email.clone()),
        ("Phone", p.phone.clone()),
        ("Location", format!("{}, {}", p.city, p.state)),
        ("LinkedIn", p.linkedin.clone().unwrap_or_default()),
        ("College", p.college_name.clone()),
        ("Current Company", p.current_company.clone().unwrap_or_default()),
        ("Role", role),
        ("Skills", skills),
        ("Experience", f.experience.clone()),
        ("Education", f.education.clone()),
    ];

    let mut table = String::new();
    for (label, value) in rows.iter() {
        let _ = write!(
            table,
            "<tr><th>{}</th><td>{}</td></tr>",
            label,
            html_escape::encode_text(value)
        );
    }
    let description = p
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(|d| {
            format!(
                "<h3>About the candidate</h3><p>{}</p>",
                html_escape::encode_text(d)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  body {{ font-family: Arial, sans-serif; background-color: #f4f4f4; padding: 20px; }}
  .container {{ max-width: 700px; margin: 0 auto; background: #ffffff; border-radius: 8px; padding: 30px; }}
  table {{ width: 100%; border-collapse: collapse; margin: 20px 0; }}
  th, td {{ padding: 10px; text-align: left; border-bottom: 1px solid #e0e0e0; }}
  th {{ background-color: #f9f9f9; width: 30%; }}
</style>
</head>
<body>
<div class="container">
<h2>New candidate for review</h2>
<table>{table}</table>
{description}
<p>The candidate's resume is attached.</p>
</div>
</body>
</html>"#
    )
}

pub fn code_subject() -> &'static str {
    "Your application verification code"
}

pub fn code_body(code: &str, ttl_minutes: i64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; background-color: #f4f4f4; padding: 20px;">
<div style="max-width: 600px; margin: 0 auto; background: #ffffff; border-radius: 8px; padding: 30px;">
<h2>Verify your email address</h2>
<p>Use the following code to continue your application:</p>
<p style="font-size: 32px; font-weight: bold; letter-spacing: 8px;">{code}</p>
<p><strong>This code is valid for {ttl_minutes} minutes.</strong></p>
<p>If you did not request this code, you can ignore this email.</p>
</div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::fields::ExtractedFields;
    use crate::models::application::{CandidateProfile, Decision};
    use uuid::Uuid;

    fn application(status: ScoringStatus, score: Option<u32>) -> NewApplication {
        NewApplication {
            id: Uuid::nil(),
            reference: "00000000".to_string(),
            profile: CandidateProfile {
                full_name: "Asha <b>Rao</b>".to_string(),
                email: "asha@example.com".to_string(),
                phone: "9876543210".to_string(),
                city: "Pune".to_string(),
                state: "MH".to_string(),
                linkedin: None,
                college_name: "COEP".to_string(),
                current_company: Some("Smith & Sons".to_string()),
                description: Some("Loves <script>".to_string()),
                role_category: "Software Engineer".to_string(),
                custom_role: None,
            },
            fields: ExtractedFields::default(),
            score,
            scoring_status: status,
            decision: Decision::Qualified,
            document_name: "cv.pdf".to_string(),
            document_blob_id: None,
        }
    }

    #[test]
    fn test_subject_shows_score() {
        let s = hr_notification_subject(&application(ScoringStatus::Completed, Some(72)));
        assert!(s.ends_with("(ATS Score: 72)"));
    }

    #[test]
    fn test_subject_marks_skipped() {
        let s = hr_notification_subject(&application(ScoringStatus::Skipped, Some(75)));
        assert!(s.ends_with("(ATS Skipped)"));
    }

    #[test]
    fn test_body_escapes_candidate_text() {
        let body = hr_notification_body(&application(ScoringStatus::Completed, Some(72)));
        assert!(body.contains("Asha &lt;b&gt;Rao&lt;/b&gt;"));
        assert!(body.contains("Loves &lt;script&gt;"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn test_body_escapes_ampersands_once() {
        let body = hr_notification_body(&application(ScoringStatus::Completed, Some(72)));
        assert!(body.contains("<td>Smith &amp; Sons</td>"));
        assert!(!body.contains("&amp;amp;"));
    }

    #[test]
    fn test_code_body_contains_code_and_ttl() {
        let body = code_body("042137", 10);
        assert!(body.contains("042137"));
        assert!(body.contains("10 minutes"));
    }
}
