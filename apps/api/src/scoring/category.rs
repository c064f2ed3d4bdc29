/// Role categories that skip automated scoring and go to manual review.
const BYPASS_CATEGORIES: &[&str] = &["other", "custom", "custom (user-defined role)"];

/// Lowercases, trims and collapses internal whitespace.
pub fn normalize_category(category: &str) -> String {
    category
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// True when the declared category routes the application to manual review.
pub fn is_bypass_category(category: &str) -> bool {
    let normalized = normalize_category(category);
    BYPASS_CATEGORIES.contains(&normalized.as_str()) || normalized.starts_with("custom")
}
