/// Deterministic kebab-case identifier for directory layout and query keys.
///
/// Lowercase, `&` becomes `and`, whitespace runs become single hyphens.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .replace('&', "and")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
