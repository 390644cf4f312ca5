//! Deterministic name derivation
//!
//! All per-deployment names are derived through [`derive_name`] so the same
//! inputs always land on the same resource names and two deployments that
//! differ in any input part cannot collide.

/// Application identifier baked into derived namespace names
pub const APP_NAME: &str = "rigging";

/// Join name parts into a deterministic deployment-scoped name.
///
/// Collision contract: parts are joined with `-` in order. Two part tuples
/// produce the same name only if their joined forms are byte-identical, so
/// callers that keep any one part distinct (project, context or user id)
/// get distinct names. Empty parts are skipped rather than producing `--`.
pub fn derive_name(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("-")
}

/// Discovery namespace name for one deployment.
///
/// Unique within a virtual network as long as the (project, context, user)
/// triple is unique; uniqueness of the triple is the caller's responsibility.
pub fn namespace_name(project: &str, context: &str, user: &str) -> String {
    format!(
        "{}.{}.internal",
        derive_name(&[project, context, user]),
        APP_NAME
    )
}

/// Derived front-door API name, unique per project/context/service triple.
pub fn api_name(project: &str, context: &str, service: &str) -> String {
    format!("{project}{context}{service}ApiProxy")
}

/// Reduce a derived name to a hostname label: lowercase alphanumerics and
/// dashes, everything else dropped.
pub fn host_slug(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}
