//! Member identifier to document key conversion.
//!
//! Identifiers are written as a blend of camelCase (key words) and
//! snake_case (nesting): `nodeOne_nodeTwo_nodeThree` becomes
//! `node-one.node-two.node-three`, i.e.
//!
//! ```yaml
//! node-one:
//!     node-two:
//!         node-three:
//! ```

use std::sync::LazyLock;

use regex::Regex;

static WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("([a-z])([A-Z]+)").expect("static pattern"));

/// Convert a member identifier into its dotted document path.
///
/// ```rust
/// assert_eq!(dyaml::key::derive_key("nodeOne_nodeTwo"), "node-one.node-two");
/// ```
pub fn derive_key(ident: &str) -> String {
    ident
        .split('_')
        .map(|segment| {
            WORD_BOUNDARY
                .replace_all(segment, "$1-$2")
                .to_lowercase()
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Return the explicit key when one is given, otherwise derive it from `ident`.
pub fn resolve_key(explicit: Option<&str>, ident: &str) -> String {
    match explicit {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => derive_key(ident),
    }
}
