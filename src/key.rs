//! Key Path Construction
//!
//! Builds composite cache keys from prefix, context, identifier and suffix
//! segments.

use std::collections::BTreeMap;

/// Named tag dimensions used to scope and group keys (e.g. tenant, region).
///
/// A `BTreeMap` keeps dimension order stable, so two contexts holding the
/// same entries always render the same hash-tag group no matter the order
/// they were inserted in.
pub type KeyContext = BTreeMap<String, String>;

// == Key Path Builder ==
/// Assembles a composite key path out of optional segments.
///
/// Rendering grammar: `prefix['.'{dim:val,...}]['#'id]['.'suffix]`. The
/// context renders inside `{}` (redis hash-tag syntax) so keys sharing a
/// context land on the same storage partition. The `.` before the suffix is
/// only inserted when the key built so far is non-empty.
///
/// Building is pure and total. With no segments set the result is the empty
/// string; callers are responsible for uniqueness in that case.
///
/// # Example
/// ```
/// use tagcache::key::{KeyContext, KeyPathBuilder};
///
/// let mut context = KeyContext::new();
/// context.insert("tenant".to_string(), "x".to_string());
///
/// let key = KeyPathBuilder::new()
///     .prefix("cache")
///     .context(context)
///     .id("user")
///     .build();
///
/// assert_eq!(key, "cache.{tenant:x}#user");
/// ```
#[derive(Debug, Clone, Default)]
pub struct KeyPathBuilder {
    prefix: Option<String>,
    context: Option<KeyContext>,
    id: Option<String>,
    suffix: Option<String>,
}

impl KeyPathBuilder {
    // == Constructor ==
    /// Creates a builder with no segments set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the namespace prefix, rendered as the first segment.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the tag-dimension context, rendered as a `{dim:val,...}` group.
    pub fn context(mut self, context: KeyContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Sets the logical identifier, appended as `#id` with no separator.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the static qualifier appended after the identifier.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    // == Build ==
    /// Renders the key path.
    ///
    /// # Returns
    /// The composite key string; empty when no segments were set.
    pub fn build(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(prefix) = &self.prefix {
            parts.push(prefix.clone());
        }

        if let Some(context) = &self.context {
            let dims: Vec<String> = context
                .iter()
                .map(|(dim, value)| format!("{}:{}", dim, value))
                .collect();
            parts.push(format!("{{{}}}", dims.join(",")));
        }

        let mut key = parts.join(".");

        if let Some(id) = &self.id {
            key.push('#');
            key.push_str(id);
        }

        if let Some(suffix) = &self.suffix {
            if !key.is_empty() {
                key.push('.');
            }
            key.push_str(suffix);
        }

        key
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn context(entries: &[(&str, &str)]) -> KeyContext {
        entries
            .iter()
            .map(|(dim, value)| (dim.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_build_empty() {
        assert_eq!(KeyPathBuilder::new().build(), "");
    }

    #[test]
    fn test_build_prefix_only() {
        let key = KeyPathBuilder::new().prefix("cache").build();
        assert_eq!(key, "cache");
    }

    #[test]
    fn test_build_prefix_and_id() {
        let key = KeyPathBuilder::new().prefix("cache").id("user").build();
        assert_eq!(key, "cache#user");
    }

    #[test]
    fn test_build_full_key() {
        let key = KeyPathBuilder::new()
            .prefix("cache.sessions")
            .context(context(&[("tenant", "x")]))
            .id("user")
            .suffix("meta")
            .build();

        assert_eq!(key, "cache.sessions.{tenant:x}#user.meta");
    }

    #[test]
    fn test_build_context_without_prefix() {
        let key = KeyPathBuilder::new()
            .context(context(&[("tenant", "x")]))
            .id("42")
            .build();

        assert_eq!(key, "{tenant:x}#42");
    }

    #[test]
    fn test_build_suffix_only_omits_separator() {
        let key = KeyPathBuilder::new().suffix("meta").build();
        assert_eq!(key, "meta");
    }

    #[test]
    fn test_build_id_only() {
        let key = KeyPathBuilder::new().id("42").build();
        assert_eq!(key, "#42");
    }

    #[test]
    fn test_build_multiple_dimensions_sorted() {
        let key = KeyPathBuilder::new()
            .prefix("cache")
            .context(context(&[("tenant", "x"), ("region", "eu")]))
            .id("user")
            .build();

        // BTreeMap iteration is sorted by dimension name.
        assert_eq!(key, "cache.{region:eu,tenant:x}#user");
    }

    #[test]
    fn test_build_insertion_order_does_not_matter() {
        let forward = KeyPathBuilder::new()
            .context(context(&[("a", "1"), ("b", "2"), ("c", "3")]))
            .build();
        let reversed = KeyPathBuilder::new()
            .context(context(&[("c", "3"), ("b", "2"), ("a", "1")]))
            .build();

        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_build_empty_context_renders_empty_group() {
        let key = KeyPathBuilder::new()
            .prefix("cache")
            .context(KeyContext::new())
            .build();

        assert_eq!(key, "cache.{}");
    }
}
