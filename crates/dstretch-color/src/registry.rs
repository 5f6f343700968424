//! Name to descriptor lookup.

use crate::builtin::builtin_colorspaces;
use crate::space::ColorspaceDescriptor;
use crate::{ColorError, ColorResult};
use std::collections::BTreeMap;

/// Catalog of colorspaces keyed by name.
///
/// Names are matched exactly. Registering a name that already exists
/// replaces the previous entry.
///
/// ```rust
/// use dstretch_color::ColorspaceRegistry;
///
/// let registry = ColorspaceRegistry::with_builtins();
/// assert!(registry.contains("YDS"));
/// assert!(registry.get("NOPE").is_err());
/// assert_eq!(registry.list()["CRGB"], "Pre-calculated matrix, very effective for faint reds");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ColorspaceRegistry {
    spaces: BTreeMap<String, ColorspaceDescriptor>,
}

impl ColorspaceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in catalog.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for space in builtin_colorspaces() {
            registry.register(space);
        }
        registry
    }

    /// Adds or replaces a descriptor, returning the one it replaced.
    pub fn register(&mut self, descriptor: ColorspaceDescriptor) -> Option<ColorspaceDescriptor> {
        self.spaces.insert(descriptor.name().to_string(), descriptor)
    }

    /// Resolves a name.
    ///
    /// # Errors
    ///
    /// [`ColorError::UnknownColorspace`] if nothing is registered under `name`.
    pub fn get(&self, name: &str) -> ColorResult<&ColorspaceDescriptor> {
        self.spaces
            .get(name)
            .ok_or_else(|| ColorError::UnknownColorspace {
                name: name.to_string(),
                available: self.names().map(str::to_string).collect(),
            })
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.spaces.contains_key(name)
    }

    /// Maps every name to its description, sorted by name.
    pub fn list(&self) -> BTreeMap<String, String> {
        self.spaces
            .iter()
            .map(|(name, cs)| (name.clone(), cs.description().to_string()))
            .collect()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.spaces.keys().map(String::as_str)
    }

    /// Names of the spaces tuned for `pigment` (case-insensitive), sorted.
    pub fn optimized_for(&self, pigment: &str) -> Vec<&str> {
        self.spaces
            .values()
            .filter(|cs| cs.is_optimized_for(pigment))
            .map(|cs| cs.name())
            .collect()
    }

    /// Iterates over descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ColorspaceDescriptor> {
        self.spaces.values()
    }

    /// Number of registered spaces.
    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BaseSpace;
    use dstretch_core::ErrorKind;
    use dstretch_math::Mat3;

    #[test]
    fn test_builtin_names() {
        let r = ColorspaceRegistry::with_builtins();
        let names: Vec<&str> = r.names().collect();
        for expected in [
            "RGB", "LAB", "YDS", "YBR", "YBK", "YRE", "YRD", "YYE", "YWE", "YXX", "LDS", "LRE",
            "LRD", "LBK", "LBL", "LWE", "LYE", "LXX", "CRGB",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }
        assert_eq!(r.len(), 19);
    }

    #[test]
    fn test_unknown_lists_available() {
        let r = ColorspaceRegistry::with_builtins();
        let err = r.get("XYZ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownColorspace);
        assert!(err.to_string().contains("YDS"));
    }

    #[test]
    fn test_register_overwrites() {
        let mut r = ColorspaceRegistry::with_builtins();
        let custom = ColorspaceDescriptor::builtin_matrix(
            "CRGB",
            "replacement",
            &["red"],
            BaseSpace::Rgb,
            Mat3::IDENTITY,
        )
        .unwrap();
        assert!(r.register(custom).is_some());
        assert_eq!(r.get("CRGB").unwrap().description(), "replacement");
        assert_eq!(r.len(), 19);
    }

    #[test]
    fn test_optimized_for() {
        let r = ColorspaceRegistry::with_builtins();
        let reds = r.optimized_for("Red");
        assert!(reds.contains(&"CRGB"));
        assert!(reds.contains(&"YBR"));
        assert!(!reds.contains(&"YDS"));
        assert_eq!(r.optimized_for("white"), vec!["LWE", "YWE"]);
    }
}
