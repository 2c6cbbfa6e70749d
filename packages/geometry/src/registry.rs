//! Compile-time registry of map definitions.
//!
//! Each entry is an `(id, toml_content)` pair embedded via `include_str!`.
//! Adding another body (e.g. a higher-resolution polar mosaic) means adding
//! a TOML file in `maps/` and a matching entry here.

use astralens_geometry_models::MapDefinition;

/// Number of registered maps. Enforced by a test.
#[cfg(test)]
const EXPECTED_MAP_COUNT: usize = 1;

/// Embedded TOML map definitions.
const MAP_TOMLS: &[(&str, &str)] = &[("moon", include_str!("../maps/moon.toml"))];

/// Identifier of the map the viewer opens by default.
pub const DEFAULT_MAP_ID: &str = "moon";

/// Returns all registered map definitions.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. These are compile-time
/// constants, so a parse failure is a development error caught by the tests
/// below.
#[must_use]
pub fn all_maps() -> Vec<MapDefinition> {
    MAP_TOMLS
        .iter()
        .map(|(id, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse map definition '{id}': {e}"))
        })
        .collect()
}

/// Looks up a map definition by id.
#[must_use]
pub fn find_map(id: &str) -> Option<MapDefinition> {
    all_maps().into_iter().find(|m| m.id == id)
}

/// The default (Moon) map definition.
///
/// # Panics
///
/// Panics if the default map is missing from the registry.
#[must_use]
pub fn default_map() -> MapDefinition {
    find_map(DEFAULT_MAP_ID)
        .unwrap_or_else(|| panic!("Default map '{DEFAULT_MAP_ID}' is not registered"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use astralens_geometry_models::{MIN_ZOOM, MOON_IMAGE_HEIGHT, MOON_IMAGE_WIDTH, TILE_SIZE};
    use std::collections::BTreeSet;

    #[test]
    fn all_maps_parse() {
        assert_eq!(all_maps().len(), EXPECTED_MAP_COUNT);
    }

    #[test]
    fn ids_are_unique_and_match_keys() {
        let mut seen = BTreeSet::new();
        for ((key, _), map) in MAP_TOMLS.iter().zip(all_maps()) {
            assert_eq!(*key, map.id);
            assert!(seen.insert(map.id.clone()), "duplicate map id {}", map.id);
        }
    }

    #[test]
    fn moon_matches_constants() {
        let moon = default_map();
        assert_eq!(moon.width, MOON_IMAGE_WIDTH);
        assert_eq!(moon.height, MOON_IMAGE_HEIGHT);
        assert_eq!(moon.tile_size, TILE_SIZE);
        assert_eq!(moon.native_zoom, 0);
        assert_eq!(moon.min_zoom, MIN_ZOOM);
        assert!(moon.tile_url_template.contains("{z}/{y}/{x}"));
    }
}
