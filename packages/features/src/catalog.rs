//! In-memory feature catalog with ID lookup and name search.

use std::path::Path;

use crate::{FeatureError, FeatureRecord};

/// The loaded feature database.
///
/// A catalog starts out unloaded ([`FeatureCatalog::default`]); lookups
/// against it fail with [`FeatureError::NotLoaded`] so the caller can show
/// a message instead of an empty result.
#[derive(Debug, Clone, Default)]
pub struct FeatureCatalog {
    features: Option<Vec<FeatureRecord>>,
}

impl FeatureCatalog {
    /// Wraps an already-parsed list of features.
    #[must_use]
    pub const fn new(features: Vec<FeatureRecord>) -> Self {
        Self {
            features: Some(features),
        }
    }

    /// Parses a JSON array of features.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::Json`] if the string isn't a valid feature
    /// array.
    pub fn from_json_str(json: &str) -> Result<Self, FeatureError> {
        let features: Vec<FeatureRecord> = serde_json::from_str(json)?;
        Ok(Self::new(features))
    }

    /// Reads a feature JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError`] if the file can't be read or parsed.
    pub fn load(path: &Path) -> Result<Self, FeatureError> {
        log::info!("Loading features from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&contents)?;
        log::info!("Loaded {} features", catalog.len());
        Ok(catalog)
    }

    /// Whether feature data is available.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.features.is_some()
    }

    /// Number of features (zero when unloaded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.as_ref().map_or(0, Vec::len)
    }

    /// Whether the catalog holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All features.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::NotLoaded`] if no data has been loaded.
    pub fn all(&self) -> Result<&[FeatureRecord], FeatureError> {
        self.features.as_deref().ok_or(FeatureError::NotLoaded)
    }

    /// Finds a feature by ID, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::NotLoaded`] if no data has been loaded, or
    /// [`FeatureError::NotFound`] if no feature has that ID.
    pub fn find_by_id(&self, id: &str) -> Result<&FeatureRecord, FeatureError> {
        let needle = id.trim();
        self.all()?
            .iter()
            .find(|f| f.id.eq_ignore_ascii_case(needle))
            .ok_or_else(|| FeatureError::NotFound {
                id: needle.to_string(),
            })
    }

    /// Case-insensitive substring search on feature names.
    ///
    /// An empty query matches nothing. At most `limit` results are returned,
    /// in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::NotLoaded`] if no data has been loaded.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<&FeatureRecord>, FeatureError> {
        let features = self.all()?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        Ok(features
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"id":"TYC-1","name":"Tycho","coordinates":[-43.31,-11.36],"description":"A crater on the Moon with a diameter of 85.29 km.","imageUrl":""},
        {"id":"COP-2","name":"Copernicus","coordinates":[9.62,-20.08],"description":"A crater on the Moon with a diameter of 96.07 km."},
        {"id":"MAR-3","name":"Mare Tranquillitatis","coordinates":[8.35,30.83]}
    ]"#;

    #[test]
    fn unloaded_catalog_reports_not_loaded() {
        let catalog = FeatureCatalog::default();
        assert!(!catalog.is_loaded());
        assert!(matches!(catalog.find_by_id("TYC-1"), Err(FeatureError::NotLoaded)));
        assert!(matches!(catalog.search("ty", 5), Err(FeatureError::NotLoaded)));
    }

    #[test]
    fn finds_by_id_case_insensitively() {
        let catalog = FeatureCatalog::from_json_str(SAMPLE).unwrap();
        let f = catalog.find_by_id("  tyc-1 ").unwrap();
        assert_eq!(f.name, "Tycho");
        assert!((f.coordinates.latitude - -43.31).abs() < 1e-9);
    }

    #[test]
    fn id_miss_is_not_found() {
        let catalog = FeatureCatalog::from_json_str(SAMPLE).unwrap();
        match catalog.find_by_id("XYZ-9") {
            Err(FeatureError::NotFound { id }) => assert_eq!(id, "XYZ-9"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn searches_names() {
        let catalog = FeatureCatalog::from_json_str(SAMPLE).unwrap();
        let hits = catalog.search("CO", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "COP-2");
        assert_eq!(catalog.search("a", 1).unwrap().len(), 1);
        assert!(catalog.search("   ", 10).unwrap().is_empty());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let catalog = FeatureCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.find_by_id("MAR-3").unwrap().description, "");
    }
}
