//! Conversion from the nomenclature CSV export to feature JSON.
//!
//! Expected columns (header whitespace is ignored): `Feature Name`,
//! `Center Latitude`, `Center Longitude`, `Feature Type`, `Diameter`.
//! Rows with an empty latitude or longitude are skipped. IDs are the first
//! three characters of the name in upper case plus a running counter that
//! only advances on accepted rows (`"TYC-1"`, `"COP-2"`, ...).

use std::io::Read;
use std::path::Path;

use astralens_geometry_models::GeoPoint;

use crate::{FeatureError, FeatureRecord};

const NAME_COLUMN: &str = "Feature Name";
const LATITUDE_COLUMN: &str = "Center Latitude";
const LONGITUDE_COLUMN: &str = "Center Longitude";
const TYPE_COLUMN: &str = "Feature Type";
const DIAMETER_COLUMN: &str = "Diameter";

/// Parses nomenclature CSV rows into feature records.
///
/// # Errors
///
/// Returns [`FeatureError::MissingColumn`] if a required header is absent,
/// or [`FeatureError::Csv`] if the CSV is malformed.
pub fn convert_csv<R: Read>(reader: R) -> Result<Vec<FeatureRecord>, FeatureError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| FeatureError::MissingColumn {
                column: name.to_string(),
            })
    };

    let name_idx = column(NAME_COLUMN)?;
    let lat_idx = column(LATITUDE_COLUMN)?;
    let lon_idx = column(LONGITUDE_COLUMN)?;
    let type_idx = column(TYPE_COLUMN)?;
    let diameter_idx = column(DIAMETER_COLUMN)?;

    let mut features = Vec::new();
    let mut counter = 0_u32;

    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let (lat_str, lon_str) = (field(lat_idx), field(lon_idx));
        if lat_str.is_empty() || lon_str.is_empty() {
            continue;
        }

        let (Ok(latitude), Ok(longitude)) = (lat_str.parse::<f64>(), lon_str.parse::<f64>()) else {
            log::warn!("Skipping row {}: unparseable coordinates ({lat_str}, {lon_str})", line + 2);
            continue;
        };

        counter += 1;
        let name = field(name_idx).to_string();
        let prefix: String = name.chars().take(3).collect::<String>().to_uppercase();

        features.push(FeatureRecord {
            id: format!("{prefix}-{counter}"),
            description: format!(
                "A {} on the Moon with a diameter of {} km.",
                field(type_idx),
                field(diameter_idx)
            ),
            name,
            coordinates: GeoPoint::new(latitude, longitude),
            image_url: String::new(),
        });
    }

    log::info!("Converted {} features", features.len());

    Ok(features)
}

/// Converts a CSV file on disk and writes pretty-printed JSON.
///
/// Returns the number of features written.
///
/// # Errors
///
/// Returns [`FeatureError`] if reading, parsing or writing fails.
pub fn convert_file(csv_path: &Path, json_path: &Path) -> Result<usize, FeatureError> {
    log::info!("Reading features from {}", csv_path.display());
    let file = std::fs::File::open(csv_path)?;
    let features = convert_csv(file)?;

    if let Some(parent) = json_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(json_path, serde_json::to_string_pretty(&features)?)?;

    log::info!(
        "Saved {} features to {}",
        features.len(),
        json_path.display()
    );
    Ok(features.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FeatureCatalog;

    const CSV: &str = "\
Feature Name,Center Latitude, Center Longitude ,Feature Type,Diameter
Tycho,-43.31,-11.36,Crater,85.29
Unplaced,,,Crater,1
Copernicus,9.62,-20.08,Crater,96.07
Mare Tranquillitatis,8.35,30.83,Mare,875.75
";

    #[test]
    fn converts_rows_and_skips_missing_coordinates() {
        let features = convert_csv(CSV.as_bytes()).unwrap();
        assert_eq!(features.len(), 3);

        assert_eq!(features[0].id, "TYC-1");
        assert_eq!(features[1].id, "COP-2");
        assert_eq!(features[2].id, "MAR-3");
        assert_eq!(
            features[0].description,
            "A Crater on the Moon with a diameter of 85.29 km."
        );
        assert!((features[1].coordinates.longitude - -20.08).abs() < 1e-9);
        assert!(features[2].image_url.is_empty());
    }

    #[test]
    fn short_names_use_what_they_have() {
        let csv = "Feature Name,Center Latitude,Center Longitude,Feature Type,Diameter\nAb,1,2,Crater,3\n";
        let features = convert_csv(csv.as_bytes()).unwrap();
        assert_eq!(features[0].id, "AB-1");
    }

    #[test]
    fn missing_column_is_reported() {
        let csv = "Feature Name,Center Latitude\nTycho,1\n";
        match convert_csv(csv.as_bytes()) {
            Err(FeatureError::MissingColumn { column }) => assert_eq!(column, "Center Longitude"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn converted_file_loads_back_into_a_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("lunar_features.csv");
        let json_path = dir.path().join("out/features_all.json");
        std::fs::write(&csv_path, CSV).unwrap();

        assert_eq!(convert_file(&csv_path, &json_path).unwrap(), 3);
        let catalog = FeatureCatalog::load(&json_path).unwrap();
        assert_eq!(catalog.find_by_id("cop-2").unwrap().name, "Copernicus");
    }
}
