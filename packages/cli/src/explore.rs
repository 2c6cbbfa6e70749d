//! Terminal front end for the map tools: feature lookup, distance
//! measurement and landing-site analysis over one [`MapSession`].

use astralens_analysis::UniformRandomTerrain;
use astralens_features::FeatureCatalog;
use astralens_geometry::CoordinateTransform;
use astralens_geometry::overlay::RiskZoneIndex;
use astralens_geometry::registry;
use astralens_geometry_models::{GeoPoint, PixelPoint, SelectionRectangle};
use astralens_measurement::format_distance;
use astralens_session::{InteractionMode, MapSession};
use dialoguer::{Input, Select};

enum Action {
    FindFeature,
    Measure,
    Analyze,
    ToggleRiskOverlay,
    Status,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::FindFeature,
        Self::Measure,
        Self::Analyze,
        Self::ToggleRiskOverlay,
        Self::Status,
        Self::Quit,
    ];

    const fn label(&self) -> &'static str {
        match self {
            Self::FindFeature => "Find a feature",
            Self::Measure => "Measure a distance",
            Self::Analyze => "Analyze a landing area",
            Self::ToggleRiskOverlay => "Toggle risk-zone overlay",
            Self::Status => "Show session status",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the explore menu until the user quits.
///
/// # Errors
///
/// Returns an error if a terminal prompt fails.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = astralens_server::ServerConfig::from_env();
    let map = registry::find_map(&config.map_id).unwrap_or_else(registry::default_map);

    let catalog = FeatureCatalog::load(&config.features_path).unwrap_or_else(|e| {
        log::warn!("Feature data unavailable: {e}");
        FeatureCatalog::default()
    });
    let zones = match &config.risk_zones_path {
        Some(path) => RiskZoneIndex::load(path),
        None => RiskZoneIndex::bundled(),
    }
    .unwrap_or_else(|e| {
        log::warn!("Risk zones unavailable: {e}");
        RiskZoneIndex::default()
    });

    println!("{} ({} features)", map.name, catalog.len());
    let mut session = MapSession::new(CoordinateTransform::new(map.dimensions()), catalog);
    let mut terrain = UniformRandomTerrain::from_entropy();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    loop {
        println!();
        let idx = Select::new()
            .with_prompt("Map tool")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::FindFeature => find_feature(&mut session, &zones)?,
            Action::Measure => measure(&mut session)?,
            Action::Analyze => analyze(&mut session, &mut terrain)?,
            Action::ToggleRiskOverlay => {
                let visible = session.toggle_risk_overlay();
                println!(
                    "Risk-zone overlay {} ({} zones)",
                    if visible { "shown" } else { "hidden" },
                    zones.zones().len()
                );
            }
            Action::Status => {
                let status = session.status();
                println!("Mode:               {}", status.mode);
                println!("Features:           {}", status.feature_count);
                println!("Labeled:            {}", status.labeled_count);
                println!("Measurement points: {}", status.measurement_points);
                println!("Analysis shown:     {}", status.has_analysis);
                println!("Risk overlay:       {}", status.risk_overlay_visible);
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

fn prompt_geo(label: &str) -> Result<GeoPoint, dialoguer::Error> {
    let latitude: f64 = Input::new()
        .with_prompt(format!("{label} latitude"))
        .interact_text()?;
    let longitude: f64 = Input::new()
        .with_prompt(format!("{label} longitude"))
        .interact_text()?;
    Ok(GeoPoint::new(latitude, longitude))
}

fn find_feature(
    session: &mut MapSession,
    zones: &RiskZoneIndex,
) -> Result<(), Box<dyn std::error::Error>> {
    let query: String = Input::new().with_prompt("Search").interact_text()?;

    let ids: Vec<(String, String)> = match session.catalog().search(&query, 20) {
        Ok(matches) => matches
            .into_iter()
            .map(|f| (f.id.clone(), f.name.clone()))
            .collect(),
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    if ids.is_empty() {
        println!("No features match '{query}'");
        return Ok(());
    }

    let names: Vec<&str> = ids.iter().map(|(_, name)| name.as_str()).collect();
    let idx = Select::new()
        .with_prompt("Feature")
        .items(&names)
        .default(0)
        .interact()?;

    match session.label_feature(&ids[idx].0) {
        Ok(labeled) => {
            let feature = &labeled.feature;
            println!("{} ({})", feature.name, feature.id);
            println!(
                "  {:.4}, {:.4} -> pixel ({:.0}, {:.0})",
                feature.coordinates.latitude,
                feature.coordinates.longitude,
                labeled.marker.x,
                labeled.marker.y
            );
            if !feature.description.is_empty() {
                println!("  {}", feature.description);
            }
            for zone in zones.zones_at(feature.coordinates) {
                match &zone.level {
                    Some(level) => println!("  Risk zone: {} ({level})", zone.name),
                    None => println!("  Risk zone: {}", zone.name),
                }
            }
        }
        Err(e) => println!("{e}"),
    }

    Ok(())
}

fn measure(session: &mut MapSession) -> Result<(), Box<dyn std::error::Error>> {
    session.set_mode(InteractionMode::Measure);
    session.clear_points();

    for label in ["From", "To"] {
        let geo = prompt_geo(label)?;
        let pixel = session.transform().to_pixel(geo);
        session.click(pixel);
    }

    if let Some(distance) = session.distance() {
        println!("Distance: {}", format_distance(distance));
    }
    session.set_mode(InteractionMode::Browse);
    Ok(())
}

fn analyze(
    session: &mut MapSession,
    terrain: &mut UniformRandomTerrain,
) -> Result<(), Box<dyn std::error::Error>> {
    session.set_mode(InteractionMode::Analyze);

    let corner1 = prompt_geo("First corner")?;
    let corner2 = prompt_geo("Opposite corner")?;
    let to_pixel = |geo: GeoPoint| -> PixelPoint { session.transform().to_pixel(geo) };
    let rect = SelectionRectangle::new(to_pixel(corner1), to_pixel(corner2));

    if let Some(result) = session.complete_drag(&rect, terrain) {
        let stats = result.stats;
        let safe = result.cells.iter().filter(|c| c.is_safe()).count();
        println!("Grade:         {}", stats.suitability_grade);
        println!("Average slope: {:.1}°", stats.average_slope);
        println!(
            "Safe area:     {}% ({safe} of {} cells)",
            stats.safe_area_percent,
            result.cells.len()
        );
    }
    session.set_mode(InteractionMode::Browse);
    Ok(())
}
