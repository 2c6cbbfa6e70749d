#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API and tile server for the `AstraLens` lunar map.
//!
//! Serves the pre-generated `{z}/{y}/{x}.png` tile pyramid, the feature
//! database, the projected risk-zone overlay, area analysis and distance
//! measurement, plus the AI assistant behind `/api/ask`.
//!
//! All state is loaded once at startup and read-only afterwards. A missing
//! feature file or AI configuration degrades the affected endpoints instead
//! of stopping the server.

mod handlers;
pub mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use astralens_ai::LlmProvider;
use astralens_features::FeatureCatalog;
use astralens_geometry::CoordinateTransform;
use astralens_geometry::overlay::RiskZoneIndex;
use astralens_geometry::registry;
use astralens_geometry_models::MapDefinition;

/// Startup configuration, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind (`BIND_ADDR`, default `127.0.0.1`).
    pub bind_addr: String,
    /// Port to listen on (`PORT`, default `8080`).
    pub port: u16,
    /// Root of the tile pyramid (`TILES_DIR`, default `tiles/moon`).
    pub tiles_dir: PathBuf,
    /// Feature database JSON (`FEATURES_PATH`, default
    /// `data/moon_features.json`).
    pub features_path: PathBuf,
    /// Risk-zone `GeoJSON` (`RISK_ZONES_PATH`); the bundled dataset is used
    /// when unset.
    pub risk_zones_path: Option<PathBuf>,
    /// Map definition ID (`MAP_ID`, default `moon`).
    pub map_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            tiles_dir: PathBuf::from("tiles/moon"),
            features_path: PathBuf::from("data/moon_features.json"),
            risk_zones_path: None,
            map_id: registry::DEFAULT_MAP_ID.to_string(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from environment variables, falling back to
    /// the defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            tiles_dir: std::env::var("TILES_DIR").map_or(defaults.tiles_dir, PathBuf::from),
            features_path: std::env::var("FEATURES_PATH")
                .map_or(defaults.features_path, PathBuf::from),
            risk_zones_path: std::env::var("RISK_ZONES_PATH").ok().map(PathBuf::from),
            map_id: std::env::var("MAP_ID").unwrap_or(defaults.map_id),
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// Map being served.
    pub map: MapDefinition,
    /// Geo/pixel transform for [`Self::map`].
    pub transform: CoordinateTransform,
    /// Feature database; unloaded if the file was missing.
    pub catalog: FeatureCatalog,
    /// Risk zones for lookups.
    pub zones: RiskZoneIndex,
    /// Risk zones projected into pixel space, served as-is.
    pub projected_zones: serde_json::Value,
    /// Root of the tile pyramid.
    pub tiles_dir: PathBuf,
    /// LLM provider for `/api/ask`; `None` when no credentials are set.
    pub ai: Option<Arc<dyn LlmProvider>>,
}

impl AppState {
    /// Builds the state from already loaded parts.
    #[must_use]
    pub fn new(
        map: MapDefinition,
        catalog: FeatureCatalog,
        zones: RiskZoneIndex,
        tiles_dir: PathBuf,
        ai: Option<Arc<dyn LlmProvider>>,
    ) -> Self {
        let transform = CoordinateTransform::new(map.dimensions());
        let projected_zones = zones.projected(&transform).unwrap_or_else(|e| {
            log::error!("Failed to project risk zones: {e}");
            serde_json::json!({ "type": "FeatureCollection", "features": [] })
        });

        Self {
            map,
            transform,
            catalog,
            zones,
            projected_zones,
            tiles_dir,
            ai,
        }
    }

    /// Loads everything named by `config`.
    ///
    /// Missing or malformed data is logged and replaced by an empty
    /// stand-in so the rest of the API stays available.
    #[must_use]
    pub fn load(config: &ServerConfig) -> Self {
        let map = registry::find_map(&config.map_id).unwrap_or_else(|| {
            log::warn!(
                "Unknown map '{}', falling back to '{}'",
                config.map_id,
                registry::DEFAULT_MAP_ID
            );
            registry::default_map()
        });

        log::info!("Loading features from {}...", config.features_path.display());
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
        log::info!("Loaded {} risk zones", zones.zones().len());

        let ai = astralens_ai::create_provider_from_env()
            .map(Arc::<dyn LlmProvider>::from)
            .map_err(|e| log::warn!("AI assistant disabled: {e}"))
            .ok();

        Self::new(map, catalog, zones, config.tiles_dir.clone(), ai)
    }
}

/// Registers every route. Shared by [`run_server`] and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/tiles/{z}/{y}/{x}.png", web::get().to(handlers::tile))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .route("/map", web::get().to(handlers::map))
                .route("/features", web::get().to(handlers::features))
                .route("/features/{id}", web::get().to(handlers::feature))
                .route("/project", web::get().to(handlers::project))
                .route("/risk-zones", web::get().to(handlers::risk_zones))
                .route("/risk-zones/at", web::get().to(handlers::risk_zones_at))
                .route("/analysis", web::post().to(handlers::analysis))
                .route("/measure", web::post().to(handlers::measure))
                .route("/ask", web::post().to(handlers::ask)),
        );
}

/// Starts the `AstraLens` API server.
///
/// Loads the state described by [`ServerConfig::from_env`] and serves it
/// until shut down. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let config = ServerConfig::from_env();
    let state = web::Data::new(AppState::load(&config));

    log::info!(
        "Serving tiles from {} ({} features)",
        config.tiles_dir.display(),
        state.catalog.len()
    );
    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.tiles_dir, PathBuf::from("tiles/moon"));
        assert_eq!(config.map_id, "moon");
        assert!(config.risk_zones_path.is_none());
    }

    #[test]
    fn state_projects_bundled_zones() {
        let state = AppState::new(
            registry::default_map(),
            FeatureCatalog::default(),
            RiskZoneIndex::bundled().unwrap(),
            PathBuf::from("tiles"),
            None,
        );
        assert_eq!(state.projected_zones["type"], "FeatureCollection");
        assert_eq!(
            state.projected_zones["features"].as_array().unwrap().len(),
            state.zones.zones().len()
        );
    }
}
