//! HTTP handler functions for the `AstraLens` API.

use actix_files::NamedFile;
use actix_web::{HttpRequest, HttpResponse, web};
use astralens_ai::{AgentContext, run_agent};
use astralens_analysis::{UniformRandomTerrain, run_analysis};
use astralens_chat::FALLBACK_ANSWER;
use astralens_features::{FeatureError, FeatureRecord};
use astralens_geometry::pyramid::tile_path;
use astralens_geometry_models::{GeoPoint, SelectionRectangle};
use astralens_measurement::{MeasurementSet, format_distance};
use astralens_server_models::{
    AnalysisRequest, ApiError, ApiFeature, ApiHealth, ApiMap, ApiRiskZoneHit, AskRequest,
    AskResponse, FeatureQueryParams, GeoQueryParams, MeasureRequest, MeasureResponse,
};

use crate::AppState;

/// Default page size for `/api/features`.
const DEFAULT_FEATURE_LIMIT: usize = 50;

/// Largest page `/api/features` will return.
const MAX_FEATURE_LIMIT: usize = 1000;

fn error(message: impl Into<String>) -> ApiError {
    ApiError {
        error: message.into(),
    }
}

fn tile_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(error("Tile not found"))
}

fn feature_error(e: &FeatureError) -> HttpResponse {
    match e {
        FeatureError::NotLoaded => HttpResponse::ServiceUnavailable().json(error(e.to_string())),
        FeatureError::NotFound { .. } => HttpResponse::NotFound().json(error(e.to_string())),
        _ => {
            log::error!("Feature query failed: {e}");
            HttpResponse::InternalServerError().json(error("Failed to query features"))
        }
    }
}

fn to_api_feature(state: &AppState, feature: &FeatureRecord) -> ApiFeature {
    ApiFeature {
        id: feature.id.clone(),
        name: feature.name.clone(),
        latitude: feature.coordinates.latitude,
        longitude: feature.coordinates.longitude,
        pixel: state.transform.to_pixel(feature.coordinates),
        description: feature.description.clone(),
        image_url: feature.image_url.clone(),
    }
}

/// `GET /tiles/{z}/{y}/{x}.png`
///
/// Serves one tile of the pyramid. Non-numeric or negative indices and
/// tiles outside the pyramid are 404s.
pub async fn tile(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String, String)>,
) -> HttpResponse {
    let (z, y, x) = path.into_inner();

    let (Ok(zoom), Ok(y), Ok(x)) = (z.parse::<i32>(), y.parse::<i64>(), x.parse::<i64>()) else {
        return tile_not_found();
    };
    let (Ok(y), Ok(x)) = (u32::try_from(y), u32::try_from(x)) else {
        return tile_not_found();
    };

    let file = tile_path(&state.tiles_dir, &zoom.to_string(), y, x);
    match NamedFile::open_async(&file).await {
        Ok(named) => named.into_response(&req),
        Err(_) => {
            log::debug!("Tile not found: {}", file.display());
            tile_not_found()
        }
    }
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        feature_count: state.catalog.len(),
    })
}

/// `GET /api/map`
///
/// Returns the map definition the tile layer is configured from.
pub async fn map(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiMap::from(state.map.clone()))
}

/// `GET /api/features?q=&limit=`
///
/// Searches features by name, or lists the first `limit` features when no
/// query is given.
pub async fn features(
    state: web::Data<AppState>,
    params: web::Query<FeatureQueryParams>,
) -> HttpResponse {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_FEATURE_LIMIT)
        .min(MAX_FEATURE_LIMIT);

    let found: Result<Vec<&FeatureRecord>, FeatureError> = match params.q.as_deref() {
        Some(q) => state.catalog.search(q, limit),
        None => state
            .catalog
            .all()
            .map(|all| all.iter().take(limit).collect()),
    };

    match found {
        Ok(records) => {
            let api: Vec<ApiFeature> = records
                .into_iter()
                .map(|f| to_api_feature(&state, f))
                .collect();
            HttpResponse::Ok().json(api)
        }
        Err(e) => feature_error(&e),
    }
}

/// `GET /api/features/{id}`
pub async fn feature(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    match state.catalog.find_by_id(&id) {
        Ok(record) => HttpResponse::Ok().json(to_api_feature(&state, record)),
        Err(e) => feature_error(&e),
    }
}

/// `GET /api/project?lat=&lon=`
///
/// Converts a geographic position to pixel space (clamped).
pub async fn project(
    state: web::Data<AppState>,
    params: web::Query<GeoQueryParams>,
) -> HttpResponse {
    let pixel = state
        .transform
        .to_pixel(GeoPoint::new(params.lat, params.lon));
    HttpResponse::Ok().json(pixel)
}

/// `GET /api/risk-zones`
///
/// Returns the risk-zone overlay projected into pixel space.
pub async fn risk_zones(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.projected_zones)
}

/// `GET /api/risk-zones/at?lat=&lon=`
///
/// Lists the risk zones containing a geographic position.
pub async fn risk_zones_at(
    state: web::Data<AppState>,
    params: web::Query<GeoQueryParams>,
) -> HttpResponse {
    let hits: Vec<ApiRiskZoneHit> = state
        .zones
        .zones_at(GeoPoint::new(params.lat, params.lon))
        .into_iter()
        .map(|z| ApiRiskZoneHit {
            name: z.name.clone(),
            level: z.level.clone(),
        })
        .collect();
    HttpResponse::Ok().json(hits)
}

/// `POST /api/analysis`
///
/// Scores the selected rectangle. Pass `seed` for reproducible results.
pub async fn analysis(body: web::Json<AnalysisRequest>) -> HttpResponse {
    let rect = SelectionRectangle::new(body.corner1, body.corner2);
    let mut terrain = body
        .seed
        .map_or_else(UniformRandomTerrain::from_entropy, UniformRandomTerrain::seeded);
    let result = run_analysis(&rect, &mut terrain);

    log::debug!(
        "Analysis: grade {} ({}% safe, avg {:.2} deg)",
        result.stats.suitability_grade,
        result.stats.safe_area_percent,
        result.stats.average_slope
    );

    HttpResponse::Ok().json(result)
}

/// `POST /api/measure`
///
/// Replays the points through the two-point measurement rule and reports
/// the resulting distance.
pub async fn measure(body: web::Json<MeasureRequest>) -> HttpResponse {
    let mut set = MeasurementSet::new();
    for point in &body.points {
        set.add_point(*point);
    }
    let distance = set.distance();

    HttpResponse::Ok().json(MeasureResponse {
        distance,
        formatted: distance.map(format_distance),
    })
}

/// `POST /api/ask`
///
/// Answers a question with the AI agent. Failures answer with the fixed
/// fallback text and a 502 so the chat panel can show it directly.
pub async fn ask(state: web::Data<AppState>, body: web::Json<AskRequest>) -> HttpResponse {
    let question = body.user_question.trim();
    if question.is_empty() {
        return HttpResponse::BadRequest().json(error("Question is empty"));
    }

    let Some(provider) = state.ai.as_deref() else {
        log::warn!("Ask request received but no AI provider is configured");
        return fallback();
    };

    let context = AgentContext {
        map_name: &state.map.name,
        catalog: &state.catalog,
        transform: &state.transform,
        zones: &state.zones,
    };

    match run_agent(provider, &context, question).await {
        Ok(answer) => HttpResponse::Ok().json(AskResponse { answer }),
        Err(e) => {
            log::error!("AI agent failed: {e}");
            fallback()
        }
    }
}

fn fallback() -> HttpResponse {
    HttpResponse::BadGateway().json(AskResponse {
        answer: FALLBACK_ANSWER.to_string(),
    })
}
