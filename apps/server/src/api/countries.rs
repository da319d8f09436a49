use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use country_cache_core::{Country, StatusResponse};
use validator::Validate;

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{AppJson, CountryQueryParams, CountryUpdateRequest},
};

async fn refresh_countries(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatusResponse>> {
    let status = state.country_service.refresh().await?;
    Ok(Json(status))
}

async fn list_countries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CountryQueryParams>,
) -> ApiResult<Json<Vec<Country>>> {
    let countries = state.country_service.list_countries(
        params.region.as_deref(),
        params.currency.as_deref(),
        params.sort.as_deref(),
    )?;
    Ok(Json(countries))
}

async fn get_status(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatusResponse>> {
    Ok(Json(state.country_service.get_status()?))
}

async fn get_summary_image(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let bytes = state.country_service.get_summary_image().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"summary.png\"",
            ),
        ],
        bytes,
    ))
}

async fn list_by_region(
    State(state): State<Arc<AppState>>,
    Path(region): Path<String>,
) -> ApiResult<Json<Vec<Country>>> {
    Ok(Json(state.country_service.list_by_region(&region)?))
}

async fn get_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Country>> {
    Ok(Json(state.country_service.get_by_name(&name)?))
}

async fn update_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    AppJson(request): AppJson<CountryUpdateRequest>,
) -> ApiResult<Json<Country>> {
    request.validate()?;
    let country = state
        .country_service
        .update_country(&name, request.into_update())
        .await?;
    Ok(Json(country))
}

async fn delete_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    state.country_service.delete_by_name(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/countries", get(list_countries))
        .route("/countries/refresh", post(refresh_countries))
        .route("/countries/status", get(get_status))
        .route("/countries/image", get(get_summary_image))
        .route("/countries/region/{region}", get(list_by_region))
        .route(
            "/countries/{name}",
            get(get_country).put(update_country).delete(delete_country),
        )
}
