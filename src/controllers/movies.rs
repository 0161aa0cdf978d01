use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::success;
use crate::error::{ApiResult, AppError};
use crate::middleware::parse_id;
use crate::models::{Movie, Schedule};
use crate::AppState;

const POPULAR_LIMIT: i64 = 10;
const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 50;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/upcoming", get(upcoming_movies))
        .route("/movies/popular", get(popular_movies))
        .route("/movies/{id}", get(movie_detail))
        .route("/movies/{id}/schedules", get(movie_schedules))
        .route("/movies/schedules/{schedule_id}/seats", get(available_seats))
}

#[derive(Debug, Deserialize)]
struct MoviesQuery {
    page: Option<u32>,
    #[serde(rename = "pageSize")]
    page_size: Option<u32>,
    search: Option<String>,
}

// GET /api/movies/upcoming
async fn upcoming_movies(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let movies = Movie::upcoming(&state.db).await?;
    Ok(success(movies))
}

// GET /api/movies/popular
async fn popular_movies(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let movies = Movie::popular(&state.db, POPULAR_LIMIT).await?;
    Ok(success(movies))
}

// GET /api/movies?page=1&pageSize=10&search=dune
async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MoviesQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let search = params.search.unwrap_or_default();
    let offset = i64::from(page - 1) * i64::from(page_size);

    let movies = Movie::page(&state.db, i64::from(page_size), offset, &search).await?;

    Ok(Json(json!({
        "success": true,
        "page": page,
        "pageSize": page_size,
        "search": search,
        "data": movies,
    })))
}

// GET /api/movies/{id}
async fn movie_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "movie")?;
    let movie = Movie::find(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("movie not found".to_string()))?;
    Ok(success(movie))
}

// GET /api/movies/{id}/schedules
async fn movie_schedules(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "movie")?;
    let schedules = Schedule::for_movie(id, &state.db).await?;
    Ok(success(schedules))
}

// GET /api/movies/schedules/{schedule_id}/seats
async fn available_seats(
    State(state): State<Arc<AppState>>,
    Path(schedule_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let schedule_id = parse_id(&schedule_id, "schedule")?;

    // Generation is read before the query so a concurrent order makes our fill stale, not visible.
    let cached = match &state.cache {
        Some(cache) => cache
            .seats_generation(schedule_id)
            .await
            .map(|generation| (cache, generation)),
        None => None,
    };

    if let Some((cache, generation)) = cached {
        if let Some(seats) = cache.get_available_seats(schedule_id, generation).await {
            return Ok(success(seats));
        }
    }

    let seats = state.availability.available_seats(schedule_id).await?;

    if let Some((cache, generation)) = cached {
        cache.save_available_seats(schedule_id, generation, &seats).await;
    }

    Ok(success(seats))
}
