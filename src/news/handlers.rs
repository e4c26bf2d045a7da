use axum::{
    extract::State,
    routing::get,
    Router,
};
use tracing::{instrument, warn};

use crate::{
    error::AppError,
    extract::{Json, Path, Query},
    news::{
        dto::{ArticleResponse, Page, PageQuery},
        repo_types::Category,
        services,
    },
    state::AppState,
};

pub fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/news", get(list_news))
        .route("/news/:category", get(list_news_by_category))
}

#[instrument(skip(state))]
pub async fn list_news(
    State(state): State<AppState>,
    Query(p): Query<PageQuery>,
) -> Result<Json<Page<ArticleResponse>>, AppError> {
    let page = services::list_articles(&state, None, p.page, p.size).await?;
    Ok(Json(page.map(ArticleResponse::from)))
}

#[instrument(skip(state))]
pub async fn list_news_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(p): Query<PageQuery>,
) -> Result<Json<Page<ArticleResponse>>, AppError> {
    let category: Category = category.parse().map_err(|e: anyhow::Error| {
        warn!(error = %e, "unknown news category");
        AppError::BadRequest(e.to_string())
    })?;
    let page = services::list_articles(&state, Some(category), p.page, p.size).await?;
    Ok(Json(page.map(ArticleResponse::from)))
}
