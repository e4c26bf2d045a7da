use time::{
    format_description::well_known::{Iso8601, Rfc3339},
    OffsetDateTime, PrimitiveDateTime,
};
use tracing::{debug, info};

use crate::{
    error::AppError,
    news::{
        client::Headline,
        dto::Page,
        repo_types::{Article, Category, NewArticle},
    },
    state::AppState,
};

/// Below this many cached articles the unfiltered feed is refreshed first.
pub const ALL_REFRESH_THRESHOLD: i64 = 10;
pub const ALL_FETCH_SIZE: u32 = 20;
/// Same for a single category.
pub const CATEGORY_REFRESH_THRESHOLD: i64 = 5;
pub const CATEGORY_FETCH_SIZE: u32 = 10;

pub const MAX_PAGE_SIZE: u32 = 100;

const UNKNOWN: &str = "Unknown";

/// Serves a page of cached articles, refreshing the cache from the remote
/// API first when it holds too few rows for the requested scope.
pub async fn list_articles(
    st: &AppState,
    category: Option<Category>,
    page: u32,
    size: u32,
) -> Result<Page<Article>, AppError> {
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(AppError::BadRequest(format!(
            "size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    let (threshold, fetch_size) = match category {
        Some(_) => (CATEGORY_REFRESH_THRESHOLD, CATEGORY_FETCH_SIZE),
        None => (ALL_REFRESH_THRESHOLD, ALL_FETCH_SIZE),
    };

    let cached = st.articles.count(category).await?;
    if cached < threshold {
        debug!(?category, cached, threshold, "news cache below threshold");
        refresh(st, category, fetch_size).await?;
    }

    let total = st.articles.count(category).await?;
    let offset = i64::from(page) * i64::from(size);
    let rows = st.articles.page(category, i64::from(size), offset).await?;
    Ok(Page::new(rows, page, size, total))
}

/// Pulls one batch of headlines and caches every title not seen before.
/// Returns the number of newly stored articles.
async fn refresh(
    st: &AppState,
    category: Option<Category>,
    page_size: u32,
) -> Result<usize, AppError> {
    let headlines = st.news_api.top_headlines(category, page_size).await?;
    let received = headlines.len();
    let now = OffsetDateTime::now_utc();

    let mut stored = 0;
    for headline in headlines {
        let Some(article) = to_new_article(headline, category, now) else {
            continue;
        };
        if st.articles.insert_if_absent(article).await? {
            stored += 1;
        }
    }

    info!(?category, received, stored, "news cache refreshed");
    Ok(stored)
}

/// Maps a remote headline to a cache row. Headlines without a title are dropped;
/// the title is kept verbatim since it is the dedup key.
pub(crate) fn to_new_article(
    h: Headline,
    category: Option<Category>,
    now: OffsetDateTime,
) -> Option<NewArticle> {
    let title = h.title.filter(|t| !t.trim().is_empty())?;
    let source = h
        .source
        .and_then(|s| s.name)
        .unwrap_or_else(|| UNKNOWN.to_string());
    let category = category.unwrap_or_else(|| Category::infer_from_source(&source));

    Some(NewArticle {
        title,
        content: h.content.or_else(|| h.description.clone()),
        description: h.description,
        author: h.author.unwrap_or_else(|| UNKNOWN.to_string()),
        source,
        source_url: h.url,
        image_url: h.url_to_image,
        category,
        published_at: parse_published_at(h.published_at.as_deref(), now),
    })
}

/// Parses an ISO-8601 timestamp; falls back to `now` when absent or invalid.
pub(crate) fn parse_published_at(raw: Option<&str>, now: OffsetDateTime) -> OffsetDateTime {
    let Some(raw) = raw.map(str::trim) else {
        return now;
    };
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return ts;
    }
    if let Ok(ts) = OffsetDateTime::parse(raw, &Iso8601::DEFAULT) {
        return ts;
    }
    if let Ok(ts) = PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT) {
        return ts.assume_utc();
    }
    debug!(raw, "unparseable publishedAt, using current time");
    now
}
