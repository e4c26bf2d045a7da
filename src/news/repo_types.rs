use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Technology,
    Business,
    Sports,
    Entertainment,
    Health,
    Science,
    Politics,
    General,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Technology,
        Category::Business,
        Category::Sports,
        Category::Entertainment,
        Category::Health,
        Category::Science,
        Category::Politics,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technology => "TECHNOLOGY",
            Category::Business => "BUSINESS",
            Category::Sports => "SPORTS",
            Category::Entertainment => "ENTERTAINMENT",
            Category::Health => "HEALTH",
            Category::Science => "SCIENCE",
            Category::Politics => "POLITICS",
            Category::General => "GENERAL",
        }
    }

    /// Value of the `category` query parameter sent upstream. Only three
    /// categories have a dedicated feed; the rest are served from `general`.
    pub fn api_param(&self) -> &'static str {
        match self {
            Category::Technology => "technology",
            Category::Business => "business",
            Category::Sports => "sports",
            _ => "general",
        }
    }

    /// Guesses a category from the publisher name by substring match.
    ///
    /// This is a known-imprecise heuristic: `"ai"` also matches names such as
    /// "Daily Mail". It is used only when the request did not name a category.
    pub fn infer_from_source(source: &str) -> Category {
        let s = source.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| s.contains(n));
        if has(&["tech", "ai", "digital"]) {
            Category::Technology
        } else if has(&["business", "finance", "market"]) {
            Category::Business
        } else if has(&["sport", "athletic"]) {
            Category::Sports
        } else {
            Category::General
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == upper)
            .ok_or_else(|| anyhow::anyhow!("unknown news category {s:?}"))
    }
}

/// Raw `news_articles` row; category is stored as TEXT.
#[derive(Debug, FromRow)]
pub struct ArticleRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub author: String,
    pub source: String,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub category: String,
    pub published_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub author: String,
    pub source: String,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub category: Category,
    pub published_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl TryFrom<ArticleRow> for Article {
    type Error = anyhow::Error;

    fn try_from(r: ArticleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            title: r.title,
            description: r.description,
            content: r.content,
            author: r.author,
            source: r.source,
            source_url: r.source_url,
            image_url: r.image_url,
            category: r.category.parse()?,
            published_at: r.published_at,
            created_at: r.created_at,
        })
    }
}

/// Article ready to be cached. `title` is the dedup key.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub author: String,
    pub source: String,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub category: Category,
    pub published_at: OffsetDateTime,
}
