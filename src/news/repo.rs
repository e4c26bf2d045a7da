use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::news::repo_types::{Article, ArticleRow, Category, NewArticle};

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Number of cached articles, optionally restricted to one category.
    async fn count(&self, category: Option<Category>) -> anyhow::Result<i64>;
    /// Inserts unless an article with the same title exists. Returns `true` if a row was written.
    async fn insert_if_absent(&self, article: NewArticle) -> anyhow::Result<bool>;
    /// Articles ordered by `published_at` descending.
    async fn page(
        &self,
        category: Option<Category>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Article>>;
}

#[derive(Clone)]
pub struct PgArticleStore {
    db: PgPool,
}

impl PgArticleStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn count(&self, category: Option<Category>) -> anyhow::Result<i64> {
        let n: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM news_articles WHERE ($1::TEXT IS NULL OR category = $1)",
        )
        .bind(category.map(|c| c.as_str()))
        .fetch_one(&self.db)
        .await
        .context("count news articles")?;
        Ok(n)
    }

    async fn insert_if_absent(&self, a: NewArticle) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO news_articles
                (id, title, description, content, author, source, source_url, image_url,
                 category, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (title) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&a.title)
        .bind(&a.description)
        .bind(&a.content)
        .bind(&a.author)
        .bind(&a.source)
        .bind(&a.source_url)
        .bind(&a.image_url)
        .bind(a.category.as_str())
        .bind(a.published_at)
        .execute(&self.db)
        .await
        .context("insert news article")?;
        Ok(res.rows_affected() == 1)
    }

    async fn page(
        &self,
        category: Option<Category>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT id, title, description, content, author, source, source_url, image_url,
                   category, published_at, created_at
              FROM news_articles
             WHERE ($1::TEXT IS NULL OR category = $1)
             ORDER BY published_at DESC, id
             LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category.map(|c| c.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("page news articles")?;

        rows.into_iter().map(Article::try_from).collect()
    }
}
