use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::weather::repo_types::{NewWeatherSnapshot, WeatherSnapshot};

#[async_trait]
pub trait WeatherStore: Send + Sync {
    /// Newest snapshot for `city` created strictly after `since`.
    async fn latest_since(
        &self,
        city: &str,
        since: OffsetDateTime,
    ) -> anyhow::Result<Option<WeatherSnapshot>>;
    async fn insert(&self, snapshot: NewWeatherSnapshot) -> anyhow::Result<WeatherSnapshot>;
}

#[derive(Clone)]
pub struct PgWeatherStore {
    db: PgPool,
}

impl PgWeatherStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const WEATHER_COLUMNS: &str = "id, city, country, temperature, feels_like, humidity, wind_speed, \
                               description, icon, created_at";

#[async_trait]
impl WeatherStore for PgWeatherStore {
    async fn latest_since(
        &self,
        city: &str,
        since: OffsetDateTime,
    ) -> anyhow::Result<Option<WeatherSnapshot>> {
        let row = sqlx::query_as::<_, WeatherSnapshot>(&format!(
            r#"
            SELECT {WEATHER_COLUMNS}
              FROM weather_data
             WHERE city = $1 AND created_at > $2
             ORDER BY created_at DESC
             LIMIT 1
            "#
        ))
        .bind(city)
        .bind(since)
        .fetch_optional(&self.db)
        .await
        .context("find recent weather")?;
        Ok(row)
    }

    async fn insert(&self, s: NewWeatherSnapshot) -> anyhow::Result<WeatherSnapshot> {
        let row = sqlx::query_as::<_, WeatherSnapshot>(&format!(
            r#"
            INSERT INTO weather_data
                (id, city, country, temperature, feels_like, humidity, wind_speed, description, icon)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {WEATHER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&s.city)
        .bind(&s.country)
        .bind(s.temperature)
        .bind(s.feels_like)
        .bind(s.humidity)
        .bind(s.wind_speed)
        .bind(&s.description)
        .bind(&s.icon)
        .fetch_one(&self.db)
        .await
        .context("insert weather snapshot")?;
        Ok(row)
    }
}
