use std::sync::Arc;

use crate::{
    auth::repo::{PgUserStore, UserStore},
    config::AppConfig,
    db,
    news::{
        client::{NewsApi, NewsApiClient},
        repo::{ArticleStore, PgArticleStore},
    },
    todos::repo::{PgTodoStore, TodoStore},
    weather::{
        client::{WeatherApi, WeatherApiClient},
        repo::{PgWeatherStore, WeatherStore},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub todos: Arc<dyn TodoStore>,
    pub articles: Arc<dyn ArticleStore>,
    pub weather: Arc<dyn WeatherStore>,
    pub news_api: Arc<dyn NewsApi>,
    pub weather_api: Arc<dyn WeatherApi>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let pool = db::connect(&config.database_url).await?;

        if config.news.api.credentials().is_none() {
            tracing::warn!("news api not configured; /api/news will fail until it is");
        }
        if config.weather.credentials().is_none() {
            tracing::warn!("weather api not configured; /api/weather will fail until it is");
        }

        let http = reqwest::Client::new();
        Ok(Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            todos: Arc::new(PgTodoStore::new(pool.clone())),
            articles: Arc::new(PgArticleStore::new(pool.clone())),
            weather: Arc::new(PgWeatherStore::new(pool)),
            news_api: Arc::new(NewsApiClient::new(http.clone(), config.news.clone())),
            weather_api: Arc::new(WeatherApiClient::new(http, config.weather.clone())),
            config,
        })
    }
}
