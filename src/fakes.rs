//! In-memory stand-ins for Postgres and the remote APIs, used by unit and router tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    auth::{
        password::hash_password,
        repo::UserStore,
        repo_types::{EmailChange, NewUser, User},
    },
    config::{AppConfig, ExternalApiConfig, JwtConfig, NewsConfig},
    error::AppError,
    news::{
        client::{Headline, NewsApi},
        repo::ArticleStore,
        repo_types::{Article, Category, NewArticle},
    },
    state::AppState,
    todos::{
        repo::TodoStore,
        repo_types::{Todo, TodoFields, TodoFilter},
    },
    weather::{
        client::{WeatherApi, WeatherQuery, WeatherReport},
        repo::WeatherStore,
        repo_types::{NewWeatherSnapshot, WeatherSnapshot},
    },
};

pub const TEST_PASSWORD: &str = "password123";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "workable".into(),
            audience: "workable-users".into(),
            ttl_minutes: 15,
            refresh_ttl_minutes: 60,
        },
        news: NewsConfig {
            api: ExternalApiConfig::default(),
            country: "us".into(),
        },
        weather: ExternalApiConfig::default(),
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser<'_>) -> anyhow::Result<Option<User>> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Ok(None);
        }
        let now = OffsetDateTime::now_utc();
        let created = User {
            id: Uuid::new_v4(),
            email: user.email.to_string(),
            password_hash: user.password_hash.to_string(),
            name: user.name.to_string(),
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(Some(created))
    }

    async fn change_email(&self, id: Uuid, new_email: &str) -> anyhow::Result<EmailChange> {
        let mut users = self.users.lock().unwrap();
        // Same order of checks as the Postgres store.
        let Some(idx) = users.iter().position(|u| u.id == id) else {
            return Ok(EmailChange::UserMissing);
        };
        if users[idx].email == new_email {
            return Ok(EmailChange::SameEmail);
        }
        if users.iter().any(|u| u.email == new_email && u.id != id) {
            return Ok(EmailChange::EmailTaken);
        }
        let user = &mut users[idx];
        user.email = new_email.to_string();
        user.updated_at = OffsetDateTime::now_utc();
        Ok(EmailChange::Changed(user.clone()))
    }
}

#[derive(Default)]
pub struct MemoryTodoStore {
    todos: Mutex<Vec<Todo>>,
}

impl MemoryTodoStore {
    fn modify(&self, id: Uuid, f: impl FnOnce(&mut Todo)) -> Option<Todo> {
        let mut todos = self.todos.lock().unwrap();
        let todo = todos.iter_mut().find(|t| t.id == id)?;
        f(todo);
        todo.updated_at = OffsetDateTime::now_utc();
        Some(todo.clone())
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn list_by_owner(&self, owner_id: Uuid, filter: TodoFilter) -> anyhow::Result<Vec<Todo>> {
        // Later inserts win ties on created_at, as with a monotonic clock.
        let mut out: Vec<Todo> = self
            .todos
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|t| t.owner_id == owner_id && filter.matches(t))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Todo>> {
        Ok(self.todos.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn insert(&self, owner_id: Uuid, fields: TodoFields) -> anyhow::Result<Todo> {
        let now = OffsetDateTime::now_utc();
        let todo = Todo {
            id: Uuid::new_v4(),
            owner_id,
            title: fields.title,
            description: fields.description,
            priority: fields.priority,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        self.todos.lock().unwrap().push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: Uuid, fields: TodoFields) -> anyhow::Result<Option<Todo>> {
        Ok(self.modify(id, |t| {
            t.title = fields.title;
            t.description = fields.description;
            t.priority = fields.priority;
        }))
    }

    async fn toggle(&self, id: Uuid) -> anyhow::Result<Option<Todo>> {
        Ok(self.modify(id, |t| t.completed = !t.completed))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut todos = self.todos.lock().unwrap();
        let before = todos.len();
        todos.retain(|t| t.id != id);
        Ok(todos.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryArticleStore {
    articles: Mutex<Vec<Article>>,
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn count(&self, category: Option<Category>) -> anyhow::Result<i64> {
        let n = self
            .articles
            .lock()
            .unwrap()
            .iter()
            .filter(|a| category.map_or(true, |c| a.category == c))
            .count();
        Ok(n as i64)
    }

    async fn insert_if_absent(&self, a: NewArticle) -> anyhow::Result<bool> {
        let mut articles = self.articles.lock().unwrap();
        if articles.iter().any(|existing| existing.title == a.title) {
            return Ok(false);
        }
        articles.push(Article {
            id: Uuid::new_v4(),
            title: a.title,
            description: a.description,
            content: a.content,
            author: a.author,
            source: a.source,
            source_url: a.source_url,
            image_url: a.image_url,
            category: a.category,
            published_at: a.published_at,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(true)
    }

    async fn page(
        &self,
        category: Option<Category>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Article>> {
        let mut matching: Vec<Article> = self
            .articles
            .lock()
            .unwrap()
            .iter()
            .filter(|a| category.map_or(true, |c| a.category == c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryWeatherStore {
    snapshots: Mutex<Vec<WeatherSnapshot>>,
}

impl MemoryWeatherStore {
    pub fn count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    /// Moves every stored snapshot `by` into the past.
    pub fn age_all(&self, by: Duration) {
        for s in self.snapshots.lock().unwrap().iter_mut() {
            s.created_at -= by;
        }
    }
}

#[async_trait]
impl WeatherStore for MemoryWeatherStore {
    async fn latest_since(
        &self,
        city: &str,
        since: OffsetDateTime,
    ) -> anyhow::Result<Option<WeatherSnapshot>> {
        // max_by_key keeps the last maximum, so equal timestamps favour the newest insert.
        Ok(self
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.city == city && s.created_at > since)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn insert(&self, s: NewWeatherSnapshot) -> anyhow::Result<WeatherSnapshot> {
        let snapshot = WeatherSnapshot {
            id: Uuid::new_v4(),
            city: s.city,
            country: s.country,
            temperature: s.temperature,
            feels_like: s.feels_like,
            humidity: s.humidity,
            wind_speed: s.wind_speed,
            description: s.description,
            icon: s.icon,
            created_at: OffsetDateTime::now_utc(),
        };
        self.snapshots.lock().unwrap().push(snapshot.clone());
        Ok(snapshot)
    }
}

/// Headline source that replays a canned response and records every call.
#[derive(Default)]
pub struct FakeNewsApi {
    headlines: Mutex<Vec<Headline>>,
    calls: Mutex<Vec<(Option<Category>, u32)>>,
    unconfigured: Mutex<bool>,
}

impl FakeNewsApi {
    pub fn respond_with(&self, headlines: Vec<Headline>) {
        *self.headlines.lock().unwrap() = headlines;
    }

    pub fn fail_with_configuration(&self) {
        *self.unconfigured.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<(Option<Category>, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsApi for FakeNewsApi {
    async fn top_headlines(
        &self,
        category: Option<Category>,
        page_size: u32,
    ) -> Result<Vec<Headline>, AppError> {
        if *self.unconfigured.lock().unwrap() {
            return Err(AppError::Configuration("News API is not configured".into()));
        }
        self.calls.lock().unwrap().push((category, page_size));
        let all = self.headlines.lock().unwrap().clone();
        Ok(all.into_iter().take(page_size as usize).collect())
    }
}

/// Weather source returning whatever report was last set. Without one it
/// behaves like an upstream that answered with an empty body.
pub struct FakeWeatherApi {
    report: Mutex<Option<WeatherReport>>,
    calls: Mutex<usize>,
    configured: Mutex<bool>,
}

impl Default for FakeWeatherApi {
    fn default() -> Self {
        Self {
            report: Mutex::new(None),
            calls: Mutex::new(0),
            configured: Mutex::new(true),
        }
    }
}

impl FakeWeatherApi {
    pub fn respond_with(&self, report: WeatherReport) {
        *self.report.lock().unwrap() = Some(report);
    }

    pub fn set_configured(&self, configured: bool) {
        *self.configured.lock().unwrap() = configured;
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl WeatherApi for FakeWeatherApi {
    fn ensure_configured(&self) -> Result<(), AppError> {
        if *self.configured.lock().unwrap() {
            Ok(())
        } else {
            Err(AppError::Configuration("Weather API is not configured".into()))
        }
    }

    async fn current(&self, _query: WeatherQuery<'_>) -> Result<WeatherReport, AppError> {
        self.ensure_configured()?;
        *self.calls.lock().unwrap() += 1;
        self.report
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::Upstream("Empty response from weather API".into()))
    }
}

/// An [`AppState`] wired to in-memory parts, plus handles to poke at them.
pub struct TestEnv {
    pub state: AppState,
    pub news_api: Arc<FakeNewsApi>,
    pub weather_api: Arc<FakeWeatherApi>,
    pub weather_store: Arc<MemoryWeatherStore>,
}

impl TestEnv {
    pub fn new() -> Self {
        let news_api = Arc::new(FakeNewsApi::default());
        let weather_api = Arc::new(FakeWeatherApi::default());
        let weather_store = Arc::new(MemoryWeatherStore::default());

        let state = AppState {
            config: Arc::new(test_config()),
            users: Arc::new(MemoryUserStore::default()),
            todos: Arc::new(MemoryTodoStore::default()),
            articles: Arc::new(MemoryArticleStore::default()),
            weather: weather_store.clone(),
            news_api: news_api.clone(),
            weather_api: weather_api.clone(),
        };

        Self {
            state,
            news_api,
            weather_api,
            weather_store,
        }
    }

    /// Registers a user whose password is [`TEST_PASSWORD`].
    pub async fn user(&self, email: &str) -> User {
        let hash = hash_password(TEST_PASSWORD).unwrap();
        let name = email.split('@').next().unwrap_or(email);
        self.state
            .users
            .create(NewUser {
                email,
                password_hash: &hash,
                name,
            })
            .await
            .unwrap()
            .expect("email already registered")
    }

    pub async fn seed_article(&self, title: &str, category: Category) {
        let inserted = self
            .state
            .articles
            .insert_if_absent(NewArticle {
                title: title.into(),
                description: None,
                content: None,
                author: "Unknown".into(),
                source: "Seed".into(),
                source_url: None,
                image_url: None,
                category,
                published_at: OffsetDateTime::now_utc(),
            })
            .await
            .unwrap();
        assert!(inserted, "duplicate seed title {title}");
    }
}
