use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

use crate::{config::NewsConfig, error::AppError, news::repo_types::Category};

/// Envelope of the `/top-headlines` endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlinesResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_results: Option<i64>,
    #[serde(default)]
    pub articles: Option<Vec<Headline>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headline {
    #[serde(default)]
    pub source: Option<HeadlineSource>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeadlineSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// Remote source of news headlines.
#[async_trait]
pub trait NewsApi: Send + Sync {
    async fn top_headlines(
        &self,
        category: Option<Category>,
        page_size: u32,
    ) -> Result<Vec<Headline>, AppError>;
}

#[derive(Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    config: NewsConfig,
}

impl NewsApiClient {
    pub fn new(http: reqwest::Client, config: NewsConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl NewsApi for NewsApiClient {
    async fn top_headlines(
        &self,
        category: Option<Category>,
        page_size: u32,
    ) -> Result<Vec<Headline>, AppError> {
        let (base_url, api_key) = self.config.api.credentials().ok_or_else(|| {
            AppError::Configuration(
                "News API not configured: set NEWS_API_BASE_URL and NEWS_API_KEY".into(),
            )
        })?;

        let mut query: Vec<(&str, String)> = vec![("country", self.config.country.clone())];
        if let Some(c) = category {
            query.push(("category", c.api_param().to_string()));
        }
        query.push(("apiKey", api_key.to_string()));
        query.push(("pageSize", page_size.to_string()));

        debug!(?category, page_size, "requesting top headlines");
        let resp = self
            .http
            .get(format!("{base_url}/top-headlines"))
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "news api request failed");
                AppError::Upstream("News API request failed".into())
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!("News API returned {status}")));
        }

        let body: HeadlinesResponse = resp.json().await.map_err(|e| {
            error!(error = %e, "news api response not decodable");
            AppError::Upstream("News API returned a malformed response".into())
        })?;
        debug!(
            status = body.status.as_deref().unwrap_or("-"),
            total = body.total_results.unwrap_or_default(),
            "top headlines received"
        );

        Ok(body.articles.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExternalApiConfig;
    use mockito::Matcher;

    fn client(base_url: Option<String>, api_key: Option<&str>) -> NewsApiClient {
        NewsApiClient::new(
            reqwest::Client::new(),
            NewsConfig {
                api: ExternalApiConfig {
                    base_url,
                    api_key: api_key.map(Into::into),
                },
                country: "us".into(),
            },
        )
    }

    #[tokio::test]
    async fn sends_category_key_and_page_size() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/top-headlines")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("country".into(), "us".into()),
                Matcher::UrlEncoded("category".into(), "sports".into()),
                Matcher::UrlEncoded("apiKey".into(), "news-key".into()),
                Matcher::UrlEncoded("pageSize".into(), "10".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"ok","totalResults":1,"articles":[
                    {"source":{"id":null,"name":"ESPN"},"author":null,"title":"Final score",
                     "description":"d","url":"https://espn.example/1","urlToImage":null,
                     "publishedAt":"2024-05-01T12:00:00Z","content":null}]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let items = client(Some(server.url()), Some("news-key"))
            .top_headlines(Some(Category::Sports), 10)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title.as_deref(), Some("Final score"));
        assert_eq!(
            items[0].source.as_ref().and_then(|s| s.name.as_deref()),
            Some("ESPN")
        );
    }

    #[tokio::test]
    async fn missing_credentials_is_configuration_error() {
        let err = client(None, Some("k")).top_headlines(None, 20).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn server_error_is_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/top-headlines")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = client(Some(server.url()), Some("k"))
            .top_headlines(None, 20)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn null_article_list_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/top-headlines")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"ok","totalResults":0,"articles":null}"#)
            .create_async()
            .await;

        let items = client(Some(server.url()), Some("k"))
            .top_headlines(None, 20)
            .await
            .unwrap();
        assert!(items.is_empty());
    }
}
