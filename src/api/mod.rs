pub mod models;

pub use models::*;

use once_cell::sync::Lazy;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

const DEFAULT_API_BASE: &str = "https://api.fan18x.com/api";

/// Client for the remote catalog. The catalog picks the page; we only tell it
/// which ids were already shown this session.
pub struct CatalogClient {
    base_url: String,
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn random_url(&self, recent_ids: &[String]) -> String {
        if recent_ids.is_empty() {
            return format!("{}/video/random", self.base_url);
        }
        let joined = recent_ids
            .iter()
            .map(|id| urlencoding::encode(id).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}/video/random?recentIds={}", self.base_url, joined)
    }

    /// Fetch the next page of feed items. No guaranteed page size; the
    /// response is "the next page", however large the server made it.
    pub async fn random_page(&self, recent_ids: &[String]) -> Result<Vec<FeedItem>, String> {
        let url = self.random_url(recent_ids);
        let response = HTTP_CLIENT
            .get(&url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let json: RandomVideosResponse = response.json().await.map_err(|e| e.to_string())?;

        if !json.success {
            return Err(if json.message.is_empty() {
                "Unknown error".to_string()
            } else {
                json.message
            });
        }

        Ok(json.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_url_omits_param_when_history_empty() {
        let client = CatalogClient::new("https://api.test/api/");
        assert_eq!(client.random_url(&[]), "https://api.test/api/video/random");
    }

    #[test]
    fn random_url_encodes_recent_ids() {
        let client = CatalogClient::new("https://api.test/api");
        let ids = vec!["a1".to_string(), "b 2".to_string()];
        assert_eq!(
            client.random_url(&ids),
            "https://api.test/api/video/random?recentIds=a1,b%202"
        );
    }
}
