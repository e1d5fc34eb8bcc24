use crate::models::PublicProfile;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Read-only Appwrite client for the profile store
///
/// Profiles are owned by the profile service. The swipe engine only needs
/// display fields for users it has already resolved as matches.
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    profiles_collection: String,
    client: Client,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        profiles_collection: String,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            profiles_collection,
            client,
        })
    }

    /// Get a single public profile by user ID
    pub async fn get_public_profile(&self, user_id: &str) -> Result<PublicProfile, AppwriteError> {
        let queries = vec![format!("equal(\"userId\", [\"{}\"])", user_id)];
        let queries_json = serde_json::to_string(&queries)
            .map_err(|e| AppwriteError::InvalidResponse(e.to_string()))?;
        let encoded_queries = urlencoding::encode(&queries_json);

        let url = format!(
            "{}/databases/{}/collections/{}/documents?query={}",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.profiles_collection,
            encoded_queries
        );

        tracing::debug!("Fetching profile for user: {}", user_id);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to fetch profile for {}: {} - {}", user_id, status, body);
            return Err(AppwriteError::ApiError(format!(
                "Failed to fetch profile: {}",
                status
            )));
        }

        let json: Value = response.json().await?;

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

        let doc = documents
            .first()
            .ok_or_else(|| AppwriteError::NotFound(format!("Profile not found for user {}", user_id)))?;

        let data = doc.get("data").unwrap_or(doc);

        serde_json::from_value(data.clone())
            .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to parse profile: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: String) -> AppwriteClient {
        AppwriteClient::new(
            base_url,
            "test_key".to_string(),
            "test_project".to_string(),
            "test_db".to_string(),
            "profiles".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_appwrite_client_creation() {
        let client = client("https://appwrite.test/v1".to_string());
        assert_eq!(client.base_url, "https://appwrite.test/v1");
        assert_eq!(client.profiles_collection, "profiles");
    }

    #[tokio::test]
    async fn test_get_public_profile() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"^/databases/test_db/collections/profiles/documents".to_string()),
            )
            .match_header("X-Appwrite-Key", "test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"total": 1, "documents": [{"userId": "u1", "name": "Robin", "age": 29, "imageFileIds": ["f1"]}]}"#,
            )
            .create_async()
            .await;

        let profile = client(server.url()).get_public_profile("u1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(profile.user_id, "u1");
        assert_eq!(profile.name, "Robin");
        assert_eq!(profile.age, Some(29));
        assert!(!profile.verified());
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"^/databases/test_db/collections/profiles/documents".to_string()),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"total": 0, "documents": []}"#)
            .create_async()
            .await;

        let result = client(server.url()).get_public_profile("ghost").await;
        assert!(matches!(result, Err(AppwriteError::NotFound(_))));
    }
}
