//! Twitter client over the v2 API.

use async_trait::async_trait;
use reqwest::Client;

use crate::credentials::CredentialStore;

use super::error::SocialError;
use super::platform::{Post, PostId, SocialPlatform};

pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

/// Credentials needed to act as a Twitter user.
#[derive(Debug, Clone)]
pub struct TwitterCredentials {
    pub access_token: String,
    pub user_id: String,
    pub username: String,
}

impl TwitterCredentials {
    /// Resolve credentials from the environment, falling back to the
    /// credential store.
    pub fn resolve(store: &CredentialStore) -> Result<Self, SocialError> {
        Ok(Self {
            access_token: secret(store, "TWITTER_ACCESS_TOKEN", "access_token")?,
            user_id: secret(store, "TWITTER_USER_ID", "user_id")?,
            username: secret(store, "TWITTER_USERNAME", "username")?,
        })
    }
}

fn secret(
    store: &CredentialStore,
    env_var: &'static str,
    key: &str,
) -> Result<String, SocialError> {
    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            return Ok(value);
        }
    }
    store
        .get("twitter", key)
        .map(str::to_string)
        .ok_or(SocialError::MissingCredential(env_var))
}

/// Twitter API v2 client.
pub struct TwitterClient {
    client: Client,
    base_url: String,
    credentials: TwitterCredentials,
}

impl TwitterClient {
    #[must_use]
    pub fn new(client: Client, base_url: String, credentials: TwitterCredentials) -> Self {
        Self {
            client,
            base_url,
            credentials,
        }
    }

    /// The handle the client acts as, for self-post detection.
    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    async fn create_tweet(&self, body: &CreateTweetRequest) -> Result<PostId, SocialError> {
        let url = format!("{}/2/tweets", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.credentials.access_token)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SocialError::Api { status, message });
        }

        let created: CreateTweetResponse = response.json().await?;
        Ok(created.data.id)
    }
}

#[async_trait]
impl SocialPlatform for TwitterClient {
    async fn post(&self, content: &str) -> Result<PostId, SocialError> {
        self.create_tweet(&CreateTweetRequest {
            text: content.to_string(),
            reply: None,
        })
        .await
    }

    async fn reply(&self, post_id: &str, content: &str) -> Result<PostId, SocialError> {
        self.create_tweet(&CreateTweetRequest {
            text: content.to_string(),
            reply: Some(ReplySettings {
                in_reply_to_tweet_id: post_id.to_string(),
            }),
        })
        .await
    }

    async fn like(&self, post_id: &str) -> Result<(), SocialError> {
        let url = format!(
            "{}/2/users/{}/likes",
            self.base_url, self.credentials.user_id
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.credentials.access_token)
            .json(&LikeRequest {
                tweet_id: post_id.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SocialError::Api { status, message });
        }
        Ok(())
    }

    async fn read_timeline(&self, count: usize) -> Result<Vec<Post>, SocialError> {
        let url = format!(
            "{}/2/users/{}/timelines/reverse_chronological",
            self.base_url, self.credentials.user_id
        );
        let max_results = count.clamp(1, 100).to_string();
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.credentials.access_token)
            .query(&[
                ("max_results", max_results.as_str()),
                ("tweet.fields", "author_id"),
                ("expansions", "author_id"),
                ("user.fields", "username"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SocialError::Api { status, message });
        }

        let timeline: TimelineResponse = response.json().await?;
        Ok(timeline.into_posts())
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(serde::Serialize)]
struct CreateTweetRequest {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<ReplySettings>,
}

#[derive(serde::Serialize)]
struct ReplySettings {
    in_reply_to_tweet_id: String,
}

#[derive(serde::Deserialize)]
struct CreateTweetResponse {
    data: CreatedTweet,
}

#[derive(serde::Deserialize)]
struct CreatedTweet {
    id: String,
}

#[derive(serde::Serialize)]
struct LikeRequest {
    tweet_id: String,
}

#[derive(serde::Deserialize)]
struct TimelineResponse {
    #[serde(default)]
    data: Vec<TimelineTweet>,
    #[serde(default)]
    includes: TimelineIncludes,
}

#[derive(serde::Deserialize)]
struct TimelineTweet {
    id: String,
    text: String,
    author_id: Option<String>,
}

#[derive(Default, serde::Deserialize)]
struct TimelineIncludes {
    #[serde(default)]
    users: Vec<TimelineUser>,
}

#[derive(serde::Deserialize)]
struct TimelineUser {
    id: String,
    username: String,
}

impl TimelineResponse {
    fn into_posts(self) -> Vec<Post> {
        let users = self.includes.users;
        self.data
            .into_iter()
            .map(|tweet| {
                let author_username = tweet.author_id.as_ref().and_then(|author| {
                    users
                        .iter()
                        .find(|u| &u.id == author)
                        .map(|u| u.username.clone())
                });
                Post {
                    id: tweet.id,
                    text: tweet.text,
                    author_id: tweet.author_id,
                    author_username,
                }
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
