//! The agent tick loop.
//!
//! A single cooperative loop: once per `loop_delay` it selects a weighted
//! task, dispatches it against the agent's collaborators, and sleeps.
//! A failed tick is logged and the loop carries on. Shutdown is observed
//! only at tick boundaries, never mid-call.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::agent::{AgentProfile, ConnectionConfig};
use crate::llm::{CompletionRequest, LlmProvider};
use crate::social::{Post, SocialPlatform};

use super::error::SchedulerError;
use super::selector::TaskSelector;

const DEFAULT_TWEET_INTERVAL: Duration = Duration::from_secs(900);
const DEFAULT_TIMELINE_READ_COUNT: usize = 15;

/// Runs one agent's autonomous loop.
///
/// All state is held here explicitly; there is no process-wide "current
/// agent".
pub struct AgentRunner {
    profile: AgentProfile,
    llm: Arc<dyn LlmProvider>,
    social: Arc<dyn SocialPlatform>,
    selector: TaskSelector,
    llm_connection: ConnectionConfig,
    system_prompt: String,
    own_username: Option<String>,
    timeline: VecDeque<Post>,
    last_post_at: Option<Instant>,
}

impl std::fmt::Debug for AgentRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRunner")
            .field("profile", &self.profile)
            .field("llm_connection", &self.llm_connection)
            .field("system_prompt", &self.system_prompt)
            .field("own_username", &self.own_username)
            .field("timeline", &self.timeline)
            .field("last_post_at", &self.last_post_at)
            .finish_non_exhaustive()
    }
}

impl AgentRunner {
    /// Build a runner for a profile and its collaborators.
    ///
    /// Fails fast when the profile configures no LLM provider connection.
    pub fn new(
        profile: AgentProfile,
        llm: Arc<dyn LlmProvider>,
        social: Arc<dyn SocialPlatform>,
        selector: TaskSelector,
        own_username: Option<String>,
    ) -> Result<Self, SchedulerError> {
        let llm_connection = profile
            .llm_connection()
            .cloned()
            .ok_or(SchedulerError::NoLlmProvider)?;
        let system_prompt = profile.system_prompt();

        Ok(Self {
            profile,
            llm,
            social,
            selector,
            llm_connection,
            system_prompt,
            own_username,
            timeline: VecDeque::new(),
            last_post_at: None,
        })
    }

    /// Run until the shutdown channel fires (or its sender is dropped).
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(agent = %self.profile.name, "Starting agent loop");
        let delay = self.profile.loop_delay();

        loop {
            if *shutdown.borrow() {
                break;
            }

            info!("{}", self.status_line());
            if let Err(e) = self.tick().await {
                warn!(error = %e, "Tick failed, continuing after delay");
            }

            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!(agent = %self.profile.name, "Agent loop stopped");
    }

    async fn tick(&mut self) -> Result<(), SchedulerError> {
        self.replenish_timeline().await?;

        let task_name = self.selector.next().name.clone();
        debug!(task = %task_name, "Selected task");

        match task_name.as_str() {
            "post-tweet" => self.post_new().await,
            "reply-to-tweet" => self.reply_to_next().await,
            "like-tweet" => self.like_next().await,
            other => {
                warn!(task = other, "Unknown task name, skipping");
                Ok(())
            }
        }
    }

    async fn replenish_timeline(&mut self) -> Result<(), SchedulerError> {
        if !self.timeline.is_empty() {
            return Ok(());
        }
        let count = self
            .profile
            .twitter()
            .map(|t| t.timeline_read_count())
            .unwrap_or(DEFAULT_TIMELINE_READ_COUNT);

        info!("Reading timeline");
        let posts = self.social.read_timeline(count).await?;
        debug!(count = posts.len(), "Timeline replenished");
        self.timeline.extend(posts);
        Ok(())
    }

    async fn post_new(&mut self) -> Result<(), SchedulerError> {
        let interval = self
            .profile
            .twitter()
            .map(|t| t.tweet_interval())
            .unwrap_or(DEFAULT_TWEET_INTERVAL);

        if let Some(last) = self.last_post_at {
            if last.elapsed() < interval {
                debug!("Post interval has not elapsed yet, skipping");
                return Ok(());
            }
        }

        let prompt = format!(
            "Generate an engaging tweet. Don't include any hashtags, links or emojis. \
             Keep it under 280 characters. The tweet should be pure commentary; do not \
             promote anything apart from {}. Do not repeat any of the example tweets.",
            self.profile.name
        );
        let text = self.generate(&prompt).await?;
        if text.trim().is_empty() {
            warn!("Generated empty post, skipping");
            return Ok(());
        }

        let id = self.social.post(&text).await?;
        self.last_post_at = Some(Instant::now());
        info!(post = %id, "Posted: {text}");
        Ok(())
    }

    async fn reply_to_next(&mut self) -> Result<(), SchedulerError> {
        let Some(post) = self.timeline.pop_front() else {
            debug!("Timeline queue is empty, nothing to reply to");
            return Ok(());
        };

        if self.is_own_post(&post) {
            debug!(post = %post.id, "Skipping reply to own post");
            return Ok(());
        }

        let prompt = format!(
            "Generate a friendly, engaging reply to this post: {}. Keep it under 280 \
             characters. Don't include any usernames, hashtags, links or emojis. Do not \
             repeat any of the example tweets.",
            post.text
        );
        let text = self.generate(&prompt).await?;
        if text.trim().is_empty() {
            warn!("Generated empty reply, skipping");
            return Ok(());
        }

        let id = self.social.reply(&post.id, &text).await?;
        info!(post = %post.id, reply = %id, "Replied: {text}");
        Ok(())
    }

    async fn like_next(&mut self) -> Result<(), SchedulerError> {
        let Some(post) = self.timeline.pop_front() else {
            debug!("Timeline queue is empty, nothing to like");
            return Ok(());
        };

        self.social.like(&post.id).await?;
        info!(post = %post.id, "Liked");
        Ok(())
    }

    async fn generate(&self, prompt: &str) -> Result<String, SchedulerError> {
        let request = CompletionRequest::for_connection(
            &self.llm_connection,
            Some(self.system_prompt.clone()),
            prompt,
        )
        .ok_or(SchedulerError::NoLlmProvider)?;
        Ok(self.llm.generate(&request).await?)
    }

    fn is_own_post(&self, post: &Post) -> bool {
        match (&self.own_username, &post.author_username) {
            (Some(own), Some(author)) => own.eq_ignore_ascii_case(author),
            _ => false,
        }
    }

    fn status_line(&self) -> String {
        format!(
            "{} | agent: {} | queue: {} posts",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.profile.name,
            self.timeline.len()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::social::{PostId, SocialError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeLlm;

    #[async_trait]
    impl LlmProvider for FakeLlm {
        async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            assert!(request.system_prompt.is_some());
            Ok("generated text".to_string())
        }
    }

    #[derive(Default)]
    struct FakeSocial {
        state: Mutex<FakeSocialState>,
    }

    #[derive(Default)]
    struct FakeSocialState {
        timeline: Vec<Post>,
        posts: Vec<String>,
        replies: Vec<(PostId, String)>,
        likes: Vec<PostId>,
    }

    impl FakeSocial {
        fn with_timeline(timeline: Vec<Post>) -> Self {
            Self {
                state: Mutex::new(FakeSocialState {
                    timeline,
                    ..Default::default()
                }),
            }
        }
    }

    #[async_trait]
    impl SocialPlatform for FakeSocial {
        async fn post(&self, content: &str) -> Result<PostId, SocialError> {
            let mut state = self.state.lock().unwrap();
            state.posts.push(content.to_string());
            Ok(format!("post-{}", state.posts.len()))
        }

        async fn reply(&self, post_id: &str, content: &str) -> Result<PostId, SocialError> {
            let mut state = self.state.lock().unwrap();
            state.replies.push((post_id.to_string(), content.to_string()));
            Ok(format!("reply-{}", state.replies.len()))
        }

        async fn like(&self, post_id: &str) -> Result<(), SocialError> {
            self.state.lock().unwrap().likes.push(post_id.to_string());
            Ok(())
        }

        async fn read_timeline(&self, _count: usize) -> Result<Vec<Post>, SocialError> {
            Ok(std::mem::take(&mut self.state.lock().unwrap().timeline))
        }
    }

    fn profile_with_task(task: &str) -> AgentProfile {
        AgentProfile::from_document(json!({
            "name": "Mino",
            "bio": ["a test agent"],
            "traits": ["curious"],
            "examples": ["ex"],
            "loop_delay": 60,
            "config": [
                {"name": "twitter", "tweet_interval": 1},
                {"name": "openai", "model": "gpt-4"}
            ],
            "tasks": [{"name": task, "weight": 1, "description": "test task"}]
        }))
        .unwrap()
    }

    fn post(id: &str, author: Option<&str>) -> Post {
        Post {
            id: id.to_string(),
            text: format!("text of {id}"),
            author_id: None,
            author_username: author.map(str::to_string),
        }
    }

    fn runner(profile: AgentProfile, social: Arc<FakeSocial>) -> AgentRunner {
        let selector = TaskSelector::with_seed(&profile.tasks, 1).unwrap();
        AgentRunner::new(
            profile,
            Arc::new(FakeLlm),
            social,
            selector,
            Some("mino".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn runner_requires_llm_connection() {
        let profile = AgentProfile::from_document(json!({
            "name": "Mino",
            "bio": [],
            "traits": [],
            "examples": [],
            "loop_delay": 60,
            "config": [{"name": "twitter"}],
            "tasks": [{"name": "post-tweet", "weight": 1, "description": "post"}]
        }))
        .unwrap();

        let selector = TaskSelector::with_seed(&profile.tasks, 1).unwrap();
        let err = AgentRunner::new(
            profile,
            Arc::new(FakeLlm),
            Arc::new(FakeSocial::default()),
            selector,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SchedulerError::NoLlmProvider));
    }

    #[tokio::test]
    async fn post_tweet_tick_publishes_generated_text() {
        let social = Arc::new(FakeSocial::default());
        let mut runner = runner(profile_with_task("post-tweet"), social.clone());

        runner.tick().await.unwrap();

        let state = social.state.lock().unwrap();
        assert_eq!(state.posts, vec!["generated text"]);
    }

    #[tokio::test]
    async fn post_tweet_respects_interval() {
        let social = Arc::new(FakeSocial::default());
        let mut runner = runner(profile_with_task("post-tweet"), social.clone());

        runner.tick().await.unwrap();
        // Second tick lands inside the 1s interval and must not post.
        runner.tick().await.unwrap();

        assert_eq!(social.state.lock().unwrap().posts.len(), 1);
    }

    #[tokio::test]
    async fn reply_skips_own_posts() {
        let social = Arc::new(FakeSocial::with_timeline(vec![
            post("1", Some("Mino")),
            post("2", Some("someone")),
        ]));
        let mut runner = runner(profile_with_task("reply-to-tweet"), social.clone());

        // First tick pops the agent's own post and skips it.
        runner.tick().await.unwrap();
        assert!(social.state.lock().unwrap().replies.is_empty());

        // Second tick replies to the remaining post.
        runner.tick().await.unwrap();
        let state = social.state.lock().unwrap();
        assert_eq!(state.replies.len(), 1);
        assert_eq!(state.replies[0].0, "2");
    }

    #[tokio::test]
    async fn like_tick_likes_next_timeline_post() {
        let social = Arc::new(FakeSocial::with_timeline(vec![post("9", Some("other"))]));
        let mut runner = runner(profile_with_task("like-tweet"), social.clone());

        runner.tick().await.unwrap();

        assert_eq!(social.state.lock().unwrap().likes, vec!["9"]);
    }

    #[tokio::test]
    async fn unknown_task_is_skipped() {
        let social = Arc::new(FakeSocial::default());
        let mut runner = runner(profile_with_task("dance"), social.clone());

        runner.tick().await.unwrap();

        let state = social.state.lock().unwrap();
        assert!(state.posts.is_empty());
        assert!(state.replies.is_empty());
        assert!(state.likes.is_empty());
    }

    #[tokio::test]
    async fn shutdown_stops_loop_between_ticks() {
        let social = Arc::new(FakeSocial::default());
        let runner = runner(profile_with_task("post-tweet"), social.clone());

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(runner.run(rx));

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("loop did not stop after shutdown")
            .unwrap();

        // Depending on timing the first tick may or may not have run, but
        // the loop never gets past the boundary after the signal.
        assert!(social.state.lock().unwrap().posts.len() <= 1);
    }
}
