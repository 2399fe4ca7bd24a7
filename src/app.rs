use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use crate::assistant::{AssistantClient, AssistantReply};
use crate::config::Config;
use crate::feed::{Comment, FeedStore, Post};
use crate::persona;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Feed,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Feed list state
    pub feed_state: ListState,

    // Selected-post state, reset on every selection
    pub selected: Option<usize>,
    pub liked: bool,
    pub flagged: bool,
    pub post_likes: i64,
    pub comment_state: ListState,

    // Comment draft
    pub draft: String,
    pub draft_cursor: usize,

    // In-flight assistant reply. At most one at a time; the input stays
    // disabled until it settles.
    pub loading: bool,
    pub reply_task: Option<JoinHandle<AssistantReply>>,
    pending_post: Option<usize>,

    // Animation state (ellipsis while the assistant is typing)
    pub animation_frame: u8,

    // Data
    pub feed: FeedStore,
    pub assistant: AssistantClient,
}

impl App {
    pub async fn new(posts_path: &str) -> anyhow::Result<Self> {
        let config = Config::load()?;
        let assistant = AssistantClient::new(&config)?;

        let mut feed = FeedStore::new();
        if let Err(error) = feed.load_from_json(posts_path).await {
            tracing::warn!(%error, path = posts_path, "failed to load feed, starting empty");
        }

        Ok(Self::with_parts(feed, assistant))
    }

    pub fn with_parts(feed: FeedStore, assistant: AssistantClient) -> Self {
        let mut feed_state = ListState::default();
        if !feed.is_empty() {
            feed_state.select(Some(0));
        }

        Self {
            should_quit: false,
            screen: Screen::Feed,
            input_mode: InputMode::Normal,

            feed_state,

            selected: None,
            liked: false,
            flagged: false,
            post_likes: 0,
            comment_state: ListState::default(),

            draft: String::new(),
            draft_cursor: 0,

            loading: false,
            reply_task: None,
            pending_post: None,

            animation_frame: 0,

            feed,
            assistant,
        }
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.selected.and_then(|index| self.feed.post(index))
    }

    // Feed list navigation
    pub fn feed_nav_down(&mut self) {
        let len = self.feed.len();
        if len > 0 {
            let i = self.feed_state.selected().unwrap_or(0);
            self.feed_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn feed_nav_up(&mut self) {
        let i = self.feed_state.selected().unwrap_or(0);
        self.feed_state.select(Some(i.saturating_sub(1)));
    }

    /// Open the post highlighted in the feed list and reset the per-post
    /// interaction state.
    pub fn select_post(&mut self) {
        let Some(index) = self.feed_state.selected() else {
            return;
        };
        let Some(post) = self.feed.post(index) else {
            return;
        };

        self.post_likes = post.likes;
        self.selected = Some(index);
        self.liked = false;
        self.flagged = false;
        self.draft.clear();
        self.draft_cursor = 0;
        self.comment_state = ListState::default();
        self.screen = Screen::Post;
        self.input_mode = InputMode::Normal;
    }

    /// Return to the feed list. An in-flight reply keeps running and still
    /// lands in the post it was submitted under.
    pub fn deselect(&mut self) {
        self.selected = None;
        self.liked = false;
        self.flagged = false;
        self.draft.clear();
        self.draft_cursor = 0;
        self.screen = Screen::Feed;
        self.input_mode = InputMode::Normal;
    }

    /// Pure boolean flip, not a vote ledger: toggling freely is intentional
    /// demo behavior.
    pub fn toggle_like(&mut self) {
        let Some(index) = self.selected else {
            return;
        };

        let delta: i64 = if self.liked { -1 } else { 1 };
        self.liked = !self.liked;
        self.post_likes += delta;
        if let Some(post) = self.feed.post_mut(index) {
            post.likes += delta;
        }
    }

    /// Cosmetic only; nothing is reported anywhere.
    pub fn toggle_flag(&mut self) {
        if self.selected.is_some() {
            self.flagged = !self.flagged;
        }
    }

    // Comment thread navigation
    pub fn comment_nav_down(&mut self) {
        let len = self
            .selected_post()
            .map(|post| post.comments.len())
            .unwrap_or(0);
        if len > 0 {
            let i = self.comment_state.selected().unwrap_or(0);
            self.comment_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn comment_nav_up(&mut self) {
        let i = self.comment_state.selected().unwrap_or(0);
        self.comment_state.select(Some(i.saturating_sub(1)));
    }

    /// Append the drafted comment and kick off the assistant reply in the
    /// background. Whitespace-only drafts are a no-op, as is submitting while
    /// a reply is already in flight.
    pub fn submit_comment(&mut self) {
        if self.loading || self.reply_task.is_some() {
            return;
        }
        if self.draft.trim().is_empty() {
            return;
        }
        let Some(index) = self.selected else {
            return;
        };
        let Some(post) = self.feed.post_mut(index) else {
            return;
        };

        let draft = std::mem::take(&mut self.draft);
        self.draft_cursor = 0;

        // Context for the assistant is the thread as it stood before this
        // comment; the new text travels separately.
        let post_text = post.content.text.clone();
        let history = post.comments.clone();

        post.comments.push(Comment::from_user(&draft));

        self.loading = true;
        self.pending_post = Some(index);
        self.input_mode = InputMode::Normal;

        let assistant = self.assistant.clone();
        self.reply_task = Some(tokio::spawn(async move {
            assistant.generate_reply(&post_text, &history, &draft).await
        }));
    }

    /// Settle a finished reply task: resolve the persona and append exactly
    /// one assistant comment. Called from the event loop on every tick.
    pub async fn poll_reply(&mut self) {
        let finished = self
            .reply_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        let Some(task) = self.reply_task.take() else {
            return;
        };

        let reply = match task.await {
            Ok(reply) => reply,
            Err(error) => {
                tracing::error!(%error, "assistant task failed");
                AssistantReply::processing_problem()
            }
        };

        let profile = persona::resolve(&reply.response_in_role);
        if let Some(index) = self.pending_post.take() {
            if let Some(post) = self.feed.post_mut(index) {
                post.comments.push(Comment::from_assistant(
                    &reply.final_response,
                    profile.name,
                    profile.profile_picture,
                ));
            }
        }

        self.loading = false;
    }

    /// Increment a comment's like or dislike counter. Unknown ids are a
    /// no-op. The counters are independent; no mutual exclusion.
    pub fn rate_comment(&mut self, comment_id: &str, is_positive: bool) {
        let Some(index) = self.selected else {
            return;
        };
        let Some(post) = self.feed.post_mut(index) else {
            return;
        };

        if let Some(comment) = post.comments.iter_mut().find(|c| c.id == comment_id) {
            if is_positive {
                comment.likes += 1;
            } else {
                comment.dislikes += 1;
            }
        }
    }

    /// Rate the comment currently highlighted in the thread.
    pub fn rate_selected_comment(&mut self, is_positive: bool) {
        let id = self
            .comment_state
            .selected()
            .and_then(|i| self.selected_post().and_then(|post| post.comments.get(i)))
            .map(|comment| comment.id.clone());

        if let Some(id) = id {
            self.rate_comment(&id, is_positive);
        }
    }

    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FIXTURE;

    fn test_app() -> App {
        let posts: Vec<crate::feed::Post> = serde_json::from_str(FIXTURE).unwrap();
        let feed = FeedStore::from_posts(posts);
        let assistant = AssistantClient::new(&Config::default()).unwrap();
        App::with_parts(feed, assistant)
    }

    async fn settle(app: &mut App) {
        while app.reply_task.is_some() {
            tokio::task::yield_now().await;
            app.poll_reply().await;
        }
    }

    #[tokio::test]
    async fn submitting_a_comment_appends_user_then_assistant() {
        let mut app = test_app();
        app.select_post();
        let before = app.selected_post().unwrap().comments.len();

        app.draft = "test".to_string();
        app.submit_comment();
        assert!(app.loading);
        assert_eq!(app.draft, "");

        settle(&mut app).await;

        let comments = &app.selected_post().unwrap().comments;
        assert_eq!(comments.len(), before + 2);
        assert_eq!(comments[before].author.role, "user");
        assert_eq!(comments[before].content.text, "test");
        assert_eq!(comments[before + 1].author.role, "assistant");
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn offline_reply_uses_the_fixed_fallback_text() {
        let mut app = test_app();
        app.select_post();

        app.draft = "Cartoons are for babies lol".to_string();
        app.submit_comment();
        settle(&mut app).await;

        let comments = &app.selected_post().unwrap().comments;
        let last = comments.last().unwrap();
        assert_eq!(last.content.text, AssistantReply::offline().final_response);
        // Offline persona resolves to the educator
        assert_eq!(last.author.name, "Ms. Smith");
    }

    #[tokio::test]
    async fn blank_drafts_are_a_no_op() {
        let mut app = test_app();
        app.select_post();
        let before = app.selected_post().unwrap().comments.len();

        app.draft = "   \t ".to_string();
        app.submit_comment();

        assert!(!app.loading);
        assert!(app.reply_task.is_none());
        assert_eq!(app.selected_post().unwrap().comments.len(), before);
    }

    #[tokio::test]
    async fn submission_is_rejected_while_a_reply_is_in_flight() {
        let mut app = test_app();
        app.select_post();
        let before = app.selected_post().unwrap().comments.len();

        app.draft = "first".to_string();
        app.submit_comment();
        app.draft = "second".to_string();
        app.submit_comment();

        settle(&mut app).await;

        // Only the first submission went through: one user + one assistant.
        assert_eq!(app.selected_post().unwrap().comments.len(), before + 2);
        assert_eq!(app.draft, "second");
    }

    #[test]
    fn toggle_like_is_idempotent_over_two_invocations() {
        let mut app = test_app();
        app.select_post();
        let original = app.selected_post().unwrap().likes;

        app.toggle_like();
        assert!(app.liked);
        assert_eq!(app.selected_post().unwrap().likes, original + 1);
        assert_eq!(app.post_likes, original + 1);

        app.toggle_like();
        assert!(!app.liked);
        assert_eq!(app.selected_post().unwrap().likes, original);
        assert_eq!(app.post_likes, original);
    }

    #[test]
    fn selecting_a_post_resets_interaction_state() {
        let mut app = test_app();
        app.select_post();
        app.toggle_like();
        app.toggle_flag();
        app.draft = "half-typed".to_string();

        app.deselect();
        assert_eq!(app.screen, Screen::Feed);

        app.select_post();
        assert!(!app.liked);
        assert!(!app.flagged);
        assert_eq!(app.draft, "");
        assert_eq!(app.post_likes, app.selected_post().unwrap().likes);
    }

    #[test]
    fn rating_an_unknown_comment_changes_nothing() {
        let mut app = test_app();
        app.select_post();
        let before: Vec<(u32, u32)> = app
            .selected_post()
            .unwrap()
            .comments
            .iter()
            .map(|c| (c.likes, c.dislikes))
            .collect();

        app.rate_comment("no_such_comment", true);
        app.rate_comment("no_such_comment", false);

        let after: Vec<(u32, u32)> = app
            .selected_post()
            .unwrap()
            .comments
            .iter()
            .map(|c| (c.likes, c.dislikes))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn rating_increments_the_matching_counter_only() {
        let mut app = test_app();
        app.select_post();
        let id = app.selected_post().unwrap().comments[0].id.clone();

        app.rate_comment(&id, true);
        app.rate_comment(&id, true);
        app.rate_comment(&id, false);

        let comment = &app.selected_post().unwrap().comments[0];
        assert_eq!(comment.likes, 3); // fixture starts at 1
        assert_eq!(comment.dislikes, 1);
    }
}
