use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_AVATAR: &str = "/images/default_user_profile.png";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub profile_picture: String,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommentContent {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Comment {
    pub id: String,
    pub content: CommentContent,
    pub timestamp: String,
    pub author: Author,
    pub likes: u32,
    pub dislikes: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PostContent {
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    pub id: u64,
    pub content: PostContent,
    pub timestamp: String,
    pub author: Author,
    pub likes: i64,
    pub comments: Vec<Comment>,
}

impl Comment {
    /// Build a comment typed by the local user. Ids are time-based, which is
    /// enough for a single session with serialized submissions.
    pub fn from_user(text: &str) -> Self {
        Self {
            id: format!("comment_{}", Utc::now().timestamp_millis()),
            content: CommentContent {
                text: text.to_string(),
            },
            timestamp: Utc::now().to_rfc3339(),
            author: Author {
                id: "user_temp".to_string(),
                name: "User".to_string(),
                profile_picture: DEFAULT_USER_AVATAR.to_string(),
                role: "user".to_string(),
            },
            likes: 0,
            dislikes: 0,
        }
    }

    /// Build an assistant comment attributed to a resolved persona.
    pub fn from_assistant(text: &str, persona_name: &str, persona_avatar: &str) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: format!("ai_{}", now),
            content: CommentContent {
                text: text.to_string(),
            },
            timestamp: Utc::now().to_rfc3339(),
            author: Author {
                id: format!("assistant_{}", now),
                name: persona_name.to_string(),
                profile_picture: persona_avatar.to_string(),
                role: "assistant".to_string(),
            },
            likes: 0,
            dislikes: 0,
        }
    }
}

/// In-memory copy of the static feed document. Mutated in place for the
/// lifetime of the session and never written back.
pub struct FeedStore {
    posts: Vec<Post>,
}

impl FeedStore {
    pub fn new() -> Self {
        Self { posts: Vec::new() }
    }

    pub fn from_posts(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    pub async fn load_from_json(&mut self, path: &str) -> Result<()> {
        let content = tokio::fs::read_to_string(path).await?;
        self.posts = serde_json::from_str(&content)?;
        tracing::info!(path, posts = self.posts.len(), "feed loaded");
        Ok(())
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn post(&self, index: usize) -> Option<&Post> {
        self.posts.get(index)
    }

    pub fn post_mut(&mut self, index: usize) -> Option<&mut Post> {
        self.posts.get_mut(index)
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }
}

/// Two-post document mirroring the shape of `data/example_posts.json`; shared
/// by the state-machine tests in other modules.
#[cfg(test)]
pub(crate) const FIXTURE: &str = r#"[
        {
            "id": 1,
            "content": { "text": "omg lolll look at Dylan's sketchbook. he's such a nerdddd", "image": "/images/sketchbook.png" },
            "timestamp": "2024-11-20T15:04:05Z",
            "author": { "id": "user_2", "name": "Sarah", "profile_picture": "/images/profile_1.png", "role": "student" },
            "likes": 3,
            "comments": [
                {
                    "id": "comment_1",
                    "content": { "text": "lol what a loser" },
                    "timestamp": "2024-11-20T15:10:00Z",
                    "author": { "id": "user_3", "name": "Ella", "profile_picture": "/images/profile_2.png", "role": "student" },
                    "likes": 1,
                    "dislikes": 0
                }
            ]
        },
        {
            "id": 2,
            "content": { "text": "I don't want to go to school any more. Everybody hates me." },
            "timestamp": "2024-11-21T08:30:00Z",
            "author": { "id": "user_4", "name": "Dylan", "profile_picture": "/images/victim_profile.png", "role": "student" },
            "likes": 0,
            "comments": []
        }
    ]"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn loads_posts_from_fixture_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        let mut store = FeedStore::new();
        store
            .load_from_json(file.path().to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.post(0).unwrap().comments.len(), 1);
        assert_eq!(store.post(1).unwrap().content.image, None);
        assert_eq!(store.post(0).unwrap().author.name, "Sarah");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let mut store = FeedStore::new();
        assert!(store.load_from_json("no/such/file.json").await.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn user_comment_defaults() {
        let comment = Comment::from_user("hello");
        assert!(comment.id.starts_with("comment_"));
        assert_eq!(comment.author.role, "user");
        assert_eq!(comment.author.profile_picture, DEFAULT_USER_AVATAR);
        assert_eq!(comment.likes, 0);
        assert_eq!(comment.dislikes, 0);
    }

    #[test]
    fn assistant_comment_defaults() {
        let comment = Comment::from_assistant("be kind", "Ms. Smith", "/images/educator_profile.jpeg");
        assert!(comment.id.starts_with("ai_"));
        assert_eq!(comment.author.role, "assistant");
        assert_eq!(comment.author.name, "Ms. Smith");
    }
}
