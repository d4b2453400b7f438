//! Agent post types (updates, announcements, changelogs)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AgentId, MarketError, PostId, Result, UserId};

/// Kind of post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Update,
    Announcement,
    Changelog,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Announcement => "announcement",
            Self::Changelog => "changelog",
        }
    }
}

/// A stored post about an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub agent_id: AgentId,
    /// Identity that wrote the post; edit rights follow authorship
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub agent_id: AgentId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub published: bool,
}

impl NewPost {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(MarketError::invalid_input("title", "must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, rename = "type")]
    pub post_type: Option<PostType>,
    #[serde(default)]
    pub published: Option<bool>,
}

impl PostPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(MarketError::invalid_input("title", "must not be empty"));
            }
        }
        Ok(())
    }

    pub fn apply(&self, post: &mut Post) {
        if let Some(v) = &self.title {
            post.title = v.clone();
        }
        if let Some(v) = &self.content {
            post.content = v.clone();
        }
        if let Some(v) = self.post_type {
            post.post_type = v;
        }
        if let Some(v) = self.published {
            post.published = v;
        }
    }
}

/// Filters for listing posts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFilter {
    #[serde(default)]
    pub agent_id: Option<AgentId>,
    #[serde(default)]
    pub published_only: bool,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        self.agent_id.map_or(true, |a| post.agent_id == a) && (!self.published_only || post.published)
    }
}
