//! Agent post operations
//!
//! Creating a post takes two checks: a seller role, then rights over the
//! agent. Editing follows authorship instead.

use tracing::info;

use agentmart_policy::Operation;
use agentmart_types::{Caller, MarketError, NewPost, Post, PostFilter, PostId, PostPatch, Result};

use crate::access::{gate, ownership};
use crate::Context;

pub struct PostService {
    ctx: Context,
}

impl PostService {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Posts matching `filter`, newest first
    pub async fn list(&self, filter: PostFilter) -> Result<Vec<Post>> {
        let repo = self.ctx.db.post_repo();
        let candidates = match filter.agent_id {
            Some(agent_id) => repo.list_by_agent(agent_id).await?,
            None if filter.published_only => repo.list_published().await?,
            None => repo.list_all().await?,
        };
        let mut posts: Vec<Post> = candidates.into_iter().filter(|p| filter.matches(p)).collect();
        newest_first(&mut posts);
        Ok(posts)
    }

    /// Published posts only
    pub async fn list_public(&self) -> Result<Vec<Post>> {
        let mut posts = self.ctx.db.post_repo().list_published().await?;
        newest_first(&mut posts);
        Ok(posts)
    }

    pub async fn get(&self, id: PostId) -> Result<Option<Post>> {
        Ok(self.ctx.db.post_repo().find_by_id(id).await?)
    }

    pub async fn create(&self, caller: Caller, input: NewPost) -> Result<Post> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::PostCreate, &subject)?;
        let user_id = subject.user_id().ok_or(MarketError::Unauthenticated)?;

        let agent = self
            .ctx
            .db
            .agent_repo()
            .find_by_id(input.agent_id)
            .await?
            .ok_or_else(|| MarketError::not_found("Agent", input.agent_id))?;
        ownership(Operation::PostCreate, &subject, &agent.created_by)?;
        input.validate()?;

        let now = self.ctx.now();
        let post = self
            .ctx
            .db
            .post_repo()
            .create(Post {
                id: PostId::new(),
                agent_id: agent.id,
                author_id: user_id,
                title: input.title,
                content: input.content,
                post_type: input.post_type,
                published: input.published,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(post_id = %post.id, agent_id = %agent.id, published = post.published, "Post created");
        Ok(post)
    }

    /// Edit a post (author or admin)
    pub async fn update(&self, caller: Caller, id: PostId, patch: PostPatch) -> Result<Post> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::PostUpdate, &subject)?;

        let repo = self.ctx.db.post_repo();
        let post = repo.find_by_id(id).await?.ok_or_else(|| MarketError::not_found("Post", id))?;
        ownership(Operation::PostUpdate, &subject, &post.author_id)?;
        patch.validate()?;

        let now = self.ctx.now();
        let updated = repo
            .update(id, |p| {
                patch.apply(p);
                p.updated_at = now;
            })
            .await?;
        info!(post_id = %id, "Post updated");
        Ok(updated)
    }

    /// Delete a post (author or admin)
    pub async fn remove(&self, caller: Caller, id: PostId) -> Result<()> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::PostRemove, &subject)?;

        let repo = self.ctx.db.post_repo();
        let post = repo.find_by_id(id).await?.ok_or_else(|| MarketError::not_found("Post", id))?;
        ownership(Operation::PostRemove, &subject, &post.author_id)?;

        repo.delete(id).await?;
        info!(post_id = %id, "Post removed");
        Ok(())
    }
}

fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
