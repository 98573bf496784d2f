use std::sync::Arc;

use chrono::Utc;

use crate::{
    api::{Comment, CommentApi, CommentEvent, CommentId, CommentPatch, Error, NewComment, RecipeId},
    store::CommentStore,
};

/// The write surface handed to UI code for one recipe's thread.
///
/// Only `create` touches the store directly: a posted comment has to show up
/// the moment the call resolves. Edits and deletions are rarer, tolerate the
/// round-trip, and come back through the feed, which also means a rejected
/// delete can never make a comment vanish from under the user.
#[derive(Clone)]
pub struct CommentCommands {
    api: Arc<dyn CommentApi>,
    store: CommentStore,
    recipe: RecipeId,
}

impl CommentCommands {
    pub fn new(api: Arc<dyn CommentApi>, store: CommentStore, recipe: RecipeId) -> CommentCommands {
        CommentCommands { api, store, recipe }
    }

    /// Post a comment (a reply, when `parent_id` is set).
    ///
    /// The server-confirmed node is inserted locally before this returns, so
    /// the caller sees it without waiting for the push echo; when the echo
    /// does arrive it carries the same server-assigned id and the store
    /// collapses it.
    pub async fn create(
        &self,
        parent_id: Option<CommentId>,
        content: String,
    ) -> Result<Comment, Error> {
        let new = NewComment { parent_id, content };
        new.validate()?;
        let comment = self.api.create_comment(self.recipe, new).await?;
        tracing::debug!(id = ?comment.id, parent = ?comment.parent_id, "posted comment");
        self.store.apply(CommentEvent::Added(comment.clone()));
        Ok(comment)
    }

    /// Edit a comment's text. Nothing is applied locally: the visible change
    /// arrives with the "updated" push event.
    pub async fn update(&self, comment: CommentId, content: String) -> Result<(), Error> {
        let patch = CommentPatch {
            id: comment,
            content,
            updated_at: Utc::now(),
            is_edited: true,
        };
        patch.validate()?;
        self.api.update_comment(comment, patch).await
    }

    /// Delete a comment. Nothing is removed locally: the visible removal
    /// arrives with the "deleted" push event.
    pub async fn remove(&self, comment: CommentId) -> Result<(), Error> {
        self.api.delete_comment(comment).await
    }
}
