use async_trait::async_trait;

use crate::{Comment, CommentId, CommentPatch, Error, NewComment, RecipeId};

/// The remote comment service, as the client sees it.
///
/// Injected into the client rather than looked up from a global, so the
/// whole sync engine is constructible against a mock in tests.
#[async_trait]
pub trait CommentApi: Send + Sync {
    /// Fetch the full comment forest of one recipe. Used once, when a store
    /// initializes.
    async fn fetch_comments(&self, recipe: RecipeId) -> Result<Vec<Comment>, Error>;

    /// Create a comment; the returned node carries the server-assigned id
    /// that later "added" echoes will repeat.
    async fn create_comment(&self, recipe: RecipeId, comment: NewComment)
        -> Result<Comment, Error>;

    /// Edit a comment's scalar fields. The visible change comes back through
    /// the "updated" push event.
    async fn update_comment(&self, comment: CommentId, patch: CommentPatch) -> Result<(), Error>;

    /// Delete a comment. The visible removal comes back through the
    /// "deleted" push event.
    async fn delete_comment(&self, comment: CommentId) -> Result<(), Error>;
}
