use crate::{CommentId, Error, RecipeId, Time, UserId};

/// One comment in a recipe's discussion thread.
///
/// The same shape is used for what the server returns from a fetch, what a
/// successful create resolves to, and the payload of an "added" push event:
/// the `id` assigned by the server is stable across all three, which is what
/// makes echo deduplication possible on the client.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub recipe_id: RecipeId,
    pub author_id: UserId,
    pub author_name: String,

    /// `None` for a top-level comment
    pub parent_id: Option<CommentId>,

    pub content: String,

    pub created_at: Time,
    pub updated_at: Time,
    pub is_edited: bool,

    /// Direct replies, in arrival order. Never re-sorted by timestamp: any
    /// chronological display ordering is up to the UI layer.
    #[serde(default)]
    pub children: Vec<Comment>,
}

/// Client-supplied part of a comment creation.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub parent_id: Option<CommentId>,
    pub content: String,
}

impl NewComment {
    // Checked client-side before submitting, and again by the server on
    // receipt, so a buggy client cannot push invalid content to its peers.
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.content)
    }
}

/// Scalar-field replacement for an edited comment.
///
/// Deliberately has no `children`: applying a patch must never touch the
/// reply subtree of the patched node.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentPatch {
    pub id: CommentId,
    pub content: String,
    pub updated_at: Time,
    pub is_edited: bool,
}

impl CommentPatch {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.content)
    }
}
