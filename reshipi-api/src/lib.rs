use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

/// Longest accepted comment body, in bytes
pub const MAX_CONTENT_LEN: usize = 4096;

mod comment;
pub use comment::{Comment, CommentPatch, NewComment};

mod db;
pub use db::CommentApi;

mod error;
pub use error::Error;

mod event;
pub use event::{CommentEvent, CommentEventKind};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn stub() -> UserId {
        UserId(STUB_UUID)
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct RecipeId(pub Uuid);

impl RecipeId {
    pub fn stub() -> RecipeId {
        RecipeId(STUB_UUID)
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn stub() -> CommentId {
        CommentId(STUB_UUID)
    }
}

// See comments on the `validate` functions of comment.rs: all strings that
// cross the API boundary go through here.
pub fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(s.to_string()));
    }
    if s.len() > MAX_CONTENT_LEN {
        return Err(Error::ContentTooLong(s.len()));
    }
    Ok(())
}
