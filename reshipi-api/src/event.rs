use crate::{Comment, CommentId, CommentPatch, Error};

/// One message from the live comment feed.
///
/// The serde tags are the event names the server publishes on its channel;
/// the transport underneath is free to batch or retry, which is why every
/// consumer of these events has to stay idempotent.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum CommentEvent {
    Added(Comment),
    Updated(CommentPatch),
    Deleted(CommentId),
}

impl CommentEvent {
    pub fn kind(&self) -> CommentEventKind {
        match self {
            CommentEvent::Added(_) => CommentEventKind::Added,
            CommentEvent::Updated(_) => CommentEventKind::Updated,
            CommentEvent::Deleted(_) => CommentEventKind::Deleted,
        }
    }

    // See comments on the `validate` functions of comment.rs
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            CommentEvent::Added(c) => crate::validate_string(&c.content),
            CommentEvent::Updated(p) => p.validate(),
            CommentEvent::Deleted(_) => Ok(()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CommentEventKind {
    Added,
    Updated,
    Deleted,
}

impl CommentEventKind {
    pub const ALL: [CommentEventKind; 3] = [
        CommentEventKind::Added,
        CommentEventKind::Updated,
        CommentEventKind::Deleted,
    ];

    /// The event name used on the wire
    pub fn name(self) -> &'static str {
        match self {
            CommentEventKind::Added => "added",
            CommentEventKind::Updated => "updated",
            CommentEventKind::Deleted => "deleted",
        }
    }
}
