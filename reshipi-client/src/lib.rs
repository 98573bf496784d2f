mod commands;
pub use commands::CommentCommands;

mod feed;
pub use feed::{run_comment_feed, EventChannel};

mod flatten;
pub use flatten::flatten_replies;

mod store;
pub use store::{CommentStore, CommentsSnapshot, LoadState};

pub mod tree;

pub mod api {
    pub use reshipi_api::*;
}
