use std::sync::Arc;

use futures::{channel::oneshot, pin_mut, select, FutureExt};
use tokio::sync::watch;

use crate::{
    api::{Comment, CommentApi, CommentEvent, Error, RecipeId},
    tree,
};

/// Progress of the one-shot initial thread fetch.
///
/// `Ready` and `Failed` are terminal with respect to that fetch: later
/// mutations move the forest around without ever re-entering `Loading`, and
/// a failed fetch is surfaced, not retried.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(Arc<Error>),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// What UI consumers read: the current forest plus the load status.
#[derive(Clone, Debug, PartialEq)]
pub struct CommentsSnapshot {
    pub comments: Arc<Vec<Comment>>,
    pub load: LoadState,
}

/// Single owner of a recipe's comment forest.
///
/// Every mutation funnels through [`CommentStore::apply`] (the feed bridge
/// and the optimistic create path both end up there); everything else only
/// ever sees snapshots, so nothing can observe a half-applied event.
#[derive(Clone)]
pub struct CommentStore {
    state: Arc<watch::Sender<CommentsSnapshot>>,
}

impl CommentStore {
    pub fn new() -> CommentStore {
        let (state, _) = watch::channel(CommentsSnapshot {
            comments: Arc::new(Vec::new()),
            load: LoadState::Idle,
        });
        CommentStore {
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> CommentsSnapshot {
        self.state.borrow().clone()
    }

    pub fn comments(&self) -> Arc<Vec<Comment>> {
        self.state.borrow().comments.clone()
    }

    /// Receiver woken on every effective change of the forest reference and
    /// on load-state transitions.
    pub fn watch(&self) -> watch::Receiver<CommentsSnapshot> {
        self.state.subscribe()
    }

    /// Run the initial fetch, racing it against teardown.
    ///
    /// The caller keeps the receiver end of `cancel` alive for as long as it
    /// wants the result: dropping it discards an in-flight fetch without the
    /// store ever seeing the data.
    pub async fn load(
        &self,
        api: &dyn CommentApi,
        recipe: RecipeId,
        mut cancel: oneshot::Sender<()>,
    ) {
        self.state.send_modify(|s| s.load = LoadState::Loading);
        let fetch = api.fetch_comments(recipe).fuse();
        let mut cancelled = cancel.cancellation().fuse();
        pin_mut!(fetch);
        select! {
            _ = cancelled => {
                tracing::debug!(?recipe, "comment load torn down before completion");
            }
            res = fetch => match res {
                Ok(comments) => {
                    tracing::debug!(?recipe, count = comments.len(), "fetched comment thread");
                    self.state.send_modify(|s| {
                        s.comments = Arc::new(comments);
                        s.load = LoadState::Ready;
                    });
                }
                Err(err) => {
                    tracing::warn!(?recipe, ?err, "failed fetching comment thread");
                    self.state.send_modify(|s| s.load = LoadState::Failed(Arc::new(err)));
                }
            },
        }
    }

    /// Apply one feed event to the forest.
    ///
    /// Duplicate "added" echoes, events for ids not in the forest, and
    /// replies to unknown parents all degrade to no-ops that watchers never
    /// hear about.
    pub fn apply(&self, event: CommentEvent) {
        self.state.send_if_modified(|s| {
            let next = match &event {
                CommentEvent::Added(comment) => {
                    if tree::contains(&s.comments, comment.id) {
                        tracing::debug!(id = ?comment.id, "suppressing replay of known comment");
                        return false;
                    }
                    if let Some(parent_id) = comment.parent_id {
                        if !tree::contains(&s.comments, parent_id) {
                            tracing::warn!(
                                id = ?comment.id,
                                parent = ?parent_id,
                                "got reply to a comment not in the thread, dropping",
                            );
                            return false;
                        }
                    }
                    tree::insert(&s.comments, comment.clone())
                }
                CommentEvent::Updated(patch) => tree::update(&s.comments, patch),
                CommentEvent::Deleted(id) => tree::remove(&s.comments, *id),
            };
            if next == *s.comments {
                return false;
            }
            s.comments = Arc::new(next);
            true
        });
    }
}

impl Default for CommentStore {
    fn default() -> CommentStore {
        CommentStore::new()
    }
}
