use futures::{
    channel::{mpsc, oneshot},
    select, stream, FutureExt, StreamExt,
};

use crate::{
    api::{CommentEvent, CommentEventKind},
    store::CommentStore,
};

/// The server's push channel, as the client sees it: per-event-name
/// subscription with symmetric teardown.
///
/// Delivery within one kind follows the server's send order; nothing is
/// guaranteed across kinds, which is why everything downstream of this trait
/// has to stay idempotent.
pub trait EventChannel {
    /// Start receiving events of `kind`.
    ///
    /// Calling `on` again for a kind this instance already registered, or
    /// after [`EventChannel::off`] tore it down, is a caller error and is
    /// not defended against.
    fn on(&mut self, kind: CommentEventKind) -> mpsc::UnboundedReceiver<CommentEvent>;

    /// Stop receiving events of `kind`.
    fn off(&mut self, kind: CommentEventKind);
}

/// Drive the push feed into `store` until cancelled or the channel closes,
/// then unregister the three handlers exactly once.
///
/// Teardown works like the store's initial load: the caller keeps the
/// receiver end of `cancel` and drops it to stop the feed. Events already
/// queued on a receiver when teardown happens are not delivered.
pub async fn run_comment_feed<C: EventChannel>(
    mut channel: C,
    store: CommentStore,
    mut cancel: oneshot::Sender<()>,
) {
    let added = channel.on(CommentEventKind::Added);
    let updated = channel.on(CommentEventKind::Updated);
    let deleted = channel.on(CommentEventKind::Deleted);
    let mut events = stream::select(added, stream::select(updated, deleted)).fuse();
    let mut cancelled = cancel.cancellation().fuse();
    loop {
        select! {
            _ = cancelled => {
                tracing::debug!("comment feed torn down");
                break;
            }
            event = events.next() => match event {
                None => {
                    tracing::warn!("comment feed channel closed by the server");
                    break;
                }
                Some(event) => {
                    tracing::debug!(kind = event.kind().name(), "received comment event");
                    store.apply(event);
                }
            },
        }
    }
    for kind in CommentEventKind::ALL {
        channel.off(kind);
    }
}
