use std::sync::Arc;

use futures::channel::oneshot;
use reshipi_client::{
    api::{
        Comment, CommentApi, CommentEvent, CommentId, CommentPatch, Error, NewComment, RecipeId,
        Time, UserId, Uuid,
    },
    flatten_replies, run_comment_feed, tree, CommentCommands, CommentStore, LoadState,
};
use reshipi_mock_server::MockServer;

fn recipe() -> RecipeId {
    RecipeId(Uuid::from_u128(42))
}

fn me() -> UserId {
    UserId(Uuid::from_u128(7))
}

/// A comment as some other client would have created it on the server.
fn remote_comment(n: u128, parent_id: Option<CommentId>) -> Comment {
    Comment {
        id: CommentId(Uuid::from_u128(n)),
        recipe_id: recipe(),
        author_id: UserId(Uuid::from_u128(99)),
        author_name: String::from("grace"),
        parent_id,
        content: format!("remote comment {n}"),
        created_at: Time::default(),
        updated_at: Time::default(),
        is_edited: false,
        children: Vec::new(),
    }
}

async fn loaded_store(server: &MockServer) -> CommentStore {
    let store = CommentStore::new();
    let (cancel, _canceller) = oneshot::channel();
    store.load(server, recipe(), cancel).await;
    assert_eq!(store.snapshot().load, LoadState::Ready);
    store
}

/// Let the spawned feed task drain whatever is queued on its receivers.
async fn drain_feed() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn initial_load_fills_the_store() {
    let server = MockServer::new(me(), "ada");
    server.inject_event(CommentEvent::Added(remote_comment(1, None)));

    let store = CommentStore::new();
    assert_eq!(store.snapshot().load, LoadState::Idle);
    let (cancel, _canceller) = oneshot::channel();
    store.load(&server, recipe(), cancel).await;

    let snap = store.snapshot();
    assert_eq!(snap.load, LoadState::Ready);
    assert!(!snap.load.is_loading());
    assert_eq!(snap.comments.len(), 1);
    assert_eq!(snap.comments[0].id, CommentId(Uuid::from_u128(1)));
}

#[tokio::test]
async fn failed_load_surfaces_the_error_and_keeps_the_forest_empty() {
    let server = MockServer::new(me(), "ada");
    server.fail_next_request(Error::PermissionDenied);

    let store = CommentStore::new();
    let (cancel, _canceller) = oneshot::channel();
    store.load(&server, recipe(), cancel).await;

    let snap = store.snapshot();
    assert_eq!(snap.load.error(), Some(&Error::PermissionDenied));
    assert!(snap.comments.is_empty());
}

struct StalledApi;

#[async_trait::async_trait]
impl CommentApi for StalledApi {
    async fn fetch_comments(&self, _recipe: RecipeId) -> Result<Vec<Comment>, Error> {
        futures::future::pending().await
    }

    async fn create_comment(
        &self,
        _recipe: RecipeId,
        _comment: NewComment,
    ) -> Result<Comment, Error> {
        unreachable!("tests never create through the stalled api")
    }

    async fn update_comment(
        &self,
        _comment: CommentId,
        _patch: CommentPatch,
    ) -> Result<(), Error> {
        unreachable!("tests never update through the stalled api")
    }

    async fn delete_comment(&self, _comment: CommentId) -> Result<(), Error> {
        unreachable!("tests never delete through the stalled api")
    }
}

#[tokio::test]
async fn teardown_before_the_load_resolves_discards_the_result() {
    let store = CommentStore::new();
    let (cancel, canceller) = oneshot::channel();
    drop(canceller); // the store's owner went away already
    store.load(&StalledApi, recipe(), cancel).await;

    let snap = store.snapshot();
    assert!(snap.comments.is_empty());
    // teardown leaves the status where it was, it only prevents the data
    // from being applied
    assert_eq!(snap.load, LoadState::Loading);
}

#[tokio::test]
async fn remote_replies_land_under_their_parent_exactly_once() {
    let server = MockServer::new(me(), "ada");
    server.inject_event(CommentEvent::Added(remote_comment(1, None)));
    let store = loaded_store(&server).await;

    let (cancel, canceller) = oneshot::channel();
    let feed = tokio::spawn(run_comment_feed(
        server.connect_feed(),
        store.clone(),
        cancel,
    ));
    drain_feed().await; // let the feed register its handlers

    let mut watch = store.watch();
    let b = remote_comment(2, Some(CommentId(Uuid::from_u128(1))));
    server.inject_event(CommentEvent::Added(b.clone()));
    watch.changed().await.unwrap();

    let comments = store.comments();
    assert_eq!(comments[0].children.len(), 1);
    assert_eq!(comments[0].children[0].id, b.id);

    // the network retried: the same event is delivered a second time
    server.push_raw(CommentEvent::Added(b.clone()));
    drain_feed().await;
    let comments = store.comments();
    assert_eq!(comments[0].children.len(), 1);
    assert_eq!(tree::node_count(&comments), 2);

    drop(canceller);
    feed.await.unwrap();
}

#[tokio::test]
async fn created_comment_is_visible_before_its_echo_and_not_duplicated_after() {
    let server = MockServer::new(me(), "ada");
    let store = loaded_store(&server).await;

    let (cancel, canceller) = oneshot::channel();
    let feed = tokio::spawn(run_comment_feed(
        server.connect_feed(),
        store.clone(),
        cancel,
    ));
    drain_feed().await;

    let commands = CommentCommands::new(Arc::new(server.clone()), store.clone(), recipe());
    let created = commands
        .create(None, String::from("hello"))
        .await
        .expect("creating comment");

    // visible synchronously, before the feed got a chance to run
    assert!(tree::contains(&store.comments(), created.id));

    // the push echo for the same creation must not duplicate it
    drain_feed().await;
    assert_eq!(tree::node_count(&store.comments()), 1);
    assert_eq!(server.test_comment_count(recipe()), 1);

    drop(canceller);
    feed.await.unwrap();
}

#[tokio::test]
async fn edits_and_deletions_come_back_through_the_feed() {
    let server = MockServer::new(me(), "ada");
    let store = loaded_store(&server).await;

    let (cancel, canceller) = oneshot::channel();
    let feed = tokio::spawn(run_comment_feed(
        server.connect_feed(),
        store.clone(),
        cancel,
    ));
    drain_feed().await;

    let commands = CommentCommands::new(Arc::new(server.clone()), store.clone(), recipe());
    let root = commands
        .create(None, String::from("first"))
        .await
        .expect("creating root");
    let reply = commands
        .create(Some(root.id), String::from("second"))
        .await
        .expect("creating reply");
    drain_feed().await;

    // nothing applied locally until the "updated" event arrives
    let mut watch = store.watch();
    commands
        .update(root.id, String::from("first, edited"))
        .await
        .expect("updating root");
    watch.changed().await.unwrap();
    let comments = store.comments();
    assert_eq!(comments[0].content, "first, edited");
    assert!(comments[0].is_edited);
    // the patch must not have touched the reply subtree
    assert_eq!(comments[0].children[0].id, reply.id);

    // deleting the root structurally drops its replies with it
    let mut watch = store.watch();
    commands.remove(root.id).await.expect("deleting root");
    watch.changed().await.unwrap();
    let comments = store.comments();
    assert!(comments.is_empty());
    assert_eq!(server.test_comment_count(recipe()), 0);

    drop(canceller);
    feed.await.unwrap();
}

#[tokio::test]
async fn failed_delete_leaves_the_comment_in_place() {
    let server = MockServer::new(me(), "ada");
    server.inject_event(CommentEvent::Added(remote_comment(1, None)));
    let store = loaded_store(&server).await;

    let (cancel, canceller) = oneshot::channel();
    let feed = tokio::spawn(run_comment_feed(
        server.connect_feed(),
        store.clone(),
        cancel,
    ));
    drain_feed().await;

    let commands = CommentCommands::new(Arc::new(server.clone()), store.clone(), recipe());
    server.fail_next_request(Error::PermissionDenied);
    let err = commands
        .remove(CommentId(Uuid::from_u128(1)))
        .await
        .expect_err("delete should be rejected");
    assert_eq!(err, Error::PermissionDenied);

    // no "deleted" event was ever sent, so nothing changes anywhere
    drain_feed().await;
    assert_eq!(tree::node_count(&store.comments()), 1);
    assert_eq!(server.test_comment_count(recipe()), 1);

    drop(canceller);
    feed.await.unwrap();
}

#[tokio::test]
async fn stray_events_are_ignored_without_breaking_the_feed() {
    let server = MockServer::new(me(), "ada");
    server.inject_event(CommentEvent::Added(remote_comment(1, None)));
    let store = loaded_store(&server).await;

    let (cancel, canceller) = oneshot::channel();
    let feed = tokio::spawn(run_comment_feed(
        server.connect_feed(),
        store.clone(),
        cancel,
    ));
    drain_feed().await;

    // delete of an id nobody has
    server.push_raw(CommentEvent::Deleted(CommentId(Uuid::from_u128(9))));
    // reply whose parent never made it into the thread
    server.push_raw(CommentEvent::Added(remote_comment(
        3,
        Some(CommentId(Uuid::from_u128(8))),
    )));
    drain_feed().await;
    assert_eq!(tree::node_count(&store.comments()), 1);

    // the feed is still alive and applies later events
    let mut watch = store.watch();
    server.inject_event(CommentEvent::Added(remote_comment(
        2,
        Some(CommentId(Uuid::from_u128(1))),
    )));
    watch.changed().await.unwrap();
    assert_eq!(tree::node_count(&store.comments()), 2);

    drop(canceller);
    feed.await.unwrap();
}

#[tokio::test]
async fn two_clients_converge_through_the_feed() {
    let server = MockServer::new(me(), "ada");
    let store_a = loaded_store(&server).await;
    let store_b = loaded_store(&server).await;

    let (cancel_a, canceller_a) = oneshot::channel();
    let (cancel_b, canceller_b) = oneshot::channel();
    let feed_a = tokio::spawn(run_comment_feed(
        server.connect_feed(),
        store_a.clone(),
        cancel_a,
    ));
    let feed_b = tokio::spawn(run_comment_feed(
        server.connect_feed(),
        store_b.clone(),
        cancel_b,
    ));
    drain_feed().await;

    let commands = CommentCommands::new(Arc::new(server.clone()), store_a.clone(), recipe());
    let root = commands
        .create(None, String::from("hello"))
        .await
        .expect("creating comment");
    let reply = commands
        .create(Some(root.id), String::from("reply"))
        .await
        .expect("creating reply");
    let nested = commands
        .create(Some(reply.id), String::from("nested"))
        .await
        .expect("creating nested reply");
    drain_feed().await;

    assert_eq!(store_a.comments(), store_b.comments());
    assert_eq!(tree::node_count(&store_b.comments()), 3);

    // the display projection keeps every node while capping the nesting
    let flat = flatten_replies(&store_b.comments());
    assert_eq!(tree::node_count(&flat), 3);
    assert!(tree::max_depth(&flat) <= 3);
    assert_eq!(flat[0].children[0].children[0].id, nested.id);
    assert_eq!(flat[0].children[0].children[0].parent_id, Some(reply.id));

    drop(canceller_a);
    drop(canceller_b);
    feed_a.await.unwrap();
    feed_b.await.unwrap();
}
