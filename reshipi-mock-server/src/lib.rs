use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use futures::channel::mpsc;
use parking_lot::Mutex;

use reshipi_client::{
    api::{
        Comment, CommentApi, CommentEvent, CommentEventKind, CommentId, CommentPatch, Error,
        NewComment, RecipeId, UserId, Uuid,
    },
    tree, EventChannel,
};

/// In-memory stand-in for the comment service: one authoritative forest per
/// recipe, plus the push feeds of every connected client.
///
/// Every successful write relays the matching push event to all feeds
/// subscribed to that event's kind, so a client talking to this server sees
/// its own echoes the way it would against the real one.
#[derive(Clone)]
pub struct MockServer {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    author: (UserId, String),
    comments: HashMap<RecipeId, Vec<Comment>>,
    feeds: HashMap<CommentEventKind, HashMap<Uuid, mpsc::UnboundedSender<CommentEvent>>>,
    fail_next: Option<Error>,
}

impl Inner {
    fn take_failure(&mut self) -> Result<(), Error> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn relay(&mut self, event: CommentEvent) {
        if let Some(feeds) = self.feeds.get_mut(&event.kind()) {
            feeds.retain(|_, f| f.unbounded_send(event.clone()).is_ok());
        }
    }
}

impl MockServer {
    pub fn new(author: UserId, author_name: impl Into<String>) -> MockServer {
        MockServer {
            inner: Arc::new(Mutex::new(Inner {
                author: (author, author_name.into()),
                comments: HashMap::new(),
                feeds: HashMap::new(),
                fail_next: None,
            })),
        }
    }

    /// Open a push-channel connection, ready to be handed to a feed loop.
    pub fn connect_feed(&self) -> MockFeed {
        MockFeed {
            server: self.clone(),
            registered: HashMap::new(),
        }
    }

    /// Make the next API call fail with `err`, whatever it is.
    pub fn fail_next_request(&self, err: Error) {
        self.inner.lock().fail_next = Some(err);
    }

    /// Apply `event` to the authoritative forests and relay it, as if some
    /// other client had issued the write.
    pub fn inject_event(&self, event: CommentEvent) {
        event.validate().expect("injected event must be valid");
        let mut inner = self.inner.lock();
        match &event {
            CommentEvent::Added(comment) => {
                let forest = inner.comments.entry(comment.recipe_id).or_default();
                *forest = tree::insert(&*forest, comment.clone());
            }
            CommentEvent::Updated(patch) => {
                for forest in inner.comments.values_mut() {
                    *forest = tree::update(&*forest, patch);
                }
            }
            CommentEvent::Deleted(id) => {
                for forest in inner.comments.values_mut() {
                    *forest = tree::remove(&*forest, *id);
                }
            }
        }
        inner.relay(event);
    }

    /// Relay `event` to subscribed feeds without touching the authoritative
    /// forests. Lets tests replay duplicates and deliver out of order.
    pub fn push_raw(&self, event: CommentEvent) {
        self.inner.lock().relay(event);
    }

    /// Return the authoritative forest for `recipe`
    pub fn test_forest(&self, recipe: RecipeId) -> Vec<Comment> {
        self.inner
            .lock()
            .comments
            .get(&recipe)
            .cloned()
            .unwrap_or_default()
    }

    /// Return the authoritative comment count for `recipe`, replies included
    pub fn test_comment_count(&self, recipe: RecipeId) -> usize {
        tree::node_count(&self.test_forest(recipe))
    }
}

#[async_trait]
impl CommentApi for MockServer {
    async fn fetch_comments(&self, recipe: RecipeId) -> Result<Vec<Comment>, Error> {
        let mut inner = self.inner.lock();
        inner.take_failure()?;
        Ok(inner.comments.get(&recipe).cloned().unwrap_or_default())
    }

    async fn create_comment(
        &self,
        recipe: RecipeId,
        comment: NewComment,
    ) -> Result<Comment, Error> {
        comment.validate()?;
        let mut inner = self.inner.lock();
        inner.take_failure()?;
        let (author_id, author_name) = inner.author.clone();
        let forest = inner.comments.entry(recipe).or_default();
        if let Some(parent_id) = comment.parent_id {
            if !tree::contains(&*forest, parent_id) {
                return Err(Error::UnknownComment(parent_id));
            }
        }
        let now = Utc::now();
        let created = Comment {
            id: CommentId(Uuid::new_v4()),
            recipe_id: recipe,
            author_id,
            author_name,
            parent_id: comment.parent_id,
            content: comment.content,
            created_at: now,
            updated_at: now,
            is_edited: false,
            children: Vec::new(),
        };
        *forest = tree::insert(&*forest, created.clone());
        inner.relay(CommentEvent::Added(created.clone()));
        Ok(created)
    }

    async fn update_comment(&self, comment: CommentId, patch: CommentPatch) -> Result<(), Error> {
        patch.validate()?;
        let mut inner = self.inner.lock();
        inner.take_failure()?;
        let recipe = inner
            .comments
            .iter()
            .find(|(_, forest)| tree::contains(forest, comment))
            .map(|(recipe, _)| *recipe)
            .ok_or(Error::UnknownComment(comment))?;
        // the server, not the client, owns the edit bookkeeping
        let authoritative = CommentPatch {
            id: comment,
            content: patch.content,
            updated_at: Utc::now(),
            is_edited: true,
        };
        let forest = inner
            .comments
            .get_mut(&recipe)
            .expect("recipe found just above");
        *forest = tree::update(&*forest, &authoritative);
        inner.relay(CommentEvent::Updated(authoritative));
        Ok(())
    }

    async fn delete_comment(&self, comment: CommentId) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        inner.take_failure()?;
        let recipe = inner
            .comments
            .iter()
            .find(|(_, forest)| tree::contains(forest, comment))
            .map(|(recipe, _)| *recipe)
            .ok_or(Error::UnknownComment(comment))?;
        let forest = inner
            .comments
            .get_mut(&recipe)
            .expect("recipe found just above");
        *forest = tree::remove(&*forest, comment);
        inner.relay(CommentEvent::Deleted(comment));
        Ok(())
    }
}

/// One client's connection to the mock push channel.
///
/// Each registration gets its own sender id on the server, so several
/// connected clients can subscribe to the same event kind independently.
pub struct MockFeed {
    server: MockServer,
    registered: HashMap<CommentEventKind, Uuid>,
}

impl EventChannel for MockFeed {
    fn on(&mut self, kind: CommentEventKind) -> mpsc::UnboundedReceiver<CommentEvent> {
        let (sender, receiver) = mpsc::unbounded();
        let sender_id = Uuid::new_v4();
        self.server
            .inner
            .lock()
            .feeds
            .entry(kind)
            .or_default()
            .insert(sender_id, sender);
        self.registered.insert(kind, sender_id);
        receiver
    }

    fn off(&mut self, kind: CommentEventKind) {
        if let Some(sender_id) = self.registered.remove(&kind) {
            if let Some(feeds) = self.server.inner.lock().feeds.get_mut(&kind) {
                feeds.remove(&sender_id);
            }
        }
    }
}
