//! Live read models
//!
//! A [`ReadModel`] keeps a loaded view of the store up to date for as long
//! as it lives:
//!
//! - one synchronous load when it is mounted
//! - a reload on every refresh-interval tick
//! - a reload whenever a document it depends on is written through any
//!   handle of the same store
//! - an immediate reload after a mutation made through [`ReadModel::mutate`]
//!
//! The background task is aborted when the model is dropped. Without a tokio
//! runtime only the mount load, [`ReadModel::refresh`] and
//! [`ReadModel::mutate`] update the view.
//!
//! ```ignore
//! let progress = ReadModel::overall_progress(store.clone());
//! let mut updates = progress.subscribe();
//! while updates.changed().await.is_ok() {
//!     println!("{}%", updates.borrow().data.average_progress);
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::analytics::OverallProgress;
use crate::error::CoreResult;
use crate::models::{SavedContent, ScheduleBlock, Subject, UserProfile};
use crate::storage::DocumentKey;
use crate::store::Store;

type Loader<T> = Arc<dyn Fn(&Store) -> CoreResult<T> + Send + Sync>;

/// Current state of a read model
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Last successfully loaded data
    pub data: T,
    /// True until the first load finishes
    pub loading: bool,
    /// Message of the most recent failed load, cleared on success
    pub error: Option<String>,
}

/// A view of the store that reloads itself
pub struct ReadModel<T> {
    store: Store,
    loader: Loader<T>,
    state: Arc<watch::Sender<Snapshot<T>>>,
    task: Option<JoinHandle<()>>,
}

impl<T> ReadModel<T>
where
    T: Clone + Default + PartialEq + Send + Sync + 'static,
{
    /// Mount a read model
    ///
    /// `keys` are the documents whose writes trigger a reload; `interval` of
    /// `None` disables polling.
    pub fn mount<F>(store: Store, keys: &[DocumentKey], interval: Option<Duration>, loader: F) -> Self
    where
        F: Fn(&Store) -> CoreResult<T> + Send + Sync + 'static,
    {
        let loader: Loader<T> = Arc::new(loader);
        let (state, _) = watch::channel(Snapshot {
            data: T::default(),
            loading: true,
            error: None,
        });
        let state = Arc::new(state);

        apply(&state, loader(&store));

        // Subscribe before spawning so no write after mount is missed
        let changes = store.subscribe();
        let watched = keys.to_vec();
        let wants_task = interval.is_some() || !watched.is_empty();

        let task = match tokio::runtime::Handle::try_current() {
            Ok(handle) if wants_task => Some(handle.spawn(refresh_loop(
                store.clone(),
                Arc::clone(&loader),
                Arc::clone(&state),
                watched,
                changes,
                interval,
            ))),
            Ok(_) => None,
            Err(_) => {
                debug!("No tokio runtime, read model will not refresh in the background");
                None
            }
        };

        Self {
            store,
            loader,
            state,
            task,
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Snapshot<T> {
        self.state.borrow().clone()
    }

    /// Current data
    pub fn data(&self) -> T {
        self.state.borrow().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Watch for snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.state.subscribe()
    }

    /// Reload now
    pub fn refresh(&self) {
        apply(&self.state, (self.loader)(&self.store));
    }

    /// Run a mutation against the store, reloading on success
    pub fn mutate<R, F>(&self, mutation: F) -> CoreResult<R>
    where
        F: FnOnce(&Store) -> CoreResult<R>,
    {
        let output = mutation(&self.store)?;
        self.refresh();
        Ok(output)
    }
}

impl ReadModel<Vec<Subject>> {
    /// All subjects
    pub fn subjects(store: Store) -> Self {
        let interval = store.config().refresh_interval();
        Self::mount(store, &[DocumentKey::Subjects], interval, |s| {
            s.read_strict(DocumentKey::Subjects)
        })
    }
}

impl ReadModel<OverallProgress> {
    /// Overall progress across active subjects
    pub fn overall_progress(store: Store) -> Self {
        let interval = store.config().refresh_interval();
        Self::mount(
            store,
            &[DocumentKey::Subjects, DocumentKey::User],
            interval,
            |s| Ok(s.overall_progress()),
        )
    }
}

impl ReadModel<Vec<ScheduleBlock>> {
    /// Schedule of one day
    pub fn schedule(store: Store, date: NaiveDate) -> Self {
        let interval = store.config().refresh_interval();
        Self::mount(store, &[DocumentKey::Schedule], interval, move |s| {
            Ok(s.schedule_for(date))
        })
    }
}

impl ReadModel<UserProfile> {
    /// The user profile
    pub fn user_profile(store: Store) -> Self {
        let interval = store.config().refresh_interval();
        Self::mount(store, &[DocumentKey::User], interval, |s| {
            s.read_strict(DocumentKey::User)
        })
    }
}

impl ReadModel<SavedContent> {
    /// Saved posts and videos
    pub fn saved_content(store: Store) -> Self {
        let interval = store.config().refresh_interval();
        Self::mount(store, &[DocumentKey::SavedContent], interval, |s| {
            s.read_strict(DocumentKey::SavedContent)
        })
    }
}

impl<T> Drop for ReadModel<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Store a load result, keeping the last good data on failure
///
/// Subscribers are only woken when the snapshot actually changed.
fn apply<T: PartialEq>(state: &watch::Sender<Snapshot<T>>, result: CoreResult<T>) {
    state.send_if_modified(|snapshot| {
        let first_load = std::mem::replace(&mut snapshot.loading, false);
        match result {
            Ok(data) => {
                let changed = first_load || snapshot.error.is_some() || snapshot.data != data;
                snapshot.data = data;
                snapshot.error = None;
                changed
            }
            Err(e) => {
                warn!("Read model load failed: {}", e);
                let message = e.to_string();
                let changed = first_load || snapshot.error.as_deref() != Some(message.as_str());
                snapshot.error = Some(message);
                changed
            }
        }
    });
}

/// Wait for the next tick, forever when polling is off
async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn refresh_loop<T: PartialEq>(
    store: Store,
    loader: Loader<T>,
    state: Arc<watch::Sender<Snapshot<T>>>,
    keys: Vec<DocumentKey>,
    mut changes: broadcast::Receiver<DocumentKey>,
    interval: Option<Duration>,
) {
    let mut ticker = interval.map(|period| {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    loop {
        tokio::select! {
            _ = tick(&mut ticker) => {}
            change = changes.recv() => match change {
                Ok(key) if keys.contains(&key) => {}
                Ok(_) => continue,
                Err(RecvError::Lagged(missed)) => {
                    debug!("Read model missed {} change notification(s)", missed);
                }
                Err(RecvError::Closed) => break,
            },
        }

        apply(&state, loader(&store));
    }
}
