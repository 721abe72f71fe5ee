use crate::{
    runtime::{Clock, Scheduler},
    storage::KeyValueStore,
};

use std::sync::Arc;

/// Collaborators shared by every session owned by the application root.
#[derive(Clone)]
pub struct SessionContext {
    /// Time source for durations, ids and file names.
    pub clock: Arc<dyn Clock>,
    /// Source of the duration ticker and the position poller.
    pub scheduler: Arc<dyn Scheduler>,
    /// Store for session snapshots that must survive a restart.
    pub store: Arc<dyn KeyValueStore>,
}
