//! Async one-second driver for the focus timer.
//!
//! A ticker is bound to the task id that was active when it was spawned.
//! Every tick re-checks that binding under the organizer lock, so a tick that
//! fires after a switch, completion or delete changes nothing and stops the
//! ticker. Missed ticks are skipped rather than bursted; the wall-clock
//! settle on the next transition credits that time instead.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::Result;
use crate::events::Event;
use crate::organizer::{Organizer, TickOutcome};
use crate::record::RecordId;
use crate::storage::RecordStore;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub type SharedOrganizer<S> = Arc<Mutex<Organizer<S>>>;

/// Cancellable handle to a running ticker. Dropping it stops the ticker.
#[derive(Debug)]
pub struct TickHandle {
    target: RecordId,
    task: JoinHandle<()>,
}

impl TickHandle {
    pub fn target(&self) -> &RecordId {
        &self.target
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a ticker crediting one second to `target` every `period`.
pub fn spawn_ticker<S>(
    organizer: SharedOrganizer<S>,
    target: RecordId,
    period: Duration,
) -> TickHandle
where
    S: RecordStore + Send + 'static,
{
    let bound = target.clone();
    let task = tokio::spawn(async move {
        let mut cadence = interval_at(Instant::now() + period, period);
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            cadence.tick().await;
            let mut guard = organizer.lock().await;
            match guard.tick(&bound) {
                Ok(TickOutcome::Credited { .. }) => {}
                Ok(TickOutcome::Stale) => {
                    debug!(task_id = %bound, "ticker stopped: task no longer active");
                    break;
                }
                Err(e) => warn!(task_id = %bound, "tick not persisted: {e}"),
            }
        }
    });
    TickHandle { target, task }
}

/// Organizer plus a ticker that follows the active task.
///
/// Every transition cancels the current ticker first and spawns a fresh one
/// for whatever is active afterwards, so at most one ticker exists.
pub struct LiveSession<S: RecordStore + Send + 'static> {
    organizer: SharedOrganizer<S>,
    ticker: Option<TickHandle>,
    period: Duration,
}

impl<S: RecordStore + Send + 'static> LiveSession<S> {
    /// Wrap `organizer`, resuming a ticker if a task was left active.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(organizer: Organizer<S>) -> Self {
        Self::with_period(organizer, TICK_PERIOD)
    }

    pub fn with_period(organizer: Organizer<S>, period: Duration) -> Self {
        let active = organizer.active_task_id().cloned();
        let shared = Arc::new(Mutex::new(organizer));
        let ticker = active.map(|id| spawn_ticker(Arc::clone(&shared), id, period));
        Self {
            organizer: shared,
            ticker,
            period,
        }
    }

    pub fn organizer(&self) -> SharedOrganizer<S> {
        Arc::clone(&self.organizer)
    }

    /// Id the running ticker is bound to.
    pub fn ticking(&self) -> Option<&RecordId> {
        self.ticker
            .as_ref()
            .filter(|t| !t.is_finished())
            .map(TickHandle::target)
    }

    pub async fn toggle(&mut self, id: &RecordId) -> Result<Option<Event>> {
        self.ticker = None;
        let result = self.organizer.lock().await.toggle(id);
        self.resync().await;
        result
    }

    pub async fn complete(&mut self, id: &RecordId) -> Result<Option<Event>> {
        self.ticker = None;
        let result = self.organizer.lock().await.complete(id);
        self.resync().await;
        result
    }

    pub async fn delete(&mut self, id: &RecordId) -> Result<Option<Event>> {
        self.ticker = None;
        let result = self.organizer.lock().await.delete(id);
        self.resync().await;
        result
    }

    /// Stop ticking and credit any wall-clock remainder.
    pub async fn shutdown(mut self) -> Result<u64> {
        self.ticker = None;
        let credited = self.organizer.lock().await.settle()?;
        Ok(credited)
    }

    async fn resync(&mut self) {
        let active = self.organizer.lock().await.active_task_id().cloned();
        self.ticker =
            active.map(|id| spawn_ticker(Arc::clone(&self.organizer), id, self.period));
    }
}
