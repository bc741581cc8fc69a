//! [`ConsolidationQueue`]: delayed, coalescing consolidation runs.
//!
//! Scheduling a category whose previous run is still waiting cancels that
//! run and starts the delay again, so a burst of research on one category
//! produces a single consolidated page. A run past its delay is never
//! aborted, so a page file always has its row.

use std::{
  collections::HashMap,
  future::Future,
  sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use bayou_core::store::HistoryStore;
use bayou_pages::Consolidator;
use tokio::task::JoinHandle;

pub const DEFAULT_DELAY: Duration = Duration::from_secs(30);

/// A delayed run. Whoever claims it first decides its fate: the task claims
/// it when the delay is over and runs to completion; a canceller claims it
/// while it is still waiting and aborts it.
struct Delayed {
  handle:  JoinHandle<()>,
  claimed: Arc<AtomicBool>,
}

impl Delayed {
  fn spawn<F>(delay: Duration, run: F) -> Self
  where
    F: Future<Output = ()> + Send + 'static,
  {
    let claimed = Arc::new(AtomicBool::new(false));
    let task_claim = Arc::clone(&claimed);
    let handle = tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      if task_claim.swap(true, Ordering::AcqRel) {
        return;
      }
      run.await;
    });
    Self { handle, claimed }
  }

  /// Abort the run if it has not started. Returns `false` once it has.
  fn cancel(self) -> bool {
    if self.claimed.swap(true, Ordering::AcqRel) {
      return false;
    }
    self.handle.abort();
    true
  }

  fn is_finished(&self) -> bool { self.handle.is_finished() }
}

pub struct ConsolidationQueue<S> {
  consolidator: Arc<Consolidator<S>>,
  delay:        Duration,
  pending:      Mutex<HashMap<String, Delayed>>,
}

impl<S: HistoryStore + 'static> ConsolidationQueue<S> {
  pub fn new(consolidator: Arc<Consolidator<S>>, delay: Duration) -> Self {
    Self {
      consolidator,
      delay,
      pending: Mutex::new(HashMap::new()),
    }
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, Delayed>> {
    // A panic while holding the lock cannot leave the map inconsistent.
    self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Run consolidation for `category` after the delay, replacing any run
  /// still waiting for it. A run that already started is left to finish.
  pub fn schedule(&self, category: &str) {
    let key = category.to_owned();
    let consolidator = Arc::clone(&self.consolidator);

    let task_key = key.clone();
    let delayed = Delayed::spawn(self.delay, async move {
      match consolidator.consolidate(&task_key).await {
        Ok(Some(out)) => {
          tracing::info!(category = %task_key, url = %out.url, "scheduled consolidation finished");
        }
        Ok(None) => {
          tracing::debug!(category = %task_key, "scheduled consolidation had nothing to do");
        }
        Err(e) => {
          tracing::warn!(category = %task_key, error = %e, "scheduled consolidation failed");
        }
      }
    });

    if let Some(previous) = self.lock().insert(key, delayed)
      && previous.cancel()
    {
      tracing::debug!(category, "rescheduled pending consolidation");
    }
  }

  /// Cancel the run for `category` if it is still waiting. Returns `true`
  /// if one was.
  pub fn cancel(&self, category: &str) -> bool {
    self.lock().remove(category).is_some_and(Delayed::cancel)
  }

  /// Number of runs that have not finished yet.
  pub fn pending(&self) -> usize {
    let mut pending = self.lock();
    pending.retain(|_, delayed| !delayed.is_finished());
    pending.len()
  }

  /// Abort every run still waiting. Runs already consolidating finish.
  pub fn shutdown(&self) {
    let drained: Vec<_> = self.lock().drain().collect();
    for (category, delayed) in drained {
      if delayed.cancel() {
        tracing::debug!(%category, "cancelled pending consolidation");
      }
    }
  }
}

impl<S> Drop for ConsolidationQueue<S> {
  fn drop(&mut self) {
    if let Ok(pending) = self.pending.get_mut() {
      for (_, delayed) in pending.drain() {
        delayed.cancel();
      }
    }
  }
}
