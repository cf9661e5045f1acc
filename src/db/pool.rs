//! Session Pool Module
//!
//! A fixed-capacity pool of reusable backend sessions. Borrowers suspend on
//! a semaphore while no session is idle; every release hands its permit to
//! exactly one waiter, so the pool is starvation-free under release traffic.
//!
//! A session is either idle (owned by the pool) or in use (owned by exactly
//! one borrower through a [`PooledSession`] handle). The handle returns the
//! session on every exit path; a borrower that observed corruption can
//! instead [`PooledSession::invalidate`] it, permanently shrinking the pool.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use super::backend::BackendSession;

// == Shared Pool State ==
/// State behind the `Arc` shared by the pool and every outstanding handle.
///
/// The permit count always matches the number of sessions in `idle` once
/// in-flight handouts settle: a handle pushes its session back *before*
/// releasing its permit, so a granted permit guarantees a poppable session.
struct PoolShared<S: BackendSession> {
    idle: Mutex<VecDeque<S>>,
    permits: Arc<Semaphore>,
    params: S::Params,
    established: usize,
    invalidated: AtomicUsize,
}

// == Session Pool ==
/// Cloneable handle to the shared pool.
pub struct SessionPool<S: BackendSession> {
    shared: Arc<PoolShared<S>>,
}

impl<S: BackendSession> Clone for SessionPool<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: BackendSession> SessionPool<S> {
    // == Construction ==
    /// Attempts to establish `size` sessions, retaining the successes.
    ///
    /// The pool is usable iff at least one session was established; check
    /// [`is_connected`](Self::is_connected) before serving traffic.
    pub async fn connect(params: S::Params, size: usize) -> Self {
        let mut idle = VecDeque::with_capacity(size);
        for n in 0..size {
            match S::connect(&params).await {
                Ok(session) => idle.push_back(session),
                Err(e) => warn!(session = n, error = %e, "failed to establish backend session"),
            }
        }
        let established = idle.len();
        info!(established, requested = size, "session pool initialized");

        Self {
            shared: Arc::new(PoolShared {
                idle: Mutex::new(idle),
                permits: Arc::new(Semaphore::new(established)),
                params,
                established,
                invalidated: AtomicUsize::new(0),
            }),
        }
    }

    /// True iff at least one session was established at construction.
    pub fn is_connected(&self) -> bool {
        self.shared.established > 0
    }

    /// Number of sessions established at construction.
    pub fn established(&self) -> usize {
        self.shared.established
    }

    /// Established sessions minus those permanently invalidated.
    pub fn capacity(&self) -> usize {
        self.shared.established - self.shared.invalidated.load(Ordering::Relaxed)
    }

    /// Sessions currently owned by the pool rather than a borrower.
    pub fn idle_count(&self) -> usize {
        self.shared.idle.lock().len()
    }

    // == Acquire ==
    /// Borrows a session, suspending until one is idle.
    ///
    /// An unhealthy session gets one repair attempt on the way out; it is
    /// handed over regardless, and a failed repair surfaces as a failure of
    /// the borrower's next statement.
    pub async fn acquire(&self) -> PooledSession<S> {
        let permit = Arc::clone(&self.shared.permits)
            .acquire_owned()
            .await
            .expect("session pool semaphore closed");
        self.checkout(permit).await
    }

    /// As [`acquire`](Self::acquire), but gives up after `deadline`.
    /// Returns `None` when no session became idle in time.
    pub async fn acquire_with_deadline(&self, deadline: Duration) -> Option<PooledSession<S>> {
        let acquired =
            tokio::time::timeout(deadline, Arc::clone(&self.shared.permits).acquire_owned()).await;
        match acquired {
            Ok(Ok(permit)) => Some(self.checkout(permit).await),
            Ok(Err(_)) | Err(_) => None,
        }
    }

    async fn checkout(&self, permit: OwnedSemaphorePermit) -> PooledSession<S> {
        let mut session = self
            .shared
            .idle
            .lock()
            .pop_front()
            .expect("pool permit granted with no idle session");

        if !session.is_healthy() {
            warn!("borrowed session failed liveness probe, attempting reset");
            session.reset(&self.shared.params).await;
        }

        debug!("session borrowed from pool");
        PooledSession {
            shared: Arc::clone(&self.shared),
            session: Some(session),
            permit: Some(permit),
        }
    }

    // == Shutdown ==
    /// Closes all idle sessions. Called once at process exit, after the
    /// listener has stopped handing out work.
    pub fn shutdown(&self) {
        let drained: Vec<S> = self.shared.idle.lock().drain(..).collect();
        info!(closed = drained.len(), "closed idle backend sessions");
    }
}

// == Pooled Session Handle ==
/// Scoped, exclusive loan of one session.
///
/// Dropping the handle returns the session to the idle queue and then wakes
/// one waiter; the session is back before the waiter can pop. The handle
/// dereferences to the session itself.
pub struct PooledSession<S: BackendSession> {
    shared: Arc<PoolShared<S>>,
    session: Option<S>,
    permit: Option<OwnedSemaphorePermit>,
}

impl<S: BackendSession> PooledSession<S> {
    /// Discards the session instead of returning it.
    ///
    /// For sessions the borrower has observed to be beyond repair. The
    /// permit is forgotten with it, so pool capacity shrinks permanently.
    pub fn invalidate(mut self) {
        if let Some(session) = self.session.take() {
            drop(session);
        }
        if let Some(permit) = self.permit.take() {
            permit.forget();
        }
        self.shared.invalidated.fetch_add(1, Ordering::Relaxed);
        warn!("backend session invalidated and withdrawn from pool");
    }
}

impl<S: BackendSession> Deref for PooledSession<S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.session.as_ref().expect("session already released")
    }
}

impl<S: BackendSession> DerefMut for PooledSession<S> {
    fn deref_mut(&mut self) -> &mut S {
        self.session.as_mut().expect("session already released")
    }
}

impl<S: BackendSession> Drop for PooledSession<S> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.shared.idle.lock().push_back(session);
            debug!("session returned to pool");
        }
        // The permit drops last, waking a waiter only after the session is
        // back in the queue.
        drop(self.permit.take());
    }
}
