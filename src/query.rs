//! Equality-gated local query re-issuance
//!
//! `QueryGuard` re-runs a parameterized read whenever its parameter
//! changes, and only then. A parameter equal to the current one is a
//! no-op, so consumers re-evaluated for unrelated reasons never trigger a
//! duplicate query that could race and flicker against the in-flight one.
//!
//! Sessions carry a monotonically increasing id. Superseding a session
//! removes it from the current slot before the new one starts, so a late
//! result from a torn-down session fails the identity check and is
//! silently dropped — an expected race outcome, not an error.
//!
//! Session transitions and result delivery are serialized on one internal
//! lock, including the callback invocation itself: a supersede cannot
//! slip in between the identity check and the delivery. The builder and
//! the callback therefore must not call back into the guard.

use crate::error::Result;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

type Builder<P, T> = dyn Fn(&P) -> BoxFuture<'static, Result<Vec<T>>> + Send + Sync;
type Callback<T> = dyn Fn(Result<Vec<T>>) + Send + Sync;

struct Session<P> {
    param: P,
    id: u64,
    task: Option<JoinHandle<()>>,
}

struct GuardState<P> {
    /// Active session; `None` is the idle state
    current: Option<Session<P>>,
    last_id: u64,
}

struct Inner<P, T> {
    builder: Box<Builder<P, T>>,
    callback: Box<Callback<T>>,
    state: Mutex<GuardState<P>>,
}

/// Guard over one parameterized local query
///
/// Built from a query-construction function and a results callback.
/// Clones share the same guard.
pub struct QueryGuard<P, T> {
    inner: Arc<Inner<P, T>>,
}

impl<P, T> Clone for QueryGuard<P, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, T> QueryGuard<P, T>
where
    P: PartialEq + Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    /// Build a guard from a query-construction function and a results
    /// callback
    ///
    /// Both run under the guard's internal lock and must not call back
    /// into the guard.
    pub fn new(
        builder: impl Fn(&P) -> BoxFuture<'static, Result<Vec<T>>> + Send + Sync + 'static,
        callback: impl Fn(Result<Vec<T>>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                builder: Box::new(builder),
                callback: Box::new(callback),
                state: Mutex::new(GuardState {
                    current: None,
                    last_id: 0,
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GuardState<P>> {
        // A poisoned lock only means a panicked writer; the state itself
        // is a pair of plain values and stays usable.
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Feed a new parameter value
    ///
    /// Equal to the current parameter: no-op, returns `false`. Otherwise
    /// the old session (if any) is torn down, a new one starts, and the
    /// method returns `true`. Must be called from within a tokio runtime.
    pub fn on_parameter_change(&self, param: P) -> bool {
        // Single critical section: equality check, supersede, and the new
        // session's registration happen atomically. An in-flight delivery
        // holds this lock, so a supersede waits for it to finish rather
        // than interleaving with it.
        let mut state = self.lock();

        if let Some(session) = &state.current {
            if session.param == param {
                tracing::trace!("query parameter unchanged, keeping session");
                return false;
            }
        }

        // Supersede: the old session leaves the current slot first, so
        // its result can no longer pass the identity check.
        if let Some(old) = state.current.take() {
            if let Some(task) = old.task {
                task.abort();
            }
            tracing::debug!(session = old.id, "query session superseded");
        }

        state.last_id += 1;
        let id = state.last_id;

        // The spawned task blocks on this same lock inside on_result, so
        // it cannot deliver before the session below is registered.
        let fut = (self.inner.builder)(&param);
        let guard = self.clone();
        let task = tokio::spawn(async move {
            let result = fut.await;
            guard.on_result(id, result);
        });

        state.current = Some(Session {
            param,
            id,
            task: Some(task),
        });
        true
    }

    /// Deliver a session's result
    ///
    /// Applied only if `session_id` identifies the current session; stale
    /// results are dropped. The identity check and the callback run under
    /// one lock acquisition, so a parameter change arriving concurrently
    /// either supersedes before the check (result dropped) or waits until
    /// the delivery has completed — a stale result can never reach the
    /// callback after a newer session has started.
    pub fn on_result(&self, session_id: u64, result: Result<Vec<T>>) {
        let state = self.lock();
        let is_current = state
            .current
            .as_ref()
            .map(|s| s.id == session_id)
            .unwrap_or(false);
        if !is_current {
            tracing::debug!(session = session_id, "stale query result dropped");
            return;
        }
        if let Err(e) = &result {
            tracing::debug!(session = session_id, error = %e, "query failed");
        }
        (self.inner.callback)(result);
        drop(state);
    }

    /// Tear down the active session and return to idle
    ///
    /// Nothing is delivered after detaching.
    pub fn detach(&self) {
        let mut state = self.lock();
        if let Some(old) = state.current.take() {
            if let Some(task) = old.task {
                task.abort();
            }
            tracing::debug!(session = old.id, "query session detached");
        }
    }

    /// Whether a session is active
    pub fn is_active(&self) -> bool {
        self.lock().current.is_some()
    }

    /// Parameter of the active session, if any
    pub fn current_param(&self) -> Option<P> {
        self.lock().current.as_ref().map(|s| s.param.clone())
    }

    /// Drive the guard from an observable value
    ///
    /// Projects each committed snapshot to a parameter and feeds it
    /// through the equality gate. The returned task ends when the
    /// sender side is dropped.
    pub fn bind<S>(
        &self,
        rx: watch::Receiver<S>,
        project: impl Fn(&S) -> P + Send + Sync + 'static,
    ) -> JoinHandle<()>
    where
        S: Clone + Send + Sync + 'static,
    {
        let guard = self.clone();
        let mut stream = WatchStream::new(rx);
        tokio::spawn(async move {
            while let Some(snapshot) = stream.next().await {
                guard.on_parameter_change(project(&snapshot));
            }
        })
    }
}
