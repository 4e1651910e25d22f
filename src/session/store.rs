//! Observable store for the session state and in-flight guards

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::state::{Operation, SessionSnapshot, SessionState};
use crate::error::BankError;

/// Owns the `SessionState`; every write publishes a fresh snapshot.
///
/// The lock is never held across an await.
pub struct StateStore {
    state: Mutex<SessionState>,
    updates: watch::Sender<SessionSnapshot>,
}

impl StateStore {
    pub fn new() -> Self {
        let state = SessionState::default();
        let (updates, _) = watch::channel(state.snapshot());
        Self {
            state: Mutex::new(state),
            updates,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.lock())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.lock();
            let result = f(&mut state);
            (result, state.snapshot())
        };
        self.updates.send_replace(snapshot);
        result
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.read(|state| state.snapshot())
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks an operation as in flight until dropped
pub struct InFlightGuard {
    store: Arc<StateStore>,
    operation: Operation,
}

impl InFlightGuard {
    /// Claim `operation`; fails if a previous dispatch has not resolved.
    /// A successful claim clears the last error, since the user has moved on.
    pub fn acquire(store: &Arc<StateStore>, operation: Operation) -> Result<Self, BankError> {
        let claimed = store.update(|state| {
            let claimed = state.in_flight.insert(operation);
            if claimed {
                state.error = None;
            }
            claimed
        });

        if !claimed {
            log::warn!("⏳ {} already in flight, ignoring duplicate dispatch", operation);
            return Err(BankError::OperationInFlight(operation));
        }

        Ok(Self {
            store: Arc::clone(store),
            operation,
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let operation = self.operation;
        self.store.update(|state| {
            state.in_flight.remove(&operation);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_rejects_duplicate_until_dropped() {
        let store = Arc::new(StateStore::new());

        let guard = InFlightGuard::acquire(&store, Operation::Deposit).unwrap();
        assert!(matches!(
            InFlightGuard::acquire(&store, Operation::Deposit),
            Err(BankError::OperationInFlight(Operation::Deposit))
        ));
        // other operations are independent
        let other = InFlightGuard::acquire(&store, Operation::Withdraw).unwrap();
        assert_eq!(store.snapshot().in_flight.len(), 2);

        drop(guard);
        drop(other);
        assert!(store.snapshot().in_flight.is_empty());
        assert!(InFlightGuard::acquire(&store, Operation::Deposit).is_ok());
    }

    #[test]
    fn test_updates_are_published() {
        let store = StateStore::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.update(|state| state.bank_name = Some("Acme".to_string()));

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().bank_name.as_deref(), Some("Acme"));
    }
}
