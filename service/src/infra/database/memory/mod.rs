//! In-memory [`Database`] implementation.
//!
//! Keeps everything in process memory, so is meant for tests and local runs.
//! Transactions are serialized by a single lock and writes are visible right
//! away: an uncommitted transaction is not rolled back.

mod impls;

use std::{collections::HashMap, sync::Arc};

use derive_more::{Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::{
    maintenance, payment, property, rent_application, user,
    MaintenanceRequest, Message, Payment, Property, RentApplication, User,
};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
#[derive(Clone, Debug)]
pub struct Memory<C = NonTx> {
    /// Stored data.
    tables: Arc<Tables>,

    /// Kind of this client.
    client: C,
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Arc::default(),
            client: NonTx,
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Copy, Debug)]
pub struct NonTx;

/// Transactional [`Memory`] client.
///
/// Holds the transaction lock until committed or dropped.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Guard of the transaction lock, taken away on commit.
    guard: Arc<Mutex<Option<OwnedMutexGuard<()>>>>,
}

/// Stored data of a [`Memory`] database.
#[derive(Debug, Default)]
struct Tables {
    /// Lock serializing transactions.
    tx: Arc<Mutex<()>>,

    /// Stored [`User`]s.
    users: RwLock<HashMap<user::Id, User>>,

    /// Stored [`Property`]s.
    properties: RwLock<HashMap<property::Id, Property>>,

    /// Stored [`RentApplication`]s.
    rent_applications:
        RwLock<HashMap<rent_application::Id, RentApplication>>,

    /// Stored [`MaintenanceRequest`]s.
    maintenance_requests:
        RwLock<HashMap<maintenance::Id, MaintenanceRequest>>,

    /// Stored [`Payment`]s.
    payments: RwLock<HashMap<payment::Id, Payment>>,

    /// Stored [`Message`]s, in the order they were inserted.
    messages: RwLock<Vec<Message>>,
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Uniqueness constraint would be violated.
    #[display("unique constraint `{_0}` violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation(c) => constraint.map_or(true, |x| x == *c),
        }
    }
}
