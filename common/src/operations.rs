//! Abstract storage operations executed via a [`Handler`].

use std::marker::PhantomData;

use crate::Handler;

/// Stores a new value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Overwrites an existing value.
///
/// Deletion of soft-deletable entities is an [`Update`] setting their
/// deletion time.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Reads values matching a selector.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Locks a value until the surrounding transaction ends.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Opens a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Client returned by executing [`Transact`] on `T`.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Commits a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selector of `W` by `B`.
///
/// `W` describes the shape of the result, so the same `B` may select
/// different things.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the selected value.
    _what: PhantomData<W>,

    /// Value to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Returns the value this [`By`] selects by.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
