//! Marker types describing what a [`DateTimeOf`] stands for.
//!
//! [`DateTimeOf`]: crate::DateTimeOf

/// Entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Last modification of an entity.
#[derive(Clone, Copy, Debug)]
pub struct Modification;

/// Entity (soft) deletion.
#[derive(Clone, Copy, Debug)]
pub struct Deletion;

/// Moment something stops being valid.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// Successful sign-in.
#[derive(Clone, Copy, Debug)]
pub struct SignIn;

/// Resolution of an issue.
#[derive(Clone, Copy, Debug)]
pub struct Resolution;

/// Deadline of an obligation.
#[derive(Clone, Copy, Debug)]
pub struct Due;
