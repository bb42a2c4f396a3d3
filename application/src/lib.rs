//! GraphQL API of the RentEase rental marketplace.
//!
//! Exposes the [`Service`] over HTTP: queries and mutations at
//! [`server::GRAPHQL_PATH`], subscriptions over WebSocket at
//! [`server::SUBSCRIPTIONS_PATH`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;
pub mod server;

// Used in binary.
use refinery as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::{Context, Session},
    error::{AsError, Error},
    server::router,
};

/// [`service::Service`] backed by [`service::infra::Postgres`].
pub type Service = service::Service<service::infra::Postgres>;
