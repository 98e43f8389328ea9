//! Core types and trait definitions for the Roster event registration service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::EventStore`]; the HTTP layer talks to
//! a [`Roster`] handle wrapping one of them.

pub mod error;
pub mod event;
pub mod registration;
pub mod roster;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
pub use roster::Roster;
