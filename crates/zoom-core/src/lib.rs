//! Records, validation, the store abstraction and the auth gate for Zoom.
//!
//! No HTTP and no SQL here: the server, the store backend and the client all
//! build on these types.

// Store implementations use `async fn`; the trait spells out `Send` itself.
#![allow(async_fn_in_trait)]

pub mod auth;
pub mod complaint;
pub mod error;
pub mod record;
pub mod staff;
pub mod store;
pub mod tenant;

pub use error::{Error, Result};
pub use record::{Record, RecordKind, Role};
