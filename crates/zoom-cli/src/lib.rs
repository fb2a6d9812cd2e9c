//! Client side of Zoom: the HTTP client, the session state machine and the
//! state cache the `zoom` front end reads from.

pub mod cache;
pub mod client;
pub mod error;
pub mod password;
pub mod session;
pub mod sync;

pub use cache::{DashboardStats, Snapshot};
pub use client::{ApiClient, ApiConfig, Backend};
pub use error::{ClientError, Result};
pub use session::Session;
pub use sync::{ReconcilePolicy, StateCache};
