//! Remote call facade (std only).
//!
//! Requests arrive one per line as JSON objects:
//!
//! ```text
//! {"method": "move_relative", "args": [50], "kwargs": {"delay": 0.002}}
//! {"action": "terminate"}
//! ```
//!
//! and each gets a one-line reply:
//!
//! ```text
//! {"status": "ok", "ret": null}
//! {"status": "failed", "error": "NamedPositionNotFoundError", "message": "..."}
//! ```
//!
//! Calls from all connections go through one [`Dispatcher`], which holds the
//! controller behind a mutex so exactly one command runs at a time.

mod dispatch;
mod request;
mod server;

pub use dispatch::{Dispatcher, METHODS};
pub use request::{Params, Reply, Request};
pub use server::Server;
