//! Runtime facade for the ad bridge workspace.
//!
//! Every other crate in the workspace spawns tasks, sleeps and synchronizes
//! through this crate instead of naming Tokio directly. Provider adapters are
//! therefore free of executor details and the host can swap the runtime in a
//! single place.
//!
//! # Modules
//!
//! - `task`: task spawning, join and abort handles
//! - `time`: sleep, timeout and instants (pausable in tests)
//! - `sync`: channels and async-aware locks
//! - `runtime`: `block_on` and handle lookup for synchronous entry points
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(10)).await;
//!         42
//!     });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
