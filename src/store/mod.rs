//! In-process entity stores with synchronous, ordered broadcast.
//!
//! This module provides the client-side cache primitive used by every service:
//! - `Store<T>` holds the latest known value of one server-owned entity
//! - Subscribers get the current value on subscribe, then every replacement
//! - `LoadState` tracks fetch progress beside a store without changing its value

mod load_state;
mod subject;

pub use load_state::LoadState;
pub use subject::{Store, Subscription};
