//! Shared application state.

mod relay;
mod store;

pub use relay::{RelayError, RelayStore};
pub use store::{AppState, StateChange};
