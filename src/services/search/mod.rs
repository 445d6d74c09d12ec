//! Debounced search flow
//!
//! A session turns keystrokes into settled terms, settled terms into catalog
//! requests, and catalog responses into a `FetchState`. All state changes go
//! through the `update` reducer; the session runner performs the effects it
//! returns and publishes each new state.

pub mod session;
pub mod state;
pub mod update;

pub use session::{SearchSession, SessionDeps, SessionHandle};
pub use state::{FetchState, SearchEffect, SearchEvent, SearchState};
pub use update::update;
