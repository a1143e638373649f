//! TrackEm Server — configuration and wiring shared by the `trackem`
//! binary and its tests.

pub mod app;
pub mod args;
pub mod error;

pub use app::App;
pub use args::ServerArgs;
pub use error::{ServerError, ServerResult};
