//! Core state shared across the serve loop.

mod session;
mod state;

pub use session::{ActiveTemplate, Session};
#[cfg(test)]
pub(crate) use session::test_session;
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
