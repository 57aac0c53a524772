//! Command-line interface module.

mod args;
pub mod roundtrip;
pub mod serve;

pub use args::{Cli, Commands, ServeArgs};
