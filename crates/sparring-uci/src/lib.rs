//! UCI protocol handling for the sparring engines.

pub mod command;
pub mod engine;
pub mod error;
pub mod notation;

pub use command::{Command, GoParams, parse_command};
pub use engine::UciEngine;
pub use error::UciError;
