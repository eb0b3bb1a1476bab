pub mod config;
pub mod decode;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod rig;
pub mod server;

pub use error::{Error, Result};
