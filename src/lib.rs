pub mod acquisition;
pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod visualization;

pub use acquisition::*;
pub use analysis::*;
pub use data::*;
pub use manifest::*;

pub use error::{HarvestError, Result};
