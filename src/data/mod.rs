pub mod directory;
pub mod loader;
pub mod transformer;

pub use directory::*;
pub use loader::*;
pub use transformer::*;
