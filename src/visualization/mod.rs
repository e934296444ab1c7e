pub mod histogram;
pub mod report;

pub use histogram::*;
pub use report::*;
