pub mod fetcher;
pub mod request;
pub mod supervisor;

pub use fetcher::*;
pub use request::*;
pub use supervisor::*;
