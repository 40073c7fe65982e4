pub mod base;
pub mod demo;
pub mod logging;
pub mod mixer;

pub use base::*;
pub use demo::*;
pub use logging::*;
pub use mixer::*;
