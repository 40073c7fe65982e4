pub mod mixdown;
pub mod multiplexer;

pub use mixdown::Contribution;
pub use multiplexer::{Mixed, Multiplexer};
