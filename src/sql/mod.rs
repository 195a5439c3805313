//! Safe SQL builder: identifiers from registered models only, values as parameters.

mod builder;
pub mod order;
pub mod params;
pub use builder::*;
pub use order::{OrderBy, OrderTerm};
pub use params::*;
