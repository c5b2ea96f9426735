//! The prelude exports the types which describe the 900-series
//! machine itself.  Providing this prelude is the main purpose of the
//! base crate.
pub use super::error::*;
pub use super::initial_orders::*;
pub use super::instruction::*;
pub use super::types::*;
pub use super::word::*;
