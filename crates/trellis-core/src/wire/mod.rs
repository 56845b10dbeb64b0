pub mod option;
pub mod validate;

pub use option::{DefaultValue, Direction, WireOption};
pub use validate::WireOptions;
