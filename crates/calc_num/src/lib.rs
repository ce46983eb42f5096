pub mod format;
pub mod numeric;

pub use numeric::{Numeric, NumericMode};
