//! Session layer: mutable calculator state, the never-fails command
//! executor, HTML output formatting and the autocomplete controller.

pub mod autocomplete;
pub mod executor;
pub mod format;
pub mod state;

pub use autocomplete::{Autocomplete, Edit, Feedback};
pub use executor::execute;
pub use state::SessionState;
