//! Calculator function library: the calculus operation set,
//! probability distributions, descriptive statistics, random draws and
//! integer utilities. Everything here goes through the shared registry
//! so the session layer and autocomplete see one flat namespace.

pub mod calculus;
pub mod display;
pub mod dist;
pub mod numtheory;
pub mod poly;
pub mod random;
pub mod registry;
pub mod special;
pub mod stats;
mod util;

pub use registry::register_all;
