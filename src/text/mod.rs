//! Text cleanup applied on the way in and on the way out.

mod sanitize;
mod structure;

pub use sanitize::sanitize;
pub use structure::{enforce, HEADING};
