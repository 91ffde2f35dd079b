//! Data contracts shared between the decision engines and the API layer.

mod draft;
mod duplicate;
mod reviewer;
mod submission;

pub use draft::*;
pub use duplicate::*;
pub use reviewer::*;
pub use submission::*;
