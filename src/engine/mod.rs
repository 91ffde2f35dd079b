//! Pure decision engines behind the workflow API.
//!
//! Each engine is stateless and total over its inputs; all network and
//! session state lives in the callers.

pub mod duplicate;
pub mod gate;
pub mod reviewers;
