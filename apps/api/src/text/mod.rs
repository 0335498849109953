//! Resume text handling: document extraction, whitespace cleanup and the
//! keyword-based skill matcher.

pub mod clean;
pub mod extract;
pub mod skills;
