//! Source composition and merge policy.

pub mod policy;
pub mod service;
