//! qlearn Core - error type and the environment contract
//!
//! This crate provides the types shared by the learner, the reference
//! environments and the command line front end.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod env;
pub mod error;

pub use env::{ActionIndex, Environment, Info, RenderMode, Reset, Reward, StateIndex, Step};
pub use error::{QLearnError, Result};
