//! Project version graph for source preprocessing.
//!
//! A build host declares project variants and the mappings linking them,
//! then asks once for a tree rooted at its main project. The tree decides in
//! which direction every later source transformation runs.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
