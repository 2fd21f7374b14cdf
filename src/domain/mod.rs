//! Domain layer: entities and graph algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod registry;

pub use arena::{ChildLink, ProjectTree, TreeIndex, TreeNode};
pub use builder::{TreeBuilder, TreeResult};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use registry::GraphRegistry;
