//! Workspace filesystem access for Tributary.
//!
//! This module provides the read-only filesystem seam used by discovery,
//! with a disk-backed implementation and an in-memory one, plus the
//! directory layout conventions of a workspace root.

pub mod disk;
pub mod layout;
pub mod memory;
pub mod traits;

pub use disk::DiskFs;
pub use layout::WorkspaceLayout;
pub use memory::MemoryFs;
pub use traits::{DirEntry, WorkspaceFs};
