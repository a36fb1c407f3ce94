//! Rules document loading.
//!
//! `RULES.md` is opaque free text at the workspace root. It is returned
//! verbatim and never parsed here.

use std::path::Path;

use crate::error::{FailOpen, Result};
use crate::workspace::{DiskFs, WorkspaceFs, WorkspaceLayout};

/// Read `RULES.md`, propagating read failures.
///
/// Returns `Ok(None)` when no root is configured or the file does not exist.
pub fn read_rules<F: WorkspaceFs + ?Sized>(fs: &F, root: Option<&Path>) -> Result<Option<String>> {
    let Some(root) = root else {
        return Ok(None);
    };

    let path = WorkspaceLayout::new(root).rules_path();
    if !fs.exists(&path) {
        return Ok(None);
    }

    fs.read_to_string(&path).map(Some)
}

/// Load the rules document from disk.
///
/// Read failures are logged and reported as `None`.
pub fn load_rules(root: Option<&Path>) -> Option<String> {
    read_rules(&DiskFs::new(), root).fail_open_with("load_rules", None)
}
