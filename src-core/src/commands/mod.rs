//! Commands Layer
//!
//! Write operations invoked by the views. Each one performs its write
//! against the backend and returns; the change comes back through the
//! mirrors. Failures are readable strings.

mod channel_cmd;
mod gear_cmd;
mod patch_cmd;
mod lesson_cmd;
mod checklist_cmd;
mod idea_cmd;
mod location_cmd;
mod account_cmd;
mod import_cmd;

pub use channel_cmd::*;
pub use gear_cmd::*;
pub use patch_cmd::*;
pub use lesson_cmd::*;
pub use checklist_cmd::*;
pub use idea_cmd::*;
pub use location_cmd::*;
pub use account_cmd::*;
pub use import_cmd::*;

use std::path::Path;

/// Final path component of an uploaded file name, safe to embed in a
/// blob path
pub(crate) fn clean_file_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "file".to_string())
}

#[cfg(test)]
mod tests {
    use super::clean_file_name;

    #[test]
    fn test_clean_file_name() {
        assert_eq!(clean_file_name("../../etc/passwd"), "passwd");
        assert_eq!(clean_file_name("stage plot.pdf"), "stage plot.pdf");
        assert_eq!(clean_file_name(""), "file");
    }
}
