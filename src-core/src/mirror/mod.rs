//! Mirror Layer
//!
//! Live in-memory copies of the backend collections for the current team.

mod diff;
mod collection;
mod team_mirror;

#[cfg(test)]
mod tests;

pub use diff::{diff_snapshots, SnapshotDiff};
pub use collection::CollectionMirror;
pub use team_mirror::{MemberMirror, TeamMirror, TeamSnapshot};
