//! Patch Sheet Commands

use crate::domain::{Feature, PatchCategory, PatchRow};
use crate::repository::{Repository, TeamRepository};
use crate::session::Session;

pub async fn save_patch_row(session: &Session, row: PatchRow) -> Result<PatchRow, String> {
    let (_, repo) = session.editor::<PatchRow>(Feature::Patch)?;
    repo.save(row).await.map_err(|e| e.to_string())
}

pub async fn delete_patch_rows(session: &Session, ids: &[String]) -> Result<usize, String> {
    let (_, repo) = session.editor::<PatchRow>(Feature::Patch)?;
    for id in ids {
        repo.delete(id).await.map_err(|e| e.to_string())?;
    }
    Ok(ids.len())
}

/// Replace every row of one category, leaving the other categories alone
pub async fn replace_all_patch_rows(
    session: &Session,
    category: PatchCategory,
    rows: Vec<PatchRow>,
) -> Result<Vec<PatchRow>, String> {
    let (_, repo) = session.editor::<PatchRow>(Feature::Patch)?;
    let rows = rows
        .into_iter()
        .map(|mut row| {
            row.id.clear();
            row.category = category;
            row
        })
        .collect();
    let saved = repo
        .replace_where(|row| row.category == category, rows)
        .await
        .map_err(|e| e.to_string())?;
    log::info!("Replaced {} patch sheet with {} rows", category.as_str(), saved.len());
    Ok(saved)
}
