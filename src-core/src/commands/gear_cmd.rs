//! Gear Commands

use std::path::Path;

use crate::domain::{Feature, GearItem};
use crate::repository::{new_document_id, Repository, TeamRepository};
use crate::session::Session;

pub async fn save_gear(session: &Session, item: GearItem) -> Result<GearItem, String> {
    let (_, repo) = session.editor::<GearItem>(Feature::Gear)?;
    if item.name.trim().is_empty() {
        return Err("Gear name cannot be empty.".to_string());
    }
    repo.save(item).await.map_err(|e| e.to_string())
}

/// Delete several items; returns how many were deleted
pub async fn delete_gear_items(session: &Session, ids: &[String]) -> Result<usize, String> {
    let (_, repo) = session.editor::<GearItem>(Feature::Gear)?;
    for id in ids {
        repo.delete(id).await.map_err(|e| e.to_string())?;
    }
    Ok(ids.len())
}

/// Swap the team's whole inventory for `items`. Not atomic.
pub async fn replace_all_gear(session: &Session, items: Vec<GearItem>) -> Result<Vec<GearItem>, String> {
    let (_, repo) = session.editor::<GearItem>(Feature::Gear)?;
    let items = items
        .into_iter()
        .map(|mut item| {
            item.id.clear();
            item
        })
        .collect();
    let saved = repo.replace_all(items).await.map_err(|e| e.to_string())?;
    log::info!("Replaced gear inventory with {} items", saved.len());
    Ok(saved)
}

/// Upload a photo and store its URL on the item, saving the item first
/// when it is new
pub async fn upload_gear_image(
    session: &Session,
    item: GearItem,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<GearItem, String> {
    let (_, repo) = session.editor::<GearItem>(Feature::Gear)?;
    let mut item = if item.id.is_empty() {
        repo.save(item).await.map_err(|e| e.to_string())?
    } else {
        item
    };

    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "jpg".to_string());
    let content_type = mime_guess::from_ext(&ext).first_or_octet_stream();
    let path = format!("gear/{}/{}.{}", item.id, new_document_id(), ext);

    let url = session
        .services()
        .blobs
        .upload(&path, bytes, content_type.as_ref())
        .await
        .map_err(|e| e.to_string())?;
    item.image_url = Some(url);
    repo.save(item).await.map_err(|e| e.to_string())
}
