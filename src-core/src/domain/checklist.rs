//! Checklist Entity
//!
//! A checklist is completed exactly when it has items and every item is
//! done. The completion stamp is derived from that rule and is never set
//! directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::entity::{DomainError, DomainResult, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default)]
    pub done_at: Option<DateTime<Utc>>,
    /// Email of whoever ticked the item
    #[serde(default)]
    pub done_by: Option<String>,
}

impl ChecklistItem {
    pub fn new(id: String, text: String) -> Self {
        Self {
            id,
            text,
            is_done: false,
            done_at: None,
            done_by: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistTemplate {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_by: Option<String>,
    #[serde(default)]
    pub team_code: String,
}

impl ChecklistTemplate {
    pub fn new(title: String, items: Vec<ChecklistItem>) -> Self {
        Self {
            id: String::new(),
            title,
            items,
            due_date: None,
            completed_at: None,
            completed_by: None,
            team_code: String::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| item.is_done)
    }

    /// (done, total)
    pub fn progress(&self) -> (usize, usize) {
        let done = self.items.iter().filter(|item| item.is_done).count();
        (done, self.items.len())
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed() && self.due_date.is_some_and(|due| due < now)
    }

    /// Flips one item and re-derives the completion stamp.
    /// Returns the item's new done state.
    pub fn toggle_item(&mut self, item_id: &str, by: &str, at: DateTime<Utc>) -> DomainResult<bool> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| DomainError::NotFound(format!("Checklist item {}", item_id)))?;

        item.is_done = !item.is_done;
        if item.is_done {
            item.done_at = Some(at);
            item.done_by = Some(by.to_string());
        } else {
            item.done_at = None;
            item.done_by = None;
        }
        let done = item.is_done;

        self.refresh_completion(by, at);
        Ok(done)
    }

    /// Stamps completion when the rule holds, clears it otherwise.
    /// An existing stamp is kept while the checklist stays complete.
    pub fn refresh_completion(&mut self, by: &str, at: DateTime<Utc>) {
        if self.is_completed() {
            if self.completed_at.is_none() {
                self.completed_at = Some(at);
                self.completed_by = Some(by.to_string());
            }
        } else {
            self.completed_at = None;
            self.completed_by = None;
        }
    }

    /// Unticks every item so the template can be run again
    pub fn reset(&mut self) {
        for item in &mut self.items {
            item.is_done = false;
            item.done_at = None;
            item.done_by = None;
        }
        self.completed_at = None;
        self.completed_by = None;
    }
}

impl Entity for ChecklistTemplate {
    const COLLECTION: &'static str = "checklists";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn team_code(&self) -> Option<&str> {
        Some(&self.team_code)
    }

    fn set_team_code(&mut self, code: String) {
        self.team_code = code;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_items() -> ChecklistTemplate {
        ChecklistTemplate::new(
            "Sunday load-in".to_string(),
            vec![
                ChecklistItem::new("a".into(), "Power on amps".into()),
                ChecklistItem::new("b".into(), "Line check".into()),
            ],
        )
    }

    #[test]
    fn test_empty_checklist_is_never_complete() {
        let mut checklist = ChecklistTemplate::new("Empty".to_string(), vec![]);
        assert!(!checklist.is_completed());
        checklist.refresh_completion("a@x.io", Utc::now());
        assert!(checklist.completed_at.is_none());
    }

    #[test]
    fn test_completion_follows_items() {
        let mut checklist = two_items();
        let now = Utc::now();

        assert!(checklist.toggle_item("a", "a@x.io", now).unwrap());
        assert!(!checklist.is_completed());
        assert!(checklist.completed_at.is_none());

        checklist.toggle_item("b", "b@x.io", now).unwrap();
        assert!(checklist.is_completed());
        assert_eq!(checklist.completed_at, Some(now));
        assert_eq!(checklist.completed_by.as_deref(), Some("b@x.io"));
        assert_eq!(checklist.items[0].done_by.as_deref(), Some("a@x.io"));
    }

    #[test]
    fn test_untoggling_clears_completion() {
        let mut checklist = two_items();
        let now = Utc::now();
        checklist.toggle_item("a", "a@x.io", now).unwrap();
        checklist.toggle_item("b", "a@x.io", now).unwrap();
        assert!(checklist.completed_at.is_some());

        assert!(!checklist.toggle_item("a", "c@x.io", now).unwrap());
        assert!(checklist.completed_at.is_none());
        assert!(checklist.completed_by.is_none());
        assert!(checklist.items[0].done_at.is_none());
    }

    #[test]
    fn test_unknown_item_is_not_found() {
        let mut checklist = two_items();
        let err = checklist.toggle_item("zzz", "a@x.io", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn test_progress_overdue_and_reset() {
        let mut checklist = two_items();
        let now = Utc::now();
        checklist.due_date = Some(now - chrono::Duration::hours(1));
        checklist.toggle_item("a", "a@x.io", now).unwrap();
        assert_eq!(checklist.progress(), (1, 2));
        assert!(checklist.is_overdue(now));

        checklist.toggle_item("b", "a@x.io", now).unwrap();
        assert!(!checklist.is_overdue(now));

        checklist.reset();
        assert_eq!(checklist.progress(), (0, 2));
        assert!(checklist.completed_at.is_none());
    }
}
