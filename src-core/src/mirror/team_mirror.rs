//! Team Data Mirror
//!
//! One collection mirror per team collection, started and stopped
//! together for the signed-in user's team.

use std::sync::Arc;

use crate::backend::DocumentStore;
use crate::domain::{
    Channel, ChecklistTemplate, GearItem, IdeaCard, Location, PatchRow, TrainingLesson, User,
};
use super::collection::CollectionMirror;

/// Point-in-time copy of every mirrored team collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamSnapshot {
    pub channels: Vec<Channel>,
    pub gear: Vec<GearItem>,
    pub patch_rows: Vec<PatchRow>,
    pub lessons: Vec<TrainingLesson>,
    pub checklists: Vec<ChecklistTemplate>,
    pub ideas: Vec<IdeaCard>,
    pub locations: Vec<Location>,
}

pub struct TeamMirror {
    team_code: String,
    pub channels: CollectionMirror<Channel>,
    pub gear: CollectionMirror<GearItem>,
    pub patch_rows: CollectionMirror<PatchRow>,
    pub lessons: CollectionMirror<TrainingLesson>,
    pub checklists: CollectionMirror<ChecklistTemplate>,
    pub ideas: CollectionMirror<IdeaCard>,
    pub locations: CollectionMirror<Location>,
}

impl TeamMirror {
    pub fn start(store: Arc<dyn DocumentStore>, team_code: &str) -> Self {
        log::info!("Starting team mirror for {}", team_code);
        Self {
            team_code: team_code.to_string(),
            channels: CollectionMirror::start(store.clone(), team_code),
            gear: CollectionMirror::start(store.clone(), team_code),
            patch_rows: CollectionMirror::start(store.clone(), team_code),
            lessons: CollectionMirror::start(store.clone(), team_code),
            checklists: CollectionMirror::start(store.clone(), team_code),
            ideas: CollectionMirror::start(store.clone(), team_code),
            locations: CollectionMirror::start(store, team_code),
        }
    }

    pub fn team_code(&self) -> &str {
        &self.team_code
    }

    pub fn snapshot(&self) -> TeamSnapshot {
        TeamSnapshot {
            channels: self.channels.current(),
            gear: self.gear.current(),
            patch_rows: self.patch_rows.current(),
            lessons: self.lessons.current(),
            checklists: self.checklists.current(),
            ideas: self.ideas.current(),
            locations: self.locations.current(),
        }
    }
}

impl Drop for TeamMirror {
    fn drop(&mut self) {
        log::info!("Stopping team mirror for {}", self.team_code);
    }
}

/// Roster of users sharing the team code
pub struct MemberMirror {
    team_code: String,
    members: CollectionMirror<User>,
}

impl MemberMirror {
    pub fn start(store: Arc<dyn DocumentStore>, team_code: &str) -> Self {
        Self {
            team_code: team_code.to_string(),
            members: CollectionMirror::start(store, team_code),
        }
    }

    pub fn team_code(&self) -> &str {
        &self.team_code
    }

    pub fn members(&self) -> Vec<User> {
        self.members.current()
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.members
            .current()
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<Vec<User>> {
        self.members.subscribe()
    }
}
