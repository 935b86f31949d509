//! User Entity
//!
//! A crew member profile: identity, team membership, roles, per-feature
//! edit rights and subscription tier.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Subscription tier, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Basic,
    Premium,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Basic => "basic",
            SubscriptionTier::Premium => "premium",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => SubscriptionTier::Basic,
            "premium" => SubscriptionTier::Premium,
            _ => SubscriptionTier::Free,
        }
    }

    pub fn is_paid(&self) -> bool {
        *self != SubscriptionTier::Free
    }
}

/// Features with their own edit permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Chat,
    Gear,
    Patch,
    Training,
    Checklists,
    Ideas,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::Chat,
        Feature::Gear,
        Feature::Patch,
        Feature::Training,
        Feature::Checklists,
        Feature::Ideas,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Feature::Chat => "chat",
            Feature::Gear => "gear",
            Feature::Patch => "patch sheets",
            Feature::Training => "training",
            Feature::Checklists => "checklists",
            Feature::Ideas => "ideas",
        }
    }
}

/// Per-feature edit flags, stored flat on the user document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureAccess {
    #[serde(default)]
    pub can_edit_chat: bool,
    #[serde(default)]
    pub can_edit_gear: bool,
    #[serde(default)]
    pub can_edit_patch: bool,
    #[serde(default)]
    pub can_edit_training: bool,
    #[serde(default)]
    pub can_edit_checklists: bool,
    #[serde(default)]
    pub can_edit_ideas: bool,
}

impl FeatureAccess {
    pub fn all() -> Self {
        let mut access = Self::default();
        for feature in Feature::ALL {
            access.set(feature, true);
        }
        access
    }

    pub fn allows(&self, feature: Feature) -> bool {
        match feature {
            Feature::Chat => self.can_edit_chat,
            Feature::Gear => self.can_edit_gear,
            Feature::Patch => self.can_edit_patch,
            Feature::Training => self.can_edit_training,
            Feature::Checklists => self.can_edit_checklists,
            Feature::Ideas => self.can_edit_ideas,
        }
    }

    pub fn set(&mut self, feature: Feature, allowed: bool) {
        let flag = match feature {
            Feature::Chat => &mut self.can_edit_chat,
            Feature::Gear => &mut self.can_edit_gear,
            Feature::Patch => &mut self.can_edit_patch,
            Feature::Training => &mut self.can_edit_training,
            Feature::Checklists => &mut self.can_edit_checklists,
            Feature::Ideas => &mut self.can_edit_ideas,
        };
        *flag = allowed;
    }
}

/// A signed-up crew member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Auth uid, also the document id
    pub id: String,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub team_code: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(flatten)]
    pub access: FeatureAccess,
    #[serde(default)]
    pub subscription_tier: SubscriptionTier,
    #[serde(default)]
    pub assigned_campus: Option<String>,
}

impl User {
    /// Profile created at sign-up: free tier, no roles, no edit rights
    pub fn new(id: String, display_name: String, email: String, team_code: Option<String>) -> Self {
        Self {
            id,
            display_name,
            email,
            team_code: team_code.filter(|c| !c.trim().is_empty()),
            is_admin: false,
            is_owner: false,
            access: FeatureAccess::default(),
            subscription_tier: SubscriptionTier::Free,
            assigned_campus: None,
        }
    }

    pub fn has_team(&self) -> bool {
        self.team_code.is_some()
    }

    /// Admins and owners may edit everything; others need the feature flag
    pub fn can_edit(&self, feature: Feature) -> bool {
        self.is_admin || self.is_owner || self.access.allows(feature)
    }

    pub fn can_manage_members(&self) -> bool {
        self.is_admin || self.is_owner
    }

    /// Elevates the profile after a verified purchase
    pub fn apply_tier(&mut self, tier: SubscriptionTier) {
        self.subscription_tier = tier;
        self.is_admin = true;
        self.access = FeatureAccess::all();
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn team_code(&self) -> Option<&str> {
        self.team_code.as_deref()
    }

    fn set_team_code(&mut self, code: String) {
        self.team_code = Some(code);
    }
}
