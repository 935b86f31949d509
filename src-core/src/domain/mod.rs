//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! Everything here is a plain record mirrored one-to-one from a backend
//! document; no I/O happens in this layer.

mod entity;
mod user;
mod team;
mod channel;
mod gear;
mod patch;
mod lesson;
mod checklist;
mod idea;
mod location;

pub use entity::{Entity, DomainError, DomainResult};
pub use user::{User, Feature, FeatureAccess, SubscriptionTier};
pub use team::Team;
pub use channel::{Channel, ChannelKind, Message, Attachment, AttachmentKind, next_group_position};
pub use gear::{GearItem, GearStatus};
pub use patch::{PatchRow, PatchCategory};
pub use lesson::TrainingLesson;
pub use checklist::{ChecklistTemplate, ChecklistItem};
pub use idea::IdeaCard;
pub use location::Location;
