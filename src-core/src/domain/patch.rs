//! Patch Row Entity
//!
//! Signal routing records. Audio and Video rows route an input to an
//! output; Lighting rows carry a channel count and DMX universe instead.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PatchCategory {
    #[default]
    Audio,
    Video,
    Lighting,
}

impl PatchCategory {
    pub const ALL: [PatchCategory; 3] = [PatchCategory::Audio, PatchCategory::Video, PatchCategory::Lighting];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatchCategory::Audio => "Audio",
            PatchCategory::Video => "Video",
            PatchCategory::Lighting => "Lighting",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "audio" => Some(PatchCategory::Audio),
            "video" => Some(PatchCategory::Video),
            "lighting" | "lights" => Some(PatchCategory::Lighting),
            _ => None,
        }
    }

    /// Column headings for the two routing fields
    pub fn routing_labels(&self) -> (&'static str, &'static str) {
        match self {
            PatchCategory::Lighting => ("Channels", "Universe"),
            _ => ("Input", "Output"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRow {
    pub id: String,
    pub category: PatchCategory,
    pub name: String,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub notes: String,
    /// Lighting only
    #[serde(default)]
    pub channel_count: Option<u32>,
    /// Lighting only
    #[serde(default)]
    pub universe: Option<u32>,
    #[serde(default)]
    pub team_code: String,
}

impl PatchRow {
    pub fn new(category: PatchCategory, name: String) -> Self {
        Self {
            id: String::new(),
            category,
            name,
            input: String::new(),
            output: String::new(),
            source: String::new(),
            destination: String::new(),
            notes: String::new(),
            channel_count: None,
            universe: None,
            team_code: String::new(),
        }
    }

    /// The two routing cells as displayed for the row's category
    pub fn routing_values(&self) -> (String, String) {
        match self.category {
            PatchCategory::Lighting => (
                self.channel_count.map(|n| n.to_string()).unwrap_or_default(),
                self.universe.map(|u| u.to_string()).unwrap_or_default(),
            ),
            _ => (self.input.clone(), self.output.clone()),
        }
    }
}

impl Entity for PatchRow {
    const COLLECTION: &'static str = "patchRows";

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

    #[test]
    fn test_lighting_uses_channels_and_universe() {
        let mut row = PatchRow::new(PatchCategory::Lighting, "Wash 1".to_string());
        row.input = "ignored".to_string();
        row.channel_count = Some(16);
        row.universe = Some(2);
        assert_eq!(row.routing_values(), ("16".to_string(), "2".to_string()));
        assert_eq!(row.category.routing_labels(), ("Channels", "Universe"));
    }

    #[test]
    fn test_audio_uses_input_output() {
        let mut row = PatchRow::new(PatchCategory::Audio, "Kick".to_string());
        row.input = "1".to_string();
        row.output = "Stage box A1".to_string();
        assert_eq!(row.routing_values(), ("1".to_string(), "Stage box A1".to_string()));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(PatchCategory::from_str(" LIGHTING "), Some(PatchCategory::Lighting));
        assert_eq!(PatchCategory::from_str("rigging"), None);
        assert_eq!(serde_json::to_value(PatchCategory::Video).unwrap(), "Video");
    }
}
