//! # Weekly challenge descriptor
//!
//! The descriptor lives in `weekly_world_objectives.json` and is read fresh on every
//! use so operators can swap the week's challenge without restarting the server:
//!
//! ```json
//! {
//!   "week": 7,
//!   "tasks": [
//!     { "type": "dimension", "content": "minecraft:the_nether" },
//!     { "type": "item", "content": "minecraft:diamond" }
//!   ],
//!   "restrictions": [ { "type": "hardcore", "content": "true" } ]
//! }
//! ```
//!
//! A missing `restrictions` array means "hardcore only". A missing or unreadable
//! file behaves like a descriptor with no tasks, so nothing can match.

pub mod restrictions;

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::logutil::escape_log;

/// Week reported when the descriptor has no usable `week`.
pub const DEFAULT_WEEK: u32 = 1;

/// Canonical persisted key for an objective or restriction: `type|content`.
pub fn completion_key(kind: &str, content: &str) -> String {
    format!("{}|{}", kind, content)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveType {
    Dimension,
    Advancement,
    Item,
    Kill,
}

impl ObjectiveType {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "dimension" => Some(ObjectiveType::Dimension),
            "advancement" => Some(ObjectiveType::Advancement),
            "item" => Some(ObjectiveType::Item),
            "kill" => Some(ObjectiveType::Kill),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveType::Dimension => "dimension",
            ObjectiveType::Advancement => "advancement",
            ObjectiveType::Item => "item",
            ObjectiveType::Kill => "kill",
        }
    }
}

/// Something a player has to do this week.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Objective {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

impl Objective {
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
        }
    }

    pub fn key(&self) -> String {
        completion_key(&self.kind, &self.content)
    }

    pub fn matches(&self, kind: &str, value: &str) -> bool {
        self.kind == kind && self.content == value
    }

    /// Human-readable label shown in chat.
    pub fn label(&self) -> String {
        match ObjectiveType::parse(&self.kind) {
            Some(ObjectiveType::Dimension) => match self.content.as_str() {
                "minecraft:the_nether" => "Enter the Nether".to_string(),
                "minecraft:the_end" => "Enter the End".to_string(),
                other => format!("Enter dimension {}", other),
            },
            Some(ObjectiveType::Advancement) => format!("Complete advancement: {}", self.content),
            Some(ObjectiveType::Item) => format!("Obtain item: {}", self.content),
            Some(ObjectiveType::Kill) => format!("Kill entity: {}", self.content),
            None => {
                warn!("Unknown objective type: {}", escape_log(&self.kind));
                format!("{} ({})", self.kind, self.content)
            }
        }
    }
}

/// A condition on the live player or world that must hold for objectives to count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Restriction {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    /// Set for descriptor entries that could not be parsed. Never satisfied.
    #[serde(skip)]
    pub malformed: bool,
}

impl Restriction {
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
            malformed: false,
        }
    }

    /// Stand-in for an entry that did not parse. Keeps the declared type when there
    /// is one and the raw JSON as content.
    pub fn malformed(raw: &Value) -> Self {
        let kind = raw
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("invalid")
            .to_string();
        Self {
            kind,
            content: raw.to_string(),
            malformed: true,
        }
    }

    /// The restriction applied when the descriptor names none.
    pub fn default_hardcore() -> Self {
        Self::new("hardcore", "true")
    }

    pub fn key(&self) -> String {
        completion_key(&self.kind, &self.content)
    }

    pub fn label(&self) -> String {
        if self.malformed {
            return format!("Invalid restriction: {}", self.content);
        }
        match self.kind.as_str() {
            "hardcore" => "Hardcore mode enabled".to_string(),
            "gamemode" => format!("Game mode: {}", self.content),
            "difficulty" => format!("Difficulty: {}", self.content),
            other => {
                warn!("Unknown restriction type: {}", escape_log(other));
                format!("{} ({})", self.kind, self.content)
            }
        }
    }
}

/// One read of the descriptor file. Not cached between reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChallengeDescriptor {
    raw: Map<String, Value>,
}

impl ChallengeDescriptor {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a descriptor. The top level must be a JSON object.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        let raw: Map<String, Value> = serde_json::from_str(s.trim_start_matches('\0'))?;
        Ok(Self { raw })
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The reporting week, falling back to [`DEFAULT_WEEK`] when absent, non-numeric
    /// or not positive.
    pub fn week(&self) -> u32 {
        let Some(value) = self.raw.get("week") else {
            return DEFAULT_WEEK;
        };
        let week = value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f.trunc() as i64));
        match week {
            Some(w) if w > 0 && w <= u32::MAX as i64 => w as u32,
            _ => {
                warn!("Ignoring invalid week value {}; using week {}", value, DEFAULT_WEEK);
                DEFAULT_WEEK
            }
        }
    }

    /// Objectives in declared order. Malformed entries are skipped.
    pub fn tasks(&self) -> Vec<Objective> {
        match self.raw.get("tasks") {
            Some(Value::Array(items)) => parse_entries(items, "task"),
            _ => Vec::new(),
        }
    }

    /// Restrictions in declared order, or the hardcore default when the descriptor
    /// has no `restrictions` array. Malformed entries stay in the list as
    /// restrictions that can never be met.
    pub fn restrictions(&self) -> Vec<Restriction> {
        let Some(Value::Array(items)) = self.raw.get("restrictions") else {
            return vec![Restriction::default_hardcore()];
        };
        items
            .iter()
            .map(|item| match serde_json::from_value::<Restriction>(item.clone()) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Malformed restriction entry {} counts as unmet: {}", item, e);
                    Restriction::malformed(item)
                }
            })
            .collect()
    }
}

fn parse_entries<T: serde::de::DeserializeOwned>(items: &[Value], what: &str) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping malformed {} entry {}: {}", what, item, e);
                None
            }
        })
        .collect()
}

/// Reads `weekly_world_objectives.json` on demand.
#[derive(Debug, Clone)]
pub struct ChallengeLoader {
    path: PathBuf,
}

impl ChallengeLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file. I/O and parse errors are logged and produce an
    /// empty descriptor.
    pub fn load(&self) -> ChallengeDescriptor {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!("Could not find objectives file: {}", self.path.display());
                return ChallengeDescriptor::empty();
            }
            Err(e) => {
                error!("Failed to read challenge objectives {}: {}", self.path.display(), e);
                return ChallengeDescriptor::empty();
            }
        };
        match ChallengeDescriptor::from_json_str(&content) {
            Ok(d) => {
                debug!("Loaded challenge descriptor from {}", self.path.display());
                d
            }
            Err(e) => {
                error!("Failed to parse challenge objectives {}: {}", self.path.display(), e);
                ChallengeDescriptor::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_full_descriptor() {
        let d = ChallengeDescriptor::from_json_str(
            r#"{"week":3,"tasks":[{"type":"dimension","content":"minecraft:the_end"},
                {"type":"item","content":"minecraft:diamond"}],
                "restrictions":[{"type":"difficulty","content":"hard"}]}"#,
        )
        .unwrap();
        assert_eq!(d.week(), 3);
        let tasks = d.tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0], Objective::new("dimension", "minecraft:the_end"));
        assert_eq!(d.restrictions(), vec![Restriction::new("difficulty", "hard")]);
    }

    #[test]
    fn missing_restrictions_default_to_hardcore() {
        let d = ChallengeDescriptor::from_json_str(r#"{"week":1,"tasks":[]}"#).unwrap();
        assert_eq!(d.restrictions(), vec![Restriction::default_hardcore()]);
    }

    #[test]
    fn explicit_empty_restrictions_stay_empty() {
        let d = ChallengeDescriptor::from_json_str(r#"{"restrictions":[]}"#).unwrap();
        assert!(d.restrictions().is_empty());
    }

    #[test]
    fn week_fallbacks() {
        let d = ChallengeDescriptor::from_json_str(r#"{"week":"seven"}"#).unwrap();
        assert_eq!(d.week(), DEFAULT_WEEK);
        let d = ChallengeDescriptor::from_json_str(r#"{"week":4.0}"#).unwrap();
        assert_eq!(d.week(), 4);
        let d = ChallengeDescriptor::from_json_str(r#"{"week":0}"#).unwrap();
        assert_eq!(d.week(), DEFAULT_WEEK);
        assert_eq!(ChallengeDescriptor::empty().week(), DEFAULT_WEEK);
    }

    #[test]
    fn malformed_task_entries_are_skipped() {
        let d = ChallengeDescriptor::from_json_str(
            r#"{"tasks":[{"type":"kill"},{"type":"kill","content":"minecraft:zombie"},42]}"#,
        )
        .unwrap();
        assert_eq!(d.tasks(), vec![Objective::new("kill", "minecraft:zombie")]);
    }

    #[test]
    fn malformed_restriction_entries_are_kept_as_unmet() {
        let d = ChallengeDescriptor::from_json_str(
            r#"{"restrictions":[{"type":"hardcore","content":true},{"type":"difficulty","content":"hard"},7]}"#,
        )
        .unwrap();
        let restrictions = d.restrictions();
        assert_eq!(restrictions.len(), 3);
        assert!(restrictions[0].malformed);
        assert_eq!(restrictions[0].kind, "hardcore");
        assert_eq!(
            restrictions[0].label(),
            r#"Invalid restriction: {"content":true,"type":"hardcore"}"#
        );
        assert_eq!(restrictions[1], Restriction::new("difficulty", "hard"));
        assert!(restrictions[2].malformed);
        assert_eq!(restrictions[2].kind, "invalid");
    }

    #[test]
    fn labels_match_chat_wording() {
        assert_eq!(Objective::new("dimension", "minecraft:the_nether").label(), "Enter the Nether");
        assert_eq!(Objective::new("dimension", "minecraft:the_end").label(), "Enter the End");
        assert_eq!(
            Objective::new("dimension", "mymod:moon").label(),
            "Enter dimension mymod:moon"
        );
        assert_eq!(
            Objective::new("advancement", "minecraft:story/mine_diamond").label(),
            "Complete advancement: minecraft:story/mine_diamond"
        );
        assert_eq!(Objective::new("item", "minecraft:elytra").label(), "Obtain item: minecraft:elytra");
        assert_eq!(Objective::new("kill", "minecraft:warden").label(), "Kill entity: minecraft:warden");
        assert_eq!(Objective::new("dance", "x").label(), "dance (x)");
        assert_eq!(Restriction::default_hardcore().label(), "Hardcore mode enabled");
        assert_eq!(Restriction::new("gamemode", "survival").label(), "Game mode: survival");
        assert_eq!(Restriction::new("difficulty", "hard").label(), "Difficulty: hard");
    }

    #[test]
    fn keys_join_type_and_content() {
        assert_eq!(
            Objective::new("item", "minecraft:diamond").key(),
            "item|minecraft:diamond"
        );
        assert_eq!(Restriction::default_hardcore().key(), "hardcore|true");
    }

    #[test]
    fn loader_reads_fresh_each_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weekly_world_objectives.json");
        let loader = ChallengeLoader::new(&path);
        assert!(loader.load().is_empty());

        std::fs::write(&path, r#"{"week":1,"tasks":[{"type":"kill","content":"a"}]}"#).unwrap();
        assert_eq!(loader.load().tasks().len(), 1);

        std::fs::write(&path, r#"{"week":2,"tasks":[]}"#).unwrap();
        let d = loader.load();
        assert_eq!(d.week(), 2);
        assert!(d.tasks().is_empty());

        std::fs::write(&path, "garbage").unwrap();
        assert!(loader.load().tasks().is_empty());
    }
}
