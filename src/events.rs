//! Game notifications forwarded by the host adapter.

use crate::challenge::ObjectiveType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The player arrived in a dimension, e.g. `minecraft:the_nether`.
    DimensionChanged { dimension: String },
    /// An advancement changed state; `done` is false for partial progress.
    AdvancementGranted { id: String, done: bool },
    /// An item entered the inventory; `empty` for an empty stack.
    ItemPickedUp { item: String, empty: bool },
    EntityKilled { entity: String },
}

impl GameEvent {
    /// The `(type, value)` pair to match against objectives, or `None` when the event
    /// cannot complete anything.
    pub fn as_report(&self) -> Option<(ObjectiveType, &str)> {
        match self {
            GameEvent::DimensionChanged { dimension } => Some((ObjectiveType::Dimension, dimension)),
            GameEvent::AdvancementGranted { id, done: true } => Some((ObjectiveType::Advancement, id)),
            GameEvent::AdvancementGranted { done: false, .. } => None,
            GameEvent::ItemPickedUp { item, empty: false } => Some((ObjectiveType::Item, item)),
            GameEvent::ItemPickedUp { empty: true, .. } => None,
            GameEvent::EntityKilled { entity } => Some((ObjectiveType::Kill, entity)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_and_empty_events_report_nothing() {
        let partial = GameEvent::AdvancementGranted {
            id: "minecraft:story/mine_stone".into(),
            done: false,
        };
        assert_eq!(partial.as_report(), None);
        let empty = GameEvent::ItemPickedUp {
            item: "minecraft:air".into(),
            empty: true,
        };
        assert_eq!(empty.as_report(), None);
    }

    #[test]
    fn events_map_to_objective_types() {
        let e = GameEvent::DimensionChanged {
            dimension: "minecraft:the_end".into(),
        };
        assert_eq!(e.as_report(), Some((ObjectiveType::Dimension, "minecraft:the_end")));
        let e = GameEvent::EntityKilled {
            entity: "minecraft:zombie".into(),
        };
        assert_eq!(e.as_report(), Some((ObjectiveType::Kill, "minecraft:zombie")));
    }
}
