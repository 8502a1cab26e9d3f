use ashfield_common::RenderHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::layout::{AnchorKind, WorldLayout};

/// Typed logical entity a render handle stands for. `anchor` indexes
/// [`WorldLayout::anchors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogicalEntity {
    Clue { anchor: usize },
    Sign { anchor: usize },
    Terminal { anchor: usize },
    Door { anchor: usize },
    Beacon { anchor: usize },
}

impl LogicalEntity {
    pub fn from_anchor(anchor: usize, kind: AnchorKind) -> Self {
        match kind {
            AnchorKind::Clue => Self::Clue { anchor },
            AnchorKind::Sign => Self::Sign { anchor },
            AnchorKind::Terminal => Self::Terminal { anchor },
            AnchorKind::Door => Self::Door { anchor },
            AnchorKind::Beacon => Self::Beacon { anchor },
        }
    }

    pub fn anchor(&self) -> usize {
        match *self {
            Self::Clue { anchor }
            | Self::Sign { anchor }
            | Self::Terminal { anchor }
            | Self::Door { anchor }
            | Self::Beacon { anchor } => anchor,
        }
    }

    pub fn kind(&self) -> AnchorKind {
        match self {
            Self::Clue { .. } => AnchorKind::Clue,
            Self::Sign { .. } => AnchorKind::Sign,
            Self::Terminal { .. } => AnchorKind::Terminal,
            Self::Door { .. } => AnchorKind::Door,
            Self::Beacon { .. } => AnchorKind::Beacon,
        }
    }
}

/// Bidirectional table between render handles and logical entities.
///
/// The render collaborator never carries game data on its nodes; it reports
/// the handle it hit and the simulation looks the entity up here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityRegistry {
    by_handle: BTreeMap<RenderHandle, LogicalEntity>,
    by_entity: BTreeMap<LogicalEntity, RenderHandle>,
}

impl EntityRegistry {
    /// Register every anchor of `layout`, handles starting at 1 in anchor order.
    pub fn from_layout(layout: &WorldLayout) -> Self {
        let mut registry = Self::default();
        for (i, anchor) in layout.anchors().iter().enumerate() {
            registry.insert(
                RenderHandle(i as u64 + 1),
                LogicalEntity::from_anchor(i, anchor.kind),
            );
        }
        registry
    }

    fn insert(&mut self, handle: RenderHandle, entity: LogicalEntity) {
        self.by_handle.insert(handle, entity);
        self.by_entity.insert(entity, handle);
    }

    pub fn entity(&self, handle: RenderHandle) -> Option<LogicalEntity> {
        self.by_handle.get(&handle).copied()
    }

    pub fn handle(&self, entity: LogicalEntity) -> Option<RenderHandle> {
        self.by_entity.get(&entity).copied()
    }

    /// Handle of the anchor at `index`, whatever its kind.
    pub fn handle_for_anchor(&self, index: usize) -> Option<RenderHandle> {
        self.by_handle
            .iter()
            .find(|(_, e)| e.anchor() == index)
            .map(|(h, _)| *h)
    }

    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RenderHandle, LogicalEntity)> + '_ {
        self.by_handle.iter().map(|(h, e)| (*h, *e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_anchor_round_trips() {
        let layout = WorldLayout::generate(11, "text");
        let registry = EntityRegistry::from_layout(&layout);
        assert_eq!(registry.len(), layout.anchors().len());
        for (handle, entity) in registry.iter() {
            assert_eq!(registry.handle(entity), Some(handle));
            assert_eq!(layout.anchors()[entity.anchor()].kind, entity.kind());
        }
    }

    #[test]
    fn handles_are_stable_across_builds() {
        let a = EntityRegistry::from_layout(&WorldLayout::generate(5, "x"));
        let b = EntityRegistry::from_layout(&WorldLayout::generate(5, "x"));
        let ha: Vec<_> = a.iter().collect();
        let hb: Vec<_> = b.iter().collect();
        assert_eq!(ha, hb);
    }

    #[test]
    fn unknown_handle_is_none() {
        let registry = EntityRegistry::from_layout(&WorldLayout::generate(5, "x"));
        assert!(registry.entity(RenderHandle(0)).is_none());
        assert!(registry.entity(RenderHandle(999)).is_none());
    }

    #[test]
    fn handle_for_anchor_matches_order() {
        let registry = EntityRegistry::from_layout(&WorldLayout::generate(5, "x"));
        assert_eq!(registry.handle_for_anchor(0), Some(RenderHandle(1)));
        assert_eq!(
            registry.entity(RenderHandle(1)),
            Some(LogicalEntity::Sign { anchor: 0 })
        );
    }
}
