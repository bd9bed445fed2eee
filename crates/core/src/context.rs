use crate::parsers::nbt::NbtType;
use serde::Serialize;

/// What is known about an entity reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityInfo {
    /// Possible entity type ids; `None` means any type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
}

impl EntityInfo {
    /// Entity of any type.
    pub fn any() -> Self {
        Self { ids: None }
    }

    /// Entity restricted to the given type ids.
    pub fn of<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            ids: Some(ids.into_iter().map(Into::into).collect()),
        }
    }
}

/// Snapshot of the execution context at one parse step.
///
/// Contexts are values: each step receives a clone and hands back a sparse
/// [`ContextChange`] that [`CommandContext::apply`] merges into the next
/// snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandContext {
    /// The entity executing the command (`execute as`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor: Option<EntityInfo>,
    /// The entity most recently named by an argument.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_entity: Option<EntityInfo>,
    /// Root type of the last structured-data value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbt_type: Option<NbtType>,
}

/// Sparse update to a [`CommandContext`]. Present fields replace, absent
/// fields inherit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextChange {
    /// New executor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor: Option<EntityInfo>,
    /// New other entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_entity: Option<EntityInfo>,
    /// New structured-data type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbt_type: Option<NbtType>,
}

impl CommandContext {
    /// The snapshot after applying `change`.
    pub fn apply(&self, change: &ContextChange) -> CommandContext {
        CommandContext {
            executor: change.executor.clone().or_else(|| self.executor.clone()),
            other_entity: change
                .other_entity
                .clone()
                .or_else(|| self.other_entity.clone()),
            nbt_type: change.nbt_type.or(self.nbt_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_is_a_sparse_merge() {
        let base = CommandContext {
            executor: Some(EntityInfo::of(["minecraft:player"])),
            other_entity: Some(EntityInfo::any()),
            nbt_type: None,
        };
        let change = ContextChange {
            other_entity: Some(EntityInfo::of(["minecraft:pig"])),
            nbt_type: Some(NbtType::Compound),
            ..Default::default()
        };
        let next = base.apply(&change);
        assert_eq!(next.executor, base.executor);
        assert_eq!(next.other_entity, Some(EntityInfo::of(["minecraft:pig"])));
        assert_eq!(next.nbt_type, Some(NbtType::Compound));
        assert_eq!(base.apply(&ContextChange::default()), base);
    }
}
