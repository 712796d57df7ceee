//! This module defines the `Material` and `MaterialRegistry` types: the
//! catalog of everything a player can build with, which materials are
//! indestructible, and which tiers are still locked.
//!
//! Example:
//! ```rust
//! use voxel_builder::block::{blocks, MaterialRegistry};
//!
//! let mut registry = MaterialRegistry::builtin();
//! assert!(registry.is_locked(blocks::GOLD));
//! registry.unlock_tier(2);
//! assert!(!registry.is_locked(blocks::GOLD));
//! assert!(registry.is_protected(blocks::BEDROCK));
//! ```
use super::{BlockId, blocks};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tier assigned to materials that must never be placed by a player.
pub const UNOBTAINABLE_TIER: u8 = u8::MAX;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub id: BlockId,
    #[serde(default)]
    pub tier: u8, // Unlock tier; 0 is available from the start.
    #[serde(default = "Material::default_breakable")]
    pub breakable: bool, // `false` marks a protected material (bedrock, boundaries).
    #[serde(default = "Material::default_color")]
    pub color_tint: (f32, f32, f32), // Flat colour used by the viewer.
}

impl Material {
    fn default_breakable() -> bool { true }
    fn default_color() -> (f32, f32, f32) { (0.8, 0.8, 0.8) }

    fn new(name: &str, id: BlockId, tier: u8, color_tint: (f32, f32, f32)) -> Self {
        Self { name: name.to_string(), id, tier, breakable: true, color_tint }
    }
}

#[derive(Resource, Debug, Default, Clone)]
pub struct MaterialRegistry {
    pub materials: HashMap<String, Material>,
    pub names_by_id: HashMap<BlockId, String>,
    unlocked_tier: u8,
}

impl MaterialRegistry {
    /// Catalog used when no material files are present.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for material in [
            Material::new("grass", blocks::GRASS, 0, (0.36, 0.62, 0.28)),
            Material::new("dirt", blocks::DIRT, 0, (0.47, 0.33, 0.21)),
            Material::new("stone", blocks::STONE, 0, (0.52, 0.52, 0.54)),
            Material {
                breakable: false,
                ..Material::new("bedrock", blocks::BEDROCK, UNOBTAINABLE_TIER, (0.18, 0.18, 0.2))
            },
            Material::new("planks", blocks::PLANKS, 0, (0.71, 0.55, 0.33)),
            Material::new("brick", blocks::BRICK, 1, (0.62, 0.26, 0.2)),
            Material::new("glass", blocks::GLASS, 1, (0.75, 0.88, 0.95)),
            Material::new("gold", blocks::GOLD, 2, (0.95, 0.78, 0.2)),
            Material::new("marble", blocks::MARBLE, 2, (0.93, 0.92, 0.9)),
            Material::new("crystal", blocks::CRYSTAL, 3, (0.6, 0.4, 0.95)),
        ] {
            registry.register(material);
        }
        registry
    }

    /// Insert or replace a material. A material re-registered under a new
    /// name drops its old name mapping.
    pub fn register(&mut self, material: Material) {
        if let Some(old) = self.names_by_id.insert(material.id, material.name.clone())
            && old != material.name
        {
            self.materials.remove(&old);
        }
        self.materials.insert(material.name.clone(), material);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    #[must_use]
    pub fn get_by_id(&self, id: BlockId) -> Option<&Material> {
        self.names_by_id.get(&id).and_then(|name| self.materials.get(name))
    }

    #[must_use]
    pub fn contains(&self, id: BlockId) -> bool {
        self.names_by_id.contains_key(&id)
    }

    /// Lookup numeric ID for a material `name`.
    #[must_use]
    pub fn id_for_name(&self, name: &str) -> Option<BlockId> {
        self.materials.get(name).map(|m| m.id)
    }

    /// Unknown ids count as locked so they can never be placed.
    #[must_use]
    pub fn is_locked(&self, id: BlockId) -> bool {
        self.get_by_id(id).is_none_or(|m| m.tier > self.unlocked_tier)
    }

    #[must_use]
    pub fn is_protected(&self, id: BlockId) -> bool {
        self.get_by_id(id).is_some_and(|m| !m.breakable)
    }

    #[must_use]
    pub fn unlocked_tier(&self) -> u8 {
        self.unlocked_tier
    }

    /// Raise (or lower) the highest unlocked tier. The unobtainable tier is
    /// never reachable.
    pub fn unlock_tier(&mut self, tier: u8) {
        self.unlocked_tier = tier.min(UNOBTAINABLE_TIER - 1);
    }

    /// Placeable materials ordered by id, for hotbars and cycling.
    #[must_use]
    pub fn unlocked(&self) -> Vec<&Material> {
        let mut out: Vec<&Material> = self
            .materials
            .values()
            .filter(|m| m.tier <= self.unlocked_tier)
            .collect();
        out.sort_by_key(|m| m.id);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tiers_and_protection() {
        let registry = MaterialRegistry::builtin();
        assert!(!registry.is_locked(blocks::PLANKS));
        assert!(registry.is_locked(blocks::BRICK));
        assert!(registry.is_locked(blocks::BEDROCK));
        assert!(registry.is_protected(blocks::BEDROCK));
        assert!(!registry.is_protected(blocks::STONE));
        assert_eq!(registry.id_for_name("glass"), Some(blocks::GLASS));
    }

    #[test]
    fn unknown_material_is_locked() {
        let registry = MaterialRegistry::builtin();
        assert!(registry.is_locked(200));
        assert!(!registry.is_protected(200));
    }

    #[test]
    fn bedrock_stays_locked_at_any_tier() {
        let mut registry = MaterialRegistry::builtin();
        registry.unlock_tier(u8::MAX);
        assert!(!registry.is_locked(blocks::CRYSTAL));
        assert!(registry.is_locked(blocks::BEDROCK));
    }

    #[test]
    fn renaming_an_id_drops_the_old_name() {
        let mut registry = MaterialRegistry::builtin();
        registry.register(Material::new("oak", blocks::PLANKS, 0, (0.7, 0.5, 0.3)));
        assert!(registry.get("planks").is_none());
        assert_eq!(registry.get_by_id(blocks::PLANKS).map(|m| m.name.as_str()), Some("oak"));
    }

    #[test]
    fn unlocked_list_is_sorted() {
        let mut registry = MaterialRegistry::builtin();
        registry.unlock_tier(1);
        let ids: Vec<BlockId> = registry.unlocked().iter().map(|m| m.id).collect();
        assert_eq!(
            ids,
            vec![blocks::GRASS, blocks::DIRT, blocks::STONE, blocks::PLANKS, blocks::BRICK, blocks::GLASS]
        );
    }
}
