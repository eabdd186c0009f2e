// Static registry of resource, tool, and world-object definitions.
//
// `ResourceCatalog` is a read-only lookup table built once from
// `GameConfig` at session start. It answers three questions:
// - what a resource kind looks like and how high it stacks (`lookup`),
// - what a tool kind's stats are (`tool`, `new_tool`),
// - what a named world-object template contains (`template`).
//
// `lookup` is total. A kind the table does not list (a `Custom` drop, or a
// built-in kind stripped from a modded config) gets a generic definition
// built on the spot, so inventory code never threads optional fields
// around.
//
// See also: `config.rs` where the tables are declared and validated,
// `world_gen.rs` which instantiates templates, `inventory.rs` which reads
// `max_stack` when opening a new slot.

use crate::config::GameConfig;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Icon used for resources the catalog does not list.
pub const FALLBACK_ICON: &str = "📦";

/// Stack limit used for resources the catalog does not list.
pub const FALLBACK_MAX_STACK: u32 = 50;

/// Display and stacking data for one resource kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub max_stack: u32,
    pub rarity: Rarity,
}

impl ResourceDefinition {
    /// Generic definition for a kind with no table entry.
    pub fn fallback(resource_type: &ResourceType) -> Self {
        Self {
            name: resource_type.name().to_string(),
            description: String::new(),
            icon: FALLBACK_ICON.to_string(),
            max_stack: FALLBACK_MAX_STACK,
            rarity: Rarity::Common,
        }
    }
}

/// Stats for one tool kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub max_durability: u32,
    pub efficiency: f64,
}

/// Blueprint for a kind of world object. Copied field-for-field into each
/// placed instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldObjectTemplate {
    #[serde(rename = "type")]
    pub object_type: WorldObjectType,
    pub name: String,
    pub size: Size,
    pub health: u32,
    pub max_health: u32,
    pub icon: String,
    pub harvestable: bool,
    pub resources: Vec<ResourceDrop>,
    #[serde(default, rename = "respawnTime")]
    pub respawn_time_ms: Option<u64>,
}

impl WorldObjectTemplate {
    /// Place a fresh, full-health copy of this template.
    pub fn instantiate(&self, id: String, position: Position) -> WorldObject {
        WorldObject {
            id,
            object_type: self.object_type,
            name: self.name.clone(),
            position,
            size: self.size,
            health: self.health,
            max_health: self.max_health,
            resources: self.resources.clone(),
            harvestable: self.harvestable,
            respawn_time_ms: self.respawn_time_ms,
            last_harvested: None,
            icon: self.icon.clone(),
        }
    }
}

/// Read-only definition tables for one session.
#[derive(Clone, Debug)]
pub struct ResourceCatalog {
    resources: BTreeMap<ResourceType, ResourceDefinition>,
    tools: BTreeMap<ToolType, ToolDefinition>,
    templates: BTreeMap<String, WorldObjectTemplate>,
}

impl ResourceCatalog {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            resources: config.resources.clone(),
            tools: config.tools.clone(),
            templates: config.templates.clone(),
        }
    }

    /// Definition for `resource_type`, or a generic one if it is not listed.
    pub fn lookup(&self, resource_type: &ResourceType) -> Cow<'_, ResourceDefinition> {
        match self.resources.get(resource_type) {
            Some(def) => Cow::Borrowed(def),
            None => Cow::Owned(ResourceDefinition::fallback(resource_type)),
        }
    }

    pub fn tool(&self, tool_type: ToolType) -> Option<&ToolDefinition> {
        self.tools.get(&tool_type)
    }

    /// A fresh, full-durability tool of the given kind.
    pub fn new_tool(&self, tool_type: ToolType) -> Option<Tool> {
        self.tool(tool_type).map(|def| Tool {
            tool_type,
            durability: def.max_durability,
            max_durability: def.max_durability,
            efficiency: def.efficiency,
        })
    }

    pub fn template(&self, key: &str) -> Option<&WorldObjectTemplate> {
        self.templates.get(key)
    }

    /// A new single-slot stack holding `quantity` of `resource_type`.
    pub fn new_stack(&self, resource_type: &ResourceType, quantity: u32) -> ResourceStack {
        ResourceStack {
            resource_type: resource_type.clone(),
            quantity,
            max_stack: self.lookup(resource_type).max_stack,
        }
    }
}
