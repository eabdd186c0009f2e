// Data-driven game configuration.
//
// Every balance number the simulation reads lives in `GameConfig`, loaded
// from JSON at startup (or taken from `Default`, which carries the shipped
// values). The sim never hard-codes a constant that appears here: harvest
// damage, experience per harvest, day length, inventory size, placement
// counts and bounds are all config.
//
// The config also carries the three definition tables that back
// `ResourceCatalog`: resources, tools, and world-object templates. Table
// entries use the same camelCase record format as saved world objects; the
// top-level knobs are snake_case.
//
// `validate()` collects every problem it can find instead of stopping at the
// first. Any error is a configuration error: fatal at startup, never
// recovered (see `store.rs`).
//
// See also: `catalog.rs` for the definition structs, `world_gen.rs` for how
// `PlacementRule`s are consumed, `clock.rs` for the time knobs.

use crate::catalog::{ResourceDefinition, ToolDefinition, WorldObjectTemplate};
use crate::inventory::StackPolicy;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// How many instances of a template to scatter, and where.
///
/// Bounds are inclusive grid coordinates. Objects are placed independently;
/// overlaps with each other or with the player spawn are allowed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementRule {
    /// Key into `GameConfig::templates`.
    pub template: String,
    pub count: u32,
    pub x_range: (i32, i32),
    pub y_range: (i32, i32),
}

impl PlacementRule {
    pub fn new(template: &str, count: u32, x_range: (i32, i32), y_range: (i32, i32)) -> Self {
        Self {
            template: template.to_string(),
            count,
            x_range,
            y_range,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level game config
// ---------------------------------------------------------------------------

/// Top-level game configuration. Loaded once, never mutated at runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Real milliseconds for one full in-game day.
    pub day_duration_ms: u64,

    /// Real milliseconds per clock tick. The clock only moves in whole ticks.
    pub clock_tick_ms: u64,

    /// Hour at which night begins.
    pub night_start: f64,

    /// Hour at which night ends.
    pub night_end: f64,

    /// Hour of day for a brand-new game.
    pub starting_time_of_day: f64,

    pub max_health: f32,
    pub max_hunger: f32,
    pub max_energy: f32,
    pub max_warmth: f32,

    /// Distinct resource kinds a player can hold.
    pub max_inventory_slots: u32,

    /// Where a brand-new player stands.
    pub spawn_position: Position,

    /// Inventory contents of a brand-new player.
    pub starting_resources: Vec<ResourceGain>,

    /// How long one harvest occupies the player.
    pub harvest_duration_ms: u64,

    /// Health removed from an object per accepted harvest.
    pub harvest_damage: u32,

    /// Experience granted per accepted harvest, regardless of yield.
    pub harvest_experience: u32,

    /// Yield multiplier for using a matching tool. Not applied yet.
    pub tool_efficiency_multiplier: f64,

    /// What happens when a merge pushes a stack past `max_stack`.
    pub stack_policy: StackPolicy,

    /// Grid dimensions (width, height) in cells.
    pub world_size: (u32, u32),

    /// Initial world population, one rule per object category.
    pub placements: Vec<PlacementRule>,

    pub resources: BTreeMap<ResourceType, ResourceDefinition>,
    pub tools: BTreeMap<ToolType, ToolDefinition>,
    pub templates: BTreeMap<String, WorldObjectTemplate>,
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check every invariant the sim relies on. Empty means valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.day_duration_ms == 0 {
            errors.push(ConfigError::ZeroDayDuration);
        }
        if self.clock_tick_ms == 0 {
            errors.push(ConfigError::ZeroClockTick);
        }
        let hours = 0.0..=24.0;
        if !(hours.contains(&self.night_end)
            && hours.contains(&self.night_start)
            && self.night_end < self.night_start)
        {
            errors.push(ConfigError::InvalidNightWindow {
                start: self.night_start,
                end: self.night_end,
            });
        }
        if self.world_size.0 == 0 || self.world_size.1 == 0 {
            errors.push(ConfigError::EmptyWorld);
        }
        if self.max_inventory_slots == 0 {
            errors.push(ConfigError::ZeroInventorySlots);
        }
        if !self.spawn_position.in_grid(self.world_size) {
            errors.push(ConfigError::SpawnOutOfBounds(self.spawn_position));
        }

        for (kind, def) in &self.resources {
            if def.max_stack == 0 {
                errors.push(ConfigError::ZeroMaxStack(kind.clone()));
            }
        }

        for (key, template) in &self.templates {
            if template.max_health == 0 || template.health > template.max_health {
                errors.push(ConfigError::InvalidTemplateHealth {
                    template: key.clone(),
                });
            }
            for drop in &template.resources {
                if drop.quantity.min > drop.quantity.max {
                    errors.push(ConfigError::InvalidQuantityRange {
                        template: key.clone(),
                        resource: drop.resource_type.clone(),
                    });
                }
                if !(0.0..=1.0).contains(&drop.chance) {
                    errors.push(ConfigError::InvalidChance {
                        template: key.clone(),
                        resource: drop.resource_type.clone(),
                        chance: drop.chance,
                    });
                }
            }
        }

        let (width, height) = self.world_size;
        let mut categories = BTreeSet::new();
        for rule in &self.placements {
            let Some(template) = self.templates.get(&rule.template) else {
                errors.push(ConfigError::UnknownTemplate(rule.template.clone()));
                continue;
            };
            if !categories.insert(template.object_type) {
                errors.push(ConfigError::DuplicateCategory(template.object_type));
            }
            let (x0, x1) = rule.x_range;
            let (y0, y1) = rule.y_range;
            let in_grid = Position::new(x0, y0).in_grid((width, height))
                && Position::new(x1, y1).in_grid((width, height));
            if x0 > x1 || y0 > y1 || !in_grid {
                errors.push(ConfigError::PlacementOutOfBounds {
                    template: rule.template.clone(),
                });
            }
        }

        errors
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            day_duration_ms: 20 * 60 * 1000,
            clock_tick_ms: 1000,
            night_start: 18.0,
            night_end: 6.0,
            starting_time_of_day: 8.0,
            max_health: 100.0,
            max_hunger: 100.0,
            max_energy: 100.0,
            max_warmth: 100.0,
            max_inventory_slots: 20,
            spawn_position: Position::new(10, 7),
            starting_resources: vec![
                ResourceGain::new(ResourceType::Wood, 10),
                ResourceGain::new(ResourceType::Stone, 5),
                ResourceGain::new(ResourceType::Food, 3),
            ],
            harvest_duration_ms: 2000,
            harvest_damage: 10,
            harvest_experience: 5,
            tool_efficiency_multiplier: 1.5,
            stack_policy: StackPolicy::Unbounded,
            world_size: (20, 15),
            placements: vec![
                PlacementRule::new("oak_tree", 15, (1, 18), (1, 13)),
                PlacementRule::new("stone_deposit", 8, (0, 18), (0, 13)),
                PlacementRule::new("berry_bush", 10, (0, 18), (0, 13)),
                PlacementRule::new("water_spring", 3, (0, 18), (0, 13)),
            ],
            resources: default_resources(),
            tools: default_tools(),
            templates: default_templates(),
        }
    }
}

// ---------------------------------------------------------------------------
// Shipped definition tables
// ---------------------------------------------------------------------------

fn resource(
    name: &str,
    description: &str,
    icon: &str,
    max_stack: u32,
    rarity: Rarity,
) -> ResourceDefinition {
    ResourceDefinition {
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        max_stack,
        rarity,
    }
}

fn default_resources() -> BTreeMap<ResourceType, ResourceDefinition> {
    use Rarity::*;
    use ResourceType::*;
    BTreeMap::from([
        (Wood, resource("Wood", "Basic building material from trees", "🪵", 50, Common)),
        (Stone, resource("Stone", "Durable material for construction", "🪨", 50, Common)),
        (Food, resource("Food", "Restores hunger and health", "🍖", 20, Common)),
        (Metal, resource("Metal Ore", "Raw metal for advanced crafting", "⚙️", 30, Uncommon)),
        (Fiber, resource("Plant Fiber", "Flexible material for tools and rope", "🌾", 40, Common)),
        (Water, resource("Fresh Water", "Essential for survival", "💧", 10, Common)),
        (Fuel, resource("Fuel", "Burns to provide heat and light", "🔥", 25, Common)),
        (
            RareMaterial,
            resource(
                "Rare Crystal",
                "Mysterious material with unknown properties",
                "💎",
                5,
                Rare,
            ),
        ),
    ])
}

fn tool(
    name: &str,
    description: &str,
    icon: &str,
    max_durability: u32,
    efficiency: f64,
) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        max_durability,
        efficiency,
    }
}

fn default_tools() -> BTreeMap<ToolType, ToolDefinition> {
    BTreeMap::from([
        (ToolType::Axe, tool("Axe", "Cuts wood efficiently", "🪓", 100, 2.0)),
        (ToolType::Pickaxe, tool("Pickaxe", "Mines stone and metal ore", "⛏️", 80, 1.8)),
        (ToolType::Spear, tool("Spear", "Hunting weapon for food and defense", "🔱", 60, 1.5)),
        (ToolType::Hammer, tool("Hammer", "Essential for construction", "🔨", 120, 1.3)),
        (ToolType::Knife, tool("Knife", "Versatile cutting tool", "🔪", 40, 1.2)),
        (ToolType::Bow, tool("Bow", "Ranged hunting and defense weapon", "🏹", 50, 2.2)),
    ])
}

fn drop(
    resource_type: ResourceType,
    min: u32,
    max: u32,
    chance: f64,
    required_tool: Option<ToolType>,
) -> ResourceDrop {
    ResourceDrop {
        resource_type,
        quantity: QuantityRange::new(min, max),
        chance,
        required_tool,
    }
}

fn default_templates() -> BTreeMap<String, WorldObjectTemplate> {
    let mut templates = BTreeMap::new();
    templates.insert(
        "oak_tree".to_string(),
        WorldObjectTemplate {
            object_type: WorldObjectType::Tree,
            name: "Oak Tree".into(),
            size: Size::new(2, 2),
            health: 30,
            max_health: 30,
            icon: "🌳".into(),
            harvestable: true,
            resources: vec![
                drop(ResourceType::Wood, 3, 6, 1.0, Some(ToolType::Axe)),
                drop(ResourceType::Fiber, 1, 2, 0.3, None),
            ],
            respawn_time_ms: Some(10 * 60 * 1000),
        },
    );
    templates.insert(
        "stone_deposit".to_string(),
        WorldObjectTemplate {
            object_type: WorldObjectType::Rock,
            name: "Stone Deposit".into(),
            size: Size::new(1, 1),
            health: 20,
            max_health: 20,
            icon: "🪨".into(),
            harvestable: true,
            resources: vec![
                drop(ResourceType::Stone, 2, 4, 1.0, Some(ToolType::Pickaxe)),
                drop(ResourceType::Metal, 1, 1, 0.1, Some(ToolType::Pickaxe)),
            ],
            respawn_time_ms: Some(15 * 60 * 1000),
        },
    );
    templates.insert(
        "berry_bush".to_string(),
        WorldObjectTemplate {
            object_type: WorldObjectType::Bush,
            name: "Berry Bush".into(),
            size: Size::new(1, 1),
            health: 10,
            max_health: 10,
            icon: "🫐".into(),
            harvestable: true,
            resources: vec![
                drop(ResourceType::Food, 1, 3, 1.0, None),
                drop(ResourceType::Fiber, 1, 1, 0.2, None),
            ],
            respawn_time_ms: Some(5 * 60 * 1000),
        },
    );
    templates.insert(
        "water_spring".to_string(),
        WorldObjectTemplate {
            object_type: WorldObjectType::WaterSource,
            name: "Natural Spring".into(),
            size: Size::new(1, 1),
            health: 999,
            max_health: 999,
            icon: "💧".into(),
            harvestable: true,
            resources: vec![drop(ResourceType::Water, 2, 4, 1.0, None)],
            respawn_time_ms: Some(60 * 1000),
        },
    );
    templates
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A configuration problem. Fatal at startup.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    ZeroDayDuration,
    ZeroClockTick,
    InvalidNightWindow { start: f64, end: f64 },
    EmptyWorld,
    ZeroInventorySlots,
    SpawnOutOfBounds(Position),
    ZeroMaxStack(ResourceType),
    InvalidTemplateHealth { template: String },
    InvalidQuantityRange { template: String, resource: ResourceType },
    InvalidChance { template: String, resource: ResourceType, chance: f64 },
    /// A placement rule names a template that does not exist.
    UnknownTemplate(String),
    /// Two placement rules produce the same object category, so their ids
    /// would collide.
    DuplicateCategory(WorldObjectType),
    PlacementOutOfBounds { template: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroDayDuration => write!(f, "day_duration_ms must be positive"),
            ConfigError::ZeroClockTick => write!(f, "clock_tick_ms must be positive"),
            ConfigError::InvalidNightWindow { start, end } => {
                write!(f, "night window {end}..{start} must satisfy 0 <= end < start <= 24")
            }
            ConfigError::EmptyWorld => write!(f, "world_size must be non-zero in both axes"),
            ConfigError::ZeroInventorySlots => write!(f, "max_inventory_slots must be positive"),
            ConfigError::SpawnOutOfBounds(pos) => {
                write!(f, "spawn position {pos} is outside the world")
            }
            ConfigError::ZeroMaxStack(kind) => write!(f, "resource {kind} has max_stack 0"),
            ConfigError::InvalidTemplateHealth { template } => {
                write!(f, "template {template} needs 0 < health <= max_health")
            }
            ConfigError::InvalidQuantityRange { template, resource } => {
                write!(f, "template {template}: {resource} drop has min > max")
            }
            ConfigError::InvalidChance {
                template,
                resource,
                chance,
            } => write!(
                f,
                "template {template}: {resource} drop chance {chance} is outside [0, 1]"
            ),
            ConfigError::UnknownTemplate(key) => {
                write!(f, "placement names unknown template {key}")
            }
            ConfigError::DuplicateCategory(kind) => {
                write!(f, "more than one placement rule produces {kind} objects")
            }
            ConfigError::PlacementOutOfBounds { template } => {
                write!(f, "placement bounds for {template} fall outside the world grid")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
