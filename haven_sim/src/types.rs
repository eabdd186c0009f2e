// Core value types shared across the simulation.
//
// Grid positions, resource/tool/object kinds, drop tables, stacks, tools,
// and world objects. Everything here is plain data: no behavior beyond
// small accessors. All types derive `Serialize`/`Deserialize` because world
// objects and player data travel to the persistence collaborator as JSON,
// using the camelCase field names of the saved-game format.
//
// `ResourceType` is the one type with hand-written serde: it is a closed
// set of known resources plus a `Custom` escape hatch, and it serializes as
// a bare string so it can key JSON maps.
//
// See also: `catalog.rs` for the definitions keyed by these kinds,
// `state.rs` for `Player` and `GameState`, `inventory.rs` for `Inventory`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell on the world grid. `x` grows east, `y` grows south.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True if this cell lies inside a `width` x `height` grid anchored at 0.
    pub fn in_grid(self, (width, height): (u32, u32)) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as u32) < width && (self.y as u32) < height
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Footprint of an object in grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// A kind of gatherable resource.
///
/// `Custom` covers anything a drop table names that the game does not know
/// about; the catalog answers for it with a generic definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    Wood,
    Stone,
    Food,
    Metal,
    Fiber,
    Water,
    Fuel,
    RareMaterial,
    Custom(String),
}

impl ResourceType {
    /// The snake_case wire name.
    pub fn name(&self) -> &str {
        match self {
            ResourceType::Wood => "wood",
            ResourceType::Stone => "stone",
            ResourceType::Food => "food",
            ResourceType::Metal => "metal",
            ResourceType::Fiber => "fiber",
            ResourceType::Water => "water",
            ResourceType::Fuel => "fuel",
            ResourceType::RareMaterial => "rare_material",
            ResourceType::Custom(name) => name,
        }
    }

    /// Parse a wire name. Never fails: unknown names become `Custom`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "wood" => ResourceType::Wood,
            "stone" => ResourceType::Stone,
            "food" => ResourceType::Food,
            "metal" => ResourceType::Metal,
            "fiber" => ResourceType::Fiber,
            "water" => ResourceType::Water,
            "fuel" => ResourceType::Fuel,
            "rare_material" => ResourceType::RareMaterial,
            other => ResourceType::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ResourceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ResourceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        if name.is_empty() {
            return Err(serde::de::Error::custom("empty resource type"));
        }
        Ok(ResourceType::from_name(&name))
    }
}

/// A kind of hand tool. At most one is equipped at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    Axe,
    Pickaxe,
    Spear,
    Hammer,
    Knife,
    Bow,
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToolType::Axe => "axe",
            ToolType::Pickaxe => "pickaxe",
            ToolType::Spear => "spear",
            ToolType::Hammer => "hammer",
            ToolType::Knife => "knife",
            ToolType::Bow => "bow",
        };
        f.write_str(name)
    }
}

/// Category of a world object. Also the id prefix for generated objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldObjectType {
    Tree,
    Rock,
    Bush,
    WaterSource,
    OreDeposit,
    Animal,
    Ruins,
}

impl WorldObjectType {
    pub fn name(self) -> &'static str {
        match self {
            WorldObjectType::Tree => "tree",
            WorldObjectType::Rock => "rock",
            WorldObjectType::Bush => "bush",
            WorldObjectType::WaterSource => "water_source",
            WorldObjectType::OreDeposit => "ore_deposit",
            WorldObjectType::Animal => "animal",
            WorldObjectType::Ruins => "ruins",
        }
    }
}

impl fmt::Display for WorldObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

// ---------------------------------------------------------------------------
// Drops, gains, stacks, tools
// ---------------------------------------------------------------------------

/// Inclusive quantity bounds for a drop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityRange {
    pub min: u32,
    pub max: u32,
}

impl QuantityRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// One entry of an object's drop table. Immutable template data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDrop {
    pub resource_type: ResourceType,
    pub quantity: QuantityRange,
    /// Probability in [0, 1] that this entry yields anything per harvest.
    pub chance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_tool: Option<ToolType>,
}

/// A `(type, quantity)` delta applied to an inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGain {
    pub resource_type: ResourceType,
    pub quantity: u32,
}

impl ResourceGain {
    pub fn new(resource_type: ResourceType, quantity: u32) -> Self {
        Self {
            resource_type,
            quantity,
        }
    }
}

/// A quantity of one resource occupying one inventory slot.
///
/// `quantity > 0` always holds for a stack inside an inventory. Under the
/// default `StackPolicy::Unbounded`, `quantity` may exceed `max_stack`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStack {
    pub resource_type: ResourceType,
    pub quantity: u32,
    pub max_stack: u32,
}

/// An equippable tool. Durability is carried but not yet worn down.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    pub durability: u32,
    pub max_durability: u32,
    pub efficiency: f64,
}

// ---------------------------------------------------------------------------
// World objects
// ---------------------------------------------------------------------------

/// A harvestable thing placed on the grid.
///
/// `health` stays in `[0, max_health]`; zero means depleted. `last_harvested`
/// is stamped (ms, host clock) on the harvest that depletes the object.
/// `respawn_time_ms` is carried from the template but nothing revives a
/// depleted object yet (see `respawn.rs`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldObject {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: WorldObjectType,
    #[serde(default)]
    pub name: String,
    pub position: Position,
    pub size: Size,
    pub health: u32,
    pub max_health: u32,
    #[serde(default)]
    pub resources: Vec<ResourceDrop>,
    pub harvestable: bool,
    #[serde(default, rename = "respawnTime", skip_serializing_if = "Option::is_none")]
    pub respawn_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_harvested: Option<u64>,
    #[serde(default)]
    pub icon: String,
}

impl WorldObject {
    pub fn is_depleted(&self) -> bool {
        self.health == 0
    }
}

// ---------------------------------------------------------------------------
// Environment and carried-but-inert records
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherType {
    #[default]
    Clear,
    Cloudy,
    Rain,
    Storm,
    Snow,
    Fog,
    Wind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherEffectKind {
    Visibility,
    Movement,
    ResourceGathering,
    Health,
    Energy,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherEffect {
    #[serde(rename = "type")]
    pub kind: WeatherEffectKind,
    /// Multiplier applied to the affected quantity.
    pub modifier: f32,
}

/// Current weather. Carried in the snapshot; nothing changes it yet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    #[serde(rename = "type")]
    pub kind: WeatherType,
    /// 0 to 1.
    pub intensity: f32,
    /// Minutes.
    pub duration: u32,
    pub effects: Vec<WeatherEffect>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Peaceful,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Extreme,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureType {
    Shelter,
    Wall,
    Door,
    Window,
    Storage,
    Workbench,
    Fire,
    Trap,
    Watchtower,
}

/// A player-built structure. Building is not simulated yet; the list stays
/// empty but keeps its slot in the snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    pub id: String,
    #[serde(rename = "type")]
    pub structure_type: StructureType,
    pub position: Position,
    pub size: Size,
    pub health: u32,
    pub max_health: u32,
    pub level: u32,
    pub max_level: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatType {
    Wolf,
    Bear,
    Bandit,
    Storm,
    ColdSnap,
    Wildfire,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatBehavior {
    Passive,
    Defensive,
    Aggressive,
    Territorial,
    Environmental,
}

/// A hostile creature or hazard. Not spawned yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threat {
    pub id: String,
    #[serde(rename = "type")]
    pub threat_type: ThreatType,
    pub position: Position,
    pub health: u32,
    pub max_health: u32,
    pub damage: u32,
    pub behavior: ThreatBehavior,
    #[serde(default)]
    pub loot: Vec<ResourceDrop>,
}
