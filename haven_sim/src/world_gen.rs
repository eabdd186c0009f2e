// Initial world population.
//
// `generate` walks the placement rules in config order and, for each rule,
// instantiates `count` copies of its template at positions drawn uniformly
// from the rule's inclusive bounds (x first, then y). Ids are
// `"{category}_{index}"` with the index counting from 0 within the rule, so
// the default world has `tree_0..tree_14`, `rock_0..rock_7`, and so on.
//
// Placement does no collision detection. Objects may share a cell with each
// other or with the player spawn.
//
// Called once per fresh session from `store.rs`; the caller persists the
// result.
//
// **Critical constraint: determinism.** All randomness comes from the
// `RandomSource` passed by the caller, two draws per object.

use crate::catalog::ResourceCatalog;
use crate::config::{ConfigError, PlacementRule};
use crate::rng::RandomSource;
use crate::types::*;

pub fn generate<R: RandomSource + ?Sized>(
    catalog: &ResourceCatalog,
    placements: &[PlacementRule],
    rng: &mut R,
) -> Result<Vec<WorldObject>, ConfigError> {
    let total = placements.iter().map(|r| r.count as usize).sum();
    let mut objects = Vec::with_capacity(total);

    for rule in placements {
        let template = catalog
            .template(&rule.template)
            .ok_or_else(|| ConfigError::UnknownTemplate(rule.template.clone()))?;
        let (x0, x1) = rule.x_range;
        let (y0, y1) = rule.y_range;
        if x0 > x1 || y0 > y1 {
            return Err(ConfigError::PlacementOutOfBounds {
                template: rule.template.clone(),
            });
        }

        for index in 0..rule.count {
            let x = rng.roll_cell(x0, x1);
            let y = rng.roll_cell(y0, y1);
            let id = format!("{}_{index}", template.object_type);
            objects.push(template.instantiate(id, Position::new(x, y)));
        }
    }

    Ok(objects)
}
