//! Crafting requirement graph: ordering and raw bill-of-materials expansion.
//!
//! The graph has an edge from every recipe output to each of its inputs.
//! Items without a recipe are leaves; only raw resources may be leaves.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Craftable, CraftRequirements, RawResource};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CraftError {
    #[error("crafting cycle: {}", join_path(.path))]
    Cycle { path: Vec<Craftable> },
    #[error("'{item}' has no recipe and is not a raw resource")]
    MissingRecipe { item: Craftable },
}

fn join_path(path: &[Craftable]) -> String {
    path.iter()
        .map(|item| item.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Returns every item that has a recipe, ordered so that each item comes
/// after all of its craftable inputs.
///
/// Fails with [`CraftError::Cycle`] if any item depends on itself, directly or
/// transitively. The cycle path starts and ends with the same item.
pub fn crafting_order(requirements: &CraftRequirements) -> Result<Vec<Craftable>, CraftError> {
    let mut order = Vec::new();
    let mut done = BTreeSet::new();
    let mut in_stack = Vec::new();
    for &item in requirements.keys() {
        visit(item, requirements, &mut done, &mut in_stack, &mut order)?;
    }
    Ok(order)
}

fn visit(
    item: Craftable,
    requirements: &CraftRequirements,
    done: &mut BTreeSet<Craftable>,
    in_stack: &mut Vec<Craftable>,
    order: &mut Vec<Craftable>,
) -> Result<(), CraftError> {
    if done.contains(&item) {
        return Ok(());
    }
    check_cycle(item, in_stack)?;
    let Some(recipe) = requirements.get(&item) else {
        done.insert(item);
        return Ok(());
    };
    in_stack.push(item);
    for &input in recipe.keys() {
        visit(input, requirements, done, in_stack, order)?;
    }
    in_stack.pop();
    done.insert(item);
    order.push(item);
    Ok(())
}

fn check_cycle(item: Craftable, in_stack: &[Craftable]) -> Result<(), CraftError> {
    match in_stack.iter().position(|&seen| seen == item) {
        Some(start) => {
            let mut path = in_stack[start..].to_vec();
            path.push(item);
            Err(CraftError::Cycle { path })
        }
        None => Ok(()),
    }
}

/// Total raw resources consumed to craft `quantity` units of `item`,
/// expanding every intermediate component.
///
/// A raw resource with no recipe counts as itself.
pub fn raw_requirements(
    requirements: &CraftRequirements,
    item: Craftable,
    quantity: u64,
) -> Result<BTreeMap<RawResource, u64>, CraftError> {
    let mut totals = BTreeMap::new();
    let mut in_stack = Vec::new();
    expand(item, quantity, requirements, &mut in_stack, &mut totals)?;
    Ok(totals)
}

fn expand(
    item: Craftable,
    quantity: u64,
    requirements: &CraftRequirements,
    in_stack: &mut Vec<Craftable>,
    totals: &mut BTreeMap<RawResource, u64>,
) -> Result<(), CraftError> {
    check_cycle(item, in_stack)?;
    match (requirements.get(&item), item) {
        (Some(recipe), _) => {
            in_stack.push(item);
            for (&input, &per_unit) in recipe {
                let needed = quantity.saturating_mul(u64::from(per_unit));
                expand(input, needed, requirements, in_stack, totals)?;
            }
            in_stack.pop();
        }
        (None, Craftable::Raw(raw)) => {
            let total = totals.entry(raw).or_insert(0);
            *total = total.saturating_add(quantity);
        }
        (None, Craftable::Component(_)) => return Err(CraftError::MissingRecipe { item }),
    }
    Ok(())
}
