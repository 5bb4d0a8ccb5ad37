use std::collections::BTreeMap;

use starmap_core::{
    crafting_order, raw_requirements, ComponentResource as C, CraftError, CraftRequirements,
    Craftable, RawResource as R, Recipe,
};

fn recipe(inputs: &[(Craftable, u32)]) -> Recipe {
    inputs.iter().copied().collect()
}

fn raw(r: R) -> Craftable {
    Craftable::Raw(r)
}

fn comp(c: C) -> Craftable {
    Craftable::Component(c)
}

fn station_recipes() -> CraftRequirements {
    BTreeMap::from([
        (comp(C::Glass), recipe(&[(raw(R::Silicon), 1), (raw(R::Oxygen), 1)])),
        (comp(C::MetalPlate), recipe(&[(raw(R::Iron), 1)])),
        (
            comp(C::Alloy),
            recipe(&[(raw(R::Iron), 1), (raw(R::Carbon), 1), (raw(R::Titanium), 1)]),
        ),
        (
            comp(C::ReinforcedMetalPlate),
            recipe(&[(comp(C::MetalPlate), 1), (comp(C::Alloy), 1)]),
        ),
        (
            comp(C::CircuitBoard),
            recipe(&[(raw(R::Copper), 1), (raw(R::Silicon), 1)]),
        ),
        (
            comp(C::Wiring),
            recipe(&[(raw(R::Copper), 1), (comp(C::Rubber), 1)]),
        ),
        (comp(C::Rubber), recipe(&[(raw(R::Carbon), 1), (raw(R::Water), 1)])),
        (
            comp(C::Container),
            recipe(&[
                (comp(C::MetalPlate), 1),
                (comp(C::Glass), 1),
                (raw(R::Aluminium), 1),
            ]),
        ),
    ])
}

#[test]
fn test_order_places_inputs_before_outputs() {
    let recipes = station_recipes();
    let order = crafting_order(&recipes).unwrap();
    assert_eq!(order.len(), recipes.len());
    let position = |item: Craftable| order.iter().position(|&o| o == item).unwrap();
    for (output, inputs) in &recipes {
        for input in inputs.keys() {
            if recipes.contains_key(input) {
                assert!(
                    position(*input) < position(*output),
                    "{input} should precede {output}"
                );
            }
        }
    }
}

#[test]
fn test_order_excludes_leaves() {
    let order = crafting_order(&station_recipes()).unwrap();
    assert!(order.iter().all(|item| matches!(item, Craftable::Component(_))));
}

#[test]
fn test_empty_requirements_have_empty_order() {
    assert!(crafting_order(&BTreeMap::new()).unwrap().is_empty());
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let recipes = BTreeMap::from([(comp(C::Glass), recipe(&[(comp(C::Glass), 1)]))]);
    let err = crafting_order(&recipes).unwrap_err();
    assert_eq!(
        err,
        CraftError::Cycle {
            path: vec![comp(C::Glass), comp(C::Glass)]
        }
    );
}

#[test]
fn test_transitive_cycle_is_reported_with_path() {
    let mut recipes = station_recipes();
    recipes.insert(
        comp(C::MetalPlate),
        recipe(&[(comp(C::ReinforcedMetalPlate), 1)]),
    );
    let err = crafting_order(&recipes).unwrap_err();
    let CraftError::Cycle { path } = &err else {
        panic!("expected cycle, got {err:?}");
    };
    assert_eq!(path.first(), path.last());
    assert!(path.contains(&comp(C::MetalPlate)));
    assert!(path.contains(&comp(C::ReinforcedMetalPlate)));
    assert!(err.to_string().starts_with("crafting cycle: "));
}

#[test]
fn test_raw_requirements_of_container() {
    let totals = raw_requirements(&station_recipes(), comp(C::Container), 1).unwrap();
    assert_eq!(
        totals,
        BTreeMap::from([
            (R::Aluminium, 1),
            (R::Iron, 1),
            (R::Silicon, 1),
            (R::Oxygen, 1),
        ])
    );
}

#[test]
fn test_raw_requirements_merge_shared_inputs() {
    // reinforced plate = metal plate (iron) + alloy (iron, carbon, titanium)
    let totals = raw_requirements(&station_recipes(), comp(C::ReinforcedMetalPlate), 3).unwrap();
    assert_eq!(totals[&R::Iron], 6);
    assert_eq!(totals[&R::Carbon], 3);
    assert_eq!(totals[&R::Titanium], 3);
    assert_eq!(totals.len(), 3);
}

#[test]
fn test_raw_requirements_of_raw_is_itself() {
    let totals = raw_requirements(&station_recipes(), raw(R::Gold), 5).unwrap();
    assert_eq!(totals, BTreeMap::from([(R::Gold, 5)]));
}

#[test]
fn test_raw_requirements_scale_with_recipe_quantities() {
    let mut recipes = station_recipes();
    recipes.insert(
        comp(C::Wiring),
        recipe(&[(raw(R::Copper), 2), (comp(C::Rubber), 3)]),
    );
    let totals = raw_requirements(&recipes, comp(C::Wiring), 2).unwrap();
    assert_eq!(totals[&R::Copper], 4);
    assert_eq!(totals[&R::Carbon], 6);
    assert_eq!(totals[&R::Water], 6);
}

#[test]
fn test_missing_component_recipe_is_reported() {
    let mut recipes = station_recipes();
    recipes.remove(&comp(C::Rubber));
    let err = raw_requirements(&recipes, comp(C::Wiring), 1).unwrap_err();
    assert_eq!(
        err,
        CraftError::MissingRecipe {
            item: comp(C::Rubber)
        }
    );
}

#[test]
fn test_raw_requirements_detect_cycles() {
    let recipes = BTreeMap::from([
        (comp(C::Glass), recipe(&[(comp(C::Rubber), 1)])),
        (comp(C::Rubber), recipe(&[(comp(C::Glass), 1)])),
    ]);
    assert!(matches!(
        raw_requirements(&recipes, comp(C::Glass), 1),
        Err(CraftError::Cycle { .. })
    ));
}
