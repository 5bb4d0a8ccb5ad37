//! Catalog loading and validation shared between `starmap_cli` and tests.
//!
//! Content lives in `content/*.json`. The same files are embedded at compile
//! time and served by [`builtin`].

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use starmap_core::{
    check_distribution, crafting_order, BlackHoleType, BuildingResource, Catalog,
    ComponentResource, Constants, CraftRequirements, Craftable, Distribution, LuminosityClass,
    NameTable, RawResource, Recipe, Season, SpectralClass, StarColor, StarType,
};

/// Files read from a content directory.
pub const CONTENT_FILES: [&str; 7] = [
    "constants.json",
    "stars.json",
    "star_types.json",
    "black_holes.json",
    "resources.json",
    "recipes.json",
    "seasons.json",
];

#[derive(Deserialize)]
struct ConstantsFile {
    content_version: String,
    constants: Constants,
}

#[derive(Deserialize)]
struct StarsFile {
    spectral_class_distribution: Distribution<SpectralClass>,
    spectral_class_colors: BTreeMap<SpectralClass, StarColor>,
    luminosity_by_spectral_class: BTreeMap<SpectralClass, Distribution<LuminosityClass>>,
    luminosity_class_names: NameTable<LuminosityClass>,
}

#[derive(Deserialize)]
struct StarTypesFile {
    probability: Distribution<StarType>,
    names: NameTable<StarType>,
}

#[derive(Deserialize)]
struct BlackHolesFile {
    frequency: Distribution<BlackHoleType>,
    names: NameTable<BlackHoleType>,
}

#[derive(Deserialize)]
struct ResourcesFile {
    raw: RawResourcesSection,
    components: ComponentsSection,
    buildings: BuildingsSection,
}

#[derive(Deserialize)]
struct RawResourcesSection {
    names: NameTable<RawResource>,
    rarity: BTreeMap<RawResource, f64>,
}

#[derive(Deserialize)]
struct ComponentsSection {
    names: NameTable<ComponentResource>,
}

#[derive(Deserialize)]
struct BuildingsSection {
    names: NameTable<BuildingResource>,
}

#[derive(Deserialize)]
struct RecipesFile {
    recipes: Vec<RecipeDef>,
}

#[derive(Deserialize)]
struct RecipeDef {
    output: Craftable,
    inputs: Recipe,
}

#[derive(Deserialize)]
struct SeasonsFile {
    names: NameTable<Season>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validates every table in the catalog, panicking on any authoring error.
///
/// Catches mistakes like: a probability table that does not sum to 1, a
/// display-name table missing a member, or a recipe that depends on itself.
/// Empty display names are placeholders and only logged at debug level.
pub fn validate_catalog(catalog: &Catalog) {
    validate_distributions(catalog);
    validate_name_tables(catalog);
    validate_resources(catalog);
    validate_recipes(&catalog.craft_requirements);
    validate_presentation(catalog);
}

fn assert_complete<K: Ord + Display, V>(table: &str, members: &[K], entries: &BTreeMap<K, V>) {
    for member in members {
        assert!(
            entries.contains_key(member),
            "{table} has no entry for '{member}'"
        );
    }
}

fn assert_distribution<K: Ord + Display>(table: &str, members: &[K], weights: &Distribution<K>) {
    assert_complete(table, members, weights);
    if let Err(err) = check_distribution(weights) {
        panic!("{table} is not a valid distribution: {err}");
    }
}

fn validate_distributions(catalog: &Catalog) {
    assert_distribution(
        "star_type_probability",
        StarType::ALL,
        &catalog.star_type_probability,
    );
    assert_distribution(
        "black_hole_type_frequency",
        BlackHoleType::ALL,
        &catalog.black_hole_type_frequency,
    );
    assert_distribution(
        "spectral_class_distribution",
        SpectralClass::ALL,
        &catalog.spectral_class_distribution,
    );

    // Luminosity maps are partial; each one is normalized on its own.
    for (spectral, weight) in &catalog.spectral_class_distribution {
        assert!(
            *weight <= 0.0 || catalog.luminosity_by_spectral_class.contains_key(spectral),
            "spectral class '{spectral}' has weight {weight} but no luminosity distribution"
        );
    }
    for (spectral, luminosity) in &catalog.luminosity_by_spectral_class {
        if let Err(err) = check_distribution(luminosity) {
            panic!("luminosity_by_spectral_class[{spectral}] is not a valid distribution: {err}");
        }
    }
}

fn validate_name_table<K: Ord + Display>(table: &str, members: &[K], names: &NameTable<K>) {
    assert_complete(table, members, names);
    for (member, name) in names {
        if name.trim().is_empty() {
            tracing::debug!(table, %member, "display name is an empty placeholder");
        }
    }
}

fn validate_name_tables(catalog: &Catalog) {
    validate_name_table("star_type_names", StarType::ALL, &catalog.star_type_names);
    validate_name_table(
        "luminosity_class_names",
        LuminosityClass::ALL,
        &catalog.luminosity_class_names,
    );
    validate_name_table(
        "black_hole_type_names",
        BlackHoleType::ALL,
        &catalog.black_hole_type_names,
    );
    validate_name_table(
        "raw_resource_names",
        RawResource::ALL,
        &catalog.raw_resource_names,
    );
    validate_name_table(
        "component_resource_names",
        ComponentResource::ALL,
        &catalog.component_resource_names,
    );
    validate_name_table(
        "building_resource_names",
        BuildingResource::ALL,
        &catalog.building_resource_names,
    );
    validate_name_table("season_names", Season::ALL, &catalog.season_names);
}

fn validate_resources(catalog: &Catalog) {
    assert_complete(
        "raw_resource_rarity",
        RawResource::ALL,
        &catalog.raw_resource_rarity,
    );
    for (resource, rarity) in &catalog.raw_resource_rarity {
        assert!(
            (0.0..=1.0).contains(rarity),
            "raw resource '{resource}' rarity {rarity} is out of range [0, 1]"
        );
    }
}

fn validate_recipes(requirements: &CraftRequirements) {
    for (output, recipe) in requirements {
        assert!(!recipe.is_empty(), "recipe for '{output}' has no inputs");
        for (input, quantity) in recipe {
            assert!(
                *quantity > 0,
                "recipe for '{output}' requires zero '{input}'"
            );
        }
    }
    for component in ComponentResource::ALL {
        assert!(
            requirements.contains_key(&Craftable::Component(*component)),
            "component '{component}' has no recipe"
        );
    }
    if let Err(err) = crafting_order(requirements) {
        panic!("{err}");
    }
}

fn is_hex_color(hex: &str) -> bool {
    hex.len() == 7
        && hex.starts_with('#')
        && hex[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn validate_presentation(catalog: &Catalog) {
    assert_complete(
        "spectral_class_colors",
        SpectralClass::ALL,
        &catalog.spectral_class_colors,
    );
    for (spectral, color) in &catalog.spectral_class_colors {
        assert!(
            is_hex_color(&color.hex),
            "spectral class '{spectral}' colour '{}' is not #rrggbb",
            color.hex
        );
    }
    let p = catalog.constants.base_system_appear_probability;
    assert!(
        (0.0..=1.0).contains(&p),
        "base_system_appear_probability {p} is out of range [0, 1]"
    );
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn parse<T: DeserializeOwned>(source: &impl Fn(&str) -> Result<String>, file: &str) -> Result<T> {
    let text = source(file)?;
    serde_json::from_str(&text).with_context(|| format!("parsing {file}"))
}

/// Assembles a catalog from content files supplied by `source`, keyed by file name.
fn parse_catalog(source: impl Fn(&str) -> Result<String>) -> Result<Catalog> {
    let constants_file: ConstantsFile = parse(&source, "constants.json")?;
    let stars: StarsFile = parse(&source, "stars.json")?;
    let star_types: StarTypesFile = parse(&source, "star_types.json")?;
    let black_holes: BlackHolesFile = parse(&source, "black_holes.json")?;
    let resources: ResourcesFile = parse(&source, "resources.json")?;
    let recipes_file: RecipesFile = parse(&source, "recipes.json")?;
    let seasons: SeasonsFile = parse(&source, "seasons.json")?;

    let mut craft_requirements = CraftRequirements::new();
    for recipe in recipes_file.recipes {
        if craft_requirements
            .insert(recipe.output, recipe.inputs)
            .is_some()
        {
            bail!("recipes.json lists '{}' more than once", recipe.output);
        }
    }

    Ok(Catalog {
        content_version: constants_file.content_version,
        constants: constants_file.constants,
        star_type_probability: star_types.probability,
        star_type_names: star_types.names,
        spectral_class_distribution: stars.spectral_class_distribution,
        spectral_class_colors: stars.spectral_class_colors,
        luminosity_by_spectral_class: stars.luminosity_by_spectral_class,
        luminosity_class_names: stars.luminosity_class_names,
        black_hole_type_frequency: black_holes.frequency,
        black_hole_type_names: black_holes.names,
        raw_resource_names: resources.raw.names,
        raw_resource_rarity: resources.raw.rarity,
        component_resource_names: resources.components.names,
        building_resource_names: resources.buildings.names,
        craft_requirements,
        season_names: seasons.names,
    })
}

/// Reads and parses a content directory without running [`validate_catalog`].
///
/// For tooling that reports on content which may be broken.
pub fn parse_catalog_dir(content_dir: impl AsRef<Path>) -> Result<Catalog> {
    let dir = content_dir.as_ref();
    parse_catalog(|file| {
        std::fs::read_to_string(dir.join(file)).with_context(|| format!("reading {file}"))
    })
}

/// Loads and validates the catalog from a content directory.
///
/// # Panics
///
/// If the content parses but fails [`validate_catalog`].
pub fn load_catalog(content_dir: impl AsRef<Path>) -> Result<Catalog> {
    let dir = content_dir.as_ref();
    let catalog = parse_catalog_dir(dir)?;
    validate_catalog(&catalog);
    tracing::debug!(
        dir = %dir.display(),
        content_version = %catalog.content_version,
        "catalog loaded"
    );
    Ok(catalog)
}

macro_rules! embedded {
    ($file:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../content/", $file))
    };
}

fn embedded_source(file: &str) -> Result<String> {
    let text = match file {
        "constants.json" => embedded!("constants.json"),
        "stars.json" => embedded!("stars.json"),
        "star_types.json" => embedded!("star_types.json"),
        "black_holes.json" => embedded!("black_holes.json"),
        "resources.json" => embedded!("resources.json"),
        "recipes.json" => embedded!("recipes.json"),
        "seasons.json" => embedded!("seasons.json"),
        other => bail!("no embedded content file named {other}"),
    };
    Ok(text.to_string())
}

static BUILTIN: OnceLock<Catalog> = OnceLock::new();

/// The catalog compiled into the binary, parsed and validated on first use.
pub fn builtin() -> Result<&'static Catalog> {
    if let Some(catalog) = BUILTIN.get() {
        return Ok(catalog);
    }
    let catalog = parse_catalog(embedded_source).context("parsing embedded catalog")?;
    validate_catalog(&catalog);
    tracing::debug!(content_version = %catalog.content_version, "embedded catalog loaded");
    Ok(BUILTIN.get_or_init(|| catalog))
}
