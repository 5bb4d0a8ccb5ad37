use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Display;

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use starmap_catalog::{builtin, load_catalog, parse_catalog_dir, validate_catalog};
use starmap_core::{
    crafting_order, raw_requirements, sample, validate_system, BiomeType, BlackHoleType,
    BuildingResource, Catalog, ComponentResource, Craftable, LuminosityClass, NameTable,
    RawResource, Season, SpectralClass, StarType, SurfaceType, SystemData, TOLERANCE,
};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "starmap_cli", about = "Star map catalog CLI")]
struct Cli {
    /// Load content from this directory instead of the embedded catalog.
    #[arg(long, global = true)]
    content_dir: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the catalog and print each distribution's deviation from 1.
    Validate,
    /// List every enumeration with its display names.
    Tables,
    /// Draw weighted samples from a table and print a histogram.
    Sample {
        #[arg(long, value_enum)]
        table: SampleTable,
        /// RNG seed. Random when omitted.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 1000)]
        count: u64,
    },
    /// Print the raw resources needed to craft an item.
    Bom {
        /// Resource tag, e.g. `container` or `iron`.
        item: String,
        #[arg(long, default_value_t = 1)]
        quantity: u64,
    },
    /// Check a star system record stored as JSON.
    CheckSystem { path: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum SampleTable {
    StarType,
    BlackHole,
    SpectralClass,
    /// Spectral class, then luminosity class given the spectral class.
    StarClass,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn resolve_catalog(content_dir: Option<&str>) -> Result<Cow<'static, Catalog>> {
    match content_dir {
        Some(dir) => Ok(Cow::Owned(
            load_catalog(dir).with_context(|| format!("loading catalog from {dir}"))?,
        )),
        None => Ok(Cow::Borrowed(builtin()?)),
    }
}

/// Like `resolve_catalog`, but a content directory is only parsed so that
/// broken tables can still be reported.
fn resolve_unchecked_catalog(content_dir: Option<&str>) -> Result<Cow<'static, Catalog>> {
    match content_dir {
        Some(dir) => Ok(Cow::Owned(
            parse_catalog_dir(dir).with_context(|| format!("parsing catalog in {dir}"))?,
        )),
        None => Ok(Cow::Borrowed(builtin()?)),
    }
}

fn validate(catalog: &Catalog) -> Result<()> {
    println!("content_version={}", catalog.content_version);
    let mut worst = 0.0_f64;
    for (table, deviation) in catalog.distribution_report() {
        let status = if deviation < TOLERANCE { "ok" } else { "FAIL" };
        println!("  {table:<40} deviation={deviation:.3e}  {status}");
        worst = worst.max(deviation);
    }
    ensure!(
        worst < TOLERANCE,
        "catalog has a distribution that deviates from 1 by {worst}"
    );
    let order = crafting_order(&catalog.craft_requirements)?;
    println!("  crafting graph: {} recipes, acyclic", order.len());
    validate_catalog(catalog);
    println!("catalog is valid");
    Ok(())
}

fn print_names<K: Display + Ord>(title: &str, members: &[K], names: &NameTable<K>) {
    println!("{title} ({})", members.len());
    for member in members {
        let name = names.get(member).map_or("", String::as_str);
        let name = if name.is_empty() { "<unnamed>" } else { name };
        println!("  {member:<24} {name}");
    }
}

fn print_members<K: Display>(title: &str, members: &[K]) {
    let tags: Vec<String> = members.iter().map(ToString::to_string).collect();
    println!("{title} ({}): {}", members.len(), tags.join(", "));
}

fn print_tables(catalog: &Catalog) {
    println!("spectral classes ({})", SpectralClass::ALL.len());
    for spectral in SpectralClass::ALL {
        let (min_k, max_k) = spectral.temperature_range_k();
        let band = match max_k {
            Some(max_k) => format!("{min_k}-{max_k} K"),
            None => format!("> {min_k} K"),
        };
        let color = catalog.spectral_class_colors.get(spectral);
        println!(
            "  {spectral:<3} {band:<16} {:<14} {}",
            color.map_or("", |c| c.color.as_str()),
            color.map_or("", |c| c.hex.as_str()),
        );
    }
    print_names(
        "luminosity classes",
        LuminosityClass::ALL,
        &catalog.luminosity_class_names,
    );
    print_names("star types", StarType::ALL, &catalog.star_type_names);
    print_names(
        "black hole types",
        BlackHoleType::ALL,
        &catalog.black_hole_type_names,
    );
    print_names(
        "raw resources",
        RawResource::ALL,
        &catalog.raw_resource_names,
    );
    print_names(
        "component resources",
        ComponentResource::ALL,
        &catalog.component_resource_names,
    );
    print_names(
        "building resources",
        BuildingResource::ALL,
        &catalog.building_resource_names,
    );
    print_names("seasons", Season::ALL, &catalog.season_names);
    print_members("surface types", SurfaceType::ALL);
    print_members("biome types", BiomeType::ALL);
    println!(
        "base_system_appear_probability={}",
        catalog.constants.base_system_appear_probability
    );
}

fn sample_table(catalog: &Catalog, table: SampleTable, seed: Option<u64>, count: u64) -> Result<()> {
    ensure!(count > 0, "--count must be at least 1");
    let seed = seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    tracing::debug!(seed, count, "sampling");

    let mut histogram: BTreeMap<String, u64> = BTreeMap::new();
    for _ in 0..count {
        let label = match table {
            SampleTable::StarType => catalog.sample_star_type(&mut rng)?.to_string(),
            SampleTable::BlackHole => catalog.sample_black_hole_type(&mut rng)?.to_string(),
            SampleTable::SpectralClass => {
                sample(&catalog.spectral_class_distribution, &mut rng)?.to_string()
            }
            SampleTable::StarClass => {
                let (spectral, luminosity) = catalog.sample_star_class(&mut rng)?;
                format!("{spectral}{luminosity}")
            }
        };
        *histogram.entry(label).or_insert(0) += 1;
    }

    println!("seed={seed} count={count}");
    for (label, hits) in &histogram {
        let share = *hits as f64 / count as f64;
        println!("  {label:<14} {hits:>8}  {:>6.2}%", share * 100.0);
    }
    Ok(())
}

fn bill_of_materials(catalog: &Catalog, item: &str, quantity: u64) -> Result<()> {
    ensure!(quantity > 0, "--quantity must be at least 1");
    let item: Craftable = item.parse()?;
    let totals = raw_requirements(&catalog.craft_requirements, item, quantity)?;
    let name = catalog.craftable_name(item).unwrap_or_default();
    println!("{quantity} x {item} ({name}):");
    if let Some(recipe) = catalog.recipe(item) {
        let inputs: Vec<String> = recipe.iter().map(|(i, q)| format!("{q} {i}")).collect();
        println!("  made from: {}", inputs.join(", "));
    }
    for (resource, amount) in &totals {
        let resource_name = catalog
            .raw_resource_names
            .get(resource)
            .map_or("", String::as_str);
        println!("  {resource:<12} {amount:>6}  {resource_name}");
    }
    Ok(())
}

fn check_system(catalog: &Catalog, path: &str) -> Result<()> {
    let json =
        std::fs::read_to_string(path).with_context(|| format!("reading system file: {path}"))?;
    let system: SystemData =
        serde_json::from_str(&json).with_context(|| format!("parsing system file: {path}"))?;
    validate_system(&system).with_context(|| format!("validating system '{}'", system.id))?;
    let star_type = system.body.star_type();
    let kind = catalog
        .star_type_names
        .get(&star_type)
        .map_or(star_type.as_str(), String::as_str);
    println!(
        "system '{}' ({kind}) with {} planets is valid",
        system.name,
        system.planets.len()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let dir = cli.content_dir.as_deref();
    match cli.command {
        Commands::Validate => validate(&*resolve_unchecked_catalog(dir)?)?,
        Commands::Tables => print_tables(&*resolve_catalog(dir)?),
        Commands::Sample { table, seed, count } => {
            sample_table(&*resolve_catalog(dir)?, table, seed, count)?;
        }
        Commands::Bom { item, quantity } => {
            bill_of_materials(&*resolve_catalog(dir)?, &item, quantity)?;
        }
        Commands::CheckSystem { path } => check_system(&*resolve_catalog(dir)?, &path)?,
    }
    Ok(())
}
