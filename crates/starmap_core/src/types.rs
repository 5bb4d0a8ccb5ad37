//! Type definitions for `starmap_core`.
//!
//! Category enumerations, table aliases, and the `Catalog` that holds every
//! static table.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distribution::{distribution_deviation, sample, DistributionError};

// ---------------------------------------------------------------------------
// Category enumerations
// ---------------------------------------------------------------------------

/// Returned by `FromStr` on a catalog enumeration when the tag is not a member.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} tag '{tag}'")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub tag: String,
}

/// Declares a closed enumeration whose variants serialize as fixed wire tags.
///
/// Generates `ALL`, `as_str`, `Display` and `FromStr`.
macro_rules! catalog_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $tag:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $tag)] $variant, )+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownTag;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok($name::$variant),)+
                    other => Err(UnknownTag {
                        kind: stringify!($name),
                        tag: other.to_string(),
                    }),
                }
            }
        }
    };
}

catalog_enum! {
    /// Stellar temperature / colour category.
    SpectralClass {
        O => "O",
        B => "B",
        A => "A",
        F => "F",
        G => "G",
        K => "K",
        M => "M",
    }
}

impl SpectralClass {
    /// Surface temperature band in kelvin as `(min, max)`. O stars have no upper bound.
    pub fn temperature_range_k(self) -> (u32, Option<u32>) {
        match self {
            SpectralClass::O => (30_000, None),
            SpectralClass::B => (10_000, Some(30_000)),
            SpectralClass::A => (7_500, Some(10_000)),
            SpectralClass::F => (6_000, Some(7_500)),
            SpectralClass::G => (5_000, Some(6_000)),
            SpectralClass::K => (3_800, Some(5_000)),
            SpectralClass::M => (2_500, Some(3_800)),
        }
    }
}

catalog_enum! {
    /// Stellar size / brightness category, supergiant through white dwarf.
    #[allow(clippy::upper_case_acronyms)]
    LuminosityClass {
        /// Supergiant.
        I => "I",
        /// Bright giant.
        II => "II",
        /// Giant.
        III => "III",
        /// Subgiant.
        IV => "IV",
        /// Dwarf (main sequence).
        V => "V",
        /// Subdwarf.
        VI => "VI",
        /// White dwarf.
        VII => "VII",
    }
}

catalog_enum! {
    /// Central body of a star system.
    StarType {
        Star => "star",
        BlackHole => "black_hole",
        NeutronStar => "neutron_star",
        Wormhole => "wormhole",
    }
}

catalog_enum! {
    BlackHoleType {
        Stellar => "stellar",
        Supermassive => "supermassive",
        Intermediate => "intermediate",
        Micro => "micro",
    }
}

catalog_enum! {
    SurfaceType {
        Rock => "rock",
        Ice => "ice",
        Gas => "gas",
        Water => "water",
        Sand => "sand",
        Lava => "lava",
        Grass => "grass",
        Snow => "snow",
    }
}

catalog_enum! {
    BiomeType {
        Lush => "lush",
        Barren => "barren",
        Toxic => "toxic",
        Scorched => "scorched",
        Frozen => "frozen",
        Radioactive => "radioactive",
        Dead => "dead",
        Volcanic => "volcanic",
        Ocean => "ocean",
        Gas => "gas",
    }
}

catalog_enum! {
    /// Resources extracted on planets or in star systems.
    RawResource {
        Aluminium => "aluminium",
        Carbon => "carbon",
        Copper => "copper",
        Gold => "gold",
        Iron => "iron",
        Silicon => "silicon",
        Titanium => "titanium",
        Uranium => "uranium",
        Water => "water",
        Hydrogen => "hydrogen",
        Oxygen => "oxygen",
        Nitrogen => "nitrogen",
        Helium => "helium",
        Methane => "methane",
        Ammonia => "ammonia",
        Sulphur => "sulphur",
        Phosphorus => "phosphorus",
        Nickel => "nickel",
        Silver => "silver",
        Lithium => "lithium",
        Beryllium => "beryllium",
        Sodium => "sodium",
        Magnesium => "magnesium",
        Potassium => "potassium",
        Calcium => "calcium",
        Rubidium => "rubidium",
        Strontium => "strontium",
        Caesium => "caesium",
        Radium => "radium",
        Francium => "francium",
        Scandium => "scandium",
        Yttrium => "yttrium",
        Lutetium => "lutetium",
        Lawrencium => "lawrencium",
        Zirconium => "zirconium",
        Vanadium => "vanadium",
        Niobium => "niobium",
        Chromium => "chromium",
        Manganese => "manganese",
        Cobalt => "cobalt",
        Zinc => "zinc",
        Palladium => "palladium",
        Iridium => "iridium",
        Cadmium => "cadmium",
        Mercury => "mercury",
        Osmium => "osmium",
        Boron => "boron",
        Fluorine => "fluorine",
        Neon => "neon",
        Chlorine => "chlorine",
        Argon => "argon",
        Lead => "lead",
        Bismuth => "bismuth",
        Krypton => "krypton",
        Selenium => "selenium",
        Tin => "tin",
        Indium => "indium",
        Iodine => "iodine",
        Xenon => "xenon",
        Thorium => "thorium",
    }
}

catalog_enum! {
    /// Manufactured items built from raw or other component resources.
    ComponentResource {
        Glass => "glass",
        MetalPlate => "metal-plate",
        ReinforcedMetalPlate => "reinforced-metal-plate",
        Alloy => "alloy",
        CircuitBoard => "circuit-board",
        Wiring => "wiring",
        Rubber => "rubber",
        Container => "container",
    }
}

catalog_enum! {
    /// Colony modules.
    BuildingResource {
        DrillingRig => "drilling-rig",
        Borehole => "borehole",
        Refinery => "refinery",
        Storage => "storage",
        Factory => "factory",
        PowerPlant => "power-plant",
        Communications => "communications",
        Shipyard => "shipyard",
    }
}

catalog_enum! {
    Season {
        Winter => "winter",
        Spring => "spring",
        Summer => "summer",
        Autumn => "autumn",
    }
}

/// Anything that can appear in a crafting recipe.
///
/// Untagged on the wire: raw and component tags are disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Craftable {
    Raw(RawResource),
    Component(ComponentResource),
}

impl Craftable {
    pub fn as_str(self) -> &'static str {
        match self {
            Craftable::Raw(raw) => raw.as_str(),
            Craftable::Component(component) => component.as_str(),
        }
    }
}

impl From<RawResource> for Craftable {
    fn from(raw: RawResource) -> Self {
        Craftable::Raw(raw)
    }
}

impl From<ComponentResource> for Craftable {
    fn from(component: ComponentResource) -> Self {
        Craftable::Component(component)
    }
}

impl std::fmt::Display for Craftable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Craftable {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(raw) = s.parse::<RawResource>() {
            return Ok(Craftable::Raw(raw));
        }
        s.parse::<ComponentResource>()
            .map(Craftable::Component)
            .map_err(|_| UnknownTag {
                kind: "Craftable",
                tag: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Table types
// ---------------------------------------------------------------------------

/// Discrete distribution over an enumeration. Weights should sum to 1.
pub type Distribution<K> = BTreeMap<K, f64>;

/// A distribution conditioned on an outer category. Each inner map is
/// normalized on its own and may omit members that never occur.
pub type ConditionalDistribution<O, K> = BTreeMap<O, Distribution<K>>;

pub type NameTable<K> = BTreeMap<K, String>;

/// Inputs needed to craft one unit of an item.
pub type Recipe = BTreeMap<Craftable, u32>;

pub type CraftRequirements = BTreeMap<Craftable, Recipe>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarColor {
    /// Human-readable colour name.
    pub color: String,
    /// `#rrggbb`
    pub hex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    /// Base chance that a star system appears in a map cell.
    pub base_system_appear_probability: f64,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Every static table of the star map. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub content_version: String,
    pub constants: Constants,

    pub star_type_probability: Distribution<StarType>,
    pub star_type_names: NameTable<StarType>,

    pub spectral_class_distribution: Distribution<SpectralClass>,
    pub spectral_class_colors: BTreeMap<SpectralClass, StarColor>,
    pub luminosity_by_spectral_class: ConditionalDistribution<SpectralClass, LuminosityClass>,
    pub luminosity_class_names: NameTable<LuminosityClass>,

    pub black_hole_type_frequency: Distribution<BlackHoleType>,
    pub black_hole_type_names: NameTable<BlackHoleType>,

    pub raw_resource_names: NameTable<RawResource>,
    /// Base abundance per raw resource in [0, 1]. Not a distribution.
    pub raw_resource_rarity: BTreeMap<RawResource, f64>,
    pub component_resource_names: NameTable<ComponentResource>,
    /// Some entries are empty placeholders.
    pub building_resource_names: NameTable<BuildingResource>,
    pub craft_requirements: CraftRequirements,

    pub season_names: NameTable<Season>,
}

impl Catalog {
    pub fn craftable_name(&self, item: Craftable) -> Option<&str> {
        match item {
            Craftable::Raw(raw) => self.raw_resource_names.get(&raw),
            Craftable::Component(component) => self.component_resource_names.get(&component),
        }
        .map(String::as_str)
    }

    pub fn recipe(&self, item: Craftable) -> Option<&Recipe> {
        self.craft_requirements.get(&item)
    }

    pub fn sample_star_type(&self, rng: &mut impl Rng) -> Result<StarType, DistributionError> {
        sample(&self.star_type_probability, rng)
    }

    pub fn sample_black_hole_type(
        &self,
        rng: &mut impl Rng,
    ) -> Result<BlackHoleType, DistributionError> {
        sample(&self.black_hole_type_frequency, rng)
    }

    /// Draws a spectral class, then a luminosity class conditioned on it.
    pub fn sample_star_class(
        &self,
        rng: &mut impl Rng,
    ) -> Result<(SpectralClass, LuminosityClass), DistributionError> {
        let spectral = sample(&self.spectral_class_distribution, rng)?;
        let luminosity_table = self
            .luminosity_by_spectral_class
            .get(&spectral)
            .ok_or(DistributionError::Empty)?;
        let luminosity = sample(luminosity_table, rng)?;
        Ok((spectral, luminosity))
    }

    /// Deviation from 1 of every table that must be a complete distribution,
    /// labelled by table name. Luminosity maps are listed per spectral class.
    pub fn distribution_report(&self) -> Vec<(String, f64)> {
        let mut report = vec![
            (
                "star_type_probability".to_string(),
                distribution_deviation(&self.star_type_probability),
            ),
            (
                "black_hole_type_frequency".to_string(),
                distribution_deviation(&self.black_hole_type_frequency),
            ),
            (
                "spectral_class_distribution".to_string(),
                distribution_deviation(&self.spectral_class_distribution),
            ),
        ];
        for (spectral, inner) in &self.luminosity_by_spectral_class {
            report.push((
                format!("luminosity_by_spectral_class[{spectral}]"),
                distribution_deviation(inner),
            ));
        }
        report
    }
}
