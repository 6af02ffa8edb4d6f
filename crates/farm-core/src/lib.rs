#![deny(warnings)]

//! Core domain models and invariants for the colony farmland planner.
//!
//! This crate defines the serializable reference data (crops, soils, meal
//! types) bundled into a read-only [`Catalog`], plus validation helpers that
//! guarantee the invariants the calculator relies on.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use thiserror::Error;

/// Daily nutrition one colonist needs.
pub const NUTRITION_PER_PERSON_PER_DAY: f64 = 1.6;
/// Nutrition units obtained from one unit of raw crop yield.
pub const NUTRITION_PER_YIELD: f64 = 0.05;
/// Production-loss margin applied on top of the bare tile requirement.
pub const SAFETY_MARGIN: f64 = 1.05;
/// Days in a game year, used for colony-wide sizing.
pub const DEFAULT_YEAR_DAYS: u32 = 60;
/// Game data version the built-in catalog was taken from.
pub const REFERENCE_DATA_VERSION: &str = "1.5.4069";

/// Unique identifier for a crop, e.g. "potato".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CropId(pub String);

/// Unique identifier for a soil type, e.g. "rich_soil".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoilId(pub String);

impl CropId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl SoilId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// How a crop fares on a particular soil.
///
/// Written in catalog files as a plain number of days or `not_growable`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "GrowthRepr", into = "GrowthRepr")]
pub enum Growth {
    /// Days needed to reach maturity.
    Days(f64),
    /// The crop cannot be planted on this soil.
    NotGrowable,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum GrowthRepr {
    Days(f64),
    Marker(GrowthMarker),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum GrowthMarker {
    NotGrowable,
}

impl From<GrowthRepr> for Growth {
    fn from(r: GrowthRepr) -> Self {
        match r {
            GrowthRepr::Days(d) => Growth::Days(d),
            GrowthRepr::Marker(GrowthMarker::NotGrowable) => Growth::NotGrowable,
        }
    }
}

impl From<Growth> for GrowthRepr {
    fn from(g: Growth) -> Self {
        match g {
            Growth::Days(d) => GrowthRepr::Days(d),
            Growth::NotGrowable => GrowthRepr::Marker(GrowthMarker::NotGrowable),
        }
    }
}

/// A plantable crop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    /// Crop identifier.
    pub id: CropId,
    /// Display name.
    pub name: String,
    /// How strongly soil fertility affects yield (0 = not at all, 1 = fully).
    pub fertility_sensitivity: f64,
    /// Yield units per harvest at neutral fertility (> 0).
    pub base_yield: f64,
    /// Growth duration per soil. Soils missing here are not growable.
    #[serde(default)]
    pub growth: BTreeMap<SoilId, Growth>,
}

impl Crop {
    /// Growth entry for `soil`; absent keys count as [`Growth::NotGrowable`].
    pub fn growth_on(&self, soil: &SoilId) -> Growth {
        self.growth
            .get(soil)
            .copied()
            .unwrap_or(Growth::NotGrowable)
    }
}

/// A soil type a crop can be planted on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Soil {
    /// Soil identifier.
    pub id: SoilId,
    /// Display name.
    pub name: String,
    /// Fertility multiplier (1.0 = baseline, > 0).
    pub fertility: f64,
}

/// A rule converting raw nutrition into meals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealType {
    /// Meal name, unique within a catalog.
    pub name: String,
    /// Raw nutrition consumed per meal cooked (> 0).
    pub input: f64,
    /// Nutrition a meal supplies when eaten (>= 0).
    pub output: f64,
}

fn default_year_days() -> u32 {
    DEFAULT_YEAR_DAYS
}

/// Read-only reference tables shared by every calculation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Plantable crops, in menu order.
    pub crops: Vec<Crop>,
    /// Soil types, in menu order.
    pub soils: Vec<Soil>,
    /// Meal conversions evaluated against every result.
    #[serde(default)]
    pub meals: Vec<MealType>,
    /// Days in a year used for colony-wide sizing.
    #[serde(default = "default_year_days")]
    pub year_days: u32,
}

impl Catalog {
    /// Look up a crop by id.
    pub fn crop(&self, id: &CropId) -> Option<&Crop> {
        self.crops.iter().find(|c| &c.id == id)
    }

    /// Look up a soil by id.
    pub fn soil(&self, id: &SoilId) -> Option<&Soil> {
        self.soils.iter().find(|s| &s.id == id)
    }

    /// The built-in crop, soil and meal tables.
    pub fn reference() -> Self {
        fn crop(id: &str, name: &str, sensitivity: f64, base_yield: f64, days: [Option<f64>; 4]) -> Crop {
            let soils = ["gravel", "soil", "rich_soil", "hydroponics"];
            let growth = soils
                .iter()
                .zip(days)
                .map(|(soil, d)| {
                    let g = d.map(Growth::Days).unwrap_or(Growth::NotGrowable);
                    (SoilId::new(*soil), g)
                })
                .collect();
            Crop {
                id: CropId::new(id),
                name: name.to_string(),
                fertility_sensitivity: sensitivity,
                base_yield,
                growth,
            }
        }
        fn soil(id: &str, name: &str, fertility: f64) -> Soil {
            Soil {
                id: SoilId::new(id),
                name: name.to_string(),
                fertility,
            }
        }

        Catalog {
            crops: vec![
                crop("potato", "Potato", 0.4, 11.0, [Some(12.17), Some(10.71), Some(9.23), Some(6.23)]),
                crop("corn", "Corn", 1.0, 22.0, [Some(29.8), Some(20.86), Some(14.9), None]),
                crop("rice", "Rice", 1.0, 6.0, [Some(7.91), Some(5.54), Some(3.96), Some(1.98)]),
            ],
            soils: vec![
                soil("gravel", "Gravel", 0.7),
                soil("soil", "Soil", 1.0),
                soil("rich_soil", "Rich soil", 1.4),
                soil("hydroponics", "Hydroponics basin", 2.8),
            ],
            meals: vec![
                MealType {
                    name: "simple meal".to_string(),
                    input: 0.5,
                    output: 0.9,
                },
                MealType {
                    name: "nutrient paste meal".to_string(),
                    input: 0.3,
                    output: 0.9,
                },
            ],
            year_days: DEFAULT_YEAR_DAYS,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::reference()
    }
}

/// Validation errors for inputs and catalog invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A count that must be at least one was zero.
    #[error("{field} must be a positive integer")]
    NonPositive { field: &'static str },
    /// Operator input outside the accepted range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: u32,
        max: u32,
    },
    /// Tile count below zero.
    #[error("tile count must not be negative, got {0}")]
    NegativeTiles(i64),
    /// Crop id not present in the catalog.
    #[error("unknown crop: {0}")]
    UnknownCrop(String),
    /// Soil id not present in the catalog.
    #[error("unknown soil: {0}")]
    UnknownSoil(String),
    /// Crop growth table references a soil the catalog lacks.
    #[error("crop {crop} references unknown soil {soil}")]
    UnknownSoilRef { crop: String, soil: String },
    /// Two catalog entries share an id.
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },
    /// Numeric catalog field is NaN or infinite.
    #[error("non-finite value for {0}")]
    NonFinite(String),
    /// Catalog field that must be strictly positive.
    #[error("{0} must be > 0")]
    NonPositiveValue(String),
    /// Catalog field that must not be negative.
    #[error("{0} must be >= 0")]
    NegativeValue(String),
    /// Crop or soil table is empty.
    #[error("catalog has no {0}")]
    EmptyCatalog(&'static str),
    /// Entry with a blank display name.
    #[error("{kind} {id} has an empty name")]
    EmptyName { kind: &'static str, id: String },
    /// Year length of zero days.
    #[error("year_days must be > 0")]
    ZeroYearDays,
}

/// Bounds the front ends accept for operator input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLimits {
    /// Accepted colonist counts.
    pub population: RangeInclusive<u32>,
    /// Accepted growing-season lengths in days.
    pub growing_days: RangeInclusive<u32>,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            population: 1..=1000,
            growing_days: 1..=DEFAULT_YEAR_DAYS,
        }
    }
}

fn check_range(
    field: &'static str,
    value: i64,
    range: &RangeInclusive<u32>,
) -> Result<u32, ValidationError> {
    let (min, max) = (*range.start(), *range.end());
    if value < i64::from(min) || value > i64::from(max) {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    // Within a u32 range, so the cast is lossless.
    Ok(value as u32)
}

impl InputLimits {
    /// Check a raw population entry against the limits.
    pub fn population(&self, value: i64) -> Result<u32, ValidationError> {
        check_range("population", value, &self.population)
    }

    /// Check a raw growing-days entry against the limits.
    pub fn growing_days(&self, value: i64) -> Result<u32, ValidationError> {
        check_range("growing_days", value, &self.growing_days)
    }
}

/// Require a strictly positive count.
pub fn require_positive(field: &'static str, value: u32) -> Result<u32, ValidationError> {
    if value == 0 {
        return Err(ValidationError::NonPositive { field });
    }
    Ok(value)
}

fn positive(label: String, v: f64) -> Result<(), ValidationError> {
    if !v.is_finite() {
        return Err(ValidationError::NonFinite(label));
    }
    if v <= 0.0 {
        return Err(ValidationError::NonPositiveValue(label));
    }
    Ok(())
}

fn non_negative(label: String, v: f64) -> Result<(), ValidationError> {
    if !v.is_finite() {
        return Err(ValidationError::NonFinite(label));
    }
    if v < 0.0 {
        return Err(ValidationError::NegativeValue(label));
    }
    Ok(())
}

/// Validate a soil.
pub fn validate_soil(s: &Soil) -> Result<(), ValidationError> {
    if s.name.trim().is_empty() {
        return Err(ValidationError::EmptyName {
            kind: "soil",
            id: s.id.0.clone(),
        });
    }
    positive(format!("soil {} fertility", s.id.0), s.fertility)
}

/// Validate a crop's own numbers (not its soil references).
pub fn validate_crop(c: &Crop) -> Result<(), ValidationError> {
    if c.name.trim().is_empty() {
        return Err(ValidationError::EmptyName {
            kind: "crop",
            id: c.id.0.clone(),
        });
    }
    non_negative(
        format!("crop {} fertility_sensitivity", c.id.0),
        c.fertility_sensitivity,
    )?;
    positive(format!("crop {} base_yield", c.id.0), c.base_yield)?;
    for (soil, growth) in &c.growth {
        if let Growth::Days(d) = growth {
            positive(format!("crop {} growth on {}", c.id.0, soil.0), *d)?;
        }
    }
    Ok(())
}

/// Validate a meal type.
pub fn validate_meal(m: &MealType) -> Result<(), ValidationError> {
    if m.name.trim().is_empty() {
        return Err(ValidationError::EmptyName {
            kind: "meal",
            id: m.name.clone(),
        });
    }
    positive(format!("meal {} input", m.name), m.input)?;
    non_negative(format!("meal {} output", m.name), m.output)
}

/// Validate the whole catalog, including cross-references from crops to soils.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), ValidationError> {
    if catalog.crops.is_empty() {
        return Err(ValidationError::EmptyCatalog("crops"));
    }
    if catalog.soils.is_empty() {
        return Err(ValidationError::EmptyCatalog("soils"));
    }
    if catalog.year_days == 0 {
        return Err(ValidationError::ZeroYearDays);
    }

    let mut soil_ids: BTreeSet<&SoilId> = BTreeSet::new();
    for s in &catalog.soils {
        validate_soil(s)?;
        if !soil_ids.insert(&s.id) {
            return Err(ValidationError::DuplicateId {
                kind: "soil",
                id: s.id.0.clone(),
            });
        }
    }

    let mut crop_ids: BTreeSet<&CropId> = BTreeSet::new();
    for c in &catalog.crops {
        validate_crop(c)?;
        if !crop_ids.insert(&c.id) {
            return Err(ValidationError::DuplicateId {
                kind: "crop",
                id: c.id.0.clone(),
            });
        }
        for soil in c.growth.keys() {
            if !soil_ids.contains(soil) {
                return Err(ValidationError::UnknownSoilRef {
                    crop: c.id.0.clone(),
                    soil: soil.0.clone(),
                });
            }
        }
    }

    let mut meal_names: BTreeSet<&str> = BTreeSet::new();
    for m in &catalog.meals {
        validate_meal(m)?;
        if !meal_names.insert(m.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                kind: "meal",
                id: m.name.clone(),
            });
        }
    }
    Ok(())
}
