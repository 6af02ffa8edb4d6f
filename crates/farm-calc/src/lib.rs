#![deny(warnings)]

//! Farmland sizing: how many tiles of a crop feed a colony.
//!
//! This crate provides:
//! - The yield model (fertility interpolation, harvest count, per-tile yield)
//! - Nutrition-to-tiles conversion with a production safety margin
//! - Meal production statistics for every meal type in the catalog
//! - A near-square layout search for the resulting tile count

use farm_core::{
    require_positive, Catalog, Crop, CropId, Growth, Soil, SoilId, ValidationError,
    NUTRITION_PER_PERSON_PER_DAY, NUTRITION_PER_YIELD, SAFETY_MARGIN,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

mod layout;

pub use layout::{
    layout_score, optimal_layout, scan_bound, try_optimal_layout, Cell, Layout, WASTE_WEIGHT,
};

/// Errors produced by a farm calculation.
#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    /// The crop has no growth entry for the soil.
    #[error("{crop} cannot be grown on {soil}")]
    IncompatibleCropSoil { crop: String, soil: String },
    /// The season is shorter than one growth cycle.
    #[error("{crop} needs {required} days to grow, but the season only has {available}")]
    InsufficientGrowingSeason {
        crop: String,
        required: f64,
        available: u32,
    },
    /// Fertility and sensitivity combine to a yield of zero or less.
    #[error("{crop} yields nothing on {soil}")]
    NoYield { crop: String, soil: String },
    /// Input or catalog lookup failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Production figures for one meal type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealStats {
    /// Meals that can be cooked from a year's harvest.
    pub total_meals: u64,
    /// Average meals per day, one decimal.
    pub daily_meals: f64,
    /// Colonists those meals feed for the year, one decimal.
    pub supported_population: f64,
}

impl MealStats {
    /// Whether the meals feed at least `population` colonists.
    pub fn is_sufficient(&self, population: u32) -> bool {
        self.supported_population >= f64::from(population)
    }

    /// Share of `population` fed, capped at 100.
    pub fn coverage_percent(&self, population: u32) -> f64 {
        if population == 0 {
            return 100.0;
        }
        (self.supported_population / f64::from(population) * 100.0).min(100.0)
    }
}

/// Outcome of sizing a farm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FarmResult {
    /// Crop display name.
    pub crop_name: String,
    /// Soil display name.
    pub soil_name: String,
    /// Tiles to plant, including the safety margin.
    pub tiles: u64,
    /// Harvests per growing season.
    pub harvests: u32,
    /// Recommended arrangement of the tiles.
    pub layout: Layout,
    /// Yield of one tile over the season.
    pub per_tile_yield: f64,
    /// Yield of the whole farm over the season.
    pub annual_yield: f64,
    /// Nutrition the whole farm produces.
    pub total_nutrition: f64,
    /// Statistics keyed by meal name.
    pub meals: BTreeMap<String, MealStats>,
}

/// Round to one decimal from the exact binary value, ties to even.
///
/// Only quarters (`.25`, `.75`) are exact ties at one decimal; everything
/// else goes through exact decimal formatting.
fn round1(x: f64) -> f64 {
    let frac = x.fract().abs();
    if frac == 0.25 || frac == 0.75 {
        let tenths = x * 10.0;
        let lo = tenths.floor();
        let even = if lo % 2.0 == 0.0 { lo } else { lo + 1.0 };
        return even / 10.0;
    }
    format!("{x:.1}").parse().unwrap_or(x)
}

/// Fertility multiplier a crop actually gets from a soil.
///
/// Sensitivity 0 ignores the soil, 1 takes its fertility as-is, and values
/// above 1 amplify it.
pub fn effective_fertility(crop: &Crop, soil: &Soil) -> f64 {
    1.0 + (soil.fertility - 1.0) * crop.fertility_sensitivity
}

/// Nutrition a colony of `population` needs over `year_days`.
pub fn nutrition_needed(population: u32, year_days: u32) -> f64 {
    f64::from(population) * NUTRITION_PER_PERSON_PER_DAY * f64::from(year_days)
}

/// Smallest tile count whose yield covers `nutrition` after the safety margin.
pub fn tiles_required(nutrition: f64, per_tile_yield: f64) -> u64 {
    (nutrition / (per_tile_yield * NUTRITION_PER_YIELD) * SAFETY_MARGIN).ceil() as u64
}

fn meal_stats(catalog: &Catalog, total_nutrition: f64) -> BTreeMap<String, MealStats> {
    let year = f64::from(catalog.year_days);
    catalog
        .meals
        .iter()
        .map(|meal| {
            let total_meals = (total_nutrition / meal.input).floor() as u64;
            let fed = total_meals as f64 * meal.output;
            let stats = MealStats {
                total_meals,
                daily_meals: round1(total_meals as f64 / year),
                supported_population: round1(fed / (NUTRITION_PER_PERSON_PER_DAY * year)),
            };
            (meal.name.clone(), stats)
        })
        .collect()
}

/// Size a farm of `crop` on `soil` feeding `population` over a season of
/// `growing_days`.
///
/// Fails when either count is zero, when the crop cannot grow on the soil,
/// or when one growth cycle does not fit into the season.
pub fn calculate(
    catalog: &Catalog,
    crop: &Crop,
    soil: &Soil,
    population: u32,
    growing_days: u32,
) -> Result<FarmResult, CalcError> {
    require_positive("population", population)?;
    require_positive("growing_days", growing_days)?;

    let growth_days = match crop.growth_on(&soil.id) {
        Growth::Days(d) => d,
        Growth::NotGrowable => {
            return Err(CalcError::IncompatibleCropSoil {
                crop: crop.name.clone(),
                soil: soil.name.clone(),
            })
        }
    };
    if growth_days > f64::from(growing_days) {
        return Err(CalcError::InsufficientGrowingSeason {
            crop: crop.name.clone(),
            required: growth_days,
            available: growing_days,
        });
    }

    let fertility = effective_fertility(crop, soil);
    let harvests = (f64::from(growing_days) / growth_days).floor() as u32;
    let per_tile_yield = crop.base_yield * f64::from(harvests) * fertility;
    if !(per_tile_yield.is_finite() && per_tile_yield > 0.0) {
        return Err(CalcError::NoYield {
            crop: crop.name.clone(),
            soil: soil.name.clone(),
        });
    }

    let needed = nutrition_needed(population, catalog.year_days);
    let tiles = tiles_required(needed, per_tile_yield);
    let annual_yield = per_tile_yield * tiles as f64;
    let total_nutrition = annual_yield * NUTRITION_PER_YIELD;
    debug!(
        crop = %crop.id.0,
        soil = %soil.id.0,
        fertility,
        harvests,
        per_tile_yield,
        tiles,
        "sized farm"
    );

    Ok(FarmResult {
        crop_name: crop.name.clone(),
        soil_name: soil.name.clone(),
        tiles,
        harvests,
        layout: optimal_layout(tiles),
        per_tile_yield,
        annual_yield,
        total_nutrition,
        meals: meal_stats(catalog, total_nutrition),
    })
}

/// [`calculate`] with crop and soil looked up by id.
pub fn calculate_by_id(
    catalog: &Catalog,
    crop: &CropId,
    soil: &SoilId,
    population: u32,
    growing_days: u32,
) -> Result<FarmResult, CalcError> {
    let crop = catalog
        .crop(crop)
        .ok_or_else(|| ValidationError::UnknownCrop(crop.0.clone()))?;
    let soil = catalog
        .soil(soil)
        .ok_or_else(|| ValidationError::UnknownSoil(soil.0.clone()))?;
    calculate(catalog, crop, soil, population, growing_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(crop: &str, soil: &str, population: u32, days: u32) -> Result<FarmResult, CalcError> {
        let catalog = Catalog::reference();
        calculate_by_id(
            &catalog,
            &CropId::new(crop),
            &SoilId::new(soil),
            population,
            days,
        )
    }

    #[test]
    fn potato_on_soil_for_five() {
        let r = run("potato", "soil", 5, 60).unwrap();
        assert_eq!(r.crop_name, "Potato");
        assert_eq!(r.soil_name, "Soil");
        assert_eq!(r.harvests, 5);
        assert_eq!(r.per_tile_yield, 55.0);
        assert_eq!(r.tiles, 184);
        assert_eq!(r.annual_yield, 55.0 * 184.0);
        assert_eq!(r.layout, optimal_layout(184));

        let simple = &r.meals["simple meal"];
        assert_eq!(simple.total_meals, 1012);
        assert_eq!(simple.daily_meals, 16.9);
        assert_eq!(simple.supported_population, 9.5);
        assert!(simple.is_sufficient(5));
        assert_eq!(simple.coverage_percent(5), 100.0);

        let paste = &r.meals["nutrient paste meal"];
        assert_eq!(paste.total_meals, 1686);
        assert_eq!(paste.daily_meals, 28.1);
        assert_eq!(paste.supported_population, 15.8);
    }

    #[test]
    fn one_decimal_rounding_uses_exact_value() {
        // 13.45 and 28.35 are stored just below the tie.
        assert_eq!(round1(807.0 / 60.0), 13.4);
        assert_eq!(round1(3024.0 * 0.9 / 96.0), 28.3);
        assert_eq!(round1(1.25), 1.2);
        assert_eq!(round1(1.75), 1.8);
        assert_eq!(round1(16.866), 16.9);
        assert_eq!(round1(28.1), 28.1);
    }

    #[test]
    fn meal_stats_round_like_the_tables() {
        let catalog = Catalog::reference();
        let stats = meal_stats(&catalog, 403.5);
        assert_eq!(stats["simple meal"].total_meals, 807);
        assert_eq!(stats["simple meal"].daily_meals, 13.4);

        let stats = meal_stats(&catalog, 1512.0);
        assert_eq!(stats["simple meal"].total_meals, 3024);
        assert_eq!(stats["simple meal"].daily_meals, 50.4);
        assert_eq!(stats["simple meal"].supported_population, 28.3);
    }

    #[test]
    fn missing_growth_entry_is_incompatible() {
        let catalog = Catalog::reference();
        let soil = catalog.soil(&SoilId::new("rich_soil")).unwrap();
        let mut crop = catalog.crop(&CropId::new("potato")).unwrap().clone();
        crop.growth.remove(&soil.id);
        assert_eq!(
            calculate(&catalog, &crop, soil, 5, 60),
            Err(CalcError::IncompatibleCropSoil {
                crop: "Potato".into(),
                soil: "Rich soil".into()
            })
        );
    }

    #[test]
    fn fertility_interpolates_and_extrapolates() {
        let catalog = Catalog::reference();
        let rich = catalog.soil(&SoilId::new("rich_soil")).unwrap();
        let mut crop = catalog.crop(&CropId::new("potato")).unwrap().clone();
        assert!((effective_fertility(&crop, rich) - 1.16).abs() < 1e-12);
        crop.fertility_sensitivity = 0.0;
        assert_eq!(effective_fertility(&crop, rich), 1.0);
        crop.fertility_sensitivity = 2.0;
        assert!((effective_fertility(&crop, rich) - 1.8).abs() < 1e-12);
    }

    #[test]
    fn corn_in_hydroponics_is_incompatible() {
        assert_eq!(
            run("corn", "hydroponics", 10, 60),
            Err(CalcError::IncompatibleCropSoil {
                crop: "Corn".into(),
                soil: "Hydroponics basin".into()
            })
        );
    }

    #[test]
    fn short_season_is_rejected() {
        let err = run("corn", "gravel", 10, 20).unwrap_err();
        assert_eq!(
            err,
            CalcError::InsufficientGrowingSeason {
                crop: "Corn".into(),
                required: 29.8,
                available: 20
            }
        );
        assert_eq!(
            err.to_string(),
            "Corn needs 29.8 days to grow, but the season only has 20"
        );
    }

    #[test]
    fn zero_inputs_fail_validation() {
        assert_eq!(
            run("rice", "soil", 0, 30),
            Err(CalcError::Validation(ValidationError::NonPositive {
                field: "population"
            }))
        );
        assert_eq!(
            run("rice", "soil", 3, 0),
            Err(CalcError::Validation(ValidationError::NonPositive {
                field: "growing_days"
            }))
        );
    }

    #[test]
    fn unknown_ids_fail_validation() {
        assert_eq!(
            run("cactus", "soil", 3, 30),
            Err(CalcError::Validation(ValidationError::UnknownCrop(
                "cactus".into()
            )))
        );
        assert_eq!(
            run("rice", "lava", 3, 30),
            Err(CalcError::Validation(ValidationError::UnknownSoil(
                "lava".into()
            )))
        );
    }

    #[test]
    fn hypersensitive_crop_on_poor_soil_yields_nothing() {
        let catalog = Catalog::reference();
        let gravel = catalog.soil(&SoilId::new("gravel")).unwrap();
        let mut crop = catalog.crop(&CropId::new("rice")).unwrap().clone();
        crop.fertility_sensitivity = 4.0;
        assert_eq!(
            calculate(&catalog, &crop, gravel, 5, 60),
            Err(CalcError::NoYield {
                crop: "Rice".into(),
                soil: "Gravel".into()
            })
        );
    }

    #[test]
    fn substitute_catalog_year_length_is_used() {
        let mut catalog = Catalog::reference();
        catalog.year_days = 120;
        let long = calculate_by_id(&catalog, &CropId::new("potato"), &SoilId::new("soil"), 5, 60)
            .unwrap();
        let short = run("potato", "soil", 5, 60).unwrap();
        assert_eq!(long.harvests, short.harvests);
        assert!(long.tiles > short.tiles);
    }

    #[test]
    fn result_serializes_with_layout() {
        let r = run("rice", "hydroponics", 12, 30).unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["tiles"], r.tiles);
        assert_eq!(json["layout"]["kind"], "grid");
    }

    proptest! {
        #[test]
        fn valid_inputs_give_positive_results(
            crop in 0usize..3,
            soil in 0usize..4,
            population in 1u32..=1000,
            days in 1u32..=60,
        ) {
            let catalog = Catalog::reference();
            let c = &catalog.crops[crop];
            let s = &catalog.soils[soil];
            match calculate(&catalog, c, s, population, days) {
                Ok(r) => {
                    prop_assert!(r.harvests >= 1);
                    prop_assert!(r.tiles >= 1);
                    let (w, h) = r.layout.dimensions().unwrap();
                    prop_assert!(w * h >= r.tiles);
                    // Margin-adjusted production covers the need.
                    let need = nutrition_needed(population, catalog.year_days);
                    prop_assert!(r.total_nutrition >= need);
                }
                Err(CalcError::IncompatibleCropSoil { .. }) => {
                    prop_assert_eq!(c.growth_on(&s.id), Growth::NotGrowable);
                }
                Err(CalcError::InsufficientGrowingSeason { required, available, .. }) => {
                    prop_assert!(required > f64::from(available));
                }
                Err(e) => prop_assert!(false, "unexpected error: {e}"),
            }
        }

        #[test]
        fn tiles_are_the_smallest_that_cover_the_margin(
            crop in 0usize..3,
            soil in 0usize..4,
            population in 1u32..=1000,
            days in 1u32..=60,
        ) {
            let catalog = Catalog::reference();
            if let Ok(r) = calculate(&catalog, &catalog.crops[crop], &catalog.soils[soil], population, days) {
                let target = nutrition_needed(population, catalog.year_days) * SAFETY_MARGIN;
                let per_tile = r.per_tile_yield * NUTRITION_PER_YIELD;
                let eps = target * 1e-9;
                prop_assert!(r.tiles as f64 * per_tile >= target - eps);
                if r.tiles > 1 {
                    prop_assert!((r.tiles - 1) as f64 * per_tile < target + eps);
                }
            }
        }

        #[test]
        fn calculation_is_idempotent(population in 1u32..=1000, days in 10u32..=60) {
            let a = run("potato", "rich_soil", population, days).unwrap();
            let b = run("potato", "rich_soil", population, days).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn tiles_monotonic_in_population(population in 1u32..1000, extra in 1u32..200) {
            let small = run("rice", "soil", population, 60).unwrap();
            let large = run("rice", "soil", population + extra, 60).unwrap();
            prop_assert!(large.tiles >= small.tiles);
        }
    }
}
