//! Daily targets derived from a [`Profile`].
//!
//! Energy uses the revised Harris-Benedict BMR scaled by an activity
//! multiplier, shifted by a flat goal adjustment. Macros are fixed shares of
//! the adjusted energy; micronutrient targets do not depend on the profile.

use serde::Serialize;

use crate::profile::{Profile, Sex};

pub const FIBER_G: f64 = 30.0;
pub const VITAMIN_A_UG: f64 = 900.0;
pub const VITAMIN_C_MG: f64 = 90.0;
pub const IRON_MG: f64 = 18.0;
pub const CALCIUM_MG: f64 = 1000.0;
pub const POTASSIUM_MG: f64 = 3500.0;

const PROTEIN_SHARE: f64 = 0.25;
const FAT_SHARE: f64 = 0.25;
const CARBS_SHARE: f64 = 0.50;
const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;
const KCAL_PER_G_CARBS: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RdaTarget {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub fiber: f64,
    pub vitamin_a: f64,
    pub vitamin_c: f64,
    pub iron: f64,
    pub calcium: f64,
    pub potassium: f64,
}

/// Unrounded intermediate energy values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyBreakdown {
    pub bmr: f64,
    pub tdee: f64,
    pub adjusted_kcal: f64,
}

fn bmr_male(p: &Profile) -> f64 {
    88.362 + 13.397 * p.weight_kg + 4.799 * p.height_cm - 5.677 * f64::from(p.age)
}

fn bmr_female(p: &Profile) -> f64 {
    447.593 + 9.247 * p.weight_kg + 3.098 * p.height_cm - 4.330 * f64::from(p.age)
}

pub fn basal_metabolic_rate(p: &Profile) -> f64 {
    match p.sex {
        Sex::Male => bmr_male(p),
        Sex::Female => bmr_female(p),
        // No sex-specific equation: take the midpoint of both.
        Sex::Other => (bmr_male(p) + bmr_female(p)) / 2.0,
    }
}

pub fn energy_breakdown(p: &Profile) -> EnergyBreakdown {
    let bmr = basal_metabolic_rate(p);
    let tdee = bmr * p.activity_level.multiplier();
    EnergyBreakdown {
        bmr,
        tdee,
        adjusted_kcal: tdee + p.goal.kcal_adjustment(),
    }
}

pub fn calculate_rda(p: &Profile) -> RdaTarget {
    let kcal = energy_breakdown(p).adjusted_kcal;
    RdaTarget {
        calories: kcal.round(),
        protein: (kcal * PROTEIN_SHARE / KCAL_PER_G_PROTEIN).round(),
        fat: (kcal * FAT_SHARE / KCAL_PER_G_FAT).round(),
        carbs: (kcal * CARBS_SHARE / KCAL_PER_G_CARBS).round(),
        fiber: FIBER_G,
        vitamin_a: VITAMIN_A_UG,
        vitamin_c: VITAMIN_C_MG,
        iron: IRON_MG,
        calcium: CALCIUM_MG,
        potassium: POTASSIUM_MG,
    }
}
