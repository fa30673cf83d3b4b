use serde::Serialize;

use super::aggregate::DailyTotals;
use super::rda::RdaTarget;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientProgress {
    pub label: &'static str,
    pub current: f64,
    pub target: f64,
    pub unit: &'static str,
    /// Share of target reached, capped at 100.
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalorieProgress {
    pub consumed: f64,
    pub target: f64,
    pub remaining: f64,
    /// Uncapped share of the calorie target.
    pub goal_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    pub calories: CalorieProgress,
    pub macros: Vec<NutrientProgress>,
    pub micros: Vec<NutrientProgress>,
}

fn ratio_percent(current: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    (current / target * 100.0).round().max(0.0)
}

fn bar(label: &'static str, current: f64, target: f64, unit: &'static str) -> NutrientProgress {
    let current = current.round();
    NutrientProgress {
        label,
        current,
        target,
        unit,
        percent: ratio_percent(current, target).min(100.0) as u32,
    }
}

pub fn build_progress(totals: &DailyTotals, rda: &RdaTarget) -> ProgressReport {
    ProgressReport {
        calories: CalorieProgress {
            consumed: totals.calories,
            target: rda.calories,
            remaining: (rda.calories - totals.calories).max(0.0),
            goal_percent: ratio_percent(totals.calories, rda.calories) as u32,
        },
        macros: vec![
            bar("Protein", totals.protein, rda.protein, "g"),
            bar("Fats", totals.fat, rda.fat, "g"),
            bar("Carbs", totals.carbs, rda.carbs, "g"),
        ],
        micros: vec![
            bar("Vitamin A", totals.vitamin_a, rda.vitamin_a, "µg"),
            bar("Vitamin C", totals.vitamin_c, rda.vitamin_c, "mg"),
            bar("Iron", totals.iron, rda.iron, "mg"),
            bar("Calcium", totals.calcium, rda.calcium, "mg"),
            bar("Potassium", totals.potassium, rda.potassium, "mg"),
        ],
    }
}
