use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{FoodEntry, Nutrient};

/// History row with the macro triple pulled out for display.
#[derive(Debug, Serialize)]
pub struct LogListItem {
    pub id: Uuid,
    pub name: String,
    pub calories: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbs_g: f64,
    pub nutrients: Vec<Nutrient>,
}

impl From<FoodEntry> for LogListItem {
    fn from(e: FoodEntry) -> Self {
        Self {
            protein_g: e.amount_of("Protein").round(),
            fat_g: e.amount_of("Fat").round(),
            carbs_g: e.amount_of("Carbs").round(),
            id: e.id,
            name: e.name,
            calories: e.calories,
            timestamp: e.timestamp,
            nutrients: e.nutrients,
        }
    }
}
