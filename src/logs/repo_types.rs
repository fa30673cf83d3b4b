use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientCategory {
    Macro,
    Micro,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub category: NutrientCategory,
}

impl Nutrient {
    pub fn macro_g(name: &str, amount: f64) -> Self {
        Self {
            name: name.to_string(),
            amount,
            unit: "g".into(),
            category: NutrientCategory::Macro,
        }
    }

    pub fn micro(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
            category: NutrientCategory::Micro,
        }
    }
}

/// One logged instance of food consumption. Never mutated once logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: Uuid,
    pub name: String,
    pub calories: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub nutrients: Vec<Nutrient>,
}

impl FoodEntry {
    pub fn new(
        name: impl Into<String>,
        calories: f64,
        timestamp: OffsetDateTime,
        nutrients: Vec<Nutrient>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            calories,
            timestamp,
            nutrients,
        }
    }

    /// Amount of the first nutrient whose name matches exactly, or zero.
    pub fn amount_of(&self, name: &str) -> f64 {
        self.nutrients
            .iter()
            .find(|n| n.name == name)
            .map(|n| n.amount)
            .unwrap_or(0.0)
    }
}
