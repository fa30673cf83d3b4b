use std::ops::Add;

use serde::Serialize;
use time::{OffsetDateTime, Time};

use crate::logs::FoodEntry;

/// Per-nutrient sums over one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub vitamin_a: f64,
    pub vitamin_c: f64,
    pub iron: f64,
    pub calcium: f64,
    pub potassium: f64,
}

impl Add for DailyTotals {
    type Output = DailyTotals;

    fn add(self, o: DailyTotals) -> DailyTotals {
        DailyTotals {
            calories: self.calories + o.calories,
            protein: self.protein + o.protein,
            fat: self.fat + o.fat,
            carbs: self.carbs + o.carbs,
            vitamin_a: self.vitamin_a + o.vitamin_a,
            vitamin_c: self.vitamin_c + o.vitamin_c,
            iron: self.iron + o.iron,
            calcium: self.calcium + o.calcium,
            potassium: self.potassium + o.potassium,
        }
    }
}

impl DailyTotals {
    /// Adds one entry's calories and recognised nutrients.
    pub fn absorb(&mut self, entry: &FoodEntry) {
        self.calories += entry.calories;
        for n in &entry.nutrients {
            if let Some(bucket) = self.bucket_mut(&n.name) {
                *bucket += n.amount;
            }
        }
    }

    // Vitamins match on substring so qualified names ("Vitamin C (ascorbic acid)") count.
    fn bucket_mut(&mut self, name: &str) -> Option<&mut f64> {
        let name = name.to_lowercase();
        match name.as_str() {
            "protein" => Some(&mut self.protein),
            "fat" => Some(&mut self.fat),
            "carbs" => Some(&mut self.carbs),
            "iron" => Some(&mut self.iron),
            "calcium" => Some(&mut self.calcium),
            "potassium" => Some(&mut self.potassium),
            n if n.contains("vitamin a") => Some(&mut self.vitamin_a),
            n if n.contains("vitamin c") => Some(&mut self.vitamin_c),
            _ => None,
        }
    }
}

/// Local midnight of the day containing `now`, in `now`'s offset.
pub fn start_of_day(now: OffsetDateTime) -> OffsetDateTime {
    now.replace_time(Time::MIDNIGHT)
}

pub fn aggregate_day(entries: &[FoodEntry], now: OffsetDateTime) -> DailyTotals {
    let since = start_of_day(now);
    entries
        .iter()
        .filter(|e| e.timestamp >= since)
        .fold(DailyTotals::default(), |mut acc, e| {
            acc.absorb(e);
            acc
        })
}
