use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nutrition::RdaTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sex {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// TDEE multiplier applied on top of BMR.
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    WeightLoss,
    Maintenance,
    MuscleGain,
    DeficiencyManagement,
}

impl Goal {
    /// Flat kcal adjustment applied to TDEE.
    pub fn kcal_adjustment(self) -> f64 {
        match self {
            Goal::WeightLoss => -500.0,
            Goal::MuscleGain => 300.0,
            Goal::Maintenance | Goal::DeficiencyManagement => 0.0,
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Other => "other",
        })
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Goal::WeightLoss => "weight-loss",
            Goal::Maintenance => "maintenance",
            Goal::MuscleGain => "muscle-gain",
            Goal::DeficiencyManagement => "deficiency-management",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub age: u32,
    pub sex: Sex,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            age: 28,
            sex: Sex::Male,
            weight_kg: 75.0,
            height_cm: 180.0,
            activity_level: ActivityLevel::Moderate,
            goal: Goal::MuscleGain,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("age must be a positive number of years")]
    Age,
    #[error("weight must be a positive number of kilograms")]
    Weight,
    #[error("height must be a positive number of centimetres")]
    Height,
}

impl Profile {
    /// Checks the ranges the RDA calculator relies on.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.age == 0 {
            return Err(ProfileError::Age);
        }
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(ProfileError::Weight);
        }
        if !(self.height_cm.is_finite() && self.height_cm > 0.0) {
            return Err(ProfileError::Height);
        }
        Ok(())
    }
}

/// Profile together with the targets derived from it.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub rda: RdaTarget,
}
