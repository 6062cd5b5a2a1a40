use serde::{Deserialize, Serialize};

/// Goals and body metrics as reported by the profile backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileMetrics {
    pub weight: f64,
    pub height: f64,
    pub calorie_goal: f64,
    pub protein_goal: f64,
    pub carbs_goal: f64,
    pub fat_goal: f64,
}

/// One day of logged intake; `date` is `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyNutrition {
    pub date: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub metrics: ProfileMetrics,
    #[serde(default)]
    pub daily_nutrition: Vec<DailyNutrition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub ok: bool,
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Percent of each daily goal reached, rounded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NutritionProgress {
    pub calories_percent: i64,
    pub protein_percent: i64,
    pub carbs_percent: i64,
    pub fat_percent: i64,
}
