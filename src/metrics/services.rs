use super::dto::{MetricsInput, NutritionTargets, UserMetrics};
use crate::error::ProxyError;

pub const DEFAULT_DISPLAY_NAME: &str = "Usuario";

/// Daily targets from body weight:
/// calories = weight*32, protein = weight*1.6,
/// carbs = 45% of calories / 4 kcal/g, fat = 30% of calories / 9 kcal/g.
/// Carbs and fat are derived from the already-rounded calorie figure.
pub fn calculate_nutrition_targets(weight: f64) -> NutritionTargets {
    let calories = (weight * 32.0).round();
    let protein = (weight * 1.6).round();
    let carbs = (calories * 0.45 / 4.0).round();
    let fat = (calories * 0.3 / 9.0).round();
    NutritionTargets {
        calories: calories as i64,
        protein: protein as i64,
        carbs: carbs as i64,
        fat: fat as i64,
    }
}

/// Name stored in the metrics row, never the auth profile.
pub fn display_name(metrics: Option<&UserMetrics>) -> String {
    metrics
        .and_then(|m| m.full_name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_DISPLAY_NAME)
        .to_string()
}

pub fn validate_weight(weight: f64) -> Result<(), ProxyError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(ProxyError::Input("weight must be a non-negative number".into()))
    }
}

pub fn validate_input(input: &MetricsInput) -> Result<(), ProxyError> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    let non_negative = |v: Option<f64>| v.map_or(true, |g| g.is_finite() && g >= 0.0);

    if !positive(input.weight) {
        return Err(ProxyError::Input("weight must be greater than zero".into()));
    }
    if !positive(input.height) {
        return Err(ProxyError::Input("height must be greater than zero".into()));
    }
    if !non_negative(Some(input.calorie_goal))
        || !non_negative(input.protein_goal)
        || !non_negative(input.carbs_goal)
        || !non_negative(input.fat_goal)
    {
        return Err(ProxyError::Input("goals must be non-negative numbers".into()));
    }
    Ok(())
}
