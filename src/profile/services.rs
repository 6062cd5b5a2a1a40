use time::{macros::format_description, Date, OffsetDateTime};

use super::dto::{DailyNutrition, NutritionProgress, UserProfile};

/// Today's date (UTC) in the `YYYY-MM-DD` form the profile backend uses.
pub fn today() -> String {
    format_date(OffsetDateTime::now_utc().date())
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

pub fn nutrition_for<'a>(profile: &'a UserProfile, date: &str) -> Option<&'a DailyNutrition> {
    profile.daily_nutrition.iter().find(|d| d.date == date)
}

/// Calorie goal minus what was eaten on `date`; the whole goal when nothing
/// was logged.
pub fn calories_remaining(profile: &UserProfile, date: &str) -> f64 {
    let eaten = nutrition_for(profile, date).map_or(0.0, |d| d.calories);
    profile.metrics.calorie_goal - eaten
}

pub fn nutrition_progress(profile: &UserProfile, date: &str) -> NutritionProgress {
    let Some(day) = nutrition_for(profile, date) else {
        return NutritionProgress::default();
    };
    let goals = &profile.metrics;
    NutritionProgress {
        calories_percent: percent(day.calories, goals.calorie_goal),
        protein_percent: percent(day.protein, goals.protein_goal),
        carbs_percent: percent(day.carbs, goals.carbs_goal),
        fat_percent: percent(day.fat, goals.fat_goal),
    }
}

fn percent(value: f64, goal: f64) -> i64 {
    if goal <= 0.0 || !goal.is_finite() {
        return 0;
    }
    (value / goal * 100.0).round() as i64
}
