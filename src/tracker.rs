//! Display math behind the nutrition tracker panel.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::metrics::dto::NutritionTargets;

/// Window within which tracker data counts as fresh.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Progress above this share of the target is flagged.
pub const NEAR_LIMIT_PERCENT: f64 = 90.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NutritionData {
    pub weight: f64, // kg
    pub height: f64, // cm
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Default for NutritionData {
    fn default() -> Self {
        Self {
            weight: 75.0,
            height: 180.0,
            calories: 1850.0,
            protein: 120.0,
            carbs: 200.0,
            fat: 65.0,
        }
    }
}

/// Body-mass index rounded to one decimal; `None` without a usable height.
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if !(height_cm > 0.0) || !weight_kg.is_finite() {
        return None;
    }
    let meters = height_cm / 100.0;
    Some((weight_kg / (meters * meters) * 10.0).round() / 10.0)
}

/// Share of `target` reached, clamped to 100. A non-positive target gives 0.
pub fn progress_percentage(current: f64, target: f64) -> f64 {
    if !(target > 0.0) {
        return 0.0;
    }
    (current / target * 100.0).clamp(0.0, 100.0)
}

pub fn is_near_limit(current: f64, target: f64) -> bool {
    progress_percentage(current, target) > NEAR_LIMIT_PERCENT
}

/// One macro row in the tracker.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MacroCard {
    pub label: &'static str,
    pub current: f64,
    pub target: f64,
    pub unit: &'static str,
    pub percentage: f64,
    pub near_limit: bool,
}

impl MacroCard {
    fn new(label: &'static str, current: f64, target: f64, unit: &'static str) -> Self {
        Self {
            label,
            current,
            target,
            unit,
            percentage: progress_percentage(current, target),
            near_limit: is_near_limit(current, target),
        }
    }
}

pub fn macro_cards(data: &NutritionData, targets: &NutritionTargets) -> [MacroCard; 4] {
    [
        MacroCard::new("Calories", data.calories, targets.calories as f64, "kcal"),
        MacroCard::new("Protein", data.protein, targets.protein as f64, "g"),
        MacroCard::new("Carbs", data.carbs, targets.carbs as f64, "g"),
        MacroCard::new("Fat", data.fat, targets.fat as f64, "g"),
    ]
}

/// Remembers when data was last loaded so rapid re-renders skip the backend.
#[derive(Debug, Clone)]
pub struct FreshnessGuard {
    window: Duration,
    last_fetch: Option<Instant>,
}

impl Default for FreshnessGuard {
    fn default() -> Self {
        Self::new(FRESHNESS_WINDOW)
    }
}

impl FreshnessGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fetch: None,
        }
    }

    /// True when nothing was fetched yet or the window has elapsed.
    pub fn should_refresh(&self, now: Instant) -> bool {
        match self.last_fetch {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= self.window,
        }
    }

    pub fn mark_fetched(&mut self, now: Instant) {
        self.last_fetch = Some(now);
    }

    pub fn invalidate(&mut self) {
        self.last_fetch = None;
    }
}
