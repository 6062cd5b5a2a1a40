use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Row of the `user_metrics` table in the hosted database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct UserMetrics {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub weight: f64, // kg
    pub height: f64, // cm
    pub calorie_goal: f64,
    pub protein_goal: Option<f64>,
    pub carbs_goal: Option<f64>,
    pub fat_goal: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Writable part of a metrics row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsInput {
    #[serde(default)]
    pub full_name: Option<String>,
    pub weight: f64,
    pub height: f64,
    pub calorie_goal: f64,
    #[serde(default)]
    pub protein_goal: Option<f64>,
    #[serde(default)]
    pub carbs_goal: Option<f64>,
    #[serde(default)]
    pub fat_goal: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NutritionTargets {
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

#[derive(Debug, Deserialize)]
pub struct TargetsQuery {
    pub weight: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NameUpdate {
    pub full_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsEnvelope {
    pub ok: bool,
    pub metrics: Option<UserMetrics>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NameEnvelope {
    pub ok: bool,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatedEnvelope {
    pub ok: bool,
    pub updated: bool,
}
