use std::collections::HashMap;

use anyhow::Context;
use axum::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::dto::{MetricsInput, UserMetrics};

#[async_trait]
pub trait MetricsStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<UserMetrics>>;
    /// Updates the user's row if one exists, inserts it otherwise.
    async fn save(&self, user_id: Uuid, input: &MetricsInput) -> anyhow::Result<UserMetrics>;
    /// Returns whether a row was touched.
    async fn update_name(&self, user_id: Uuid, full_name: &str) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgMetricsStore {
    db: PgPool,
}

impl PgMetricsStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const COLUMNS: &str = "id, user_id, full_name, weight, height, calorie_goal, \
                       protein_goal, carbs_goal, fat_goal, created_at, updated_at";

/// Single-statement insert-or-update keyed on the `user_id` unique constraint;
/// a `NULL` name keeps the stored one.
fn upsert_sql() -> String {
    format!(
        r#"
        INSERT INTO user_metrics
               (user_id, full_name, weight, height, calorie_goal,
                protein_goal, carbs_goal, fat_goal)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id) DO UPDATE
           SET full_name = COALESCE(EXCLUDED.full_name, user_metrics.full_name),
               weight = EXCLUDED.weight,
               height = EXCLUDED.height,
               calorie_goal = EXCLUDED.calorie_goal,
               protein_goal = EXCLUDED.protein_goal,
               carbs_goal = EXCLUDED.carbs_goal,
               fat_goal = EXCLUDED.fat_goal,
               updated_at = now()
     RETURNING {COLUMNS}
        "#
    )
}

#[async_trait]
impl MetricsStore for PgMetricsStore {
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<UserMetrics>> {
        let row = sqlx::query_as::<_, UserMetrics>(&format!(
            "SELECT {COLUMNS} FROM user_metrics WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("select user_metrics")?;
        Ok(row)
    }

    async fn save(&self, user_id: Uuid, input: &MetricsInput) -> anyhow::Result<UserMetrics> {
        let row = sqlx::query_as::<_, UserMetrics>(&upsert_sql())
            .bind(user_id)
            .bind(input.full_name.as_deref())
            .bind(input.weight)
            .bind(input.height)
            .bind(input.calorie_goal)
            .bind(input.protein_goal)
            .bind(input.carbs_goal)
            .bind(input.fat_goal)
            .fetch_one(&self.db)
            .await
            .context("upsert user_metrics")?;
        Ok(row)
    }

    async fn update_name(&self, user_id: Uuid, full_name: &str) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "UPDATE user_metrics SET full_name = $2, updated_at = now() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(full_name)
        .execute(&self.db)
        .await
        .context("update user_metrics.full_name")?;
        Ok(res.rows_affected() > 0)
    }
}

/// Process-local store used when running without a database and in tests.
#[derive(Default)]
pub struct MemoryMetricsStore {
    rows: RwLock<HashMap<Uuid, UserMetrics>>,
}

#[async_trait]
impl MetricsStore for MemoryMetricsStore {
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<UserMetrics>> {
        Ok(self.rows.read().await.get(&user_id).cloned())
    }

    async fn save(&self, user_id: Uuid, input: &MetricsInput) -> anyhow::Result<UserMetrics> {
        let now = OffsetDateTime::now_utc();
        let mut rows = self.rows.write().await;
        let row = rows.entry(user_id).or_insert_with(|| UserMetrics {
            id: Uuid::new_v4(),
            user_id,
            full_name: None,
            weight: 0.0,
            height: 0.0,
            calorie_goal: 0.0,
            protein_goal: None,
            carbs_goal: None,
            fat_goal: None,
            created_at: now,
            updated_at: now,
        });
        if input.full_name.is_some() {
            row.full_name = input.full_name.clone();
        }
        row.weight = input.weight;
        row.height = input.height;
        row.calorie_goal = input.calorie_goal;
        row.protein_goal = input.protein_goal;
        row.carbs_goal = input.carbs_goal;
        row.fat_goal = input.fat_goal;
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn update_name(&self, user_id: Uuid, full_name: &str) -> anyhow::Result<bool> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&user_id) {
            Some(row) => {
                row.full_name = Some(full_name.to_string());
                row.updated_at = OffsetDateTime::now_utc();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(weight: f64, name: Option<&str>) -> MetricsInput {
        MetricsInput {
            full_name: name.map(str::to_string),
            weight,
            height: 175.0,
            calorie_goal: 2200.0,
            protein_goal: Some(120.0),
            carbs_goal: None,
            fat_goal: None,
        }
    }

    #[tokio::test]
    async fn save_inserts_then_updates_same_row() {
        let store = MemoryMetricsStore::default();
        let user = Uuid::new_v4();
        assert!(store.get(user).await.unwrap().is_none());

        let first = store.save(user, &input(70.0, Some("Ana"))).await.unwrap();
        let second = store.save(user, &input(72.0, None)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.weight, 72.0);
        assert_eq!(second.full_name.as_deref(), Some("Ana"));
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn update_name_requires_existing_row() {
        let store = MemoryMetricsStore::default();
        let user = Uuid::new_v4();
        assert!(!store.update_name(user, "Luis").await.unwrap());
        store.save(user, &input(80.0, None)).await.unwrap();
        assert!(store.update_name(user, "Luis").await.unwrap());
        let row = store.get(user).await.unwrap().unwrap();
        assert_eq!(row.full_name.as_deref(), Some("Luis"));
    }

    #[test]
    fn save_is_one_conflict_keyed_statement() {
        let sql = upsert_sql();
        assert!(sql.contains("ON CONFLICT (user_id) DO UPDATE"));
        assert!(sql.contains("COALESCE(EXCLUDED.full_name, user_metrics.full_name)"));
        assert!(!sql.contains("SELECT"));
    }

    /// Runs only when DATABASE_URL points at a scratch database.
    #[tokio::test]
    async fn concurrent_first_saves_share_one_row() {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };
        let pool = PgPool::connect(&url).await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        let store = PgMetricsStore::new(pool);
        let user = Uuid::new_v4();

        let (first, second) = (input(70.0, Some("Ana")), input(71.0, None));
        let (a, b) = tokio::join!(store.save(user, &first), store.save(user, &second));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.id, b.id);
        let row = store.get(user).await.unwrap().unwrap();
        assert_eq!(row.full_name.as_deref(), Some("Ana"));
    }
}
