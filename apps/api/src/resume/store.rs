//! Resume persistence. The core only hands `ResumeRecord` values in and out.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{ResumeFields, ResumeRecord, ResumeRow, ResumeUpdate};

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// The user's most recently updated record, if any.
    async fn find_latest_by_user(&self, user_id: Uuid) -> Result<Option<ResumeRecord>, AppError>;

    async fn create(
        &self,
        user_id: Uuid,
        title: &str,
        fields: &ResumeFields,
    ) -> Result<ResumeRecord, AppError>;

    /// Last write wins. Fails with `NotFound` unless `id` belongs to `user_id`.
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: ResumeUpdate,
    ) -> Result<ResumeRecord, AppError>;
}

/// Postgres-backed store. `data` is JSONB holding `ResumeFields`.
#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn find_latest_by_user(&self, user_id: Uuid) -> Result<Option<ResumeRecord>, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            SELECT id, user_id, title, data, created_at, updated_at
            FROM resumes
            WHERE user_id = $1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ResumeRecord::from))
    }

    async fn create(
        &self,
        user_id: Uuid,
        title: &str,
        fields: &ResumeFields,
    ) -> Result<ResumeRecord, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (id, user_id, title, data)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, data, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(Json(fields))
        .fetch_one(&self.pool)
        .await?;

        info!("Created resume {} for user {}", row.id, user_id);
        Ok(row.into())
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: ResumeUpdate,
    ) -> Result<ResumeRecord, AppError> {
        let fields = update.fields.map(Json);

        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            UPDATE resumes
            SET title = COALESCE($3, title),
                data = COALESCE($4, data),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, data, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(update.title)
        .bind(fields)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

        Ok(row.into())
    }
}
