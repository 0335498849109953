use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::category::{CategoryRow, CategoryView};
use crate::models::classification::{CategoryMatch, ClassificationStats, ClassificationView};
use crate::models::job_posting::JobPostingView;
use crate::models::resume::{ResumeRow, ResumeSummary};
use crate::models::user::UserRow;
use crate::pagination::{PageRequest, Paged};
use crate::store::{
    CategoryPatch, JobPostingPatch, NewCategory, NewClassification, NewJobPosting, NewResume,
    NewUser, Scope, Store, StoreError, StoreResult,
};

const CATEGORY_VIEW: &str = r#"
    SELECT cat.id, cat.name, cat.keywords, cat.created_at, COUNT(c.id) AS resume_count
    FROM categories cat
    LEFT JOIN classifications c ON c.category_id = cat.id
"#;

const CLASSIFICATION_VIEW: &str = r#"
    SELECT c.id, c.resume_id, u.username AS user_name, r.file AS resume_file,
           c.category_id AS category, cat.name AS category_name,
           c.confidence_score, c.classified_at
    FROM classifications c
    JOIN resumes r ON r.id = c.resume_id
    JOIN users u ON u.id = r.user_id
    JOIN categories cat ON cat.id = c.category_id
"#;

/// Serializes reclassification of one resume; the row lock is held until the
/// surrounding transaction ends.
const LOCK_RESUME: &str = "SELECT id FROM resumes WHERE id = $1 FOR UPDATE";

const JOB_POSTING_VIEW: &str = r#"
    SELECT j.id, j.title, j.description, j.category_id AS category,
           cat.name AS category_name, j.created_at, j.is_active
    FROM job_postings j
    JOIN categories cat ON cat.id = j.category_id
"#;

/// PostgreSQL-backed [`Store`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn classification_view(&self, id: Uuid) -> StoreResult<ClassificationView> {
        Ok(
            sqlx::query_as(&format!("{CLASSIFICATION_VIEW} WHERE c.id = $1"))
                .bind(id)
                .fetch_one(&self.pool)
                .await?,
        )
    }
}

/// Translates constraint violations into store errors the API can report.
fn write_error(err: sqlx::Error, conflict: &str) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict(conflict.to_string());
        }
        if db.is_foreign_key_violation() {
            return StoreError::InvalidReference("referenced object does not exist".to_string());
        }
        if db.is_check_violation() {
            return StoreError::InvalidReference("value violates a constraint".to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow> {
        sqlx::query_as(
            r#"
            INSERT INTO users (id, username, password_hash, is_staff)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "username: a user with that username already exists"))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserRow>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_categories(&self, page: PageRequest) -> StoreResult<Paged<CategoryView>> {
        let items = sqlx::query_as(&format!(
            "{CATEGORY_VIEW} GROUP BY cat.id ORDER BY cat.name LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        let total = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;
        Ok(Paged { items, total })
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<Option<CategoryView>> {
        Ok(
            sqlx::query_as(&format!("{CATEGORY_VIEW} WHERE cat.id = $1 GROUP BY cat.id"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_category(&self, category: NewCategory) -> StoreResult<CategoryView> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO categories (id, name, keywords) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&category.name)
            .bind(&category.keywords)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, "name: category with this name already exists"))?;
        self.get_category(id)
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn update_category(
        &self,
        id: Uuid,
        patch: CategoryPatch,
    ) -> StoreResult<Option<CategoryView>> {
        let updated = sqlx::query(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name), keywords = COALESCE($3, keywords)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.keywords)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "name: category with this name already exists"))?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_category(id).await
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<bool> {
        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }

    async fn get_or_create_category(&self, name: &str) -> StoreResult<CategoryRow> {
        sqlx::query(
            "INSERT INTO categories (id, name, keywords) VALUES ($1, $2, '') ON CONFLICT (name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(sqlx::query_as("SELECT * FROM categories WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn insert_resume(&self, resume: NewResume) -> StoreResult<ResumeRow> {
        sqlx::query_as(
            r#"
            INSERT INTO resumes (id, user_id, file, original_filename, text_content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(resume.id)
        .bind(resume.user_id)
        .bind(&resume.file)
        .bind(&resume.original_filename)
        .bind(&resume.text_content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "resume already exists"))
    }

    async fn list_resumes(
        &self,
        owner: Uuid,
        page: PageRequest,
    ) -> StoreResult<Paged<ResumeSummary>> {
        let items = sqlx::query_as(
            r#"
            SELECT r.id, r.file, r.original_filename, r.uploaded_at, u.username AS user_name,
                   (SELECT COUNT(*) FROM classifications c WHERE c.resume_id = r.id)
                       AS classification_count
            FROM resumes r
            JOIN users u ON u.id = r.user_id
            WHERE r.user_id = $1
            ORDER BY r.uploaded_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        let total = sqlx::query_scalar("SELECT COUNT(*) FROM resumes WHERE user_id = $1")
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(Paged { items, total })
    }

    async fn get_resume(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<ResumeRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn delete_resume(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<ResumeRow>> {
        Ok(
            sqlx::query_as("DELETE FROM resumes WHERE id = $1 AND user_id = $2 RETURNING *")
                .bind(id)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn replace_classification(
        &self,
        new: NewClassification,
    ) -> StoreResult<ClassificationView> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;
        let locked: Option<Uuid> = sqlx::query_scalar(LOCK_RESUME)
            .bind(new.resume_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(StoreError::InvalidReference(
                "resume: referenced object does not exist".to_string(),
            ));
        }
        sqlx::query("DELETE FROM classifications WHERE resume_id = $1")
            .bind(new.resume_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO classifications (id, resume_id, category_id, confidence_score)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(new.resume_id)
        .bind(new.category_id)
        .bind(new.confidence.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error(e, "classification already exists"))?;
        tx.commit().await?;
        self.classification_view(id).await
    }

    async fn create_classification(
        &self,
        new: NewClassification,
    ) -> StoreResult<ClassificationView> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO classifications (id, resume_id, category_id, confidence_score)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(new.resume_id)
        .bind(new.category_id)
        .bind(new.confidence.get())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "classification already exists"))?;
        self.classification_view(id).await
    }

    async fn list_classifications(
        &self,
        scope: Scope,
        page: PageRequest,
    ) -> StoreResult<Paged<ClassificationView>> {
        let items = sqlx::query_as(&format!(
            r#"{CLASSIFICATION_VIEW}
            WHERE ($1::uuid IS NULL OR r.user_id = $1)
            ORDER BY c.classified_at DESC
            LIMIT $2 OFFSET $3"#
        ))
        .bind(scope.owner())
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        let total = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM classifications c
            JOIN resumes r ON r.id = c.resume_id
            WHERE ($1::uuid IS NULL OR r.user_id = $1)
            "#,
        )
        .bind(scope.owner())
        .fetch_one(&self.pool)
        .await?;
        Ok(Paged { items, total })
    }

    async fn get_classification(
        &self,
        id: Uuid,
        scope: Scope,
    ) -> StoreResult<Option<ClassificationView>> {
        Ok(sqlx::query_as(&format!(
            "{CLASSIFICATION_VIEW} WHERE c.id = $1 AND ($2::uuid IS NULL OR r.user_id = $2)"
        ))
        .bind(id)
        .bind(scope.owner())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_classification(&self, id: Uuid, scope: Scope) -> StoreResult<bool> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM classifications c
            USING resumes r
            WHERE c.id = $1 AND r.id = c.resume_id AND ($2::uuid IS NULL OR r.user_id = $2)
            "#,
        )
        .bind(id)
        .bind(scope.owner())
        .execute(&self.pool)
        .await?;
        Ok(deleted.rows_affected() > 0)
    }

    async fn resume_classifications(&self, resume_id: Uuid) -> StoreResult<Vec<ClassificationView>> {
        Ok(sqlx::query_as(&format!(
            "{CLASSIFICATION_VIEW} WHERE c.resume_id = $1 ORDER BY c.classified_at DESC"
        ))
        .bind(resume_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn category_classifications(
        &self,
        category_id: Uuid,
        page: PageRequest,
    ) -> StoreResult<Paged<ClassificationView>> {
        let items = sqlx::query_as(&format!(
            r#"{CLASSIFICATION_VIEW}
            WHERE c.category_id = $1
            ORDER BY c.classified_at DESC
            LIMIT $2 OFFSET $3"#
        ))
        .bind(category_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        let total = sqlx::query_scalar("SELECT COUNT(*) FROM classifications WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(Paged { items, total })
    }

    async fn classifications_by_category_name(
        &self,
        name: &str,
    ) -> StoreResult<Vec<CategoryMatch>> {
        Ok(sqlx::query_as(
            r#"
            SELECT r.id AS resume_id, u.username AS "user", cat.name AS category,
                   c.confidence_score AS confidence, r.uploaded_at, c.classified_at
            FROM classifications c
            JOIN categories cat ON cat.id = c.category_id
            JOIN resumes r ON r.id = c.resume_id
            JOIN users u ON u.id = r.user_id
            WHERE LOWER(cat.name) = LOWER($1)
            ORDER BY c.classified_at DESC
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn classification_stats(&self, scope: Scope) -> StoreResult<ClassificationStats> {
        let (total_classifications, average_confidence): (i64, f64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(AVG(c.confidence_score), 0)::DOUBLE PRECISION
            FROM classifications c
            JOIN resumes r ON r.id = c.resume_id
            WHERE ($1::uuid IS NULL OR r.user_id = $1)
            "#,
        )
        .bind(scope.owner())
        .fetch_one(&self.pool)
        .await?;
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT cat.name, COUNT(*)
            FROM classifications c
            JOIN resumes r ON r.id = c.resume_id
            JOIN categories cat ON cat.id = c.category_id
            WHERE ($1::uuid IS NULL OR r.user_id = $1)
            GROUP BY cat.name
            "#,
        )
        .bind(scope.owner())
        .fetch_all(&self.pool)
        .await?;
        Ok(ClassificationStats {
            total_classifications,
            average_confidence,
            categories_distribution: rows.into_iter().collect::<BTreeMap<_, _>>(),
        })
    }

    async fn list_job_postings(
        &self,
        include_inactive: bool,
        page: PageRequest,
    ) -> StoreResult<Paged<JobPostingView>> {
        let items = sqlx::query_as(&format!(
            r#"{JOB_POSTING_VIEW}
            WHERE ($1 OR j.is_active)
            ORDER BY j.created_at DESC
            LIMIT $2 OFFSET $3"#
        ))
        .bind(include_inactive)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        let total = sqlx::query_scalar("SELECT COUNT(*) FROM job_postings WHERE ($1 OR is_active)")
            .bind(include_inactive)
            .fetch_one(&self.pool)
            .await?;
        Ok(Paged { items, total })
    }

    async fn get_job_posting(
        &self,
        id: Uuid,
        include_inactive: bool,
    ) -> StoreResult<Option<JobPostingView>> {
        Ok(sqlx::query_as(&format!(
            "{JOB_POSTING_VIEW} WHERE j.id = $1 AND ($2 OR j.is_active)"
        ))
        .bind(id)
        .bind(include_inactive)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_job_posting(&self, posting: NewJobPosting) -> StoreResult<JobPostingView> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO job_postings (id, title, description, category_id, is_active)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&posting.title)
        .bind(&posting.description)
        .bind(posting.category_id)
        .bind(posting.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "job posting already exists"))?;
        self.get_job_posting(id, true)
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn update_job_posting(
        &self,
        id: Uuid,
        patch: JobPostingPatch,
    ) -> StoreResult<Option<JobPostingView>> {
        let updated = sqlx::query(
            r#"
            UPDATE job_postings
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                category_id = COALESCE($4, category_id),
                is_active = COALESCE($5, is_active)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.category_id)
        .bind(patch.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "job posting already exists"))?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_job_posting(id, true).await
    }

    async fn delete_job_posting(&self, id: Uuid) -> StoreResult<bool> {
        let deleted = sqlx::query("DELETE FROM job_postings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }
}
