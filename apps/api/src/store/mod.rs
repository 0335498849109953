//! Persistence seam. Handlers only see [`Store`]; production wires in
//! [`postgres::PgStore`].

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::category::{CategoryRow, CategoryView};
use crate::models::classification::{
    CategoryMatch, ClassificationStats, ClassificationView, ConfidenceScore,
};
use crate::models::job_posting::JobPostingView;
use crate::models::resume::{ResumeRow, ResumeSummary};
use crate::models::user::UserRow;
use crate::pagination::{PageRequest, Paged};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// A referenced row does not exist.
    #[error("{0}")]
    InvalidReference(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Whose rows a query may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Owner(Uuid),
    All,
}

impl Scope {
    /// Staff see everything, everyone else only their own rows.
    pub fn for_user(user_id: Uuid, is_staff: bool) -> Self {
        if is_staff {
            Scope::All
        } else {
            Scope::Owner(user_id)
        }
    }

    pub fn owner(self) -> Option<Uuid> {
        match self {
            Scope::Owner(id) => Some(id),
            Scope::All => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub keywords: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub keywords: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewResume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file: String,
    pub original_filename: String,
    pub text_content: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewClassification {
    pub resume_id: Uuid,
    pub category_id: Uuid,
    pub confidence: ConfidenceScore,
}

#[derive(Debug, Clone)]
pub struct NewJobPosting {
    pub title: String,
    pub description: String,
    pub category_id: Uuid,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct JobPostingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[async_trait]
pub trait Store: Send + Sync {
    // users
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserRow>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>>;

    // categories, ordered by name
    async fn list_categories(&self, page: PageRequest) -> StoreResult<Paged<CategoryView>>;
    async fn get_category(&self, id: Uuid) -> StoreResult<Option<CategoryView>>;
    async fn create_category(&self, category: NewCategory) -> StoreResult<CategoryView>;
    async fn update_category(
        &self,
        id: Uuid,
        patch: CategoryPatch,
    ) -> StoreResult<Option<CategoryView>>;
    async fn delete_category(&self, id: Uuid) -> StoreResult<bool>;
    /// Exact, case-sensitive match on name; inserts when absent.
    async fn get_or_create_category(&self, name: &str) -> StoreResult<CategoryRow>;

    // resumes, newest first
    async fn insert_resume(&self, resume: NewResume) -> StoreResult<ResumeRow>;
    async fn list_resumes(
        &self,
        owner: Uuid,
        page: PageRequest,
    ) -> StoreResult<Paged<ResumeSummary>>;
    async fn get_resume(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<ResumeRow>>;
    /// Deletes the resume and its classifications, returning the removed row.
    async fn delete_resume(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<ResumeRow>>;

    // classifications, newest first
    /// Drops every classification of the resume and inserts `new`, atomically.
    async fn replace_classification(
        &self,
        new: NewClassification,
    ) -> StoreResult<ClassificationView>;
    async fn create_classification(
        &self,
        new: NewClassification,
    ) -> StoreResult<ClassificationView>;
    async fn list_classifications(
        &self,
        scope: Scope,
        page: PageRequest,
    ) -> StoreResult<Paged<ClassificationView>>;
    async fn get_classification(
        &self,
        id: Uuid,
        scope: Scope,
    ) -> StoreResult<Option<ClassificationView>>;
    async fn delete_classification(&self, id: Uuid, scope: Scope) -> StoreResult<bool>;
    async fn resume_classifications(&self, resume_id: Uuid) -> StoreResult<Vec<ClassificationView>>;
    async fn category_classifications(
        &self,
        category_id: Uuid,
        page: PageRequest,
    ) -> StoreResult<Paged<ClassificationView>>;
    /// Case-insensitive match on category name, across all users.
    async fn classifications_by_category_name(
        &self,
        name: &str,
    ) -> StoreResult<Vec<CategoryMatch>>;
    async fn classification_stats(&self, scope: Scope) -> StoreResult<ClassificationStats>;

    // job postings, newest first
    async fn list_job_postings(
        &self,
        include_inactive: bool,
        page: PageRequest,
    ) -> StoreResult<Paged<JobPostingView>>;
    async fn get_job_posting(
        &self,
        id: Uuid,
        include_inactive: bool,
    ) -> StoreResult<Option<JobPostingView>>;
    async fn create_job_posting(&self, posting: NewJobPosting) -> StoreResult<JobPostingView>;
    async fn update_job_posting(
        &self,
        id: Uuid,
        patch: JobPostingPatch,
    ) -> StoreResult<Option<JobPostingView>>;
    async fn delete_job_posting(&self, id: Uuid) -> StoreResult<bool>;
}
