//! In-memory [`Store`] for router tests. Rows live in insertion order;
//! "newest first" listings walk them backwards.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::category::{CategoryRow, CategoryView};
use crate::models::classification::{CategoryMatch, ClassificationStats, ClassificationView};
use crate::models::job_posting::JobPostingView;
use crate::models::resume::{ResumeRow, ResumeSummary};
use crate::models::user::UserRow;
use crate::pagination::{slice_page, PageRequest, Paged};
use crate::store::{
    CategoryPatch, JobPostingPatch, NewCategory, NewClassification, NewJobPosting, NewResume,
    NewUser, Scope, Store, StoreError, StoreResult,
};

#[derive(Debug, Clone)]
struct ClassificationRecord {
    id: Uuid,
    resume_id: Uuid,
    category_id: Uuid,
    confidence_score: f64,
    classified_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct JobPostingRecord {
    id: Uuid,
    title: String,
    description: String,
    category_id: Uuid,
    is_active: bool,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: Vec<UserRow>,
    categories: Vec<CategoryRow>,
    resumes: Vec<ResumeRow>,
    classifications: Vec<ClassificationRecord>,
    job_postings: Vec<JobPostingRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resume rows, for asserting nothing was persisted.
    pub fn resume_count(&self) -> usize {
        self.tables.lock().unwrap().resumes.len()
    }
}

impl Tables {
    fn user(&self, id: Uuid) -> Option<&UserRow> {
        self.users.iter().find(|u| u.id == id)
    }

    fn resume(&self, id: Uuid) -> Option<&ResumeRow> {
        self.resumes.iter().find(|r| r.id == id)
    }

    fn category(&self, id: Uuid) -> Option<&CategoryRow> {
        self.categories.iter().find(|c| c.id == id)
    }

    fn category_view(&self, row: &CategoryRow) -> CategoryView {
        CategoryView {
            id: row.id,
            name: row.name.clone(),
            keywords: row.keywords.clone(),
            created_at: row.created_at,
            resume_count: self
                .classifications
                .iter()
                .filter(|c| c.category_id == row.id)
                .count() as i64,
        }
    }

    fn classification_view(&self, record: &ClassificationRecord) -> Option<ClassificationView> {
        let resume = self.resume(record.resume_id)?;
        let user = self.user(resume.user_id)?;
        let category = self.category(record.category_id)?;
        Some(ClassificationView {
            id: record.id,
            resume_id: resume.id,
            user_name: user.username.clone(),
            resume_file: resume.file.clone(),
            category: category.id,
            category_name: category.name.clone(),
            confidence_score: record.confidence_score,
            classified_at: record.classified_at,
        })
    }

    fn in_scope(&self, record: &ClassificationRecord, scope: Scope) -> bool {
        match scope {
            Scope::All => true,
            Scope::Owner(owner) => self
                .resume(record.resume_id)
                .is_some_and(|r| r.user_id == owner),
        }
    }

    fn scoped_views(&self, scope: Scope) -> Vec<ClassificationView> {
        self.classifications
            .iter()
            .rev()
            .filter(|c| self.in_scope(c, scope))
            .filter_map(|c| self.classification_view(c))
            .collect()
    }

    fn job_view(&self, record: &JobPostingRecord) -> Option<JobPostingView> {
        let category = self.category(record.category_id)?;
        Some(JobPostingView {
            id: record.id,
            title: record.title.clone(),
            description: record.description.clone(),
            category: category.id,
            category_name: category.name.clone(),
            created_at: record.created_at,
            is_active: record.is_active,
        })
    }

    fn name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.categories
            .iter()
            .any(|c| c.name == name && Some(c.id) != except)
    }

    fn insert_classification(&mut self, new: NewClassification) -> StoreResult<ClassificationView> {
        if self.resume(new.resume_id).is_none() || self.category(new.category_id).is_none() {
            return Err(StoreError::InvalidReference(
                "referenced object does not exist".to_string(),
            ));
        }
        let record = ClassificationRecord {
            id: Uuid::new_v4(),
            resume_id: new.resume_id,
            category_id: new.category_id,
            confidence_score: new.confidence.get(),
            classified_at: Utc::now(),
        };
        self.classifications.push(record.clone());
        self.classification_view(&record)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }
}

fn missing_reference() -> StoreError {
    StoreError::InvalidReference("referenced object does not exist".to_string())
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow> {
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(
                "username: a user with that username already exists".to_string(),
            ));
        }
        let row = UserRow {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            is_staff: user.is_staff,
            created_at: Utc::now(),
        };
        t.users.push(row.clone());
        Ok(row)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserRow>> {
        Ok(self.tables.lock().unwrap().user(id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_categories(&self, page: PageRequest) -> StoreResult<Paged<CategoryView>> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<CategoryView> = t.categories.iter().map(|c| t.category_view(c)).collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(slice_page(&rows, page))
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<Option<CategoryView>> {
        let t = self.tables.lock().unwrap();
        Ok(t.category(id).map(|c| t.category_view(c)))
    }

    async fn create_category(&self, category: NewCategory) -> StoreResult<CategoryView> {
        let mut t = self.tables.lock().unwrap();
        if t.name_taken(&category.name, None) {
            return Err(StoreError::Conflict(
                "name: category with this name already exists".to_string(),
            ));
        }
        let row = CategoryRow {
            id: Uuid::new_v4(),
            name: category.name,
            keywords: category.keywords,
            created_at: Utc::now(),
        };
        t.categories.push(row.clone());
        Ok(t.category_view(&row))
    }

    async fn update_category(
        &self,
        id: Uuid,
        patch: CategoryPatch,
    ) -> StoreResult<Option<CategoryView>> {
        let mut t = self.tables.lock().unwrap();
        if let Some(name) = &patch.name {
            if t.name_taken(name, Some(id)) {
                return Err(StoreError::Conflict(
                    "name: category with this name already exists".to_string(),
                ));
            }
        }
        let Some(row) = t.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(keywords) = patch.keywords {
            row.keywords = keywords;
        }
        let row = row.clone();
        Ok(Some(t.category_view(&row)))
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.lock().unwrap();
        let before = t.categories.len();
        t.categories.retain(|c| c.id != id);
        t.classifications.retain(|c| c.category_id != id);
        t.job_postings.retain(|j| j.category_id != id);
        Ok(t.categories.len() < before)
    }

    async fn get_or_create_category(&self, name: &str) -> StoreResult<CategoryRow> {
        let mut t = self.tables.lock().unwrap();
        if let Some(row) = t.categories.iter().find(|c| c.name == name) {
            return Ok(row.clone());
        }
        let row = CategoryRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            keywords: String::new(),
            created_at: Utc::now(),
        };
        t.categories.push(row.clone());
        Ok(row)
    }

    async fn insert_resume(&self, resume: NewResume) -> StoreResult<ResumeRow> {
        let mut t = self.tables.lock().unwrap();
        if t.user(resume.user_id).is_none() {
            return Err(missing_reference());
        }
        let row = ResumeRow {
            id: resume.id,
            user_id: resume.user_id,
            file: resume.file,
            original_filename: resume.original_filename,
            text_content: resume.text_content,
            uploaded_at: Utc::now(),
        };
        t.resumes.push(row.clone());
        Ok(row)
    }

    async fn list_resumes(
        &self,
        owner: Uuid,
        page: PageRequest,
    ) -> StoreResult<Paged<ResumeSummary>> {
        let t = self.tables.lock().unwrap();
        let user_name = t.user(owner).map(|u| u.username.clone()).unwrap_or_default();
        let rows: Vec<ResumeSummary> = t
            .resumes
            .iter()
            .rev()
            .filter(|r| r.user_id == owner)
            .map(|r| ResumeSummary {
                id: r.id,
                file: r.file.clone(),
                original_filename: r.original_filename.clone(),
                uploaded_at: r.uploaded_at,
                user_name: user_name.clone(),
                classification_count: t
                    .classifications
                    .iter()
                    .filter(|c| c.resume_id == r.id)
                    .count() as i64,
            })
            .collect();
        Ok(slice_page(&rows, page))
    }

    async fn get_resume(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<ResumeRow>> {
        let t = self.tables.lock().unwrap();
        Ok(t.resume(id).filter(|r| r.user_id == owner).cloned())
    }

    async fn delete_resume(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<ResumeRow>> {
        let mut t = self.tables.lock().unwrap();
        let Some(pos) = t
            .resumes
            .iter()
            .position(|r| r.id == id && r.user_id == owner)
        else {
            return Ok(None);
        };
        let row = t.resumes.remove(pos);
        t.classifications.retain(|c| c.resume_id != id);
        Ok(Some(row))
    }

    async fn replace_classification(
        &self,
        new: NewClassification,
    ) -> StoreResult<ClassificationView> {
        let mut t = self.tables.lock().unwrap();
        if t.resume(new.resume_id).is_none() || t.category(new.category_id).is_none() {
            return Err(missing_reference());
        }
        t.classifications.retain(|c| c.resume_id != new.resume_id);
        t.insert_classification(new)
    }

    async fn create_classification(
        &self,
        new: NewClassification,
    ) -> StoreResult<ClassificationView> {
        self.tables.lock().unwrap().insert_classification(new)
    }

    async fn list_classifications(
        &self,
        scope: Scope,
        page: PageRequest,
    ) -> StoreResult<Paged<ClassificationView>> {
        let t = self.tables.lock().unwrap();
        Ok(slice_page(&t.scoped_views(scope), page))
    }

    async fn get_classification(
        &self,
        id: Uuid,
        scope: Scope,
    ) -> StoreResult<Option<ClassificationView>> {
        let t = self.tables.lock().unwrap();
        Ok(t.classifications
            .iter()
            .find(|c| c.id == id && t.in_scope(c, scope))
            .and_then(|c| t.classification_view(c)))
    }

    async fn delete_classification(&self, id: Uuid, scope: Scope) -> StoreResult<bool> {
        let mut t = self.tables.lock().unwrap();
        let Some(pos) = t
            .classifications
            .iter()
            .position(|c| c.id == id && t.in_scope(c, scope))
        else {
            return Ok(false);
        };
        t.classifications.remove(pos);
        Ok(true)
    }

    async fn resume_classifications(&self, resume_id: Uuid) -> StoreResult<Vec<ClassificationView>> {
        let t = self.tables.lock().unwrap();
        Ok(t.scoped_views(Scope::All)
            .into_iter()
            .filter(|c| c.resume_id == resume_id)
            .collect())
    }

    async fn category_classifications(
        &self,
        category_id: Uuid,
        page: PageRequest,
    ) -> StoreResult<Paged<ClassificationView>> {
        let t = self.tables.lock().unwrap();
        let rows: Vec<ClassificationView> = t
            .scoped_views(Scope::All)
            .into_iter()
            .filter(|c| c.category == category_id)
            .collect();
        Ok(slice_page(&rows, page))
    }

    async fn classifications_by_category_name(
        &self,
        name: &str,
    ) -> StoreResult<Vec<CategoryMatch>> {
        let t = self.tables.lock().unwrap();
        let wanted = name.to_lowercase();
        Ok(t.classifications
            .iter()
            .rev()
            .filter_map(|c| {
                let category = t.category(c.category_id)?;
                if category.name.to_lowercase() != wanted {
                    return None;
                }
                let resume = t.resume(c.resume_id)?;
                Some(CategoryMatch {
                    resume_id: resume.id,
                    user: t.user(resume.user_id)?.username.clone(),
                    category: category.name.clone(),
                    confidence: c.confidence_score,
                    uploaded_at: resume.uploaded_at,
                    classified_at: c.classified_at,
                })
            })
            .collect())
    }

    async fn classification_stats(&self, scope: Scope) -> StoreResult<ClassificationStats> {
        let t = self.tables.lock().unwrap();
        let views = t.scoped_views(scope);
        let total = views.len() as i64;
        let average_confidence = if views.is_empty() {
            0.0
        } else {
            views.iter().map(|v| v.confidence_score).sum::<f64>() / views.len() as f64
        };
        let mut categories_distribution = BTreeMap::new();
        for view in &views {
            *categories_distribution
                .entry(view.category_name.clone())
                .or_insert(0) += 1;
        }
        Ok(ClassificationStats {
            total_classifications: total,
            average_confidence,
            categories_distribution,
        })
    }

    async fn list_job_postings(
        &self,
        include_inactive: bool,
        page: PageRequest,
    ) -> StoreResult<Paged<JobPostingView>> {
        let t = self.tables.lock().unwrap();
        let rows: Vec<JobPostingView> = t
            .job_postings
            .iter()
            .rev()
            .filter(|j| include_inactive || j.is_active)
            .filter_map(|j| t.job_view(j))
            .collect();
        Ok(slice_page(&rows, page))
    }

    async fn get_job_posting(
        &self,
        id: Uuid,
        include_inactive: bool,
    ) -> StoreResult<Option<JobPostingView>> {
        let t = self.tables.lock().unwrap();
        Ok(t.job_postings
            .iter()
            .find(|j| j.id == id && (include_inactive || j.is_active))
            .and_then(|j| t.job_view(j)))
    }

    async fn create_job_posting(&self, posting: NewJobPosting) -> StoreResult<JobPostingView> {
        let mut t = self.tables.lock().unwrap();
        if t.category(posting.category_id).is_none() {
            return Err(missing_reference());
        }
        let record = JobPostingRecord {
            id: Uuid::new_v4(),
            title: posting.title,
            description: posting.description,
            category_id: posting.category_id,
            is_active: posting.is_active,
            created_at: Utc::now(),
        };
        t.job_postings.push(record.clone());
        t.job_view(&record).ok_or_else(missing_reference)
    }

    async fn update_job_posting(
        &self,
        id: Uuid,
        patch: JobPostingPatch,
    ) -> StoreResult<Option<JobPostingView>> {
        let mut t = self.tables.lock().unwrap();
        if let Some(category_id) = patch.category_id {
            if t.category(category_id).is_none() {
                return Err(missing_reference());
            }
        }
        let Some(record) = t.job_postings.iter_mut().find(|j| j.id == id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            record.title = title;
        }
        if let Some(description) = patch.description {
            record.description = description;
        }
        if let Some(category_id) = patch.category_id {
            record.category_id = category_id;
        }
        if let Some(is_active) = patch.is_active {
            record.is_active = is_active;
        }
        let record = record.clone();
        Ok(t.job_view(&record))
    }

    async fn delete_job_posting(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.lock().unwrap();
        let before = t.job_postings.len();
        t.job_postings.retain(|j| j.id != id);
        Ok(t.job_postings.len() < before)
    }
}
