//! # Database — PostgreSQL Storage Layer
//!
//! Async job and contract persistence via `sqlx::PgPool`, implementing the
//! [`Store`] trait for deployments with a hosted database.
//!
//! ## Schema
//!
//! - `jobs`: posting fields plus nullable simulation metadata; `id` is
//!   assigned as `MAX(id) + 1` on insert
//! - `contracts`: job snapshot, status, worker, `created_at`
//!
//! The DDL lives in `migrations/001_jobs_contracts.sql`.
//!
//! ## Module Structure
//!
//! - [`jobs`] — job posting CRUD, filtered listing, bulk replacement
//! - [`contracts`] — contract creation, status review, filtered listing

mod contracts;
mod jobs;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::formatter::JobPosting;
use crate::simulator::CropType;
use crate::store::{Contract, ContractFilter, ContractStatus, JobFilter, NewJob, Store};

// ── Row types ───────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
pub(crate) struct JobRow {
    pub id: i64,
    pub title: String,
    pub pay: String,
    pub location: String,
    pub date: String,
    pub description: Option<String>,
    pub crop_type: Option<String>,
    pub quantity: Option<i64>,
    pub workers_requested: Option<i64>,
    pub pay_rate_mxn: Option<f64>,
    pub total_value_mxn: Option<f64>,
    pub service_time_mins: Option<f64>,
    pub arrival_time_poisson: Option<f64>,
}

impl From<JobRow> for JobPosting {
    fn from(r: JobRow) -> Self {
        JobPosting {
            id: r.id,
            title: r.title,
            pay: r.pay,
            location: r.location,
            date: r.date,
            description: r.description,
            crop_type: r.crop_type.as_deref().and_then(CropType::from_name),
            quantity: r.quantity,
            workers_requested: r.workers_requested,
            pay_rate_mxn: r.pay_rate_mxn,
            total_value_mxn: r.total_value_mxn,
            service_time_mins: r.service_time_mins,
            arrival_time_poisson: r.arrival_time_poisson,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ContractRow {
    pub id: i64,
    pub job_id: i64,
    pub job_title: String,
    pub pay: String,
    pub location: String,
    pub date: String,
    pub status: String,
    pub worker_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<ContractRow> for Contract {
    type Error = anyhow::Error;

    fn try_from(r: ContractRow) -> Result<Self> {
        Ok(Contract {
            id: r.id,
            job_id: r.job_id,
            job_title: r.job_title,
            pay: r.pay,
            location: r.location,
            date: r.date,
            status: r.status.parse()?,
            worker_id: r.worker_id,
            created_at: r.created_at,
        })
    }
}

pub(crate) const JOB_COLUMNS: &str = "id, title, pay, location, date, description, crop_type, \
     quantity, workers_requested, pay_rate_mxn, total_value_mxn, service_time_mins, \
     arrival_time_poisson";

pub(crate) const CONTRACT_COLUMNS: &str =
    "id, job_id, job_title, pay, location, date, status, worker_id, created_at";

// ── Database struct and connection ──────────────────────────────

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL using the provided database URL.
    ///
    /// Manually parses the URL to preserve the full username — sqlx's built-in
    /// parser strips the ".project-ref" suffix that the Supabase pooler requires.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with_max(database_url, 5).await
    }

    pub async fn connect_with_max(database_url: &str, max_connections: u32) -> Result<Self> {
        let url = url::Url::parse(database_url).context("invalid database URL")?;
        let username = urlencoding::decode(url.username())?.into_owned();
        let password = url
            .password()
            .map(|p| urlencoding::decode(p).map(|s| s.into_owned()))
            .transpose()?;
        let mut opts = PgConnectOptions::new()
            .host(url.host_str().unwrap_or("localhost"))
            .port(url.port().unwrap_or(5432))
            .database(url.path().trim_start_matches('/'))
            .username(&username)
            .statement_cache_capacity(0);
        if let Some(ref pw) = password {
            opts = opts.password(pw);
        }
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await
            .context("failed to connect to PostgreSQL")?;
        Ok(Database { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check: execute `SELECT 1` to verify database connectivity.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for Database {
    async fn health_check(&self) -> Result<()> {
        self.ping().await
    }

    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<JobPosting>> {
        self.get_jobs_filtered(filter).await
    }

    async fn all_jobs(&self) -> Result<Vec<JobPosting>> {
        self.get_all_jobs().await
    }

    async fn get_job(&self, id: i64) -> Result<Option<JobPosting>> {
        self.get_job_by_id(id).await
    }

    async fn create_job(&self, job: NewJob) -> Result<JobPosting> {
        self.insert_job(&job).await
    }

    async fn delete_job(&self, id: i64) -> Result<bool> {
        self.delete_job_by_id(id).await
    }

    async fn replace_jobs(&self, jobs: Vec<JobPosting>) -> Result<usize> {
        self.replace_all_jobs(&jobs).await
    }

    async fn count_jobs(&self) -> Result<i64> {
        self.get_job_count().await
    }

    async fn list_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>> {
        self.get_contracts_filtered(filter).await
    }

    async fn get_contract(&self, id: i64) -> Result<Option<Contract>> {
        self.get_contract_by_id(id).await
    }

    async fn create_contract(
        &self,
        job: &JobPosting,
        worker_id: Option<String>,
    ) -> Result<Contract> {
        self.insert_contract(job, worker_id.as_deref()).await
    }

    async fn update_contract_status(
        &self,
        id: i64,
        status: ContractStatus,
    ) -> Result<Option<Contract>> {
        self.set_contract_status(id, status).await
    }

    async fn count_contracts(&self) -> Result<i64> {
        self.get_contract_count().await
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn contract_row(status: &str) -> ContractRow {
        ContractRow {
            id: 3,
            job_id: 9,
            job_title: "Strawberry Harvester".into(),
            pay: "$40.00/flat".into(),
            location: "Farm D".into(),
            date: "2025-04-02".into(),
            status: status.into(),
            worker_id: Some("abc".into()),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn contract_row_parses_known_status() {
        let c = Contract::try_from(contract_row("accepted")).unwrap();
        assert_eq!(c.status, ContractStatus::Accepted);
        assert_eq!(c.job_id, 9);
    }

    #[test]
    fn contract_row_rejects_unknown_status() {
        assert!(Contract::try_from(contract_row("archived")).is_err());
    }

    fn job_row(crop_type: Option<&str>) -> JobRow {
        JobRow {
            id: 1,
            title: "Tomato Picker".into(),
            pay: "$6.00/bucket".into(),
            location: "Farm B".into(),
            date: "2025-03-11".into(),
            description: None,
            crop_type: crop_type.map(String::from),
            quantity: Some(1200),
            workers_requested: Some(22),
            pay_rate_mxn: Some(6.0),
            total_value_mxn: Some(7200.0),
            service_time_mins: Some(150.0),
            arrival_time_poisson: Some(12.5),
        }
    }

    #[test]
    fn job_row_maps_crop_type() {
        let posting = JobPosting::from(job_row(Some("Tomato")));
        assert_eq!(posting.crop_type, Some(CropType::Tomato));
        assert_eq!(posting.quantity, Some(1200));
    }

    #[test]
    fn job_row_tolerates_unknown_or_missing_crop() {
        assert_eq!(JobPosting::from(job_row(Some("Avocado"))).crop_type, None);
        assert_eq!(JobPosting::from(job_row(None)).crop_type, None);
    }
}
