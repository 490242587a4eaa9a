//! Job posting operations.
//!
//! Listing builds its WHERE clause at runtime from whichever [`JobFilter`]
//! fields are set, binding every value as a parameter. Ordering mirrors
//! `JobFilter::apply`: newest date first, ties in id order.

use anyhow::Result;

use super::{Database, JobRow, JOB_COLUMNS};
use crate::formatter::JobPosting;
use crate::store::{JobFilter, NewJob};

impl Database {
    pub async fn get_jobs_filtered(&self, filter: &JobFilter) -> Result<Vec<JobPosting>> {
        let mut conditions = Vec::new();
        let mut param_idx = 1u32;

        if filter.crop_type.is_some() {
            conditions.push(format!("LOWER(crop_type) = LOWER(${})", param_idx));
            param_idx += 1;
        }
        if filter.location.is_some() {
            conditions.push(format!("LOWER(location) = LOWER(${})", param_idx));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let limit_clause = match filter.effective_limit() {
            Some(_) => format!(" LIMIT ${}", param_idx),
            None => String::new(),
        };

        let sql = format!(
            "SELECT {} FROM jobs{} ORDER BY date DESC, id ASC{}",
            JOB_COLUMNS, where_clause, limit_clause
        );

        let mut query = sqlx::query_as::<_, JobRow>(&sql);
        if let Some(ref crop) = filter.crop_type {
            query = query.bind(crop);
        }
        if let Some(ref location) = filter.location {
            query = query.bind(location);
        }
        if let Some(limit) = filter.effective_limit() {
            query = query.bind(limit as i64);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(JobPosting::from).collect())
    }

    pub async fn get_all_jobs(&self) -> Result<Vec<JobPosting>> {
        let sql = format!("SELECT {} FROM jobs ORDER BY id", JOB_COLUMNS);
        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(JobPosting::from).collect())
    }

    pub async fn get_job_by_id(&self, id: i64) -> Result<Option<JobPosting>> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(JobPosting::from))
    }

    /// Insert a hand-made posting. The id is computed in the same statement
    /// as `MAX(id) + 1`; a concurrent insert racing for the same id fails on
    /// the primary key rather than overwriting.
    pub async fn insert_job(&self, job: &NewJob) -> Result<JobPosting> {
        let sql = format!(
            "INSERT INTO jobs (id, title, pay, location, date, description)
             SELECT COALESCE(MAX(id), 0) + 1, $1, $2, $3, $4, $5 FROM jobs
             RETURNING {}",
            JOB_COLUMNS
        );
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(&job.title)
            .bind(&job.pay)
            .bind(&job.location)
            .bind(&job.date)
            .bind(&job.description)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    pub async fn delete_job_by_id(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the whole jobs table in one transaction.
    pub async fn replace_all_jobs(&self, jobs: &[JobPosting]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM jobs").execute(&mut *tx).await?;
        for job in jobs {
            sqlx::query(
                "INSERT INTO jobs (id, title, pay, location, date, description, crop_type,
                                   quantity, workers_requested, pay_rate_mxn, total_value_mxn,
                                   service_time_mins, arrival_time_poisson)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            )
            .bind(job.id)
            .bind(&job.title)
            .bind(&job.pay)
            .bind(&job.location)
            .bind(&job.date)
            .bind(&job.description)
            .bind(job.crop_type.map(|c| c.as_str()))
            .bind(job.quantity)
            .bind(job.workers_requested)
            .bind(job.pay_rate_mxn)
            .bind(job.total_value_mxn)
            .bind(job.service_time_mins)
            .bind(job.arrival_time_poisson)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(jobs.len())
    }

    pub async fn get_job_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
