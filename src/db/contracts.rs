//! Contract operations. New contracts start `pending`; `created_at` is set by
//! the database clock.

use anyhow::Result;

use super::{ContractRow, Database, CONTRACT_COLUMNS};
use crate::formatter::JobPosting;
use crate::store::{Contract, ContractFilter, ContractStatus};

impl Database {
    pub async fn get_contracts_filtered(&self, filter: &ContractFilter) -> Result<Vec<Contract>> {
        let mut conditions = Vec::new();
        let mut param_idx = 1u32;

        if filter.worker_id.is_some() {
            conditions.push(format!("worker_id = ${}", param_idx));
            param_idx += 1;
        }
        if filter.status.is_some() {
            conditions.push(format!("LOWER(status) = LOWER(${})", param_idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM contracts{} ORDER BY id",
            CONTRACT_COLUMNS, where_clause
        );

        let mut query = sqlx::query_as::<_, ContractRow>(&sql);
        if let Some(ref worker) = filter.worker_id {
            query = query.bind(worker);
        }
        if let Some(ref status) = filter.status {
            query = query.bind(status);
        }
        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Contract::try_from)
            .collect()
    }

    pub async fn get_contract_by_id(&self, id: i64) -> Result<Option<Contract>> {
        let sql = format!("SELECT {} FROM contracts WHERE id = $1", CONTRACT_COLUMNS);
        sqlx::query_as::<_, ContractRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Contract::try_from)
            .transpose()
    }

    pub async fn insert_contract(
        &self,
        job: &JobPosting,
        worker_id: Option<&str>,
    ) -> Result<Contract> {
        let sql = format!(
            "INSERT INTO contracts (job_id, job_title, pay, location, date, status, worker_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
             RETURNING {}",
            CONTRACT_COLUMNS
        );
        let row = sqlx::query_as::<_, ContractRow>(&sql)
            .bind(job.id)
            .bind(&job.title)
            .bind(&job.pay)
            .bind(&job.location)
            .bind(&job.date)
            .bind(ContractStatus::Pending.as_str())
            .bind(worker_id)
            .fetch_one(&self.pool)
            .await?;
        Contract::try_from(row)
    }

    pub async fn set_contract_status(
        &self,
        id: i64,
        status: ContractStatus,
    ) -> Result<Option<Contract>> {
        let sql = format!(
            "UPDATE contracts SET status = $2 WHERE id = $1 RETURNING {}",
            CONTRACT_COLUMNS
        );
        sqlx::query_as::<_, ContractRow>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(Contract::try_from)
            .transpose()
    }

    pub async fn get_contract_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contracts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
