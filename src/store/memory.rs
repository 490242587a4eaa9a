//! In-process store. Tables are plain vectors in insertion order.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, PoisonError};

use super::{Contract, ContractFilter, ContractStatus, JobFilter, NewJob, Store};
use crate::formatter::{Clock, JobPosting, SystemClock};

fn read_or_recover<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_or_recover<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub struct MemoryStore {
    jobs: RwLock<Vec<JobPosting>>,
    contracts: RwLock<Vec<Contract>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Store whose contract timestamps come from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        MemoryStore {
            jobs: RwLock::new(Vec::new()),
            contracts: RwLock::new(Vec::new()),
            clock,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<JobPosting>> {
        let jobs = read_or_recover(&self.jobs);
        Ok(filter.apply(jobs.iter().cloned()))
    }

    async fn all_jobs(&self) -> Result<Vec<JobPosting>> {
        let mut jobs = read_or_recover(&self.jobs).clone();
        jobs.sort_by_key(|j| j.id);
        Ok(jobs)
    }

    async fn get_job(&self, id: i64) -> Result<Option<JobPosting>> {
        Ok(read_or_recover(&self.jobs).iter().find(|j| j.id == id).cloned())
    }

    async fn create_job(&self, job: NewJob) -> Result<JobPosting> {
        let mut jobs = write_or_recover(&self.jobs);
        let id = jobs.iter().map(|j| j.id).max().unwrap_or(0) + 1;
        let posting = job.into_posting(id);
        jobs.push(posting.clone());
        Ok(posting)
    }

    async fn delete_job(&self, id: i64) -> Result<bool> {
        let mut jobs = write_or_recover(&self.jobs);
        let before = jobs.len();
        jobs.retain(|j| j.id != id);
        Ok(jobs.len() != before)
    }

    async fn replace_jobs(&self, new_jobs: Vec<JobPosting>) -> Result<usize> {
        let count = new_jobs.len();
        *write_or_recover(&self.jobs) = new_jobs;
        Ok(count)
    }

    async fn count_jobs(&self) -> Result<i64> {
        Ok(read_or_recover(&self.jobs).len() as i64)
    }

    async fn list_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>> {
        Ok(read_or_recover(&self.contracts)
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn get_contract(&self, id: i64) -> Result<Option<Contract>> {
        Ok(read_or_recover(&self.contracts)
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn create_contract(
        &self,
        job: &JobPosting,
        worker_id: Option<String>,
    ) -> Result<Contract> {
        let mut contracts = write_or_recover(&self.contracts);
        let id = contracts.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let contract = Contract {
            id,
            job_id: job.id,
            job_title: job.title.clone(),
            pay: job.pay.clone(),
            location: job.location.clone(),
            date: job.date.clone(),
            status: ContractStatus::Pending,
            worker_id,
            created_at: self.clock.now(),
        };
        contracts.push(contract.clone());
        Ok(contract)
    }

    async fn update_contract_status(
        &self,
        id: i64,
        status: ContractStatus,
    ) -> Result<Option<Contract>> {
        let mut contracts = write_or_recover(&self.contracts);
        Ok(contracts.iter_mut().find(|c| c.id == id).map(|c| {
            c.status = status;
            c.clone()
        }))
    }

    async fn count_contracts(&self) -> Result<i64> {
        Ok(read_or_recover(&self.contracts).len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::FixedClock;
    use chrono::{TimeZone, Utc};

    fn new_job(title: &str, date: &str) -> NewJob {
        NewJob {
            title: title.into(),
            pay: "$7.00/bucket".into(),
            location: "Farm B".into(),
            date: date.into(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_job_assigns_max_plus_one() {
        let store = MemoryStore::new();
        let a = store.create_job(new_job("a", "2025-01-01")).await.unwrap();
        let b = store.create_job(new_job("b", "2025-01-02")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert!(store.delete_job(1).await.unwrap());
        let c = store.create_job(new_job("c", "2025-01-03")).await.unwrap();
        assert_eq!(c.id, 3);
        assert!(c.crop_type.is_none());
    }

    #[tokio::test]
    async fn delete_missing_job_reports_false() {
        let store = MemoryStore::new();
        assert!(!store.delete_job(99).await.unwrap());
    }

    #[tokio::test]
    async fn replace_jobs_keeps_contracts() {
        let store = MemoryStore::new();
        let job = store.create_job(new_job("a", "2025-01-01")).await.unwrap();
        store.create_contract(&job, None).await.unwrap();
        let replacement = vec![new_job("x", "2025-02-01").into_posting(10)];
        assert_eq!(store.replace_jobs(replacement).await.unwrap(), 1);
        assert_eq!(store.count_jobs().await.unwrap(), 1);
        assert_eq!(store.count_contracts().await.unwrap(), 1);
        assert!(store.get_job(10).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn contracts_snapshot_job_and_use_clock() {
        let at = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        let store = MemoryStore::with_clock(Arc::new(FixedClock(at)));
        let job = store.create_job(new_job("Tomato Picker", "2025-05-03")).await.unwrap();
        let contract = store
            .create_contract(&job, Some("worker-7".into()))
            .await
            .unwrap();
        assert_eq!(contract.id, 1);
        assert_eq!(contract.job_title, "Tomato Picker");
        assert_eq!(contract.date, "2025-05-03");
        assert_eq!(contract.status, ContractStatus::Pending);
        assert_eq!(contract.created_at, at);
    }

    #[tokio::test]
    async fn update_contract_status_touches_only_target() {
        let store = MemoryStore::new();
        let job = store.create_job(new_job("a", "2025-01-01")).await.unwrap();
        store.create_contract(&job, None).await.unwrap();
        store.create_contract(&job, None).await.unwrap();
        let updated = store
            .update_contract_status(2, ContractStatus::Accepted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, ContractStatus::Accepted);
        let first = store.get_contract(1).await.unwrap().unwrap();
        assert_eq!(first.status, ContractStatus::Pending);
        assert!(store
            .update_contract_status(5, ContractStatus::Rejected)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn list_jobs_applies_filter() {
        let store = MemoryStore::new();
        store.create_job(new_job("old", "2025-01-01")).await.unwrap();
        store.create_job(new_job("new", "2025-06-01")).await.unwrap();
        let jobs = store
            .list_jobs(&JobFilter {
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "new");
    }
}
