//! # Store — Job and Contract Repository
//!
//! The HTTP layer talks to persistence only through the [`Store`] trait,
//! injected into `AppState` as `Arc<dyn Store>`. Two implementations exist:
//!
//! - [`MemoryStore`] — process-local tables behind `RwLock`s (default, tests)
//! - [`crate::db::Database`] — PostgreSQL via `sqlx`
//!
//! Filter semantics live here ([`JobFilter`], [`ContractFilter`]) so both
//! implementations agree on matching and ordering.

mod memory;

pub use memory::MemoryStore;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::formatter::JobPosting;

// ── Contract types ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Pending,
    Accepted,
    Rejected,
    Signed,
    Completed,
}

impl ContractStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractStatus::Pending => "pending",
            ContractStatus::Accepted => "accepted",
            ContractStatus::Rejected => "rejected",
            ContractStatus::Signed => "signed",
            ContractStatus::Completed => "completed",
        }
    }

    /// Statuses a grower may set through `PATCH /contracts/{id}`.
    pub fn is_reviewable(self) -> bool {
        matches!(
            self,
            ContractStatus::Pending | ContractStatus::Accepted | ContractStatus::Rejected
        )
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContractStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(ContractStatus::Pending),
            "accepted" => Ok(ContractStatus::Accepted),
            "rejected" => Ok(ContractStatus::Rejected),
            "signed" => Ok(ContractStatus::Signed),
            "completed" => Ok(ContractStatus::Completed),
            other => anyhow::bail!("unknown contract status '{}'", other),
        }
    }
}

/// A worker's application for a job. Job fields are copied at creation so
/// the contract survives job deletion or regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: i64,
    pub job_id: i64,
    pub job_title: String,
    pub pay: String,
    pub location: String,
    pub date: String,
    pub status: ContractStatus,
    pub worker_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields of a hand-made job posting.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub pay: String,
    pub location: String,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewJob {
    pub fn into_posting(self, id: i64) -> JobPosting {
        JobPosting {
            id,
            title: self.title,
            pay: self.pay,
            location: self.location,
            date: self.date,
            description: self.description,
            crop_type: None,
            quantity: None,
            workers_requested: None,
            pay_rate_mxn: None,
            total_value_mxn: None,
            service_time_mins: None,
            arrival_time_poisson: None,
        }
    }
}

// ── Filters ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub crop_type: Option<String>,
    pub location: Option<String>,
    pub limit: Option<i64>,
}

impl JobFilter {
    /// Case-insensitive match on crop type and location. Postings without a
    /// crop type never match a crop filter.
    pub fn matches(&self, job: &JobPosting) -> bool {
        if let Some(ref crop) = self.crop_type {
            let hit = job
                .crop_type
                .map(|c| c.as_str().eq_ignore_ascii_case(crop))
                .unwrap_or(false);
            if !hit {
                return false;
            }
        }
        if let Some(ref location) = self.location {
            if !job.location.eq_ignore_ascii_case(location) {
                return false;
            }
        }
        true
    }

    /// Non-positive limits mean "no limit".
    pub fn effective_limit(&self) -> Option<usize> {
        self.limit.filter(|&l| l > 0).map(|l| l as usize)
    }

    /// Filter, sort newest date first (stable), and truncate.
    pub fn apply(&self, jobs: impl IntoIterator<Item = JobPosting>) -> Vec<JobPosting> {
        let mut out: Vec<JobPosting> = jobs.into_iter().filter(|j| self.matches(j)).collect();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = self.effective_limit() {
            out.truncate(limit);
        }
        out
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractFilter {
    pub worker_id: Option<String>,
    pub status: Option<String>,
}

impl ContractFilter {
    pub fn matches(&self, contract: &Contract) -> bool {
        if let Some(ref worker) = self.worker_id {
            if contract.worker_id.as_deref() != Some(worker.as_str()) {
                return false;
            }
        }
        if let Some(ref status) = self.status {
            if !contract.status.as_str().eq_ignore_ascii_case(status) {
                return false;
            }
        }
        true
    }
}

// ── Store trait ─────────────────────────────────────────────────

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity check for the readiness probe.
    async fn health_check(&self) -> Result<()>;

    /// Jobs matching `filter`, newest date first.
    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<JobPosting>>;

    /// Every job in id order.
    async fn all_jobs(&self) -> Result<Vec<JobPosting>>;

    async fn get_job(&self, id: i64) -> Result<Option<JobPosting>>;

    /// Insert a hand-made posting with id `max(id) + 1`.
    async fn create_job(&self, job: NewJob) -> Result<JobPosting>;

    /// Returns false when no job had `id`.
    async fn delete_job(&self, id: i64) -> Result<bool>;

    /// Drop every job and insert `jobs` as given. Contracts are kept.
    async fn replace_jobs(&self, jobs: Vec<JobPosting>) -> Result<usize>;

    async fn count_jobs(&self) -> Result<i64>;

    async fn list_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>>;

    async fn get_contract(&self, id: i64) -> Result<Option<Contract>>;

    /// Create a pending contract snapshotting `job`.
    async fn create_contract(&self, job: &JobPosting, worker_id: Option<String>)
        -> Result<Contract>;

    /// Returns `None` when no contract had `id`.
    async fn update_contract_status(
        &self,
        id: i64,
        status: ContractStatus,
    ) -> Result<Option<Contract>>;

    async fn count_contracts(&self) -> Result<i64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::CropType;

    fn posting(id: i64, crop: Option<CropType>, location: &str, date: &str) -> JobPosting {
        let mut p = NewJob {
            title: format!("job {}", id),
            pay: "$1.00/bucket".into(),
            location: location.into(),
            date: date.into(),
            description: None,
        }
        .into_posting(id);
        p.crop_type = crop;
        p
    }

    fn contract(status: ContractStatus, worker: Option<&str>) -> Contract {
        Contract {
            id: 1,
            job_id: 1,
            job_title: "Tomato Picker".into(),
            pay: "$6.00/bucket".into(),
            location: "Farm A".into(),
            date: "2025-03-10".into(),
            status,
            worker_id: worker.map(String::from),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn job_filter_matches_crop_case_insensitively() {
        let filter = JobFilter {
            crop_type: Some("tOmAtO".into()),
            ..Default::default()
        };
        assert!(filter.matches(&posting(1, Some(CropType::Tomato), "Farm A", "2025-01-01")));
        assert!(!filter.matches(&posting(2, Some(CropType::Strawberry), "Farm A", "2025-01-01")));
        assert!(!filter.matches(&posting(3, None, "Farm A", "2025-01-01")));
    }

    #[test]
    fn job_filter_matches_location_case_insensitively() {
        let filter = JobFilter {
            location: Some("farm c".into()),
            ..Default::default()
        };
        assert!(filter.matches(&posting(1, None, "Farm C", "2025-01-01")));
        assert!(!filter.matches(&posting(1, None, "Farm D", "2025-01-01")));
    }

    #[test]
    fn apply_sorts_newest_first_and_keeps_ties_stable() {
        let jobs = vec![
            posting(1, None, "Farm A", "2025-01-02"),
            posting(2, None, "Farm A", "2025-01-05"),
            posting(3, None, "Farm A", "2025-01-02"),
        ];
        let ids: Vec<i64> = JobFilter::default().apply(jobs).iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn apply_truncates_only_for_positive_limit() {
        let jobs: Vec<JobPosting> = (1..=5)
            .map(|i| posting(i, None, "Farm A", "2025-01-01"))
            .collect();
        let limited = JobFilter {
            limit: Some(2),
            ..Default::default()
        };
        assert_eq!(limited.apply(jobs.clone()).len(), 2);
        let zero = JobFilter {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.apply(jobs).len(), 5);
    }

    #[test]
    fn contract_filter_by_worker_and_status() {
        let c = contract(ContractStatus::Accepted, Some("w-1"));
        let by_status = ContractFilter {
            status: Some("ACCEPTED".into()),
            ..Default::default()
        };
        assert!(by_status.matches(&c));
        let by_worker = ContractFilter {
            worker_id: Some("w-2".into()),
            ..Default::default()
        };
        assert!(!by_worker.matches(&c));
        assert!(!by_worker.matches(&contract(ContractStatus::Pending, None)));
    }

    #[test]
    fn contract_status_round_trips_through_str() {
        for status in [
            ContractStatus::Pending,
            ContractStatus::Accepted,
            ContractStatus::Rejected,
            ContractStatus::Signed,
            ContractStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<ContractStatus>().unwrap(), status);
        }
        assert!("approved".parse::<ContractStatus>().is_err());
    }

    #[test]
    fn only_review_statuses_are_settable() {
        assert!(ContractStatus::Accepted.is_reviewable());
        assert!(ContractStatus::Pending.is_reviewable());
        assert!(!ContractStatus::Signed.is_reviewable());
        assert!(!ContractStatus::Completed.is_reviewable());
    }
}
