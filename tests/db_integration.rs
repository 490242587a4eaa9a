//! Database integration tests.
//!
//! All tests require TEST_DATABASE_URL to be set.
//! Run with: TEST_DATABASE_URL=postgres://... cargo test --test db_integration
//!
//! Tests should be run single-threaded to avoid conflicts:
//!   cargo test --test db_integration -- --test-threads=1

mod common;

use jornal::db::Database;
use jornal::formatter::format_jobs;
use jornal::simulator::{generate, ArrivalModel, CropType};
use jornal::store::{ContractFilter, ContractStatus, JobFilter, NewJob, Store};

/// Skip the test if TEST_DATABASE_URL is not set.
macro_rules! require_db {
    () => {
        if !common::has_test_db() {
            eprintln!("Skipping: TEST_DATABASE_URL not set");
            return;
        }
    };
}

async fn setup() -> Database {
    common::setup_test_db().await
}

async fn seeded() -> Database {
    let db = setup().await;
    let samples = generate(30, 30.0, 42).unwrap();
    let postings = format_jobs(&samples, ArrivalModel::Poisson, common::test_now()).unwrap();
    db.replace_jobs(postings).await.unwrap();
    db
}

fn new_job(title: &str, date: &str) -> NewJob {
    NewJob {
        title: title.into(),
        pay: "$7.50/bucket".into(),
        location: "Farm Q".into(),
        date: date.into(),
        description: Some("hand made".into()),
    }
}

// --- Connection ---

#[tokio::test]
async fn connect_and_ping() {
    require_db!();
    let db = setup().await;
    db.health_check().await.unwrap();
}

// --- Jobs ---

#[tokio::test]
async fn replace_jobs_round_trips_postings() {
    require_db!();
    let db = setup().await;
    let samples = generate(10, 30.0, 42).unwrap();
    let postings = format_jobs(&samples, ArrivalModel::Poisson, common::test_now()).unwrap();
    assert_eq!(db.replace_jobs(postings.clone()).await.unwrap(), 10);
    assert_eq!(db.all_jobs().await.unwrap(), postings);
}

#[tokio::test]
async fn replace_jobs_drops_previous_board() {
    require_db!();
    let db = seeded().await;
    db.replace_jobs(Vec::new()).await.unwrap();
    assert_eq!(db.count_jobs().await.unwrap(), 0);
}

#[tokio::test]
async fn list_jobs_matches_memory_semantics() {
    require_db!();
    let db = seeded().await;
    let filter = JobFilter {
        crop_type: Some("tomato".into()),
        limit: Some(5),
        ..Default::default()
    };
    let jobs = db.list_jobs(&filter).await.unwrap();
    assert!(jobs.len() <= 5);
    assert!(jobs.iter().all(|j| j.crop_type == Some(CropType::Tomato)));
    assert!(jobs.windows(2).all(|w| w[0].date >= w[1].date));

    let all = db.all_jobs().await.unwrap();
    let expected = JobFilter {
        location: Some("FARM a".into()),
        ..Default::default()
    };
    let from_db: Vec<i64> = db
        .list_jobs(&expected)
        .await
        .unwrap()
        .iter()
        .map(|j| j.id)
        .collect();
    let from_memory: Vec<i64> = expected.apply(all).iter().map(|j| j.id).collect();
    assert_eq!(from_db, from_memory);
}

#[tokio::test]
async fn create_job_uses_max_plus_one() {
    require_db!();
    let db = seeded().await;
    let job = db.create_job(new_job("Pepper Picker", "2025-04-01")).await.unwrap();
    assert_eq!(job.id, 31);
    assert!(job.crop_type.is_none());
    assert_eq!(job.description.as_deref(), Some("hand made"));
    assert_eq!(db.get_job(31).await.unwrap(), Some(job));
}

#[tokio::test]
async fn create_job_on_empty_table_starts_at_one() {
    require_db!();
    let db = setup().await;
    let job = db.create_job(new_job("First", "2025-04-01")).await.unwrap();
    assert_eq!(job.id, 1);
}

#[tokio::test]
async fn delete_job_reports_presence() {
    require_db!();
    let db = seeded().await;
    assert!(db.delete_job(4).await.unwrap());
    assert!(!db.delete_job(4).await.unwrap());
    assert!(db.get_job(4).await.unwrap().is_none());
    assert_eq!(db.count_jobs().await.unwrap(), 29);
}

// --- Contracts ---

#[tokio::test]
async fn contract_create_review_and_filter() {
    require_db!();
    let db = seeded().await;
    let job = db.get_job(2).await.unwrap().unwrap();
    let first = db.create_contract(&job, Some("w-1".into())).await.unwrap();
    let second = db.create_contract(&job, None).await.unwrap();
    assert_eq!(first.status, ContractStatus::Pending);
    assert_eq!(first.job_title, job.title);
    assert!(second.id > first.id);

    let updated = db
        .update_contract_status(first.id, ContractStatus::Accepted)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, ContractStatus::Accepted);
    assert!(db
        .update_contract_status(9999, ContractStatus::Rejected)
        .await
        .unwrap()
        .is_none());

    let by_worker = db
        .list_contracts(&ContractFilter {
            worker_id: Some("w-1".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_worker.len(), 1);
    let pending = db
        .list_contracts(&ContractFilter {
            status: Some("PENDING".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.id);
    assert_eq!(db.count_contracts().await.unwrap(), 2);
}

#[tokio::test]
async fn contracts_survive_regeneration() {
    require_db!();
    let db = seeded().await;
    let job = db.get_job(1).await.unwrap().unwrap();
    let contract = db.create_contract(&job, None).await.unwrap();
    db.replace_jobs(Vec::new()).await.unwrap();
    assert_eq!(db.get_contract(contract.id).await.unwrap(), Some(contract));
}
