//! Admin dashboard statistics.
//!
//! Pure aggregation over jobs and contracts at a given instant, so the
//! `/stats` handler only fetches data and the bucketing is testable with a
//! fixed clock.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::formatter::{JobPosting, DATE_FORMAT};
use crate::store::Contract;

pub const FORECAST_MONTHS: [&str; 6] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];

/// Demand growth per forecast month.
pub const SEASONAL_STEP: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyJobs {
    pub name: String,
    pub jobs: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyApplications {
    pub name: String,
    pub applications: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandForecast {
    pub month: String,
    pub demand: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStat {
    pub category: String,
    pub jobs: i64,
    pub workers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsResponse {
    pub active_jobs: i64,
    pub total_applications: i64,
    pub weekly_jobs: Vec<WeeklyJobs>,
    pub weekly_applications: Vec<WeeklyApplications>,
    pub labor_demand_forecast: Vec<DemandForecast>,
    pub category_stats: Vec<CategoryStat>,
}

/// Midnight of a posting's date; `None` for unparseable dates.
fn job_midnight(job: &JobPosting) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(&job.date, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn weekday(t: NaiveDateTime) -> String {
    t.format("%a").to_string()
}

/// Seven weekday buckets starting at the weekday of `week_ago`.
fn week_buckets(week_ago: NaiveDateTime) -> Vec<(String, i64)> {
    (0..7)
        .map(|i| (weekday(week_ago + Duration::days(i)), 0))
        .collect()
}

fn bump(buckets: &mut [(String, i64)], day: &str) {
    if let Some(slot) = buckets.iter_mut().find(|(name, _)| name == day) {
        slot.1 += 1;
    }
}

/// Forecast `base * (1 + i * step)` per month, truncated, with
/// `base = job_count / 2`.
pub fn demand_forecast(job_count: i64) -> Vec<DemandForecast> {
    let base = job_count / 2;
    FORECAST_MONTHS
        .iter()
        .enumerate()
        .map(|(i, month)| {
            let factor = 1.0 + i as f64 * SEASONAL_STEP;
            DemandForecast {
                month: month.to_string(),
                demand: (base as f64 * factor) as i64,
            }
        })
        .collect()
}

/// Per-crop job and requested-worker totals, in first-seen order.
pub fn category_stats(jobs: &[JobPosting]) -> Vec<CategoryStat> {
    let mut stats: Vec<CategoryStat> = Vec::new();
    for job in jobs {
        let category = job
            .crop_type
            .map(|c| c.as_str().to_string())
            .unwrap_or_else(|| "Other".to_string());
        let workers = job.workers_requested.unwrap_or(0);
        match stats.iter_mut().find(|s| s.category == category) {
            Some(s) => {
                s.jobs += 1;
                s.workers += workers;
            }
            None => stats.push(CategoryStat {
                category,
                jobs: 1,
                workers,
            }),
        }
    }
    stats
}

/// Aggregate dashboard statistics as of `now`. `jobs` should be in id order
/// so category order is stable.
pub fn compute_stats(jobs: &[JobPosting], contracts: &[Contract], now: DateTime<Utc>) -> StatsResponse {
    let now_naive = now.naive_utc();
    let week_ago = now_naive - Duration::days(7);

    let mut job_buckets = week_buckets(week_ago);
    for day in jobs.iter().filter_map(job_midnight).filter(|d| *d >= week_ago) {
        bump(&mut job_buckets, &weekday(day));
    }

    let mut application_buckets = week_buckets(week_ago);
    for contract in contracts {
        let created = contract.created_at.naive_utc();
        if created >= week_ago {
            bump(&mut application_buckets, &weekday(created));
        }
    }

    let active_jobs = jobs
        .iter()
        .filter_map(job_midnight)
        .filter(|d| *d >= now_naive)
        .count() as i64;

    StatsResponse {
        active_jobs,
        total_applications: contracts.len() as i64,
        weekly_jobs: job_buckets
            .into_iter()
            .map(|(name, jobs)| WeeklyJobs { name, jobs })
            .collect(),
        weekly_applications: application_buckets
            .into_iter()
            .map(|(name, applications)| WeeklyApplications { name, applications })
            .collect(),
        labor_demand_forecast: demand_forecast(jobs.len() as i64),
        category_stats: category_stats(jobs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::CropType;
    use crate::store::{ContractStatus, NewJob};
    use chrono::TimeZone;

    // Wednesday
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 12, 15, 30, 0).unwrap()
    }

    fn job(id: i64, date: &str, crop: Option<CropType>, workers: Option<i64>) -> JobPosting {
        let mut p = NewJob {
            title: "t".into(),
            pay: "p".into(),
            location: "Farm A".into(),
            date: date.into(),
            description: None,
        }
        .into_posting(id);
        p.crop_type = crop;
        p.workers_requested = workers;
        p
    }

    fn contract(created_at: DateTime<Utc>) -> Contract {
        Contract {
            id: 1,
            job_id: 1,
            job_title: "t".into(),
            pay: "p".into(),
            location: "Farm A".into(),
            date: "2025-03-12".into(),
            status: ContractStatus::Pending,
            worker_id: None,
            created_at,
        }
    }

    #[test]
    fn week_buckets_start_at_week_ago_weekday() {
        let stats = compute_stats(&[], &[], now());
        let names: Vec<&str> = stats.weekly_jobs.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Wed", "Thu", "Fri", "Sat", "Sun", "Mon", "Tue"]);
        assert!(stats.weekly_jobs.iter().all(|w| w.jobs == 0));
        assert_eq!(stats.weekly_applications.len(), 7);
    }

    #[test]
    fn recent_jobs_counted_by_weekday() {
        let jobs = vec![
            job(1, "2025-03-10", None, None), // Mon
            job(2, "2025-03-10", None, None), // Mon
            job(3, "2025-03-14", None, None), // Fri, future still counts
            job(4, "2025-03-01", None, None), // too old
            job(5, "not a date", None, None),
        ];
        let stats = compute_stats(&jobs, &[], now());
        let count = |day: &str| {
            stats
                .weekly_jobs
                .iter()
                .find(|w| w.name == day)
                .map(|w| w.jobs)
                .unwrap()
        };
        assert_eq!(count("Mon"), 2);
        assert_eq!(count("Fri"), 1);
        assert_eq!(count("Sat"), 0);
    }

    #[test]
    fn week_ago_boundary_uses_midnight_of_job_date() {
        // week_ago = 2025-03-05 15:30; the 5th at midnight is earlier
        let stats = compute_stats(&[job(1, "2025-03-05", None, None)], &[], now());
        assert!(stats.weekly_jobs.iter().all(|w| w.jobs == 0));
        let stats = compute_stats(&[job(1, "2025-03-06", None, None)], &[], now());
        assert_eq!(stats.weekly_jobs.iter().map(|w| w.jobs).sum::<i64>(), 1);
    }

    #[test]
    fn applications_counted_by_created_weekday() {
        let contracts = vec![
            contract(Utc.with_ymd_and_hms(2025, 3, 11, 9, 0, 0).unwrap()), // Tue
            contract(Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap()),  // too old
        ];
        let stats = compute_stats(&[], &contracts, now());
        let tue = stats
            .weekly_applications
            .iter()
            .find(|w| w.name == "Tue")
            .unwrap();
        assert_eq!(tue.applications, 1);
        assert_eq!(stats.total_applications, 2);
    }

    #[test]
    fn active_jobs_are_dated_after_now() {
        let jobs = vec![
            job(1, "2025-03-12", None, None), // today: midnight < now
            job(2, "2025-03-13", None, None),
            job(3, "2025-04-01", None, None),
        ];
        assert_eq!(compute_stats(&jobs, &[], now()).active_jobs, 2);
    }

    #[test]
    fn forecast_grows_fifteen_percent_per_month() {
        let forecast = demand_forecast(50);
        let demands: Vec<i64> = forecast.iter().map(|f| f.demand).collect();
        assert_eq!(demands, vec![25, 28, 32, 36, 40, 43]);
        assert_eq!(forecast[0].month, "Jan");
        assert_eq!(forecast[5].month, "Jun");
    }

    #[test]
    fn forecast_for_empty_board_is_zero() {
        assert!(demand_forecast(0).iter().all(|f| f.demand == 0));
        assert!(demand_forecast(1).iter().all(|f| f.demand == 0));
    }

    #[test]
    fn category_stats_group_in_first_seen_order() {
        let jobs = vec![
            job(1, "2025-03-12", Some(CropType::Strawberry), Some(20)),
            job(2, "2025-03-12", Some(CropType::Tomato), Some(30)),
            job(3, "2025-03-12", Some(CropType::Strawberry), Some(15)),
            job(4, "2025-03-12", None, None),
        ];
        let stats = category_stats(&jobs);
        assert_eq!(
            stats,
            vec![
                CategoryStat {
                    category: "Strawberry".into(),
                    jobs: 2,
                    workers: 35
                },
                CategoryStat {
                    category: "Tomato".into(),
                    jobs: 1,
                    workers: 30
                },
                CategoryStat {
                    category: "Other".into(),
                    jobs: 1,
                    workers: 0
                },
            ]
        );
    }
}
