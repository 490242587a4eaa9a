//! CSV and JSON rendering for `jornal generate`.

use anyhow::Result;

use crate::formatter::JobPosting;
use crate::simulator::JobSample;

pub const SAMPLE_CSV_HEADER: &str = "job_id,crop_type,quantity_units,unit_type,crew_size,pay_rate,\
service_time_minutes,total_value,arrival_time_constant,arrival_time_poisson\n";

pub const POSTING_CSV_HEADER: &str =
    "id,title,pay,location,date,crop_type,quantity,workers_requested,total_value_mxn\n";

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

pub fn samples_csv(samples: &[JobSample]) -> String {
    let mut csv = String::from(SAMPLE_CSV_HEADER);
    for s in samples {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            s.job_id,
            s.crop_type,
            s.quantity_units,
            s.unit_type,
            s.crew_size,
            s.pay_rate,
            s.service_time_minutes,
            s.total_value,
            s.arrival_time_constant,
            s.arrival_time_poisson,
        ));
    }
    csv
}

pub fn postings_csv(postings: &[JobPosting]) -> String {
    let mut csv = String::from(POSTING_CSV_HEADER);
    for p in postings {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            p.id,
            quote(&p.title),
            quote(&p.pay),
            quote(&p.location),
            p.date,
            opt(p.crop_type),
            opt(p.quantity),
            opt(p.workers_requested),
            opt(p.total_value_mxn),
        ));
    }
    csv
}

pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
