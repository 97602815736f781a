use serde::Serialize;

use crate::analyzers::types::Analysis;
use crate::analyzers::utility::{mean, pct};

static BUCKET_LABELS: &[&str] = &[
    "1 point",
    "2-10 points",
    "11-20 points",
    "21-50 points",
    "over 50 points",
];

/// Labelled range an assignment maximum falls into. Values between the
/// ranges (such as 1.5 or 10.5) belong to none.
pub fn max_score_bucket(score: f64) -> Option<&'static str> {
    let index = match score {
        s if s == 1.0 => 0,
        s if (2.0..=10.0).contains(&s) => 1,
        s if (11.0..=20.0).contains(&s) => 2,
        s if (21.0..=50.0).contains(&s) => 3,
        s if s > 50.0 => 4,
        _ => return None,
    };
    Some(BUCKET_LABELS[index])
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub label: &'static str,
    pub count: usize,
    pub pct: f64,
}

/// Class-wide figures shown under the ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportStats {
    pub total_students: usize,
    pub students_with_bonus: usize,
    pub bonus_share_pct: f64,
    pub total_bonus: u64,
    pub mean_bonus: f64,
    pub assignment_count: usize,
    pub lowest_max_score: Option<f64>,
    pub highest_max_score: Option<f64>,
    /// Only buckets that contain at least one assignment.
    pub max_score_buckets: Vec<BucketCount>,
}

impl ReportStats {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let table = &analysis.table;
        let bonuses: Vec<f64> = table.iter().map(|r| r.bonus_total as f64).collect();
        let students_with_bonus = table.iter().filter(|r| r.bonus_total > 0).count();

        let maxima: Vec<f64> = analysis.assignments.iter().map(|a| a.max_score).collect();
        let lowest_max_score = maxima.iter().copied().reduce(f64::min);
        let highest_max_score = maxima.iter().copied().reduce(f64::max);

        let max_score_buckets = BUCKET_LABELS
            .iter()
            .map(|&label| {
                let count = maxima
                    .iter()
                    .filter(|m| max_score_bucket(**m) == Some(label))
                    .count();
                BucketCount {
                    label,
                    count,
                    pct: pct(count, maxima.len()),
                }
            })
            .filter(|b| b.count > 0)
            .collect();

        ReportStats {
            total_students: table.len(),
            students_with_bonus,
            bonus_share_pct: pct(students_with_bonus, table.len()),
            total_bonus: table.iter().map(|r| r.bonus_total as u64).sum(),
            mean_bonus: mean(&bonuses),
            assignment_count: maxima.len(),
            lowest_max_score,
            highest_max_score,
            max_score_buckets,
        }
    }
}
