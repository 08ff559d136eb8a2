//! Aggregate numbers shown above the dashboard list.

use chrono::Utc;
use shared::{Interview, InterviewStatus};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub companies: usize,
    pub upcoming: usize,
    /// Percentage of completed interviews marked passed.
    pub pass_rate: u8,
}

/// Computed over the unfiltered collection, so the numbers don't shift while
/// the user narrows the list.
pub fn dashboard_stats(interviews: &[Interview]) -> DashboardStats {
    let now = Utc::now();
    let companies: HashSet<&str> = interviews.iter().map(|iv| iv.company.as_str()).collect();
    let completed = interviews
        .iter()
        .filter(|iv| iv.status == Some(InterviewStatus::Completed))
        .count();
    let passed = interviews.iter().filter(|iv| iv.passed == Some(true)).count();
    let upcoming = interviews
        .iter()
        .filter(|iv| {
            iv.status == Some(InterviewStatus::Scheduled)
                && iv.parsed_date().is_some_and(|date| date > now)
        })
        .count();

    DashboardStats {
        total: interviews.len(),
        companies: companies.len(),
        upcoming,
        pass_rate: if completed > 0 {
            (passed as f64 / completed as f64 * 100.0).round() as u8
        } else {
            0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shared::InterviewType;

    fn interview(company: &str, status: InterviewStatus, passed: Option<bool>) -> Interview {
        let mut iv = Interview::new(company, "Engineer", "2026-01-01T10:00:00Z", InterviewType::Video);
        iv.status = Some(status);
        iv.passed = passed;
        iv
    }

    #[test]
    fn test_empty_collection() {
        assert_eq!(dashboard_stats(&[]), DashboardStats::default());
    }

    #[test]
    fn test_counts_and_pass_rate() {
        let mut upcoming = interview("Acme", InterviewStatus::Scheduled, None);
        upcoming.date = (Utc::now() + Duration::days(3)).to_rfc3339();
        let mut past_scheduled = interview("Acme", InterviewStatus::Scheduled, None);
        past_scheduled.date = (Utc::now() - Duration::days(3)).to_rfc3339();

        let list = vec![
            interview("Tech Corp", InterviewStatus::Completed, Some(true)),
            interview("Tech Corp", InterviewStatus::Completed, Some(false)),
            interview("Startup Inc", InterviewStatus::Completed, Some(true)),
            upcoming,
            past_scheduled,
        ];

        let stats = dashboard_stats(&list);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.companies, 3);
        // Only scheduled interviews with a future date count as upcoming.
        assert_eq!(stats.upcoming, 1);
        // 2 passed out of 3 completed.
        assert_eq!(stats.pass_rate, 67);
    }
}
