//! Filter predicates for the dashboard and the community feed.
//!
//! All of these are pure functions over one interview record; the debounced
//! recomputation that applies them lives in [`crate::query`].
//!
//! The two surfaces intentionally search different fields: the dashboard
//! matches free text against company and role only, while the community feed
//! also searches question text.

use shared::{Interview, InterviewStatus, InterviewType};

/// Selector over the record's lifecycle status. `All` is the neutral value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Is(InterviewStatus),
}

/// Selector over the interview type. `All` is the neutral value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Is(InterviewType),
}

/// Selector over the tri-state result field. `Unknown` selects records whose
/// result has not been recorded, which is different from selecting either
/// boolean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PassedFilter {
    #[default]
    All,
    Passed,
    Failed,
    Unknown,
}

impl PassedFilter {
    fn matches(&self, passed: Option<bool>) -> bool {
        match self {
            PassedFilter::All => true,
            PassedFilter::Passed => passed == Some(true),
            PassedFilter::Failed => passed == Some(false),
            PassedFilter::Unknown => passed.is_none(),
        }
    }
}

/// Live filter state of the personal dashboard. Starts all-neutral; each
/// field independently narrows the result set and the fields combine with
/// logical AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardFilter {
    pub free_text: String,
    pub status: StatusFilter,
    pub interview_type: TypeFilter,
    pub passed: PassedFilter,
}

impl DashboardFilter {
    pub fn is_neutral(&self) -> bool {
        *self == DashboardFilter::default()
    }

    /// True iff the record survives every active field.
    pub fn matches(&self, interview: &Interview) -> bool {
        let term = self.free_text.trim().to_lowercase();
        if !term.is_empty()
            && !interview.company.to_lowercase().contains(&term)
            && !interview.role.to_lowercase().contains(&term)
        {
            return false;
        }
        if let StatusFilter::Is(want) = self.status {
            if interview.status != Some(want) {
                return false;
            }
        }
        if let TypeFilter::Is(want) = self.interview_type {
            if interview.interview_type != want {
                return false;
            }
        }
        self.passed.matches(interview.passed)
    }
}

/// Live filter state of the community feed. `company` is an exact match
/// against a choice taken from the fetched collection (`None` = all), and
/// free text additionally searches the shared question list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedFilter {
    pub search: String,
    pub company: Option<String>,
    pub interview_type: TypeFilter,
}

impl FeedFilter {
    pub fn is_neutral(&self) -> bool {
        *self == FeedFilter::default()
    }

    pub fn matches(&self, interview: &Interview) -> bool {
        if let Some(company) = &self.company {
            if interview.company != *company {
                return false;
            }
        }
        if let TypeFilter::Is(want) = self.interview_type {
            if interview.interview_type != want {
                return false;
            }
        }
        let term = self.search.trim().to_lowercase();
        if !term.is_empty() {
            let hit = interview.company.to_lowercase().contains(&term)
                || interview.role.to_lowercase().contains(&term)
                || interview.questions.iter().any(|q| q.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Feed ordering, applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
    Company,
}

impl SortOrder {
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "Newest",
            SortOrder::OldestFirst => "Oldest",
            SortOrder::Company => "Company",
        }
    }
}

/// Sorts in place. Records with an unparseable date sort last in both date
/// orders.
pub fn sort_interviews(interviews: &mut [Interview], order: SortOrder) {
    match order {
        SortOrder::NewestFirst => {
            interviews.sort_by(|a, b| b.parsed_date().cmp(&a.parsed_date()));
        }
        SortOrder::OldestFirst => {
            interviews.sort_by(|a, b| match (a.parsed_date(), b.parsed_date()) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }
        SortOrder::Company => {
            interviews.sort_by(|a, b| a.company.to_lowercase().cmp(&b.company.to_lowercase()));
        }
    }
}

/// Distinct company names of a collection, sorted, for the feed's company
/// selector.
pub fn companies(interviews: &[Interview]) -> Vec<String> {
    let mut names: Vec<String> = interviews.iter().map(|i| i.company.clone()).collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Interview;

    fn interview(company: &str, role: &str, status: InterviewStatus) -> Interview {
        let mut iv = Interview::new(company, role, "2026-05-01T10:00:00Z", InterviewType::Video);
        iv.status = Some(status);
        iv
    }

    #[test]
    fn test_neutral_filter_excludes_nothing() {
        let records = vec![
            interview("Tech Corp", "Frontend Developer", InterviewStatus::Scheduled),
            interview("Startup Inc", "Backend Developer", InterviewStatus::Completed),
        ];
        let filter = DashboardFilter::default();
        assert!(filter.is_neutral());
        assert!(records.iter().all(|r| filter.matches(r)));
    }

    #[test]
    fn test_free_text_matches_company_or_role() {
        let a = interview("Tech Corp", "Frontend Developer", InterviewStatus::Scheduled);
        let b = interview("Startup Inc", "Backend Developer", InterviewStatus::Completed);
        let filter = DashboardFilter {
            free_text: "tech".to_string(),
            ..DashboardFilter::default()
        };
        assert!(filter.matches(&a));
        assert!(!filter.matches(&b));

        // Role side, different casing, surrounding whitespace.
        let filter = DashboardFilter {
            free_text: "  BACKEND ".to_string(),
            ..DashboardFilter::default()
        };
        assert!(!filter.matches(&a));
        assert!(filter.matches(&b));
    }

    #[test]
    fn test_dashboard_free_text_ignores_questions() {
        let mut iv = interview("Tech Corp", "SRE", InterviewStatus::Completed);
        iv.questions = vec!["Describe a paging incident".to_string()];
        let filter = DashboardFilter {
            free_text: "paging".to_string(),
            ..DashboardFilter::default()
        };
        assert!(!filter.matches(&iv));
    }

    #[test]
    fn test_status_and_type_filters() {
        let mut iv = interview("Acme", "SRE", InterviewStatus::Scheduled);
        iv.interview_type = InterviewType::Panel;

        let filter = DashboardFilter {
            status: StatusFilter::Is(InterviewStatus::Completed),
            ..DashboardFilter::default()
        };
        assert!(!filter.matches(&iv));

        let filter = DashboardFilter {
            status: StatusFilter::Is(InterviewStatus::Scheduled),
            interview_type: TypeFilter::Is(InterviewType::Panel),
            ..DashboardFilter::default()
        };
        assert!(filter.matches(&iv));

        // A record without a status never matches a specific selector.
        iv.status = None;
        let filter = DashboardFilter {
            status: StatusFilter::Is(InterviewStatus::Scheduled),
            ..DashboardFilter::default()
        };
        assert!(!filter.matches(&iv));
    }

    #[test]
    fn test_passed_tri_state() {
        let mut unknown = interview("Acme", "SRE", InterviewStatus::Completed);
        unknown.passed = None;
        let mut yes = unknown.clone();
        yes.passed = Some(true);
        let mut no = unknown.clone();
        no.passed = Some(false);

        let want_unknown = DashboardFilter {
            passed: PassedFilter::Unknown,
            ..DashboardFilter::default()
        };
        assert!(want_unknown.matches(&unknown));
        assert!(!want_unknown.matches(&yes));
        assert!(!want_unknown.matches(&no));

        let want_passed = DashboardFilter {
            passed: PassedFilter::Passed,
            ..DashboardFilter::default()
        };
        assert!(want_passed.matches(&yes));
        assert!(!want_passed.matches(&unknown));
        assert!(!want_passed.matches(&no));

        let want_failed = DashboardFilter {
            passed: PassedFilter::Failed,
            ..DashboardFilter::default()
        };
        assert!(want_failed.matches(&no));
        assert!(!want_failed.matches(&unknown));
    }

    #[test]
    fn test_fields_combine_with_and() {
        let iv = interview("Tech Corp", "Frontend Developer", InterviewStatus::Scheduled);
        let filter = DashboardFilter {
            free_text: "tech".to_string(),
            status: StatusFilter::Is(InterviewStatus::Completed),
            ..DashboardFilter::default()
        };
        // Free text matches but status doesn't: no single field decides inclusion.
        assert!(!filter.matches(&iv));
    }

    #[test]
    fn test_predicate_ignores_unrelated_fields() {
        let mut a = interview("Tech Corp", "SRE", InterviewStatus::Completed);
        let mut b = a.clone();
        b.notes = Some("went well".to_string());
        b.performance_rating = Some(9);
        b.is_public = false;
        a.passed = Some(true);
        b.passed = Some(true);

        let filter = DashboardFilter {
            free_text: "tech".to_string(),
            status: StatusFilter::Is(InterviewStatus::Completed),
            passed: PassedFilter::Passed,
            ..DashboardFilter::default()
        };
        assert_eq!(filter.matches(&a), filter.matches(&b));
    }

    #[test]
    fn test_feed_search_includes_questions() {
        let mut iv = interview("Tech Corp", "SRE", InterviewStatus::Completed);
        iv.questions = vec!["Describe a paging incident".to_string()];
        let filter = FeedFilter {
            search: "paging".to_string(),
            ..FeedFilter::default()
        };
        assert!(filter.matches(&iv));

        let miss = FeedFilter {
            search: "kubernetes".to_string(),
            ..FeedFilter::default()
        };
        assert!(!miss.matches(&iv));
    }

    #[test]
    fn test_feed_company_is_exact() {
        let iv = interview("Tech Corp", "SRE", InterviewStatus::Completed);
        let exact = FeedFilter {
            company: Some("Tech Corp".to_string()),
            ..FeedFilter::default()
        };
        assert!(exact.matches(&iv));
        let other = FeedFilter {
            company: Some("Tech".to_string()),
            ..FeedFilter::default()
        };
        assert!(!other.matches(&iv));
    }

    #[test]
    fn test_sort_orders() {
        let mut list = vec![
            interview("Zeta", "SRE", InterviewStatus::Completed),
            interview("acme", "SRE", InterviewStatus::Completed),
            interview("Mid", "SRE", InterviewStatus::Completed),
        ];
        list[0].date = "2026-01-05T09:00:00Z".to_string();
        list[1].date = "2026-03-05T09:00:00Z".to_string();
        list[2].date = "2026-02-05T09:00:00Z".to_string();

        sort_interviews(&mut list, SortOrder::NewestFirst);
        assert_eq!(list[0].company, "acme");
        assert_eq!(list[2].company, "Zeta");

        sort_interviews(&mut list, SortOrder::OldestFirst);
        assert_eq!(list[0].company, "Zeta");
        assert_eq!(list[2].company, "acme");

        sort_interviews(&mut list, SortOrder::Company);
        assert_eq!(list[0].company, "acme");
        assert_eq!(list[1].company, "Mid");
        assert_eq!(list[2].company, "Zeta");
    }

    #[test]
    fn test_unparseable_dates_sort_last() {
        let mut list = vec![
            interview("A", "SRE", InterviewStatus::Completed),
            interview("B", "SRE", InterviewStatus::Completed),
        ];
        list[0].date = "garbage".to_string();
        list[1].date = "2026-02-05T09:00:00Z".to_string();

        sort_interviews(&mut list, SortOrder::NewestFirst);
        assert_eq!(list[0].company, "B");
        sort_interviews(&mut list, SortOrder::OldestFirst);
        assert_eq!(list[0].company, "B");
    }

    #[test]
    fn test_companies_sorted_distinct() {
        let list = vec![
            interview("Tech Corp", "SRE", InterviewStatus::Completed),
            interview("Acme", "SRE", InterviewStatus::Completed),
            interview("Tech Corp", "Backend Developer", InterviewStatus::Completed),
        ];
        assert_eq!(companies(&list), vec!["Acme".to_string(), "Tech Corp".to_string()]);
    }
}
