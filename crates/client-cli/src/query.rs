//! Debounced query controllers over the in-memory interview collection.
//!
//! Each controller owns the collection as fetched plus the live filter
//! specification, and derives the filtered (feed: and sorted) view the UI
//! renders. Filter edits never recompute directly; they arm a quiet-period
//! deadline that the TUI tick polls, so a burst of keystrokes costs one
//! filter pass. Until the deadline fires the previously filtered view stays
//! on screen.

use std::time::{Duration, Instant};

use shared::Interview;

use crate::filter::{companies, sort_interviews, DashboardFilter, FeedFilter, SortOrder};

/// Quiet period measured from the last filter edit.
pub const FILTER_DEBOUNCE: Duration = Duration::from_millis(400);

/// Clock-explicit debounce: idle until an edit arms a deadline, re-arming
/// replaces the deadline (cancel previous, arm new; at most one armed at a
/// time), and `fire` reports readiness exactly once per armed deadline.
///
/// The caller supplies `Instant`s, so the state machine is independent of
/// any event-loop primitive and directly testable.
#[derive(Debug, Clone)]
pub struct Debounce {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, deadline: None }
    }

    /// Transition idle → pending, or pending → pending with the deadline
    /// pushed out to `now + quiet`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True iff an armed deadline has been reached; consumes the deadline so
    /// each armed cycle fires once.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Query controller for the personal dashboard.
#[derive(Debug)]
pub struct DashboardQuery {
    interviews: Vec<Interview>,
    filtered: Vec<Interview>,
    filter: DashboardFilter,
    debounce: Debounce,
}

impl DashboardQuery {
    pub fn new() -> Self {
        Self {
            interviews: Vec::new(),
            filtered: Vec::new(),
            filter: DashboardFilter::default(),
            debounce: Debounce::new(FILTER_DEBOUNCE),
        }
    }

    /// Replaces the collection wholesale (fresh fetch) and recomputes against
    /// the current filter right away; a fetch result is not a keystroke.
    pub fn set_interviews(&mut self, interviews: Vec<Interview>) {
        self.interviews = interviews;
        self.recompute();
    }

    /// Mutates the filter specification and (re-)arms the quiet period.
    pub fn edit<F: FnOnce(&mut DashboardFilter)>(&mut self, now: Instant, apply: F) {
        apply(&mut self.filter);
        self.debounce.arm(now);
    }

    /// Replaces the specification with the neutral default immediately; the
    /// recomputation follows the same debounce path as any other edit.
    pub fn reset(&mut self, now: Instant) {
        self.filter = DashboardFilter::default();
        self.debounce.arm(now);
    }

    /// Tick from the UI loop. Returns true when a recomputation just landed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.debounce.fire(now) {
            self.recompute();
            true
        } else {
            false
        }
    }

    /// Drops any armed recomputation without applying it, for when the view
    /// consuming this controller goes away.
    pub fn cancel_pending(&mut self) {
        self.debounce.cancel();
    }

    fn recompute(&mut self) {
        self.filtered = self
            .interviews
            .iter()
            .filter(|iv| self.filter.matches(iv))
            .cloned()
            .collect();
    }

    pub fn filter(&self) -> &DashboardFilter {
        &self.filter
    }

    /// The unfiltered collection as fetched.
    pub fn all(&self) -> &[Interview] {
        &self.interviews
    }

    /// The derived view: previous result while a recomputation is pending.
    pub fn filtered(&self) -> &[Interview] {
        &self.filtered
    }

    pub fn is_recompute_pending(&self) -> bool {
        self.debounce.is_pending()
    }
}

/// Query controller for the community feed: same debounced filtering, plus a
/// sort order applied after filtering and recomputed immediately (comparator
/// work is cheap) on every sort-key change or recompute.
#[derive(Debug)]
pub struct FeedQuery {
    interviews: Vec<Interview>,
    filtered: Vec<Interview>,
    filter: FeedFilter,
    sort: SortOrder,
    debounce: Debounce,
}

impl FeedQuery {
    pub fn new() -> Self {
        Self {
            interviews: Vec::new(),
            filtered: Vec::new(),
            filter: FeedFilter::default(),
            sort: SortOrder::default(),
            debounce: Debounce::new(FILTER_DEBOUNCE),
        }
    }

    pub fn set_interviews(&mut self, interviews: Vec<Interview>) {
        self.interviews = interviews;
        self.recompute();
    }

    pub fn edit<F: FnOnce(&mut FeedFilter)>(&mut self, now: Instant, apply: F) {
        apply(&mut self.filter);
        self.debounce.arm(now);
    }

    pub fn reset(&mut self, now: Instant) {
        self.filter = FeedFilter::default();
        self.debounce.arm(now);
    }

    /// Sort changes skip the debounce: the already-filtered view is re-sorted
    /// on the spot.
    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        sort_interviews(&mut self.filtered, self.sort);
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        if self.debounce.fire(now) {
            self.recompute();
            true
        } else {
            false
        }
    }

    pub fn cancel_pending(&mut self) {
        self.debounce.cancel();
    }

    fn recompute(&mut self) {
        self.filtered = self
            .interviews
            .iter()
            .filter(|iv| self.filter.matches(iv))
            .cloned()
            .collect();
        sort_interviews(&mut self.filtered, self.sort);
    }

    pub fn filter(&self) -> &FeedFilter {
        &self.filter
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Company choices for the selector, derived from the full collection.
    pub fn companies(&self) -> Vec<String> {
        companies(&self.interviews)
    }

    pub fn all(&self) -> &[Interview] {
        &self.interviews
    }

    pub fn filtered(&self) -> &[Interview] {
        &self.filtered
    }

    pub fn is_recompute_pending(&self) -> bool {
        self.debounce.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{PassedFilter, StatusFilter};
    use shared::{InterviewStatus, InterviewType};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn interview(company: &str, role: &str, status: InterviewStatus) -> Interview {
        let mut iv = Interview::new(company, role, "2026-05-01T10:00:00Z", InterviewType::Video);
        iv.status = Some(status);
        iv
    }

    fn sample() -> Vec<Interview> {
        vec![
            interview("Tech Corp", "Frontend Developer", InterviewStatus::Scheduled),
            interview("Startup Inc", "Backend Developer", InterviewStatus::Completed),
        ]
    }

    #[test]
    fn test_debounce_rearm_pushes_deadline_out() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(400));
        debounce.arm(t0);
        debounce.arm(t0 + ms(100));
        debounce.arm(t0 + ms(200));

        // Original deadline (t0+400) must not fire: the re-arm canceled it.
        assert!(!debounce.fire(t0 + ms(450)));
        assert!(debounce.is_pending());
        // Fires once at >= last edit + quiet period, then returns to idle.
        assert!(debounce.fire(t0 + ms(600)));
        assert!(!debounce.is_pending());
        assert!(!debounce.fire(t0 + ms(700)));
    }

    #[test]
    fn test_debounce_cancel() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(400));
        debounce.arm(t0);
        debounce.cancel();
        assert!(!debounce.fire(t0 + ms(1000)));
    }

    #[test]
    fn test_edit_burst_recomputes_once_with_last_value() {
        let t0 = Instant::now();
        let mut query = DashboardQuery::new();
        query.set_interviews(sample());

        // Keystroke burst: "t" at 0ms, "te" at 100ms, "tech" at 200ms.
        query.edit(t0, |f| f.free_text = "t".to_string());
        query.edit(t0 + ms(100), |f| f.free_text = "te".to_string());
        query.edit(t0 + ms(200), |f| f.free_text = "tech".to_string());

        // During the quiet period the previous (unfiltered) result stays up.
        assert!(!query.poll(t0 + ms(300)));
        assert_eq!(query.filtered().len(), 2);

        let mut fired = 0;
        for step in [400u64, 500, 599, 600, 700] {
            if query.poll(t0 + ms(step)) {
                fired += 1;
                // One recomputation, no earlier than last edit + 400ms.
                assert!(step >= 600);
            }
        }
        assert_eq!(fired, 1);
        assert_eq!(query.filtered().len(), 1);
        assert_eq!(query.filtered()[0].company, "Tech Corp");
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let t0 = Instant::now();
        let mut query = DashboardQuery::new();
        query.set_interviews(sample());
        query.edit(t0, |f| f.status = StatusFilter::Is(InterviewStatus::Completed));
        assert!(query.poll(t0 + ms(400)));
        let first: Vec<String> = query.filtered().iter().map(|i| i.company.clone()).collect();

        // Re-applying the same specification yields the same result.
        query.edit(t0 + ms(500), |f| f.status = StatusFilter::Is(InterviewStatus::Completed));
        assert!(query.poll(t0 + ms(900)));
        let second: Vec<String> = query.filtered().iter().map(|i| i.company.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_restores_neutral_through_debounce() {
        let t0 = Instant::now();
        let mut query = DashboardQuery::new();
        query.set_interviews(sample());
        query.edit(t0, |f| f.free_text = "tech".to_string());
        assert!(query.poll(t0 + ms(400)));
        assert_eq!(query.filtered().len(), 1);

        query.reset(t0 + ms(500));
        // Specification clears immediately, the view follows after the quiet period.
        assert!(query.filter().is_neutral());
        assert_eq!(query.filtered().len(), 1);
        assert!(query.poll(t0 + ms(900)));
        assert_eq!(query.filtered().len(), 2);
    }

    #[test]
    fn test_passed_unknown_selects_only_unset_records() {
        let t0 = Instant::now();
        let mut records = sample();
        records[0].passed = Some(true);
        records[1].passed = Some(false);
        let mut unknown = interview("Mystery Co", "Data Engineer", InterviewStatus::Completed);
        unknown.passed = None;
        records.push(unknown);

        let mut query = DashboardQuery::new();
        query.set_interviews(records);
        query.edit(t0, |f| f.passed = PassedFilter::Unknown);
        assert!(query.poll(t0 + ms(400)));
        assert_eq!(query.filtered().len(), 1);
        assert_eq!(query.filtered()[0].company, "Mystery Co");
    }

    #[test]
    fn test_fresh_fetch_replaces_wholesale() {
        let t0 = Instant::now();
        let mut query = DashboardQuery::new();
        query.set_interviews(sample());
        query.edit(t0, |f| f.free_text = "startup".to_string());
        assert!(query.poll(t0 + ms(400)));
        assert_eq!(query.filtered().len(), 1);

        // A new fetch lands: current filter applies to the new snapshot.
        query.set_interviews(vec![interview("Startup Inc", "SRE", InterviewStatus::Scheduled)]);
        assert_eq!(query.all().len(), 1);
        assert_eq!(query.filtered().len(), 1);
        assert_eq!(query.filtered()[0].role, "SRE");
    }

    #[test]
    fn test_feed_sort_is_immediate_and_post_filter() {
        let t0 = Instant::now();
        let mut records = vec![
            interview("Beta", "SRE", InterviewStatus::Completed),
            interview("Alpha", "SRE", InterviewStatus::Completed),
            interview("Gamma", "Designer", InterviewStatus::Completed),
        ];
        records[0].date = "2026-01-10T09:00:00Z".to_string();
        records[1].date = "2026-03-10T09:00:00Z".to_string();
        records[2].date = "2026-02-10T09:00:00Z".to_string();

        let mut query = FeedQuery::new();
        query.set_interviews(records);
        assert_eq!(query.filtered()[0].company, "Alpha"); // newest first by default

        query.edit(t0, |f| f.search = "sre".to_string());
        assert!(query.poll(t0 + ms(400)));
        assert_eq!(query.filtered().len(), 2);

        // No debounce on the sort key: re-sorts the filtered view on the spot.
        query.set_sort(SortOrder::OldestFirst);
        assert_eq!(query.filtered()[0].company, "Beta");
        query.set_sort(SortOrder::Company);
        assert_eq!(query.filtered()[0].company, "Alpha");
    }

    #[test]
    fn test_feed_companies_follow_full_collection() {
        let t0 = Instant::now();
        let mut query = FeedQuery::new();
        query.set_interviews(vec![
            interview("Tech Corp", "SRE", InterviewStatus::Completed),
            interview("Acme", "SRE", InterviewStatus::Completed),
        ]);
        query.edit(t0, |f| f.company = Some("Acme".to_string()));
        assert!(query.poll(t0 + ms(400)));
        assert_eq!(query.filtered().len(), 1);
        // The selector still offers every company in the fetched collection.
        assert_eq!(query.companies(), vec!["Acme".to_string(), "Tech Corp".to_string()]);
    }
}
