//! List filtering: free-text search plus an optional status filter.

use crate::store::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<S> {
    pub text: String,
    pub status: Option<S>,
}

impl<S> Default for Query<S> {
    fn default() -> Self {
        Self {
            text: String::new(),
            status: None,
        }
    }
}

impl<S> Query<S> {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: S) -> Self {
        self.status = Some(status);
        self
    }
}

/// Records whose searchable fields contain the query text (ignoring case)
/// and whose status matches the filter, in store order.
pub fn filter<'a, R: Record>(
    records: &'a [R],
    query: &Query<R::Status>,
) -> impl Iterator<Item = &'a R> + 'a {
    let needle = query.text.trim().to_lowercase();
    let status = query.status;

    records.iter().filter(move |record| {
        status.map_or(true, |wanted| record.status() == wanted) && contains(*record, &needle)
    })
}

fn contains<R: Record>(record: &R, needle: &str) -> bool {
    needle.is_empty()
        || record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BloodRequest, Donor, DonorStatus, RequestStatus, UnitStatus};
    use crate::seed;

    fn names(donors: Vec<&Donor>) -> Vec<&str> {
        donors.into_iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_search_ignores_case() {
        let donors = seed::initial_donors();
        let found: Vec<&Donor> = filter(&donors, &Query::text("jane")).collect();

        assert_eq!(names(found.clone()), ["Jane Smith"]);
        assert_eq!(found[0].id.to_string(), "D-002");
    }

    #[test]
    fn test_empty_query_keeps_everything_in_order() {
        let donors = seed::initial_donors();
        let found: Vec<&Donor> = filter(&donors, &Query::default()).collect();
        assert_eq!(names(found), ["John Doe", "Jane Smith", "Robert Johnson"]);
    }

    #[test]
    fn test_search_matches_several_fields() {
        let donors = seed::initial_donors();
        let cases = vec![
            ("d-003", vec!["Robert Johnson"]),
            ("0124", vec!["Jane Smith"]),
            ("O-", vec!["John Doe"]),
            ("  JOHN ", vec!["John Doe", "Robert Johnson"]),
            ("nobody", vec![]),
        ];

        for (text, expected) in cases {
            let found: Vec<&Donor> = filter(&donors, &Query::text(text)).collect();
            assert_eq!(names(found), expected, "Unexpected result for {:?}", text);
        }
    }

    #[test]
    fn test_status_filter() {
        let donors = seed::initial_donors();
        let deferred: Vec<&Donor> =
            filter(&donors, &Query::default().with_status(DonorStatus::Deferred)).collect();
        assert_eq!(names(deferred), ["Robert Johnson"]);

        let active_jane: Vec<&Donor> =
            filter(&donors, &Query::text("jane").with_status(DonorStatus::Deferred)).collect();
        assert!(active_jane.is_empty());
    }

    #[test]
    fn test_requests_by_hospital_and_status() {
        let requests = seed::initial_requests();
        let query = Query::text("city general").with_status(RequestStatus::Pending);
        let found: Vec<&BloodRequest> = filter(&requests, &query).collect();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].patient, "Alice Williams");
    }

    #[test]
    fn test_units_by_status() {
        let units = seed::initial_units();
        let expired = filter(&units, &Query::default().with_status(UnitStatus::Expired)).count();
        assert_eq!(expired, 1);
    }
}
