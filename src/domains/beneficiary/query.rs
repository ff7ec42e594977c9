//! Filter, sort and paginate a beneficiary snapshot.
//!
//! Every stage is a pure function over borrowed records; the input slice is
//! never reordered or modified. Only the final page is cloned.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration, Local, NaiveTime, Offset, TimeZone, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::types::{normalize_filter_value, Beneficiary, BeneficiaryFilter};
use crate::errors::{DomainError, DomainResult};
use crate::types::{PaginatedResult, PaginationParams, DEFAULT_PAGE_SIZE};

pub type QueryResult = PaginatedResult<Beneficiary>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Name,
    NationalId,
    CreatedAt,
    LastReceived,
}

impl SortColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::NationalId => "national_id",
            SortColumn::CreatedAt => "created_at",
            SortColumn::LastReceived => "last_received",
        }
    }

    pub fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "name" => Ok(SortColumn::Name),
            "national_id" | "nationalId" => Ok(SortColumn::NationalId),
            "created_at" | "createdAt" => Ok(SortColumn::CreatedAt),
            "last_received" | "lastReceived" => Ok(SortColumn::LastReceived),
            other => Err(DomainError::invalid_argument(format!(
                "unknown sort column '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(DomainError::invalid_argument(format!(
                "unknown sort direction '{}'",
                other
            ))),
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Relative window on `created_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
    #[default]
    None,
    /// Since the start of the current calendar day in the caller's zone
    Today,
    /// The last 7 days
    Week,
    /// The last 30 days
    Month,
}

impl DateFilter {
    /// `"all"`, `"none"` and the empty string mean no window.
    pub fn from_str(s: &str) -> DomainResult<Self> {
        match normalize_filter_value(s).as_deref() {
            None | Some("none") => Ok(DateFilter::None),
            Some("today") => Ok(DateFilter::Today),
            Some("week") => Ok(DateFilter::Week),
            Some("month") => Ok(DateFilter::Month),
            Some(other) => Err(DomainError::invalid_argument(format!(
                "unknown date filter '{}'",
                other
            ))),
        }
    }

    /// Earliest `created_at` that passes, or `None` when unrestricted.
    pub fn cutoff<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        match self {
            DateFilter::None => None,
            DateFilter::Today => Some(start_of_day(now)),
            DateFilter::Week => Some((now.clone() - Duration::days(7)).with_timezone(&Utc)),
            DateFilter::Month => Some((now.clone() - Duration::days(30)).with_timezone(&Utc)),
        }
    }
}

/// Local midnight of `now`'s calendar day, as an instant.
fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match now.timezone().from_local_datetime(&midnight).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => {
            // Midnight skipped by a DST jump; use the current offset
            let offset = now.offset().fix().local_minus_utc();
            Utc.from_utc_datetime(&(midnight - Duration::seconds(offset as i64)))
        }
    }
}

/// Query descriptor as handed over by the presentation layer.
///
/// Every field is optional. String-typed fields are parsed when the query
/// runs so that an unrecognized value surfaces as `InvalidArgument` instead of
/// being silently replaced by a default. Keys may be snake_case or camelCase;
/// an unknown key is a decoding error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeneficiaryQuery {
    #[serde(alias = "searchTerm")]
    pub search_term: Option<String>,
    pub filter: BeneficiaryFilter,
    #[serde(alias = "dateFilter")]
    pub date_filter: Option<String>,
    #[serde(alias = "sortColumn")]
    pub sort_column: Option<String>,
    #[serde(alias = "sortDirection")]
    pub sort_direction: Option<String>,
    pub page: Option<i64>,
    #[serde(alias = "pageSize")]
    pub page_size: Option<i64>,
}

impl BeneficiaryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: &str) -> Self {
        self.search_term = Some(term.to_string());
        self
    }

    pub fn with_filter(mut self, filter: BeneficiaryFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_date_filter(mut self, date_filter: &str) -> Self {
        self.date_filter = Some(date_filter.to_string());
        self
    }

    pub fn with_sort(mut self, column: &str, direction: &str) -> Self {
        self.sort_column = Some(column.to_string());
        self.sort_direction = Some(direction.to_string());
        self
    }

    pub fn with_page(mut self, page: i64, page_size: i64) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }
}

/// A descriptor with every default applied and every value parsed
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub search_term: Option<String>,
    pub filter: BeneficiaryFilter,
    pub date_filter: DateFilter,
    pub sort_column: SortColumn,
    pub sort_direction: SortDirection,
    pub pagination: PaginationParams,
}

impl QueryPlan {
    pub fn from_descriptor(descriptor: &BeneficiaryQuery, default_page_size: u32) -> DomainResult<Self> {
        let sort_column = match descriptor.sort_column.as_deref() {
            Some(column) => SortColumn::from_str(column)?,
            None => SortColumn::CreatedAt,
        };
        let sort_direction = match descriptor.sort_direction.as_deref() {
            Some(direction) => SortDirection::from_str(direction)?,
            None => SortDirection::Desc,
        };
        let date_filter = match descriptor.date_filter.as_deref() {
            Some(raw) => DateFilter::from_str(raw)?,
            None => DateFilter::None,
        };
        let pagination = PaginationParams::try_new(
            descriptor.page.unwrap_or(1),
            descriptor.page_size.unwrap_or(default_page_size as i64),
        )?;
        let search_term = descriptor
            .search_term
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);

        Ok(Self {
            search_term,
            filter: descriptor.filter.clone(),
            date_filter,
            sort_column,
            sort_direction,
            pagination,
        })
    }
}

/// Keep records whose name (case-insensitive), national id or phone contains
/// `term`. `None` keeps everything.
pub fn search_stage<'a>(records: Vec<&'a Beneficiary>, term: Option<&str>) -> Vec<&'a Beneficiary> {
    let Some(term) = term else {
        return records;
    };
    let term = term.to_lowercase();
    records
        .into_iter()
        .filter(|b| {
            b.name.to_lowercase().contains(&term)
                || b.national_id.contains(&term)
                || b.phone.contains(&term)
        })
        .collect()
}

/// Exact equality on every present constraint, geography included.
/// Whether city belongs to governorate is not checked here.
pub fn field_stage<'a>(records: Vec<&'a Beneficiary>, filter: &BeneficiaryFilter) -> Vec<&'a Beneficiary> {
    if filter.is_empty() {
        return records;
    }
    records.into_iter().filter(|b| filter.matches(b)).collect()
}

pub fn date_stage<'a>(records: Vec<&'a Beneficiary>, cutoff: Option<DateTime<Utc>>) -> Vec<&'a Beneficiary> {
    match cutoff {
        None => records,
        Some(cutoff) => records.into_iter().filter(|b| b.created_at >= cutoff).collect(),
    }
}

fn compare(a: &Beneficiary, b: &Beneficiary, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Name => a.name.cmp(&b.name),
        SortColumn::NationalId => a.national_id.cmp(&b.national_id),
        SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
        // None orders before Some, so a missing value is the earliest
        SortColumn::LastReceived => a.last_received.cmp(&b.last_received),
    }
}

/// Stable sort; direction flips the comparator so equal keys keep input order.
pub fn sort_stage<'a>(
    mut records: Vec<&'a Beneficiary>,
    column: SortColumn,
    direction: SortDirection,
) -> Vec<&'a Beneficiary> {
    records.sort_by(|a, b| direction.apply(compare(a, b, column)));
    records
}

/// Run a parsed plan against a snapshot
pub fn execute<Tz: TimeZone>(
    beneficiaries: &[Beneficiary],
    plan: &QueryPlan,
    now: &DateTime<Tz>,
) -> QueryResult {
    let all: Vec<&Beneficiary> = beneficiaries.iter().collect();

    let searched = search_stage(all, plan.search_term.as_deref());
    let after_search = searched.len();
    let filtered = field_stage(searched, &plan.filter);
    let after_fields = filtered.len();
    let dated = date_stage(filtered, plan.date_filter.cutoff(now));
    let after_date = dated.len();
    let ordered = sort_stage(dated, plan.sort_column, plan.sort_direction);

    debug!(
        "beneficiary query: total={}, search={}, fields={}, date={}, sort={} {:?}",
        beneficiaries.len(),
        after_search,
        after_fields,
        after_date,
        plan.sort_column,
        plan.sort_direction
    );

    PaginatedResult::from_ordered(&ordered, beneficiaries.len(), plan.pagination)
}

/// Run a descriptor against a snapshot at a fixed instant.
pub fn query_at<Tz: TimeZone>(
    beneficiaries: &[Beneficiary],
    descriptor: &BeneficiaryQuery,
    now: DateTime<Tz>,
) -> DomainResult<QueryResult> {
    let plan = QueryPlan::from_descriptor(descriptor, DEFAULT_PAGE_SIZE)?;
    Ok(execute(beneficiaries, &plan, &now))
}

/// Run a descriptor against a snapshot using the local clock.
pub fn query(beneficiaries: &[Beneficiary], descriptor: &BeneficiaryQuery) -> DomainResult<QueryResult> {
    query_at(beneficiaries, descriptor, Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::beneficiary::types::{Address, BeneficiaryStatus, IdentityStatus};
    use chrono::FixedOffset;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn beneficiary(name: &str, national_id: &str, created_at: DateTime<Utc>) -> Beneficiary {
        Beneficiary {
            id: Uuid::new_v4(),
            name: name.to_string(),
            national_id: national_id.to_string(),
            phone: "0590000000".to_string(),
            status: BeneficiaryStatus::Active,
            identity_status: IdentityStatus::Verified,
            address: Address {
                governorate: "Gaza".to_string(),
                city: "Gaza City".to_string(),
                district: "Rimal".to_string(),
            },
            family_status: None,
            family_size: None,
            age_group: None,
            economic_level: None,
            displacement_status: None,
            profession: None,
            health_status: None,
            medical_condition: None,
            created_at,
            updated_at: created_at,
            last_received: None,
        }
    }

    fn names(result: &QueryResult) -> Vec<&str> {
        result.items.iter().map(|b| b.name.as_str()).collect()
    }

    fn fixture() -> Vec<Beneficiary> {
        let mut records = vec![
            beneficiary("Ahmad", "900111111", at(1, 9)),
            beneficiary("Sara", "800111111", at(3, 9)),
            beneficiary("Khaled", "700111111", at(2, 9)),
            beneficiary("Mona", "600111111", at(2, 9)),
            beneficiary("Omar", "500111111", at(5, 9)),
        ];
        records[0].phone = "0599123456".to_string();
        records[1].address.governorate = "Rafah".to_string();
        records[1].address.city = "Rafah".to_string();
        records[3].family_size = Some("large".to_string());
        records[4].last_received = Some(at(6, 12));
        records[2].last_received = Some(at(4, 12));
        records
    }

    #[test]
    fn test_created_at_ascending_first_page() {
        let records = vec![
            beneficiary("Ahmad", "900111111", at(1, 9)),
            beneficiary("Sara", "800111111", at(3, 9)),
            beneficiary("Khaled", "700111111", at(2, 9)),
        ];
        let descriptor = BeneficiaryQuery::new()
            .with_sort("createdAt", "asc")
            .with_page(1, 2);

        let result = query_at(&records, &descriptor, at(10, 0)).unwrap();
        assert_eq!(names(&result), vec!["Ahmad", "Khaled"]);
        assert_eq!(result.total_matching, 3);
        assert_eq!(result.total_pages, 2);
        assert_eq!(result.total_all, 3);
    }

    #[test]
    fn test_defaults_sort_by_created_at_descending() {
        let records = fixture();
        let result = query_at(&records, &BeneficiaryQuery::new(), at(10, 0)).unwrap();
        assert_eq!(names(&result), vec!["Omar", "Sara", "Khaled", "Mona", "Ahmad"]);
        assert_eq!(result.page, 1);
        assert_eq!(result.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_query_is_idempotent() {
        let records = fixture();
        let descriptor = BeneficiaryQuery::new()
            .with_search("a")
            .with_sort("name", "asc")
            .with_page(1, 3);

        let first = query_at(&records, &descriptor, at(10, 0)).unwrap();
        let second = query_at(&records, &descriptor, at(10, 0)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_is_not_reordered() {
        let records = fixture();
        let before: Vec<Uuid> = records.iter().map(|b| b.id).collect();
        let descriptor = BeneficiaryQuery::new().with_sort("name", "desc");
        let _ = query_at(&records, &descriptor, at(10, 0)).unwrap();
        let after: Vec<Uuid> = records.iter().map(|b| b.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_blank_search_is_a_no_op() {
        let records = fixture();
        let all: Vec<&Beneficiary> = records.iter().collect();

        let out = search_stage(all.clone(), None);
        assert_eq!(out, all);

        let plan = QueryPlan::from_descriptor(&BeneficiaryQuery::new().with_search("   "), 20).unwrap();
        assert_eq!(plan.search_term, None);
        let out = search_stage(all.clone(), plan.search_term.as_deref());
        assert_eq!(out, all);
    }

    #[test]
    fn test_search_matches_substring_of_national_id() {
        let records = vec![
            beneficiary("First", "409011111", at(1, 9)),
            beneficiary("Second", "800111111", at(2, 9)),
        ];
        let descriptor = BeneficiaryQuery::new().with_search("090");
        let result = query_at(&records, &descriptor, at(10, 0)).unwrap();
        assert_eq!(names(&result), vec!["First"]);
        assert_eq!(result.total_all, 2);
    }

    #[test]
    fn test_search_name_is_case_insensitive_and_phone_is_searched() {
        let records = fixture();

        let result = query_at(&records, &BeneficiaryQuery::new().with_search(" SAR "), at(10, 0)).unwrap();
        assert_eq!(names(&result), vec!["Sara"]);

        let result = query_at(&records, &BeneficiaryQuery::new().with_search("9912"), at(10, 0)).unwrap();
        assert_eq!(names(&result), vec!["Ahmad"]);
    }

    #[test]
    fn test_field_filters() {
        let records = fixture();

        let filter = BeneficiaryFilter {
            governorate: Some("Rafah".to_string()),
            ..Default::default()
        };
        let result = query_at(&records, &BeneficiaryQuery::new().with_filter(filter), at(10, 0)).unwrap();
        assert_eq!(names(&result), vec!["Sara"]);

        let filter = BeneficiaryFilter {
            family_size: Some("large".to_string()),
            governorate: Some("Gaza".to_string()),
            ..Default::default()
        };
        let result = query_at(&records, &BeneficiaryQuery::new().with_filter(filter), at(10, 0)).unwrap();
        assert_eq!(names(&result), vec!["Mona"]);
        assert_eq!(result.total_all, 5);
    }

    #[test]
    fn test_geography_is_not_cross_checked() {
        // City from another governorate simply matches nothing
        let records = fixture();
        let filter = BeneficiaryFilter {
            governorate: Some("Gaza".to_string()),
            city: Some("Rafah".to_string()),
            ..Default::default()
        };
        let result = query_at(&records, &BeneficiaryQuery::new().with_filter(filter), at(10, 0)).unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_matching, 0);
        assert_eq!(result.total_pages, 0);
    }

    #[test]
    fn test_week_window() {
        let now = at(20, 12);
        let records = vec![
            beneficiary("Old", "900111111", now - Duration::days(8)),
            beneficiary("Recent", "800111111", now - Duration::days(3)),
        ];
        let descriptor = BeneficiaryQuery::new().with_date_filter("week");
        let result = query_at(&records, &descriptor, now).unwrap();
        assert_eq!(names(&result), vec!["Recent"]);
    }

    #[test]
    fn test_month_window_is_thirty_days() {
        let now = at(31, 12);
        let records = vec![
            beneficiary("Edge", "900111111", now - Duration::days(30)),
            beneficiary("Outside", "800111111", now - Duration::days(30) - Duration::seconds(1)),
        ];
        let descriptor = BeneficiaryQuery::new().with_date_filter("month");
        let result = query_at(&records, &descriptor, now).unwrap();
        assert_eq!(names(&result), vec!["Edge"]);
    }

    #[test]
    fn test_today_uses_callers_calendar_day() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        // 01:00 local on March 10th is 22:00 UTC on March 9th
        let now = tz.with_ymd_and_hms(2024, 3, 10, 1, 0, 0).unwrap();
        let records = vec![
            // 00:30 local, same day
            beneficiary("AfterMidnight", "900111111", Utc.with_ymd_and_hms(2024, 3, 9, 21, 30, 0).unwrap()),
            // 23:30 local, previous day
            beneficiary("BeforeMidnight", "800111111", Utc.with_ymd_and_hms(2024, 3, 9, 20, 30, 0).unwrap()),
        ];
        let descriptor = BeneficiaryQuery::new().with_date_filter("today");
        let result = query_at(&records, &descriptor, now).unwrap();
        assert_eq!(names(&result), vec!["AfterMidnight"]);

        assert_eq!(
            DateFilter::Today.cutoff(&now),
            Some(Utc.with_ymd_and_hms(2024, 3, 9, 21, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_date_filter_sentinels() {
        assert_eq!(DateFilter::from_str("all").unwrap(), DateFilter::None);
        assert_eq!(DateFilter::from_str("").unwrap(), DateFilter::None);
        assert_eq!(DateFilter::from_str("week").unwrap(), DateFilter::Week);
        assert!(DateFilter::from_str("year").is_err());
    }

    #[test]
    fn test_sort_directions_keep_ties_in_input_order() {
        let records = vec![
            beneficiary("A", "100000001", at(2, 9)),
            beneficiary("B", "100000002", at(1, 9)),
            beneficiary("C", "100000003", at(2, 9)),
            beneficiary("D", "100000004", at(3, 9)),
            beneficiary("E", "100000005", at(2, 9)),
        ];

        let asc = query_at(&records, &BeneficiaryQuery::new().with_sort("createdAt", "asc"), at(10, 0)).unwrap();
        let desc = query_at(&records, &BeneficiaryQuery::new().with_sort("createdAt", "desc"), at(10, 0)).unwrap();

        assert_eq!(names(&asc), vec!["B", "A", "C", "E", "D"]);
        assert_eq!(names(&desc), vec!["D", "A", "C", "E", "B"]);
    }

    #[test]
    fn test_missing_last_received_is_earliest() {
        let records = fixture();

        let asc = query_at(&records, &BeneficiaryQuery::new().with_sort("lastReceived", "asc"), at(10, 0)).unwrap();
        assert_eq!(names(&asc), vec!["Ahmad", "Sara", "Mona", "Khaled", "Omar"]);

        let desc = query_at(&records, &BeneficiaryQuery::new().with_sort("lastReceived", "desc"), at(10, 0)).unwrap();
        assert_eq!(names(&desc), vec!["Omar", "Khaled", "Ahmad", "Sara", "Mona"]);
    }

    #[test]
    fn test_sort_by_name_and_national_id() {
        let records = fixture();

        let result = query_at(&records, &BeneficiaryQuery::new().with_sort("name", "asc"), at(10, 0)).unwrap();
        assert_eq!(names(&result), vec!["Ahmad", "Khaled", "Mona", "Omar", "Sara"]);

        let result = query_at(&records, &BeneficiaryQuery::new().with_sort("national_id", "asc"), at(10, 0)).unwrap();
        assert_eq!(names(&result), vec!["Omar", "Mona", "Khaled", "Sara", "Ahmad"]);
    }

    #[test]
    fn test_pages_partition_the_result() {
        let records: Vec<Beneficiary> = (0..23)
            .map(|i| beneficiary(&format!("Person {:02}", i), &format!("{:09}", i), at(1 + (i % 5) as u32, 9)))
            .collect();

        for page_size in 1..=25 {
            let first = query_at(&records, &BeneficiaryQuery::new().with_page(1, page_size), at(10, 0)).unwrap();
            let mut seen = HashSet::new();
            let mut count = 0;
            for page in 1..=first.total_pages as i64 {
                let result = query_at(&records, &BeneficiaryQuery::new().with_page(page, page_size), at(10, 0)).unwrap();
                for b in &result.items {
                    assert!(seen.insert(b.id), "id repeated across pages");
                }
                count += result.items.len();
            }
            assert_eq!(count as u64, first.total_matching);
        }
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let records = fixture();
        let result = query_at(&records, &BeneficiaryQuery::new().with_page(9, 2), at(10, 0)).unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_matching, 5);
        assert_eq!(result.total_all, 5);
        assert_eq!(result.page, 9);
        assert_eq!(result.effective_page, 3);
        assert!(result.is_page_out_of_range());
    }

    #[test]
    fn test_empty_collection() {
        let result = query_at(&[], &BeneficiaryQuery::new(), at(10, 0)).unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_matching, 0);
        assert_eq!(result.total_all, 0);
        assert_eq!(result.total_pages, 0);
    }

    #[test]
    fn test_invalid_arguments() {
        let records = fixture();
        let now = at(10, 0);

        let result = query_at(&records, &BeneficiaryQuery::new().with_page(1, 0), now);
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));

        let result = query_at(&records, &BeneficiaryQuery::new().with_page(0, 10), now);
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));

        let result = query_at(&records, &BeneficiaryQuery::new().with_sort("phone", "asc"), now);
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));

        let result = query_at(&records, &BeneficiaryQuery::new().with_sort("name", "up"), now);
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn test_descriptor_from_json() {
        let descriptor: BeneficiaryQuery = serde_json::from_str(
            r#"{"search_term": "ahm", "filter": {"status": "active"}, "sort_column": "name", "page_size": 5}"#,
        )
        .unwrap();
        let plan = QueryPlan::from_descriptor(&descriptor, 20).unwrap();
        assert_eq!(plan.sort_column, SortColumn::Name);
        assert_eq!(plan.sort_direction, SortDirection::Desc);
        assert_eq!(plan.pagination, PaginationParams { page: 1, page_size: 5 });
        assert_eq!(plan.filter.status, Some(BeneficiaryStatus::Active));
    }

    #[test]
    fn test_camel_case_descriptor_keeps_fail_fast_rules() {
        let descriptor: BeneficiaryQuery =
            serde_json::from_str(r#"{"sortColumn": "nationalId", "sortDirection": "asc", "pageSize": 3}"#).unwrap();
        let plan = QueryPlan::from_descriptor(&descriptor, 20).unwrap();
        assert_eq!(plan.sort_column, SortColumn::NationalId);
        assert_eq!(plan.sort_direction, SortDirection::Asc);
        assert_eq!(plan.pagination.page_size, 3);

        let descriptor: BeneficiaryQuery = serde_json::from_str(r#"{"pageSize": 0}"#).unwrap();
        assert!(matches!(
            QueryPlan::from_descriptor(&descriptor, 20),
            Err(DomainError::InvalidArgument(_))
        ));

        let descriptor: BeneficiaryQuery = serde_json::from_str(r#"{"sortColumn": "bogus"}"#).unwrap();
        assert!(matches!(
            QueryPlan::from_descriptor(&descriptor, 20),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unknown_descriptor_key_is_rejected() {
        assert!(serde_json::from_str::<BeneficiaryQuery>(r#"{"sort_colum": "bogus"}"#).is_err());
        assert!(serde_json::from_str::<BeneficiaryQuery>(r#"{"filter": {"shoe_size": "42"}}"#).is_err());
    }

    #[test]
    fn test_query_uses_local_clock() {
        let records = vec![beneficiary("Now", "900111111", Utc::now())];
        let result = query(&records, &BeneficiaryQuery::new().with_date_filter("week")).unwrap();
        assert_eq!(result.total_matching, 1);
    }
}
