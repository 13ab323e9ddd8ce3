//! History aggregation.
//!
//! Buckets archived sessions into the periods of a trend chart and stacks the
//! per-category minutes of each bucket.
//!
//! # Algorithm Summary
//!
//! 1. Generate the visible periods for the granularity, oldest first, with the
//!    period containing `today` last
//! 2. Assign every record whose date falls in a period to that bucket; records
//!    with unreadable or out-of-window dates are skipped
//! 3. Collect categories (record names) in order of first appearance across
//!    the window
//! 4. Sum minutes per category per bucket and stack them in category order

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::history::HistoryItem;
use crate::types::ValidationError;

/// Label of the bucket holding today in day granularity.
pub const TODAY_LABEL: &str = "今天";

/// Time span of one chart bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    pub const ALL: [Self; 4] = [Self::Day, Self::Week, Self::Month, Self::Year];

    /// Number of buckets shown for this granularity.
    pub const fn bucket_count(self) -> u32 {
        match self {
            Self::Day => 7,
            Self::Week | Self::Month => 12,
            Self::Year => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(ValidationError::InvalidGranularity {
                value: s.to_string(),
            }),
        }
    }
}

/// A labelled half-open date range `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Period {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// Monday of the week containing `date` and the following Monday.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(7))
}

/// First day of the month containing `date` and of the next month.
pub fn month_bounds(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first = date - Duration::days(i64::from(date.day0()));
    Some((first, first.checked_add_months(Months::new(1))?))
}

/// January 1st of the year containing `date` and of the next year.
pub fn year_bounds(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(date.year(), 1, 1)?;
    Some((first, NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)?))
}

fn month_day_label(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

/// The visible periods for `granularity`, oldest first, ending with the one
/// that contains `today`.
pub fn periods(granularity: Granularity, today: NaiveDate) -> Vec<Period> {
    let count = granularity.bucket_count();
    (0..count)
        .rev()
        .filter_map(|back| period_at(granularity, today, back))
        .collect()
}

/// The period `back` steps before the one containing `today`.
fn period_at(granularity: Granularity, today: NaiveDate, back: u32) -> Option<Period> {
    match granularity {
        Granularity::Day => {
            let start = today - Duration::days(i64::from(back));
            let label = if back == 0 {
                TODAY_LABEL.to_string()
            } else {
                month_day_label(start)
            };
            Some(Period {
                label,
                start,
                end: start + Duration::days(1),
            })
        }
        Granularity::Week => {
            let (this_monday, _) = week_bounds(today);
            let start = this_monday - Duration::weeks(i64::from(back));
            Some(Period {
                label: month_day_label(start),
                start,
                end: start + Duration::weeks(1),
            })
        }
        Granularity::Month => {
            let (this_month, _) = month_bounds(today)?;
            let (start, end) = month_bounds(this_month.checked_sub_months(Months::new(back))?)?;
            Some(Period {
                label: format!("{}月", start.month()),
                start,
                end,
            })
        }
        Granularity::Year => {
            let year = today.year() - i32::try_from(back).ok()?;
            let (start, end) = year_bounds(NaiveDate::from_ymd_opt(year, 1, 1)?)?;
            Some(Period {
                label: year.to_string(),
                start,
                end,
            })
        }
    }
}

/// A charted category.
///
/// Records sharing a name are the same category; styling comes from the
/// first record seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub color: String,
    pub accent: Option<String>,
}

/// One category's band within a bucket, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StackedExtent {
    pub bottom: u32,
    pub top: u32,
}

impl StackedExtent {
    pub const fn value(self) -> u32 {
        self.top - self.bottom
    }
}

/// One period of the chart with its records and stacked minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub period: Period,
    /// Records falling in the period, in input order.
    pub items: Vec<HistoryItem>,
    /// Minutes per category, indexed like [`Aggregation::categories`].
    pub minutes: Vec<u32>,
    /// Stacked band per category, indexed like [`Aggregation::categories`].
    pub stack: Vec<StackedExtent>,
    pub total: u32,
}

/// Result of bucketing a history set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub granularity: Granularity,
    pub categories: Vec<Category>,
    pub buckets: Vec<Bucket>,
}

impl Aggregation {
    /// Largest bucket total.
    pub fn max_total(&self) -> u32 {
        self.buckets.iter().map(|b| b.total).max().unwrap_or(0)
    }

    pub fn category_index(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == name)
    }

    /// Band of category `name` in bucket `bucket`.
    pub fn extent(&self, bucket: usize, name: &str) -> Option<StackedExtent> {
        let index = self.category_index(name)?;
        self.buckets.get(bucket)?.stack.get(index).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Buckets `history` by `granularity` relative to `today`.
///
/// Never fails: records with unreadable dates or dates outside the window are
/// left out of the chart.
pub fn aggregate(history: &[HistoryItem], granularity: Granularity, today: NaiveDate) -> Aggregation {
    let periods = periods(granularity, today);
    let mut assigned: Vec<Vec<&HistoryItem>> = vec![Vec::new(); periods.len()];

    for item in history {
        let Some(date) = item.parsed_date() else {
            tracing::debug!(id = %item.id, date = %item.date, "skipping record with unreadable date");
            continue;
        };
        match periods.iter().position(|p| p.contains(date)) {
            Some(index) => assigned[index].push(item),
            None => {
                tracing::debug!(id = %item.id, %date, "record outside chart window");
            }
        }
    }

    let mut categories: Vec<Category> = Vec::new();
    for item in assigned.iter().flatten() {
        if !categories.iter().any(|c| c.name == item.name) {
            categories.push(Category {
                name: item.name.clone(),
                color: item.color.clone(),
                accent: item.accent.clone(),
            });
        }
    }

    let buckets = periods
        .into_iter()
        .zip(assigned)
        .map(|(period, items)| {
            let mut minutes = vec![0_u32; categories.len()];
            for item in &items {
                if let Some(index) = categories.iter().position(|c| c.name == item.name) {
                    minutes[index] = minutes[index].saturating_add(item.duration_minutes());
                }
            }
            let stack = stack_minutes(&minutes);
            let total = stack.last().map_or(0, |s| s.top);
            Bucket {
                period,
                items: items.into_iter().cloned().collect(),
                minutes,
                stack,
                total,
            }
        })
        .collect();

    Aggregation {
        granularity,
        categories,
        buckets,
    }
}

/// Running cumulative bands over `values`.
pub fn stack_minutes(values: &[u32]) -> Vec<StackedExtent> {
    let mut cumulative = 0_u32;
    values
        .iter()
        .map(|&value| {
            let bottom = cumulative;
            cumulative = cumulative.saturating_add(value);
            StackedExtent {
                bottom,
                top: cumulative,
            }
        })
        .collect()
}
