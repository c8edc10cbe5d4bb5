use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::news::Article;

/// Publication-date window applied to the accumulated feed.
///
/// Bounds are computed in the timezone of the `now` passed to
/// [`DateFilter::matches`], so "today" means the viewer's local day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    /// Since local midnight.
    Today,
    /// Since Sunday 00:00 of the current week.
    Week,
    /// Since the first of the current month.
    Month,
    /// Inclusive local-day range, `start` 00:00:00.000 to `end` 23:59:59.999.
    Custom { start: NaiveDate, end: NaiveDate },
}

impl DateFilter {
    /// Cycle through the preset windows. A custom range falls back to `All`.
    pub fn next_preset(self) -> Self {
        match self {
            Self::All => Self::Today,
            Self::Today => Self::Week,
            Self::Week => Self::Month,
            Self::Month | Self::Custom { .. } => Self::All,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::All => "All time".to_string(),
            Self::Today => "Today".to_string(),
            Self::Week => "This week".to_string(),
            Self::Month => "This month".to_string(),
            Self::Custom { start, end } => format!("{start} to {end}"),
        }
    }

    pub fn matches<Tz: TimeZone>(&self, published: DateTime<Utc>, now: &DateTime<Tz>) -> bool {
        let tz = now.timezone();
        let today = now.date_naive();
        match self {
            Self::All => true,
            Self::Today => published >= local_start_of(&tz, today),
            Self::Week => {
                let back = u64::from(today.weekday().num_days_from_sunday());
                let sunday = today.checked_sub_days(Days::new(back)).unwrap_or(today);
                published >= local_start_of(&tz, sunday)
            }
            Self::Month => {
                let first = today.with_day(1).unwrap_or(today);
                published >= local_start_of(&tz, first)
            }
            Self::Custom { start, end } => {
                let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
                published >= local_start_of(&tz, *start)
                    && published <= local_to_utc(&tz, end.and_time(end_of_day))
            }
        }
    }
}

fn local_start_of<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    local_to_utc(tz, date.and_time(NaiveTime::MIN))
}

/// Map a wall-clock time to an instant. Ambiguous times take the earlier
/// instant; times skipped by a DST jump resolve to the first valid instant
/// after the gap.
fn local_to_utc<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt.with_timezone(&Utc);
    }
    let after_gap = naive + chrono::Duration::hours(1);
    tz.from_local_datetime(&after_gap)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Apply the date window and source selection, preserving order.
///
/// An empty `sources` set means no source filtering. Articles without a
/// source name never match a non-empty selection.
pub fn apply_filters<Tz: TimeZone>(
    articles: &[Article],
    date: &DateFilter,
    sources: &BTreeSet<String>,
    now: &DateTime<Tz>,
) -> Vec<Article> {
    articles
        .iter()
        .filter(|a| date.matches(a.published_at, now))
        .filter(|a| {
            sources.is_empty() || a.source_name().is_some_and(|name| sources.contains(name))
        })
        .cloned()
        .collect()
}

/// Distinct non-empty source names, sorted.
pub fn unique_sources(articles: &[Article]) -> Vec<String> {
    articles
        .iter()
        .filter_map(Article::source_name)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
