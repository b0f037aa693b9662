use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::Deserialize;
use std::fmt;

/// Opaque posting key. The feed has served both numbers and strings here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobId {
    Int(i64),
    Text(String),
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Int(n) => write!(f, "{}", n),
            JobId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        JobId::Text(s.to_string())
    }
}

impl From<i64> for JobId {
    fn from(n: i64) -> Self {
        JobId::Int(n)
    }
}

/// Expiry as the feed sends it: an ISO-8601 string or epoch milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub enum Expiry {
    Millis(i64),
    Text(String),
}

impl Expiry {
    /// Parses the way a browser `Date` would: full RFC 3339, then a
    /// date-time without offset (local to `tz`), then a bare date (UTC midnight).
    pub fn to_datetime<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        match self {
            Expiry::Millis(ms) => DateTime::from_timestamp_millis(*ms).map(|dt| dt.with_timezone(tz)),
            Expiry::Text(s) => {
                let s = s.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    return Some(dt.with_timezone(tz));
                }
                for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
                    if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                        return tz.from_local_datetime(&naive).earliest();
                    }
                }
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc().with_timezone(tz))
            }
        }
    }

    /// en-US short form, e.g. "Dec 1, 24, 12:00 AM".
    pub fn display_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: fmt::Display,
    {
        match self.to_datetime(tz) {
            Some(dt) => dt.format("%b %-d, %y, %-I:%M %p").to_string(),
            None => "Invalid Date".to_string(),
        }
    }

    pub fn display_local(&self) -> String {
        self.display_in(&Local)
    }
}

/// Field decoders for the feed. A value of an unexpected JSON type becomes
/// its closest reading or `None`; it never fails the record.
mod lenient {
    use super::{Expiry, JobId};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<JobId>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => JobId::Int(i),
                None => JobId::Text(n.to_string()),
            }),
            Value::String(s) => Some(JobId::Text(s)),
            _ => None,
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => Some(b),
            _ => None,
        })
    }

    pub fn expiry<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Expiry>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_i64().map(Expiry::Millis),
            Value::String(s) => Some(Expiry::Text(s)),
            _ => None,
        })
    }
}

/// One record of the remote feed, with the feed's own field names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJobRecord {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<JobId>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub job_hours: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub job_category: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub job_location_slug: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub salary_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub salary_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub openings_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_bookmarked: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_applied: Option<bool>,
    #[serde(default, deserialize_with = "lenient::expiry")]
    pub expire_on: Option<Expiry>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub num_applications: Option<i64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub views: Option<i64>,
}

/// Records stay raw JSON until mapped so one bad record cannot sink the page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobsPage {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobPosting {
    pub id: Option<JobId>,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub job_role: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub experience: Option<String>,
    pub qualification: Option<String>, // same source field as job_type
    pub total_vacancy: Option<i64>,
    pub book_mark: Option<bool>, // server flag, not authoritative
    pub is_applied: Option<bool>,
    pub expires: Option<Expiry>,
    pub total_applied: Option<i64>,
    pub views: Option<i64>,
}

impl From<RawJobRecord> for JobPosting {
    fn from(raw: RawJobRecord) -> Self {
        JobPosting {
            id: raw.id,
            company_name: raw.company_name,
            description: raw.title,
            qualification: raw.job_hours.clone(),
            job_type: raw.job_hours,
            job_role: raw.job_category,
            location: raw.job_location_slug,
            salary_min: raw.salary_min,
            salary_max: raw.salary_max,
            experience: raw.experience,
            total_vacancy: raw.openings_count,
            book_mark: raw.is_bookmarked,
            is_applied: raw.is_applied,
            expires: raw.expire_on,
            total_applied: raw.num_applications,
            views: raw.views,
        }
    }
}

impl JobPosting {
    /// "min - max" with missing bounds left blank. Bounds are not validated.
    pub fn salary_range(&self) -> String {
        let fmt_bound = |v: Option<f64>| v.map(|n| n.to_string()).unwrap_or_default();
        format!("{} - {}", fmt_bound(self.salary_min), fmt_bound(self.salary_max))
    }

    pub fn expires_display(&self) -> String {
        match &self.expires {
            Some(expiry) => expiry.display_local(),
            None => "Invalid Date".to_string(),
        }
    }
}
