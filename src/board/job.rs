use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Backend-assigned job identifier. The wire form may be a number or a string;
/// both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => JobId(n.to_string()),
            Raw::Text(s) => JobId(s),
        })
    }
}

/// Employment type of a posting. The backend stores free text, so values
/// outside the known set are kept verbatim in `Other` and compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Remote,
    Other(String),
}

impl JobType {
    pub const KNOWN: [JobType; 5] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Internship,
        JobType::Remote,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Internship => "internship",
            JobType::Remote => "remote",
            JobType::Other(raw) => raw,
        }
    }

    /// Exact-match lookup: "remote" is `Remote`, "Remote" stays `Other`.
    pub fn from_wire(raw: &str) -> Self {
        JobType::KNOWN
            .into_iter()
            .find(|t| t.as_str() == raw)
            .unwrap_or_else(|| JobType::Other(raw.to_string()))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, JobType::Other(_))
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(JobType::from_wire(s.trim()))
    }
}

impl Serialize for JobType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(JobType::from_wire(&raw))
    }
}

/// A job posting as confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub location: String,
    #[serde(default, deserialize_with = "job_type_or_blank")]
    pub job_type: Option<JobType>,
    #[serde(default, deserialize_with = "tags_or_null")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "posting_date")]
    pub posting_date: DateTime<Utc>,
}

impl Job {
    /// Materialize a job the way the backend does after accepting a payload.
    pub fn from_payload(id: JobId, payload: JobPayload, posting_date: DateTime<Utc>) -> Self {
        Self {
            id,
            title: payload.title,
            company: payload.company,
            location: payload.location,
            job_type: payload.job_type,
            tags: payload.tags,
            posting_date,
        }
    }
}

/// The client-owned fields of a job, as submitted on create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPayload {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn string_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn tags_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn job_type_or_blank<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<JobType>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Ok(Some(JobType::from_wire(&s))),
    }
}

/// Accepts a bare ISO date (midnight UTC), an RFC 3339 timestamp, or a naive
/// ISO datetime (taken as UTC).
pub fn parse_posting_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn posting_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_posting_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid posting_date '{}'", raw)))
}
