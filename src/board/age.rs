use chrono::{DateTime, Utc};

/// Human label for how long ago a job was posted, relative to `now`.
///
/// The difference is counted in whole days, truncated toward zero, so a posting
/// from 23 hours ago is still "Today". Postings a week or more old, or dated a
/// full day or more in the future, fall back to an absolute `M/D/YYYY` date.
pub fn relative_age(posting_date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - posting_date).num_days();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        _ => posting_date.format("%-m/%-d/%Y").to_string(),
    }
}
