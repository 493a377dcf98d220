use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Category assigned to a task when none is given.
pub const DEFAULT_CATEGORY: &str = "General";

/// Completion state of a task.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Todo,
    Completed,
}

impl Status {
    /// The other of the two states.
    pub fn toggled(self) -> Status {
        match self {
            Status::Todo => Status::Completed,
            Status::Completed => Status::Todo,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::Completed => "completed",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// Coarse time-of-day bucket a task is scheduled into.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdminBlock {
    Morning,
    #[default]
    Afternoon,
}

impl AdminBlock {
    pub const ALL: [AdminBlock; 2] = [AdminBlock::Morning, AdminBlock::Afternoon];

    pub fn as_str(self) -> &'static str {
        match self {
            AdminBlock::Morning => "morning",
            AdminBlock::Afternoon => "afternoon",
        }
    }

    /// Heading label, e.g. `Morning (9-11am)`.
    pub fn label(self) -> &'static str {
        match self {
            AdminBlock::Morning => "Morning (9-11am)",
            AdminBlock::Afternoon => "Afternoon (2-5pm)",
        }
    }

    /// Short hours label shown next to each task.
    pub fn hours(self) -> &'static str {
        match self {
            AdminBlock::Morning => "9-11am",
            AdminBlock::Afternoon => "2-5pm",
        }
    }
}

macro_rules! display_from_str {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                serde_json::from_value(serde_json::Value::String(s.trim().to_lowercase()))
                    .map_err(|_| format!("invalid {} '{}'", $what, s))
            }
        }
    };
}

display_from_str!(Status, "status");
display_from_str!(Priority, "priority");
display_from_str!(AdminBlock, "admin block");

/// A single row of the remote task table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Identifier assigned by the table service.
    pub id: u64,
    /// The name or description of the task.
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Status,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    /// Free-form grouping label.
    #[serde(default = "default_category", deserialize_with = "null_as_category")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub admin_block: AdminBlock,
    /// Optional deadline.
    #[serde(default, with = "due_date_format")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

// The service sends an empty cell as `null`, not as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn null_as_category<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|c| c.unwrap_or_else(default_category))
}

/// Body of the insert request.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewTask {
    pub task_name: String,
    pub status: Status,
    pub priority: Priority,
    pub category: String,
    pub admin_block: AdminBlock,
    #[serde(with = "due_date_format")]
    pub due_date: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

/// Body of the partial update sent when toggling a task.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPatch {
    pub status: Status,
}

/// Envelope returned by the row listing endpoint.
#[derive(Deserialize, Debug, Default)]
pub struct RowPage {
    /// Total number of rows in the table, when the service reports it.
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub results: Vec<Task>,
}

/// Parses a due date typed by a user: `YYYY-MM-DD`, `YYYY-MM-DD HH:MM`
/// or `YYYY-MM-DDTHH:MM[:SS]`. A bare date means midnight.
pub fn parse_due_date(input: &str) -> Option<NaiveDateTime> {
    due_date_format::parse(input.trim())
}

/// Serde adapter for the `due_date` column. Accepts RFC 3339 (converted to
/// local time), naive timestamps and bare dates; always writes
/// `YYYY-MM-DDTHH:MM:SS`.
pub mod due_date_format {
    use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Local).naive_local());
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt);
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(WIRE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid due_date '{}'", s))),
        }
    }
}
