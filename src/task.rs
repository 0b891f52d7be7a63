use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Stable identifier of a task unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UnitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A task as supplied by the caller, before any graph statistics are derived.
///
/// The apparent window defaults to the anticipated one when no projection
/// has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: UnitId,
    #[serde(default)]
    pub name: String,
    pub anticipated_start: DateTime<Utc>,
    pub anticipated_end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apparent_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apparent_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dependencies: Vec<UnitId>,
}

impl TaskRecord {
    pub fn new(
        id: impl Into<UnitId>,
        name: impl Into<String>,
        anticipated_start: DateTime<Utc>,
        anticipated_end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            anticipated_start,
            anticipated_end,
            apparent_start: None,
            apparent_end: None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependencies<I, U>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<UnitId>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_apparent_window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.apparent_start = Some(start);
        self.apparent_end = Some(end);
        self
    }

    pub fn apparent_start_or_anticipated(&self) -> DateTime<Utc> {
        self.apparent_start.unwrap_or(self.anticipated_start)
    }

    pub fn apparent_end_or_anticipated(&self) -> DateTime<Utc> {
        self.apparent_end.unwrap_or(self.anticipated_end)
    }
}

/// A task node inside a built [`TaskGraph`](crate::graph::TaskGraph).
///
/// Dependency statistics are filled in by the graph builder once every
/// dependency of the unit has been finalised, so a `TaskUnit` is only ever
/// observed fully computed.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskUnit {
    pub(crate) id: UnitId,
    pub(crate) name: String,
    pub(crate) anticipated_start: DateTime<Utc>,
    pub(crate) anticipated_end: DateTime<Utc>,
    pub(crate) apparent_start: DateTime<Utc>,
    pub(crate) apparent_end: DateTime<Utc>,
    /// Non-redundant: edges implied through another dependency are dropped.
    pub(crate) direct_dependencies: BTreeSet<UnitId>,
    pub(crate) all_dependencies: BTreeSet<UnitId>,
    pub(crate) paths_to_dependencies: BTreeMap<UnitId, u64>,
    pub(crate) attachment_to_dependencies: u64,
}

impl TaskUnit {
    pub fn id(&self) -> &UnitId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn anticipated_start_date(&self) -> DateTime<Utc> {
        self.anticipated_start
    }

    pub fn anticipated_end_date(&self) -> DateTime<Utc> {
        self.anticipated_end
    }

    pub fn apparent_start_date(&self) -> DateTime<Utc> {
        self.apparent_start
    }

    pub fn apparent_end_date(&self) -> DateTime<Utc> {
        self.apparent_end
    }

    /// Visual footprint, from the planned start through any delay.
    pub fn presence_time(&self) -> Duration {
        self.apparent_end - self.anticipated_start
    }

    pub fn direct_dependencies(&self) -> &BTreeSet<UnitId> {
        &self.direct_dependencies
    }

    pub fn all_dependencies(&self) -> &BTreeSet<UnitId> {
        &self.all_dependencies
    }

    /// Distinct dependency paths from this unit down to `unit`; 0 when
    /// `unit` is not a dependency at all.
    pub fn get_number_of_paths_to_dependency(&self, unit: &UnitId) -> u64 {
        self.paths_to_dependencies.get(unit).copied().unwrap_or(0)
    }

    /// Distinct paths outward through every dependency down to each tail.
    pub fn attachment_to_dependencies(&self) -> u64 {
        self.attachment_to_dependencies
    }

    pub fn is_dependent_on(&self, unit: &UnitId) -> bool {
        self.all_dependencies.contains(unit)
    }

    pub fn is_directly_dependent_on(&self, unit: &UnitId) -> bool {
        self.direct_dependencies.contains(unit)
    }
}
