//! Shared types for the exit workflow engine
//!
//! Strongly typed identifiers, statuses and records - no string-based state
//! management anywhere in the pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Strongly typed EmployeeId (directory-assigned, opaque)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed UserId of the account linked to an employee
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed NotificationId
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|_| Self(s.to_string()))
            .map_err(|e| format!("Invalid NotificationId format: {}", e))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of the account linked to an employee record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Employee,
    TeamLead,
    Manager,
    Hr,
    Admin,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::TeamLead => "teamlead",
            Self::Manager => "manager",
            Self::Hr => "hr",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "employee" => Ok(Self::Employee),
            "teamlead" => Ok(Self::TeamLead),
            "manager" => Ok(Self::Manager),
            "hr" => Ok(Self::Hr),
            "admin" => Ok(Self::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Employment status of an employee
///
/// `Terminated` and `Intern` exist on the entity but the exit workflow never
/// produces or consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EmployeeStatus {
    Probation,
    Confirmed,
    ResignationSubmitted,
    NoticePeriod,
    ExitProcess,
    Relieved,
    Terminated,
    Intern,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Probation => "Probation",
            Self::Confirmed => "Confirmed",
            Self::ResignationSubmitted => "ResignationSubmitted",
            Self::NoticePeriod => "NoticePeriod",
            Self::ExitProcess => "ExitProcess",
            Self::Relieved => "Relieved",
            Self::Terminated => "Terminated",
            Self::Intern => "Intern",
        }
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-stage approval status inside a resignation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StageStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    NotRequired,
}

impl StageStatus {
    /// A stage counts as resolved once it no longer blocks the next actor.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Approved | Self::NotRequired)
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::NotRequired => "NotRequired",
        };
        write!(f, "{}", s)
    }
}

/// Exit lifecycle sub-record on an employee
///
/// Created on submit, mutated exclusively by the workflow transitions and
/// dropped wholesale on cancel.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResignationData {
    pub reason: String,
    pub comments: String,
    #[serde(default)]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub resignation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub domain_tl_approval_status: StageStatus,
    #[serde(default)]
    pub manager_approval_status: StageStatus,
    #[serde(default)]
    pub domain_tl_comments: Option<String>,
    #[serde(default)]
    pub domain_tl_action_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub manager_action_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hr_comments: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub requested_lwd: Option<NaiveDate>,
    #[serde(default)]
    pub final_lwd: Option<NaiveDate>,
    #[serde(default)]
    pub notice_days: Option<i64>,
    #[serde(default)]
    pub days_remaining: Option<i64>,
    #[serde(default)]
    pub exit_clearance: BTreeMap<String, bool>,
}

impl ResignationData {
    /// Create a fresh record at submission time
    pub fn new(
        reason: String,
        comments: String,
        attachment_url: Option<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            reason,
            comments,
            attachment_url,
            resignation_date: Some(submitted_at),
            ..Self::default()
        }
    }

    /// Shallow-merge clearance flags; flags absent from `updates` are kept.
    pub fn merge_clearance(&mut self, updates: &BTreeMap<String, bool>) {
        for (flag, value) in updates {
            self.exit_clearance.insert(flag.clone(), *value);
        }
    }
}

/// Employee record as held by the directory
///
/// The workflow reads routing fields (role, position, domain, department) and
/// mutates `status` and `resignation` only through its transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub role: ActorRole,
    pub position: String,
    pub domain: String,
    pub department: String,
    pub active: bool,
    pub status: EmployeeStatus,
    #[serde(default)]
    pub resignation: Option<ResignationData>,
    pub updated_at: DateTime<Utc>,
}

/// Severity of an in-app notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

/// In-app notification record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub is_read: bool,
    #[serde(default)]
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: UserId,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
        link: Option<String>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            title: title.into(),
            message: message.into(),
            kind,
            is_read: false,
            link,
            created_at: Utc::now(),
        }
    }
}
