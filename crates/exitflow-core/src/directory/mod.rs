//! Employee directory port and adapters
//!
//! The workflow core never talks to storage directly - every lookup goes
//! through the `EmployeeDirectory` trait so the pipeline stays unit-testable
//! with fakes.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::error::Result;
use exitflow_types::{ActorRole, Employee, EmployeeId, EmployeeStatus, UserId};

pub mod file;
pub mod memory;

pub use file::FileDirectory;
pub use memory::MemoryDirectory;

/// Loose title pattern identifying team-lead-like positions.
///
/// Matches "Team Lead", "TL", "Tech Lead" and any title containing "lead" or
/// "tl" as a substring, case-insensitively. Deliberately fuzzy: approver
/// authority is derived from free-text titles, not an explicit role field.
static TEAM_LEAD_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)lead|tl").expect("team lead title pattern must compile"));

/// Whether a free-text position title counts as a domain team lead.
pub fn is_team_lead_position(position: &str) -> bool {
    TEAM_LEAD_TITLE.is_match(position)
}

/// Case-insensitive match for domain and department names.
pub fn name_matches(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Shared team-lead filter so every adapter resolves approvers identically.
pub fn matches_team_lead(employee: &Employee, domain: &str, exclude: &EmployeeId) -> bool {
    employee.active
        && &employee.id != exclude
        && name_matches(&employee.domain, domain)
        && is_team_lead_position(&employee.position)
}

/// Shared manager filter: linked account role is manager, department matches,
/// record is active.
pub fn matches_manager(employee: &Employee, department: &str) -> bool {
    employee.active
        && employee.role == ActorRole::Manager
        && name_matches(&employee.department, department)
}

/// Employee count per status, used by health reporting
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct StatusCountMap {
    counts: BTreeMap<EmployeeStatus, usize>,
}

impl StatusCountMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, status: EmployeeStatus) {
        *self.counts.entry(status).or_insert(0) += 1;
    }

    pub fn get(&self, status: EmployeeStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Directory of employee records backing the exit workflow
///
/// Read-mostly from the workflow's point of view; `save` persists the single
/// mutated aggregate with no cross-document atomicity (last writer wins).
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn find_by_id(&self, id: &EmployeeId) -> Result<Option<Employee>>;

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Employee>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>>;

    /// Team leads in a domain, excluding the submitter itself.
    async fn find_team_leads_in_domain(
        &self,
        domain: &str,
        exclude: &EmployeeId,
    ) -> Result<Vec<Employee>>;

    /// Active managers in a department.
    async fn find_managers_in_department(&self, department: &str) -> Result<Vec<Employee>>;

    /// All active employees whose linked account has the given role.
    async fn find_by_role(&self, role: ActorRole) -> Result<Vec<Employee>>;

    /// Every employee carrying a resignation record.
    async fn list_open_resignations(&self) -> Result<Vec<Employee>>;

    /// Employee count per status.
    async fn count_by_status(&self) -> Result<StatusCountMap>;

    /// Persist one employee document.
    async fn save(&self, employee: &Employee) -> Result<()>;
}
