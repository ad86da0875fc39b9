//! Table-driven approval router
//!
//! Given the submitter and the directory lookups, decides the initial value
//! of each approval stage and who gets notified about the submission. Pure
//! decision logic: directory queries happen upstream, side effects happen
//! downstream.

use exitflow_types::{ActorRole, Employee, StageStatus, UserId};

/// Who ends up being notified about a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyAudience {
    DomainTeamLeads,
    DepartmentManagers,
    Admins,
    /// No usable target at any fallback level; submission proceeds anyway.
    Nobody,
}

/// Routing outcome for one submission
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub tl_stage: StageStatus,
    pub manager_stage: StageStatus,
    pub audience: NotifyAudience,
    /// De-duplicated account ids of the resolved audience.
    pub recipients: Vec<UserId>,
}

/// Decide stage seeding and notification audience for a submission.
///
/// `team_leads` must already be scoped to the submitter's domain with the
/// submitter excluded; `managers` to the submitter's department. Resolution
/// falls through to the next broader audience whenever a level is empty -
/// absence of an approver never blocks a submission.
pub fn route(
    submitter_role: ActorRole,
    team_leads: &[Employee],
    managers: &[Employee],
    admins: &[Employee],
) -> RoutingDecision {
    match submitter_role {
        ActorRole::Manager => {
            let (audience, recipients) = first_non_empty(&[(NotifyAudience::Admins, admins)]);
            RoutingDecision {
                tl_stage: StageStatus::NotRequired,
                manager_stage: StageStatus::NotRequired,
                audience,
                recipients,
            }
        }
        ActorRole::TeamLead => {
            let (audience, recipients) = first_non_empty(&[
                (NotifyAudience::DepartmentManagers, managers),
                (NotifyAudience::Admins, admins),
            ]);
            RoutingDecision {
                tl_stage: StageStatus::NotRequired,
                manager_stage: StageStatus::Pending,
                audience,
                recipients,
            }
        }
        // Plain employees and every other role follow the default path.
        _ => {
            let tl_stage = if team_leads.is_empty() {
                StageStatus::NotRequired
            } else {
                StageStatus::Pending
            };

            let (audience, recipients) = first_non_empty(&[
                (NotifyAudience::DomainTeamLeads, team_leads),
                (NotifyAudience::DepartmentManagers, managers),
                (NotifyAudience::Admins, admins),
            ]);

            RoutingDecision {
                tl_stage,
                manager_stage: StageStatus::Pending,
                audience,
                recipients,
            }
        }
    }
}

/// First non-empty audience wins; recipients are de-duplicated by account id
/// preserving order.
fn first_non_empty(levels: &[(NotifyAudience, &[Employee])]) -> (NotifyAudience, Vec<UserId>) {
    for (audience, employees) in levels {
        let recipients = dedup_user_ids(employees);
        if !recipients.is_empty() {
            return (*audience, recipients);
        }
    }

    (NotifyAudience::Nobody, Vec::new())
}

pub(crate) fn dedup_user_ids(employees: &[Employee]) -> Vec<UserId> {
    let mut seen = Vec::new();
    for employee in employees {
        if !seen.contains(&employee.user_id) {
            seen.push(employee.user_id.clone());
        }
    }
    seen
}
