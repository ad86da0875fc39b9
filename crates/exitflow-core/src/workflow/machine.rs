//! Exit workflow state machine
//!
//! The only code allowed to mutate `Employee.status` and the nested approval
//! fields. Each transition validates its guard, applies the mutation and
//! leaves persistence and notification to the caller.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

use crate::error::{ExitflowError, Result};
use exitflow_types::{ActorRole, Employee, EmployeeStatus, ResignationData, StageStatus};

/// Audit note written when a privileged actor bypasses a pending TL stage.
pub const TL_OVERRIDE_NOTE: &str = "Auto-approved by Admin/Manager Override";

/// Submission payload
#[derive(Debug, Clone)]
pub struct SubmitInput {
    pub reason: String,
    pub comments: String,
    pub attachment_url: Option<String>,
}

/// HR finalization payload
#[derive(Debug, Clone)]
pub struct HrFinalizeInput {
    pub notice_days: i64,
    pub final_lwd: NaiveDate,
    pub comments: Option<String>,
}

/// Absolute whole-day distance between two dates.
///
/// The absolute value is inherited behavior: a last working day in the past
/// still reads as a positive remaining-day count.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days().abs()
}

fn resignation_mut<'a>(employee: &'a mut Employee) -> Result<&'a mut ResignationData> {
    employee.resignation.as_mut().ok_or_else(|| {
        ExitflowError::Workflow(format!(
            "Employee {} has no resignation record",
            employee.id
        ))
    })
}

/// Transition 1: submit a resignation.
pub fn submit(
    employee: &mut Employee,
    input: SubmitInput,
    tl_stage: StageStatus,
    manager_stage: StageStatus,
    now: DateTime<Utc>,
) -> Result<()> {
    if input.reason.trim().is_empty() {
        return Err(ExitflowError::Validation(
            "Resignation reason is required".to_string(),
        ));
    }

    match employee.status {
        EmployeeStatus::ResignationSubmitted
        | EmployeeStatus::NoticePeriod
        | EmployeeStatus::Relieved => Err(ExitflowError::Workflow(format!(
            "Cannot submit a resignation while status is {}",
            employee.status
        ))),
        _ => {
            let mut data =
                ResignationData::new(input.reason, input.comments, input.attachment_url, now);
            data.domain_tl_approval_status = tl_stage;
            data.manager_approval_status = manager_stage;

            employee.resignation = Some(data);
            employee.status = EmployeeStatus::ResignationSubmitted;
            employee.updated_at = now;
            Ok(())
        }
    }
}

/// Transition 2: team lead approves the first stage.
///
/// Top-level status is untouched; the manager stage still gates progress.
pub fn tl_approve(
    employee: &mut Employee,
    comments: Option<String>,
    now: DateTime<Utc>,
) -> Result<()> {
    if employee.status != EmployeeStatus::ResignationSubmitted {
        return Err(ExitflowError::Workflow(format!(
            "Team lead approval requires status ResignationSubmitted, found {}",
            employee.status
        )));
    }

    let data = resignation_mut(employee)?;
    if data.domain_tl_approval_status != StageStatus::Pending {
        return Err(ExitflowError::Workflow(format!(
            "Team lead stage is {}, not Pending",
            data.domain_tl_approval_status
        )));
    }

    data.domain_tl_approval_status = StageStatus::Approved;
    data.domain_tl_action_date = Some(now);
    data.domain_tl_comments = comments;
    employee.updated_at = now;
    Ok(())
}

/// Transition 3: team lead rejects.
///
/// No status guard - any status is accepted, matching the reference behavior.
/// Rejection cancels the resignation outright, reverting to Confirmed.
pub fn tl_reject(employee: &mut Employee, reason: String, now: DateTime<Utc>) -> Result<()> {
    let data = resignation_mut(employee)?;

    data.domain_tl_approval_status = StageStatus::Rejected;
    data.domain_tl_action_date = Some(now);
    data.rejection_reason = Some(reason);

    employee.status = EmployeeStatus::Confirmed;
    employee.updated_at = now;
    Ok(())
}

/// Transition 4: manager approves the second stage.
///
/// Admin/HR actors may bypass a still-pending TL stage; the bypass is
/// recorded in the TL comments. Status stays ResignationSubmitted - the
/// NoticePeriod transition is deliberately deferred to HR.
pub fn manager_approve(
    employee: &mut Employee,
    actor_role: ActorRole,
    lwd: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> Result<()> {
    if employee.status != EmployeeStatus::ResignationSubmitted {
        return Err(ExitflowError::Workflow(format!(
            "Manager approval requires status ResignationSubmitted, found {}",
            employee.status
        )));
    }

    let data = resignation_mut(employee)?;

    if !data.domain_tl_approval_status.is_resolved() {
        if matches!(actor_role, ActorRole::Admin | ActorRole::Hr) {
            data.domain_tl_approval_status = StageStatus::Approved;
            data.domain_tl_action_date = Some(now);
            data.domain_tl_comments = Some(TL_OVERRIDE_NOTE.to_string());
        } else {
            return Err(ExitflowError::Workflow(
                "Team lead approval is still pending".to_string(),
            ));
        }
    }

    if data.manager_approval_status != StageStatus::Pending {
        return Err(ExitflowError::Workflow(format!(
            "Manager stage is {}, not Pending",
            data.manager_approval_status
        )));
    }

    data.manager_approval_status = StageStatus::Approved;
    data.manager_action_date = Some(now);

    if let Some(lwd) = lwd {
        data.requested_lwd = Some(lwd);
        data.final_lwd = Some(lwd);
        // Snapshots taken at approval time, never re-derived later.
        data.days_remaining = Some(days_between(lwd, now.date_naive()));
        if let Some(resignation_date) = data.resignation_date {
            data.notice_days = Some(days_between(lwd, resignation_date.date_naive()));
        }
    }

    employee.updated_at = now;
    Ok(())
}

/// Transition 5: manager rejects; resignation is cancelled by rejection.
pub fn manager_reject(employee: &mut Employee, reason: String, now: DateTime<Utc>) -> Result<()> {
    let data = resignation_mut(employee)?;

    data.manager_approval_status = StageStatus::Rejected;
    data.manager_action_date = Some(now);
    data.rejection_reason = Some(reason);

    employee.status = EmployeeStatus::Confirmed;
    employee.updated_at = now;
    Ok(())
}

/// Transition 6: HR finalizes - the only path into NoticePeriod.
///
/// Overwrites whatever the manager proposed; no stage re-check beyond the
/// record existing (HR discretion, matching the reference behavior).
pub fn hr_finalize(
    employee: &mut Employee,
    input: HrFinalizeInput,
    now: DateTime<Utc>,
) -> Result<()> {
    let data = resignation_mut(employee)?;

    data.notice_days = Some(input.notice_days);
    data.final_lwd = Some(input.final_lwd);
    data.hr_comments = input.comments;
    data.days_remaining = Some(days_between(input.final_lwd, now.date_naive()));

    employee.status = EmployeeStatus::NoticePeriod;
    employee.updated_at = now;
    Ok(())
}

/// Transition 7: merge exit-clearance flags. No status guard, no status change.
pub fn update_clearance(
    employee: &mut Employee,
    flags: &BTreeMap<String, bool>,
    now: DateTime<Utc>,
) -> Result<()> {
    let data = resignation_mut(employee)?;
    data.merge_clearance(flags);
    employee.updated_at = now;
    Ok(())
}

/// Transition 8: relieve the employee. Terminal.
///
/// Clearance completeness is not enforced, matching the reference behavior.
pub fn relieve(employee: &mut Employee, now: DateTime<Utc>) -> Result<()> {
    resignation_mut(employee)?;

    employee.status = EmployeeStatus::Relieved;
    employee.updated_at = now;
    Ok(())
}

/// Transition 9: cancel an in-flight resignation.
///
/// Drops the resignation record wholesale - prior-stage decisions and
/// clearance flags are lost, matching the reference behavior.
pub fn cancel(employee: &mut Employee, now: DateTime<Utc>) -> Result<()> {
    match employee.status {
        EmployeeStatus::ResignationSubmitted | EmployeeStatus::NoticePeriod => {
            employee.resignation = None;
            employee.status = EmployeeStatus::Confirmed;
            employee.updated_at = now;
            Ok(())
        }
        other => Err(ExitflowError::Workflow(format!(
            "Cannot cancel a resignation while status is {}",
            other
        ))),
    }
}
