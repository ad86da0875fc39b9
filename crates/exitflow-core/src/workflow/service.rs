//! Exit workflow service
//!
//! Wires the directory, the approval router and the state machine together:
//! load the employee, decide, transition, persist, then notify. Persistence
//! is a single-document save with no cross-call atomicity - two racing
//! approvals resolve last-writer-wins. Notification dispatch is fire and
//! forget: failures are logged and never roll back a transition.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::directory::{name_matches, EmployeeDirectory, StatusCountMap};
use crate::error::{ExitflowError, Result};
use crate::notify::NotificationDispatcher;
use crate::workflow::machine::{self, HrFinalizeInput, SubmitInput};
use crate::workflow::router::{route, NotifyAudience, RoutingDecision};
use exitflow_types::{
    ActorRole, Employee, EmployeeId, EmployeeStatus, Notification, NotificationKind, StageStatus,
    UserId,
};

const RESIGNATIONS_LINK: &str = "/resignations";

/// Authenticated caller identity, as forwarded by the HTTP layer
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: UserId,
    pub role: ActorRole,
    pub email: String,
    pub employee_id: Option<EmployeeId>,
}

/// Health check status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check result
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub counts: StatusCountMap,
    pub total_employees: usize,
    pub awaiting_approval: usize,
    pub last_check: DateTime<Utc>,
}

/// The exit workflow, generic over its two external ports
pub struct ExitWorkflow<D, N> {
    directory: Arc<D>,
    notifier: Arc<N>,
}

impl<D: EmployeeDirectory, N: NotificationDispatcher> ExitWorkflow<D, N> {
    pub fn new(directory: Arc<D>, notifier: Arc<N>) -> Self {
        Self {
            directory,
            notifier,
        }
    }

    /// Resolve the caller's own employee record: by employee id when the
    /// token carries one, then by owning account, then by email.
    async fn resolve_actor_employee(&self, actor: &Actor) -> Result<Employee> {
        if let Some(id) = &actor.employee_id {
            if let Some(employee) = self.directory.find_by_id(id).await? {
                return Ok(employee);
            }
        }

        if let Some(employee) = self.directory.find_by_user_id(&actor.user_id).await? {
            return Ok(employee);
        }

        if let Some(employee) = self.directory.find_by_email(&actor.email).await? {
            return Ok(employee);
        }

        Err(ExitflowError::NotFound(format!(
            "No employee record for user {}",
            actor.user_id
        )))
    }

    async fn load_employee(&self, id: &EmployeeId) -> Result<Employee> {
        self.directory
            .find_by_id(id)
            .await?
            .ok_or_else(|| ExitflowError::NotFound(format!("Employee {} not found", id)))
    }

    /// Transition 1: submit a resignation on behalf of the caller.
    pub async fn submit(&self, actor: &Actor, input: SubmitInput) -> Result<Employee> {
        let mut employee = self.resolve_actor_employee(actor).await?;

        let team_leads = self
            .directory
            .find_team_leads_in_domain(&employee.domain, &employee.id)
            .await?;
        let managers = self
            .directory
            .find_managers_in_department(&employee.department)
            .await?;
        let admins = self.directory.find_by_role(ActorRole::Admin).await?;

        let decision = route(employee.role, &team_leads, &managers, &admins);

        let now = Utc::now();
        machine::submit(
            &mut employee,
            input,
            decision.tl_stage,
            decision.manager_stage,
            now,
        )?;
        self.directory.save(&employee).await?;

        log::info!(
            "Resignation submitted by {} ({}), TL stage {}, manager stage {}",
            employee.name,
            employee.id,
            decision.tl_stage,
            decision.manager_stage
        );

        let audience: &[Employee] = match decision.audience {
            NotifyAudience::DomainTeamLeads => &team_leads,
            NotifyAudience::DepartmentManagers => &managers,
            NotifyAudience::Admins => &admins,
            NotifyAudience::Nobody => &[],
        };
        self.announce_submission(&employee, &decision, audience)
            .await;

        Ok(employee)
    }

    async fn announce_submission(
        &self,
        employee: &Employee,
        decision: &RoutingDecision,
        audience: &[Employee],
    ) {
        if audience.is_empty() {
            log::warn!(
                "No notification target resolved for resignation of {}",
                employee.id
            );
            return;
        }

        let action = match decision.audience {
            NotifyAudience::DomainTeamLeads => "awaiting your team lead approval",
            NotifyAudience::DepartmentManagers => "awaiting your approval",
            _ => "awaiting review",
        };
        let message = format!("{} has submitted a resignation, {}", employee.name, action);

        self.notify_many(audience, "Resignation submitted", &message, NotificationKind::Info)
            .await;
        self.email_many(
            audience,
            &format!("Resignation submitted by {}", employee.name),
            &format!(
                "{} has submitted a resignation.\n\nReason: {}\n\nPlease review it in the HR portal.",
                employee.name, employee.resignation.as_ref().map(|r| r.reason.as_str()).unwrap_or("")
            ),
        )
        .await;
    }

    /// Transition 2: team lead approves the first stage.
    pub async fn tl_approve(
        &self,
        _actor: &Actor,
        employee_id: &EmployeeId,
        comments: Option<String>,
    ) -> Result<Employee> {
        let mut employee = self.load_employee(employee_id).await?;

        machine::tl_approve(&mut employee, comments, Utc::now())?;
        self.directory.save(&employee).await?;

        log::info!("Team lead approved resignation of {}", employee.id);

        // Next stage: managers in the employee's department, admins if none.
        let managers = self.managers_or_admins(&employee.department).await;
        self.notify_many(
            &managers,
            "Resignation awaiting manager approval",
            &format!(
                "Team lead stage passed for {}'s resignation, awaiting your approval",
                employee.name
            ),
            NotificationKind::Info,
        )
        .await;

        self.notify_employee(
            &employee,
            "Team lead approval",
            "Your resignation passed team lead approval",
            NotificationKind::Success,
        )
        .await;

        Ok(employee)
    }

    /// Transition 3: team lead rejects; the resignation is cancelled.
    pub async fn tl_reject(
        &self,
        _actor: &Actor,
        employee_id: &EmployeeId,
        rejection_reason: String,
    ) -> Result<Employee> {
        if rejection_reason.trim().is_empty() {
            return Err(ExitflowError::Validation(
                "Rejection reason is required".to_string(),
            ));
        }

        let mut employee = self.load_employee(employee_id).await?;

        machine::tl_reject(&mut employee, rejection_reason.clone(), Utc::now())?;
        self.directory.save(&employee).await?;

        log::info!("Team lead rejected resignation of {}", employee.id);

        self.notify_employee(
            &employee,
            "Resignation rejected",
            &format!(
                "Your resignation was rejected by the team lead: {}",
                rejection_reason
            ),
            NotificationKind::Error,
        )
        .await;

        Ok(employee)
    }

    /// Transition 4: manager (or privileged override) approves the second stage.
    pub async fn manager_approve(
        &self,
        actor: &Actor,
        employee_id: &EmployeeId,
        lwd: Option<chrono::NaiveDate>,
    ) -> Result<Employee> {
        let mut employee = self.load_employee(employee_id).await?;

        machine::manager_approve(&mut employee, actor.role, lwd, Utc::now())?;
        self.directory.save(&employee).await?;

        log::info!(
            "Manager stage approved for {} by {} actor",
            employee.id,
            actor.role
        );

        // HR and admins take over from here.
        let hr_staff = self.roles_union(&[ActorRole::Hr, ActorRole::Admin]).await;
        self.notify_many(
            &hr_staff,
            "Resignation awaiting HR finalization",
            &format!(
                "Manager stage passed for {}'s resignation, awaiting HR finalization",
                employee.name
            ),
            NotificationKind::Info,
        )
        .await;

        self.notify_employee(
            &employee,
            "Manager approval",
            "Your resignation passed manager approval and is awaiting HR finalization",
            NotificationKind::Success,
        )
        .await;

        Ok(employee)
    }

    /// Transition 5: manager rejects; the resignation is cancelled.
    pub async fn manager_reject(
        &self,
        _actor: &Actor,
        employee_id: &EmployeeId,
        rejection_reason: String,
    ) -> Result<Employee> {
        if rejection_reason.trim().is_empty() {
            return Err(ExitflowError::Validation(
                "Rejection reason is required".to_string(),
            ));
        }

        let mut employee = self.load_employee(employee_id).await?;

        machine::manager_reject(&mut employee, rejection_reason.clone(), Utc::now())?;
        self.directory.save(&employee).await?;

        log::info!("Manager rejected resignation of {}", employee.id);

        let message = format!(
            "Your resignation was rejected by the manager: {}",
            rejection_reason
        );
        self.notify_employee(
            &employee,
            "Resignation rejected",
            &message,
            NotificationKind::Error,
        )
        .await;
        self.email_employee(&employee, "Resignation rejected", &message)
            .await;

        Ok(employee)
    }

    /// Transition 6: HR finalizes notice terms and starts the notice period.
    pub async fn hr_finalize(
        &self,
        _actor: &Actor,
        employee_id: &EmployeeId,
        input: HrFinalizeInput,
    ) -> Result<Employee> {
        let mut employee = self.load_employee(employee_id).await?;

        machine::hr_finalize(&mut employee, input, Utc::now())?;
        self.directory.save(&employee).await?;

        log::info!("HR finalized resignation of {}", employee.id);

        let final_lwd = employee
            .resignation
            .as_ref()
            .and_then(|r| r.final_lwd)
            .map(|d| d.to_string())
            .unwrap_or_default();
        let message = format!(
            "Your resignation has been finalized. Last working day: {}",
            final_lwd
        );
        self.notify_employee(
            &employee,
            "Resignation finalized",
            &message,
            NotificationKind::Success,
        )
        .await;
        self.email_employee(&employee, "Resignation finalized", &message)
            .await;

        Ok(employee)
    }

    /// Transition 7: merge exit-clearance flags.
    pub async fn update_clearance(
        &self,
        _actor: &Actor,
        employee_id: &EmployeeId,
        flags: &BTreeMap<String, bool>,
    ) -> Result<Employee> {
        let mut employee = self.load_employee(employee_id).await?;

        machine::update_clearance(&mut employee, flags, Utc::now())?;
        self.directory.save(&employee).await?;

        Ok(employee)
    }

    /// Transition 8: relieve the employee. Terminal.
    pub async fn relieve(&self, _actor: &Actor, employee_id: &EmployeeId) -> Result<Employee> {
        let mut employee = self.load_employee(employee_id).await?;

        machine::relieve(&mut employee, Utc::now())?;
        self.directory.save(&employee).await?;

        log::info!("Employee {} relieved", employee.id);

        let message = "You have been relieved. Thank you for your time with us.";
        self.notify_employee(
            &employee,
            "Relieved",
            message,
            NotificationKind::Info,
        )
        .await;
        self.email_employee(&employee, "Relieved", message).await;

        Ok(employee)
    }

    /// Transition 9: the caller cancels their own in-flight resignation.
    pub async fn cancel(&self, actor: &Actor) -> Result<Employee> {
        let mut employee = self.resolve_actor_employee(actor).await?;

        machine::cancel(&mut employee, Utc::now())?;
        self.directory.save(&employee).await?;

        log::info!("Resignation cancelled by {}", employee.id);

        let admins = self.find_role_or_empty(ActorRole::Admin).await;
        self.notify_many(
            &admins,
            "Resignation cancelled",
            &format!("{} has cancelled their resignation", employee.name),
            NotificationKind::Warning,
        )
        .await;

        Ok(employee)
    }

    /// Pending first-stage approvals in the calling team lead's domain.
    pub async fn tl_pending_list(&self, actor: &Actor) -> Result<Vec<Employee>> {
        let team_lead = self.resolve_actor_employee(actor).await?;

        Ok(self
            .directory
            .list_open_resignations()
            .await?
            .into_iter()
            .filter(|e| {
                e.status == EmployeeStatus::ResignationSubmitted
                    && name_matches(&e.domain, &team_lead.domain)
                    && e.resignation
                        .as_ref()
                        .map(|r| r.domain_tl_approval_status == StageStatus::Pending)
                        .unwrap_or(false)
            })
            .collect())
    }

    /// Resignations awaiting manager approval with the TL stage resolved.
    pub async fn manager_pending_list(&self, _actor: &Actor) -> Result<Vec<Employee>> {
        Ok(self
            .directory
            .list_open_resignations()
            .await?
            .into_iter()
            .filter(|e| {
                e.status == EmployeeStatus::ResignationSubmitted
                    && e.resignation
                        .as_ref()
                        .map(|r| {
                            r.manager_approval_status == StageStatus::Pending
                                && r.domain_tl_approval_status.is_resolved()
                        })
                        .unwrap_or(false)
            })
            .collect())
    }

    /// Resignations with the manager stage resolved, awaiting HR finalization.
    pub async fn hr_pending_list(&self, _actor: &Actor) -> Result<Vec<Employee>> {
        Ok(self
            .directory
            .list_open_resignations()
            .await?
            .into_iter()
            .filter(|e| {
                e.status == EmployeeStatus::ResignationSubmitted
                    && e.resignation
                        .as_ref()
                        .map(|r| r.manager_approval_status.is_resolved())
                        .unwrap_or(false)
            })
            .collect())
    }

    /// Employees in their notice period or exit process.
    pub async fn exit_list(&self, _actor: &Actor) -> Result<Vec<Employee>> {
        Ok(self
            .directory
            .list_open_resignations()
            .await?
            .into_iter()
            .filter(|e| {
                matches!(
                    e.status,
                    EmployeeStatus::NoticePeriod | EmployeeStatus::ExitProcess
                )
            })
            .collect())
    }

    /// Health snapshot over the directory.
    pub async fn health_check(&self) -> HealthCheckResult {
        match self.directory.count_by_status().await {
            Ok(counts) => {
                let awaiting = counts.get(EmployeeStatus::ResignationSubmitted);
                let status = if awaiting > 50 {
                    HealthStatus::Degraded
                } else {
                    HealthStatus::Healthy
                };

                HealthCheckResult {
                    status,
                    total_employees: counts.total(),
                    awaiting_approval: awaiting,
                    counts,
                    last_check: Utc::now(),
                }
            }
            Err(e) => {
                log::error!("Directory unreachable during health check: {}", e);
                HealthCheckResult {
                    status: HealthStatus::Unhealthy,
                    counts: StatusCountMap::new(),
                    total_employees: 0,
                    awaiting_approval: 0,
                    last_check: Utc::now(),
                }
            }
        }
    }

    async fn managers_or_admins(&self, department: &str) -> Vec<Employee> {
        match self.directory.find_managers_in_department(department).await {
            Ok(managers) if !managers.is_empty() => managers,
            Ok(_) => self.find_role_or_empty(ActorRole::Admin).await,
            Err(e) => {
                log::error!("Manager lookup failed, skipping notification: {}", e);
                Vec::new()
            }
        }
    }

    async fn roles_union(&self, roles: &[ActorRole]) -> Vec<Employee> {
        let mut union: Vec<Employee> = Vec::new();
        for role in roles {
            for employee in self.find_role_or_empty(*role).await {
                if !union.iter().any(|e| e.user_id == employee.user_id) {
                    union.push(employee);
                }
            }
        }
        union
    }

    async fn find_role_or_empty(&self, role: ActorRole) -> Vec<Employee> {
        match self.directory.find_by_role(role).await {
            Ok(employees) => employees,
            Err(e) => {
                log::error!("Role lookup failed, skipping notification: {}", e);
                Vec::new()
            }
        }
    }

    /// One in-app record per distinct account in `targets`, best effort.
    async fn notify_many(
        &self,
        targets: &[Employee],
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) {
        let mut seen: Vec<&UserId> = Vec::new();
        for target in targets {
            if seen.contains(&&target.user_id) {
                continue;
            }
            seen.push(&target.user_id);

            let notification = Notification::new(
                target.user_id.clone(),
                title,
                message,
                kind,
                Some(RESIGNATIONS_LINK.to_string()),
            );
            if let Err(e) = self.notifier.notify(&notification).await {
                log::error!("Failed to store notification for {}: {}", target.user_id, e);
            }
        }
    }

    async fn email_many(&self, targets: &[Employee], subject: &str, body: &str) {
        let mut seen: Vec<&str> = Vec::new();
        for target in targets {
            if seen.contains(&target.email.as_str()) {
                continue;
            }
            seen.push(&target.email);

            if let Err(e) = self.notifier.email(&target.email, subject, body).await {
                log::error!("Failed to email {}: {}", target.email, e);
            }
        }
    }

    async fn notify_employee(
        &self,
        employee: &Employee,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) {
        let notification = Notification::new(
            employee.user_id.clone(),
            title,
            message,
            kind,
            Some(RESIGNATIONS_LINK.to_string()),
        );
        if let Err(e) = self.notifier.notify(&notification).await {
            log::error!(
                "Failed to store notification for {}: {}",
                employee.user_id,
                e
            );
        }
    }

    async fn email_employee(&self, employee: &Employee, subject: &str, body: &str) {
        if let Err(e) = self.notifier.email(&employee.email, subject, body).await {
            log::error!("Failed to email {}: {}", employee.email, e);
        }
    }
}
