//! End-to-end workflow tests against the in-memory directory

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use exitflow_core::{
    Actor, EmployeeDirectory, ExitWorkflow, HrFinalizeInput, MemoryDirectory,
    NotificationDispatcher, Result, SubmitInput,
};
use exitflow_types::{
    ActorRole, Employee, EmployeeId, EmployeeStatus, Notification, NotificationKind, StageStatus,
    UserId,
};

/// Captures everything the workflow tried to send.
#[derive(Default)]
struct RecordingDispatcher {
    notifications: Mutex<Vec<Notification>>,
    emails: Mutex<Vec<(String, String)>>,
}

impl RecordingDispatcher {
    fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    fn emails(&self) -> Vec<(String, String)> {
        self.emails.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn email(&self, to: &str, subject: &str, _body: &str) -> Result<()> {
        self.emails
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

fn employee(id: &str, role: ActorRole, position: &str, domain: &str, department: &str) -> Employee {
    Employee {
        id: EmployeeId::new(id),
        user_id: UserId::new(format!("user-{}", id)),
        name: format!("Employee {}", id),
        email: format!("{}@example.com", id),
        role,
        position: position.to_string(),
        domain: domain.to_string(),
        department: department.to_string(),
        active: true,
        status: EmployeeStatus::Confirmed,
        resignation: None,
        updated_at: Utc::now(),
    }
}

fn actor_for(emp: &Employee) -> Actor {
    Actor {
        user_id: emp.user_id.clone(),
        role: emp.role,
        email: emp.email.clone(),
        employee_id: Some(emp.id.clone()),
    }
}

fn workflow(
    employees: Vec<Employee>,
) -> (
    ExitWorkflow<MemoryDirectory, RecordingDispatcher>,
    Arc<MemoryDirectory>,
    Arc<RecordingDispatcher>,
) {
    let directory = Arc::new(MemoryDirectory::with_employees(employees));
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let service = ExitWorkflow::new(directory.clone(), dispatcher.clone());
    (service, directory, dispatcher)
}

fn submit_input(reason: &str) -> SubmitInput {
    SubmitInput {
        reason: reason.to_string(),
        comments: "".to_string(),
        attachment_url: None,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn scenario_a_no_team_lead_in_domain() {
    // Employee in Engineering with no TL in the domain; one department manager.
    let submitter = employee(
        "asha",
        ActorRole::Employee,
        "Software Engineer",
        "Engineering",
        "Engineering",
    );
    let manager = employee(
        "mira",
        ActorRole::Manager,
        "Engineering Manager",
        "Platform",
        "Engineering",
    );
    let hr = employee("hina", ActorRole::Hr, "HR Generalist", "People", "HR");

    let (service, directory, dispatcher) =
        workflow(vec![submitter.clone(), manager.clone(), hr.clone()]);

    // Submit
    let updated = service
        .submit(&actor_for(&submitter), submit_input("Relocation"))
        .await
        .unwrap();

    assert_eq!(updated.status, EmployeeStatus::ResignationSubmitted);
    let data = updated.resignation.as_ref().unwrap();
    assert_eq!(data.domain_tl_approval_status, StageStatus::NotRequired);
    assert_eq!(data.manager_approval_status, StageStatus::Pending);
    assert_eq!(data.reason, "Relocation");

    // The department manager was notified, not the submitter.
    let submit_notices = dispatcher.notifications();
    assert_eq!(submit_notices.len(), 1);
    assert_eq!(submit_notices[0].user_id, manager.user_id);

    // Manager approves with a proposed last working day.
    let updated = service
        .manager_approve(&actor_for(&manager), &submitter.id, Some(date(2024, 3, 1)))
        .await
        .unwrap();

    let data = updated.resignation.as_ref().unwrap();
    assert_eq!(data.requested_lwd, Some(date(2024, 3, 1)));
    assert_eq!(data.final_lwd, Some(date(2024, 3, 1)));
    assert_eq!(data.manager_approval_status, StageStatus::Approved);
    // HR still has to finalize.
    assert_eq!(updated.status, EmployeeStatus::ResignationSubmitted);

    // HR finalizes with the standard notice.
    let updated = service
        .hr_finalize(
            &actor_for(&hr),
            &submitter.id,
            HrFinalizeInput {
                notice_days: 30,
                final_lwd: date(2024, 3, 1),
                comments: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, EmployeeStatus::NoticePeriod);
    assert_eq!(updated.resignation.as_ref().unwrap().notice_days, Some(30));

    // The persisted document reflects the final state.
    let stored = directory.find_by_id(&submitter.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EmployeeStatus::NoticePeriod);
}

#[tokio::test]
async fn scenario_b_manager_submission_skips_both_stages() {
    let manager = employee(
        "mira",
        ActorRole::Manager,
        "Engineering Manager",
        "Platform",
        "Engineering",
    );
    let admin = employee("omar", ActorRole::Admin, "HR Admin", "People", "HR");
    let hr = employee("hina", ActorRole::Hr, "HR Generalist", "People", "HR");

    let (service, _, dispatcher) = workflow(vec![manager.clone(), admin.clone(), hr.clone()]);

    let updated = service
        .submit(&actor_for(&manager), submit_input("Sabbatical"))
        .await
        .unwrap();

    let data = updated.resignation.as_ref().unwrap();
    assert_eq!(data.domain_tl_approval_status, StageStatus::NotRequired);
    assert_eq!(data.manager_approval_status, StageStatus::NotRequired);

    // All admins were notified.
    let notices = dispatcher.notifications();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].user_id, admin.user_id);

    // HR finalizes directly.
    let updated = service
        .hr_finalize(
            &actor_for(&hr),
            &manager.id,
            HrFinalizeInput {
                notice_days: 60,
                final_lwd: date(2024, 5, 1),
                comments: Some("Handover plan agreed".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, EmployeeStatus::NoticePeriod);
}

#[tokio::test]
async fn scenario_c_tl_rejection_reverts_to_confirmed() {
    let submitter = employee(
        "asha",
        ActorRole::Employee,
        "Software Engineer",
        "Payments",
        "Engineering",
    );
    let team_lead = employee(
        "tara",
        ActorRole::TeamLead,
        "Team Lead",
        "Payments",
        "Engineering",
    );

    let (service, _, dispatcher) = workflow(vec![submitter.clone(), team_lead.clone()]);

    let updated = service
        .submit(&actor_for(&submitter), submit_input("Better offer"))
        .await
        .unwrap();
    assert_eq!(
        updated.resignation.as_ref().unwrap().domain_tl_approval_status,
        StageStatus::Pending
    );

    // Exactly the domain TL was notified about the submission.
    let notices = dispatcher.notifications();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].user_id, team_lead.user_id);

    let updated = service
        .tl_reject(
            &actor_for(&team_lead),
            &submitter.id,
            "Insufficient notice".to_string(),
        )
        .await
        .unwrap();

    assert_eq!(updated.status, EmployeeStatus::Confirmed);
    let data = updated.resignation.as_ref().unwrap();
    assert_eq!(data.domain_tl_approval_status, StageStatus::Rejected);

    // The employee got an error-type notification carrying the reason verbatim.
    let rejection = dispatcher
        .notifications()
        .into_iter()
        .find(|n| n.user_id == submitter.user_id)
        .unwrap();
    assert_eq!(rejection.kind, NotificationKind::Error);
    assert!(rejection.message.contains("Insufficient notice"));
}

#[tokio::test]
async fn submit_twice_fails_with_guard_error() {
    let submitter = employee(
        "asha",
        ActorRole::Employee,
        "Software Engineer",
        "Payments",
        "Engineering",
    );
    let (service, _, _) = workflow(vec![submitter.clone()]);

    service
        .submit(&actor_for(&submitter), submit_input("Relocation"))
        .await
        .unwrap();

    let second = service
        .submit(&actor_for(&submitter), submit_input("Relocation"))
        .await;
    assert!(matches!(
        second,
        Err(exitflow_core::ExitflowError::Workflow(_))
    ));
}

#[tokio::test]
async fn cancel_only_from_in_flight_statuses() {
    let submitter = employee(
        "asha",
        ActorRole::Employee,
        "Software Engineer",
        "Payments",
        "Engineering",
    );
    let (service, directory, _) = workflow(vec![submitter.clone()]);

    // From Confirmed: guard error, record untouched.
    let result = service.cancel(&actor_for(&submitter)).await;
    assert!(matches!(
        result,
        Err(exitflow_core::ExitflowError::Workflow(_))
    ));

    // After submit, cancel drops the record and reverts the status.
    service
        .submit(&actor_for(&submitter), submit_input("Relocation"))
        .await
        .unwrap();
    let updated = service.cancel(&actor_for(&submitter)).await.unwrap();

    assert_eq!(updated.status, EmployeeStatus::Confirmed);
    assert!(updated.resignation.is_none());

    let stored = directory.find_by_id(&submitter.id).await.unwrap().unwrap();
    assert!(stored.resignation.is_none());
}

#[tokio::test]
async fn clearance_merge_accumulates_across_calls() {
    let submitter = employee(
        "asha",
        ActorRole::Employee,
        "Software Engineer",
        "Payments",
        "Engineering",
    );
    let hr = employee("hina", ActorRole::Hr, "HR Generalist", "People", "HR");
    let (service, _, _) = workflow(vec![submitter.clone(), hr.clone()]);

    service
        .submit(&actor_for(&submitter), submit_input("Relocation"))
        .await
        .unwrap();

    let mut first = BTreeMap::new();
    first.insert("assetsReturned".to_string(), true);
    first.insert("financeCleared".to_string(), false);
    service
        .update_clearance(&actor_for(&hr), &submitter.id, &first)
        .await
        .unwrap();

    let mut second = BTreeMap::new();
    second.insert("itCleared".to_string(), true);
    second.insert("financeCleared".to_string(), true);
    let updated = service
        .update_clearance(&actor_for(&hr), &submitter.id, &second)
        .await
        .unwrap();

    let clearance = &updated.resignation.as_ref().unwrap().exit_clearance;
    assert_eq!(clearance.get("assetsReturned"), Some(&true));
    assert_eq!(clearance.get("financeCleared"), Some(&true));
    assert_eq!(clearance.get("itCleared"), Some(&true));
    assert_eq!(clearance.len(), 3);
}

#[tokio::test]
async fn pending_lists_track_stage_progress() {
    let submitter = employee(
        "asha",
        ActorRole::Employee,
        "Software Engineer",
        "Payments",
        "Engineering",
    );
    let team_lead = employee(
        "tara",
        ActorRole::TeamLead,
        "Team Lead",
        "Payments",
        "Engineering",
    );
    let manager = employee(
        "mira",
        ActorRole::Manager,
        "Engineering Manager",
        "Platform",
        "Engineering",
    );
    let hr = employee("hina", ActorRole::Hr, "HR Generalist", "People", "HR");

    let (service, _, _) = workflow(vec![
        submitter.clone(),
        team_lead.clone(),
        manager.clone(),
        hr.clone(),
    ]);

    service
        .submit(&actor_for(&submitter), submit_input("Relocation"))
        .await
        .unwrap();

    // TL sees it, manager does not yet.
    let tl_list = service.tl_pending_list(&actor_for(&team_lead)).await.unwrap();
    assert_eq!(tl_list.len(), 1);
    assert!(service
        .manager_pending_list(&actor_for(&manager))
        .await
        .unwrap()
        .is_empty());

    service
        .tl_approve(&actor_for(&team_lead), &submitter.id, None)
        .await
        .unwrap();

    assert!(service
        .tl_pending_list(&actor_for(&team_lead))
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        service
            .manager_pending_list(&actor_for(&manager))
            .await
            .unwrap()
            .len(),
        1
    );

    service
        .manager_approve(&actor_for(&manager), &submitter.id, None)
        .await
        .unwrap();

    assert_eq!(
        service.hr_pending_list(&actor_for(&hr)).await.unwrap().len(),
        1
    );

    service
        .hr_finalize(
            &actor_for(&hr),
            &submitter.id,
            HrFinalizeInput {
                notice_days: 30,
                final_lwd: date(2024, 3, 1),
                comments: None,
            },
        )
        .await
        .unwrap();

    let exits = service.exit_list(&actor_for(&hr)).await.unwrap();
    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].status, EmployeeStatus::NoticePeriod);

    service
        .relieve(&actor_for(&hr), &submitter.id)
        .await
        .unwrap();
    assert!(service.exit_list(&actor_for(&hr)).await.unwrap().is_empty());
}

#[tokio::test]
async fn rejection_emails_are_best_effort_records() {
    let submitter = employee(
        "asha",
        ActorRole::Employee,
        "Software Engineer",
        "Payments",
        "Engineering",
    );
    let manager = employee(
        "mira",
        ActorRole::Manager,
        "Engineering Manager",
        "Platform",
        "Engineering",
    );

    let (service, _, dispatcher) = workflow(vec![submitter.clone(), manager.clone()]);

    service
        .submit(&actor_for(&submitter), submit_input("Relocation"))
        .await
        .unwrap();
    service
        .manager_reject(
            &actor_for(&manager),
            &submitter.id,
            "Critical release in flight".to_string(),
        )
        .await
        .unwrap();

    // Manager rejection emails the employee as well.
    let emails = dispatcher.emails();
    assert!(emails
        .iter()
        .any(|(to, subject)| to == &submitter.email && subject == "Resignation rejected"));
}
