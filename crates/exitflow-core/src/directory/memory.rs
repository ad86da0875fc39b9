//! In-memory employee directory for tests and local development

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{matches_manager, matches_team_lead, EmployeeDirectory, StatusCountMap};
use crate::error::Result;
use exitflow_types::{ActorRole, Employee, EmployeeId, UserId};

#[derive(Default)]
pub struct MemoryDirectory {
    employees: RwLock<HashMap<EmployeeId, Employee>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the directory with a fixed snapshot of employee records.
    pub fn with_employees(employees: Vec<Employee>) -> Self {
        let map = employees.into_iter().map(|e| (e.id.clone(), e)).collect();
        Self {
            employees: RwLock::new(map),
        }
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryDirectory {
    async fn find_by_id(&self, id: &EmployeeId) -> Result<Option<Employee>> {
        Ok(self.employees.read().await.get(id).cloned())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Employee>> {
        Ok(self
            .employees
            .read()
            .await
            .values()
            .find(|e| &e.user_id == user_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>> {
        Ok(self
            .employees
            .read()
            .await
            .values()
            .find(|e| e.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_team_leads_in_domain(
        &self,
        domain: &str,
        exclude: &EmployeeId,
    ) -> Result<Vec<Employee>> {
        Ok(self
            .employees
            .read()
            .await
            .values()
            .filter(|e| matches_team_lead(e, domain, exclude))
            .cloned()
            .collect())
    }

    async fn find_managers_in_department(&self, department: &str) -> Result<Vec<Employee>> {
        Ok(self
            .employees
            .read()
            .await
            .values()
            .filter(|e| matches_manager(e, department))
            .cloned()
            .collect())
    }

    async fn find_by_role(&self, role: ActorRole) -> Result<Vec<Employee>> {
        Ok(self
            .employees
            .read()
            .await
            .values()
            .filter(|e| e.active && e.role == role)
            .cloned()
            .collect())
    }

    async fn list_open_resignations(&self) -> Result<Vec<Employee>> {
        Ok(self
            .employees
            .read()
            .await
            .values()
            .filter(|e| e.resignation.is_some())
            .cloned()
            .collect())
    }

    async fn count_by_status(&self) -> Result<StatusCountMap> {
        let mut counts = StatusCountMap::new();
        for employee in self.employees.read().await.values() {
            counts.increment(employee.status);
        }

        Ok(counts)
    }

    async fn save(&self, employee: &Employee) -> Result<()> {
        self.employees
            .write()
            .await
            .insert(employee.id.clone(), employee.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use exitflow_types::EmployeeStatus;

    fn employee(id: &str, role: ActorRole, position: &str) -> Employee {
        Employee {
            id: EmployeeId::new(id),
            user_id: UserId::new(format!("user-{}", id)),
            name: format!("Employee {}", id),
            email: format!("{}@example.com", id),
            role,
            position: position.to_string(),
            domain: "Payments".to_string(),
            department: "Engineering".to_string(),
            active: true,
            status: EmployeeStatus::Confirmed,
            resignation: None,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_lookup_by_user_id_and_email() {
        let emp = employee("e1", ActorRole::Employee, "Engineer");
        let directory = MemoryDirectory::with_employees(vec![emp.clone()]);

        let by_user = directory.find_by_user_id(&emp.user_id).await.unwrap();
        assert_eq!(by_user.unwrap().id, emp.id);

        let by_email = directory.find_by_email("E1@EXAMPLE.COM").await.unwrap();
        assert_eq!(by_email.unwrap().id, emp.id);
    }

    #[tokio::test]
    async fn test_inactive_records_are_not_approvers() {
        let mut manager = employee("m1", ActorRole::Manager, "Engineering Manager");
        manager.active = false;
        let directory = MemoryDirectory::with_employees(vec![manager]);

        let managers = directory
            .find_managers_in_department("Engineering")
            .await
            .unwrap();
        assert!(managers.is_empty());
    }
}
