//! File-backed employee directory
//!
//! One JSON document per employee under `<root>/employees`. Queries are
//! directory scans; writes replace the single document.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{matches_manager, matches_team_lead, EmployeeDirectory, StatusCountMap};
use crate::error::{ExitflowError, Result};
use exitflow_types::{ActorRole, Employee, EmployeeId, UserId};

const EMPLOYEES_DIR_NAME: &str = "employees";

pub struct FileDirectory {
    employees_dir: PathBuf,
}

impl FileDirectory {
    /// Create a directory store rooted at `root_path`, creating the layout
    /// if it does not exist yet.
    pub fn new<P: AsRef<Path>>(root_path: P) -> Result<Self> {
        let employees_dir = root_path.as_ref().join(EMPLOYEES_DIR_NAME);
        fs::create_dir_all(&employees_dir)?;

        Ok(Self { employees_dir })
    }

    fn employee_path(&self, id: &EmployeeId) -> PathBuf {
        self.employees_dir.join(format!("employee_{}.json", id))
    }

    fn write_employee(&self, path: &Path, employee: &Employee) -> Result<()> {
        let json = serde_json::to_string_pretty(employee).map_err(|e| {
            ExitflowError::Serialization(format!("Failed to serialize employee: {}", e))
        })?;

        fs::write(path, json)?;
        Ok(())
    }

    fn read_employee(&self, path: &Path) -> Result<Employee> {
        let json = fs::read_to_string(path)?;

        serde_json::from_str(&json).map_err(|e| {
            ExitflowError::Deserialization(format!("Failed to deserialize employee: {}", e))
        })
    }

    /// Scan every employee document, skipping files that fail to parse.
    fn scan(&self) -> Result<Vec<Employee>> {
        if !self.employees_dir.exists() {
            return Ok(Vec::new());
        }

        let mut employees = Vec::new();

        for entry in fs::read_dir(&self.employees_dir)? {
            let entry = entry?;

            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
                match self.read_employee(&path) {
                    Ok(employee) => employees.push(employee),
                    Err(e) => log::warn!("Skipping unreadable employee file {:?}: {}", path, e),
                }
            }
        }

        Ok(employees)
    }
}

#[async_trait]
impl EmployeeDirectory for FileDirectory {
    async fn find_by_id(&self, id: &EmployeeId) -> Result<Option<Employee>> {
        let path = self.employee_path(id);
        if !path.exists() {
            return Ok(None);
        }

        Ok(Some(self.read_employee(&path)?))
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Employee>> {
        Ok(self.scan()?.into_iter().find(|e| &e.user_id == user_id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>> {
        Ok(self
            .scan()?
            .into_iter()
            .find(|e| e.email.eq_ignore_ascii_case(email)))
    }

    async fn find_team_leads_in_domain(
        &self,
        domain: &str,
        exclude: &EmployeeId,
    ) -> Result<Vec<Employee>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|e| matches_team_lead(e, domain, exclude))
            .collect())
    }

    async fn find_managers_in_department(&self, department: &str) -> Result<Vec<Employee>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|e| matches_manager(e, department))
            .collect())
    }

    async fn find_by_role(&self, role: ActorRole) -> Result<Vec<Employee>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|e| e.active && e.role == role)
            .collect())
    }

    async fn list_open_resignations(&self) -> Result<Vec<Employee>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|e| e.resignation.is_some())
            .collect())
    }

    async fn count_by_status(&self) -> Result<StatusCountMap> {
        let mut counts = StatusCountMap::new();
        for employee in self.scan()? {
            counts.increment(employee.status);
        }

        Ok(counts)
    }

    async fn save(&self, employee: &Employee) -> Result<()> {
        let path = self.employee_path(&employee.id);
        self.write_employee(&path, employee)?;

        log::debug!("Saved employee document: {}", employee.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use exitflow_types::EmployeeStatus;
    use tempfile::TempDir;

    fn employee(id: &str, role: ActorRole, position: &str, domain: &str) -> Employee {
        Employee {
            id: EmployeeId::new(id),
            user_id: UserId::new(format!("user-{}", id)),
            name: format!("Employee {}", id),
            email: format!("{}@example.com", id),
            role,
            position: position.to_string(),
            domain: domain.to_string(),
            department: "Engineering".to_string(),
            active: true,
            status: EmployeeStatus::Confirmed,
            resignation: None,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_find_by_id() {
        let temp_dir = TempDir::new().unwrap();
        let directory = FileDirectory::new(temp_dir.path()).unwrap();

        let emp = employee("e1", ActorRole::Employee, "Software Engineer", "Payments");
        directory.save(&emp).await.unwrap();

        let loaded = directory.find_by_id(&emp.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, emp.id);
        assert_eq!(loaded.email, emp.email);

        let missing = directory
            .find_by_id(&EmployeeId::new("nope"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_team_lead_lookup_excludes_submitter() {
        let temp_dir = TempDir::new().unwrap();
        let directory = FileDirectory::new(temp_dir.path()).unwrap();

        let submitter = employee("sub", ActorRole::TeamLead, "Team Lead", "Payments");
        let other_tl = employee("tl2", ActorRole::TeamLead, "Tech Lead", "payments");
        let engineer = employee("eng", ActorRole::Employee, "Software Engineer", "Payments");

        directory.save(&submitter).await.unwrap();
        directory.save(&other_tl).await.unwrap();
        directory.save(&engineer).await.unwrap();

        let leads = directory
            .find_team_leads_in_domain("Payments", &submitter.id)
            .await
            .unwrap();

        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].id, other_tl.id);
    }

    #[tokio::test]
    async fn test_directory_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let emp = employee("e1", ActorRole::Manager, "Delivery Manager", "Payments");

        {
            let directory = FileDirectory::new(temp_dir.path()).unwrap();
            directory.save(&emp).await.unwrap();
        }

        // Second instance - should be able to load the persisted document
        {
            let directory = FileDirectory::new(temp_dir.path()).unwrap();
            let managers = directory
                .find_managers_in_department("engineering")
                .await
                .unwrap();
            assert_eq!(managers.len(), 1);
            assert_eq!(managers[0].id, emp.id);
        }
    }

    #[tokio::test]
    async fn test_count_by_status() {
        let temp_dir = TempDir::new().unwrap();
        let directory = FileDirectory::new(temp_dir.path()).unwrap();

        let mut a = employee("a", ActorRole::Employee, "Engineer", "Payments");
        let mut b = employee("b", ActorRole::Employee, "Engineer", "Payments");
        a.status = EmployeeStatus::NoticePeriod;
        b.status = EmployeeStatus::Confirmed;

        directory.save(&a).await.unwrap();
        directory.save(&b).await.unwrap();

        let counts = directory.count_by_status().await.unwrap();
        assert_eq!(counts.get(EmployeeStatus::NoticePeriod), 1);
        assert_eq!(counts.get(EmployeeStatus::Confirmed), 1);
        assert_eq!(counts.total(), 2);
    }
}
