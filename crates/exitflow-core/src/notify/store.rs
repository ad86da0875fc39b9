//! File-backed in-app notification store
//!
//! One JSON record per notification under `<root>/notifications`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ExitflowError, Result};
use exitflow_types::{Notification, UserId};

const NOTIFICATIONS_DIR_NAME: &str = "notifications";

pub struct FileNotificationStore {
    notifications_dir: PathBuf,
}

impl FileNotificationStore {
    pub fn new<P: AsRef<Path>>(root_path: P) -> Result<Self> {
        let notifications_dir = root_path.as_ref().join(NOTIFICATIONS_DIR_NAME);
        fs::create_dir_all(&notifications_dir)?;

        Ok(Self { notifications_dir })
    }

    /// Persist one notification record.
    pub fn append(&self, notification: &Notification) -> Result<()> {
        let path = self
            .notifications_dir
            .join(format!("notification_{}.json", notification.id));

        let json = serde_json::to_string_pretty(notification).map_err(|e| {
            ExitflowError::Serialization(format!("Failed to serialize notification: {}", e))
        })?;

        fs::write(path, json)?;

        log::debug!(
            "Stored notification {} for user {}",
            notification.id,
            notification.user_id
        );
        Ok(())
    }

    /// All stored notifications for one user, unsorted.
    pub fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Notification>> {
        if !self.notifications_dir.exists() {
            return Ok(Vec::new());
        }

        let mut notifications = Vec::new();

        for entry in fs::read_dir(&self.notifications_dir)? {
            let entry = entry?;

            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
                let json = fs::read_to_string(&path)?;

                if let Ok(notification) = serde_json::from_str::<Notification>(&json) {
                    if &notification.user_id == user_id {
                        notifications.push(notification);
                    }
                }
            }
        }

        Ok(notifications)
    }
}
