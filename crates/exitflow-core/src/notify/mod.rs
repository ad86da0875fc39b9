//! Notification dispatch port and adapters
//!
//! Dispatch is best-effort by contract: the workflow logs failures and moves
//! on, the employee record stays the source of truth.

use async_trait::async_trait;

use crate::error::Result;
use exitflow_types::Notification;

pub mod mailer;
pub mod store;

pub use mailer::MailerClient;
pub use store::FileNotificationStore;

/// Outbound notification channels used by the workflow
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Write one in-app notification record.
    async fn notify(&self, notification: &Notification) -> Result<()>;

    /// Send one email.
    async fn email(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Production dispatcher: in-app store plus an optional mail client.
///
/// With no mailer configured, email sends are skipped and logged.
pub struct Notifier {
    store: FileNotificationStore,
    mailer: Option<MailerClient>,
}

impl Notifier {
    pub fn new(store: FileNotificationStore, mailer: Option<MailerClient>) -> Self {
        Self { store, mailer }
    }
}

#[async_trait]
impl NotificationDispatcher for Notifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.store.append(notification)
    }

    async fn email(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        match &self.mailer {
            Some(mailer) => mailer.send(to, subject, body).await,
            None => {
                log::debug!("Mailer disabled, skipping email to {}: {}", to, subject);
                Ok(())
            }
        }
    }
}
