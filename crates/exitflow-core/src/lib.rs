//! Exitflow Core Library
//!
//! Business logic for the HR exit workflow: the employee directory port, the
//! approval router, the workflow state machine and the notification ports.

pub mod config;
pub mod directory;
pub mod error;
pub mod notify;
pub mod workflow;

// Re-export main types for easy access
pub use config::{DirectoryConfig, ExitflowConfig, MailerConfig, ServerConfig};
pub use error::{ExitflowError, Result};

// Re-export directory types
pub use directory::{EmployeeDirectory, FileDirectory, MemoryDirectory, StatusCountMap};

// Re-export notification types
pub use notify::{FileNotificationStore, MailerClient, NotificationDispatcher, Notifier};

// Re-export workflow types
pub use workflow::{
    route, Actor, ExitWorkflow, HealthCheckResult, HealthStatus, HrFinalizeInput, NotifyAudience,
    RoutingDecision, SubmitInput,
};
