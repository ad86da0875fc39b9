//! Exit workflow module

pub mod machine;
pub mod router;
pub mod service;

pub use machine::{HrFinalizeInput, SubmitInput};
pub use router::{route, NotifyAudience, RoutingDecision};
pub use service::{Actor, ExitWorkflow, HealthCheckResult, HealthStatus};
