/// API uptime monitoring
///
/// - `checker`: one HTTP probe, classified into a health status
/// - `executor`: probe + persist, shared by scheduled and manual checks
/// - `registry`: one periodic task per scheduled target
/// - `service`: admin operations keeping store and registry consistent
pub mod checker;
pub mod executor;
pub mod registry;
pub mod service;
pub mod types;

pub use checker::{HttpProber, Prober};
pub use executor::ProbeExecutor;
pub use registry::{MonitorRegistry, RegistryStatus};
pub use service::MonitorService;
pub use types::{HealthStatus, ProbeOutcome};
