//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "add these modules to a project".

pub mod executor;
pub mod install_service;
pub mod module_service;
pub mod resolver;

pub use executor::BlueprintExecutor;
pub use install_service::{
    FailurePolicy, InstallEvent, InstallReport, InstallRequest, InstallService, ModuleReport,
    ParamAssignment,
};
pub use module_service::{ModuleInfo, ModuleService};
pub use resolver::DependencyResolver;
