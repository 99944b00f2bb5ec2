//! Install Service - main application orchestrator.
//!
//! This service coordinates the whole "add modules to a project" workflow:
//! 1. Resolve the requested modules into an installation order
//! 2. Abort the batch if resolution reported any defect
//! 3. Seed each module's parameters into the shared context
//! 4. Execute each blueprint in order, collecting per-module results
//!
//! It implements the driving port (incoming) and uses driven ports (outgoing).

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::ModuleStore,
        services::{executor::BlueprintExecutor, resolver::DependencyResolver},
    },
    domain::{
        DomainError, ExecutionResult, ModuleDescriptor, ModuleId, ParamValue, ProjectContext,
        RenderError, ResolutionResult,
    },
    error::KilnResult,
};

/// What to do when a module's blueprint reports errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Run the remaining modules anyway.
    #[default]
    Continue,
    /// Skip every module after the first failing one.
    Stop,
}

/// A parameter value supplied by the caller for one module.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamAssignment {
    pub module: ModuleId,
    pub name: String,
    pub value: ParamValue,
}

impl ParamAssignment {
    pub fn new(module: ModuleId, name: impl Into<String>, value: ParamValue) -> Self {
        Self {
            module,
            name: name.into(),
            value,
        }
    }

    /// Parse `module.name=value`.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidParameter {
            name: raw.to_string(),
            reason: reason.to_string(),
        };

        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| invalid("expected module.name=value"))?;
        let (module, name) = key
            .trim()
            .split_once('.')
            .ok_or_else(|| invalid("expected module.name=value"))?;
        if name.is_empty() {
            return Err(invalid("parameter name is empty"));
        }

        Ok(Self {
            module: ModuleId::parse(module)?,
            name: name.to_string(),
            value: ParamValue::from_cli(value),
        })
    }
}

/// Input for one install batch.
#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    pub modules: Vec<ModuleId>,
    pub params: Vec<ParamAssignment>,
    pub dry_run: bool,
}

/// Per-module outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleReport {
    pub id: ModuleId,
    pub name: String,
    pub result: ExecutionResult,
}

/// Outcome of one install batch.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub order: Vec<ModuleId>,
    pub modules: Vec<ModuleReport>,
    /// Modules that never ran because an earlier one failed under
    /// [`FailurePolicy::Stop`].
    pub not_run: Vec<ModuleId>,
    pub dry_run: bool,
}

impl InstallReport {
    pub fn success(&self) -> bool {
        self.not_run.is_empty() && self.modules.iter().all(|m| m.result.success)
    }

    /// All module results folded into one.
    pub fn totals(&self) -> ExecutionResult {
        let mut total = ExecutionResult {
            success: true,
            ..Default::default()
        };
        for module in &self.modules {
            total.absorb(&module.result);
        }
        total
    }
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum InstallEvent<'a> {
    Started {
        module: &'a ModuleDescriptor,
        index: usize,
        total: usize,
    },
    Finished(&'a ModuleReport),
}

/// Main installation service.
pub struct InstallService {
    store: Box<dyn ModuleStore>,
    executor: BlueprintExecutor,
    policy: FailurePolicy,
}

impl InstallService {
    /// Create a new install service with the given store and executor.
    pub fn new(store: Box<dyn ModuleStore>, executor: BlueprintExecutor) -> Self {
        Self {
            store,
            executor,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve without executing anything.
    pub fn plan(&self, modules: &[ModuleId]) -> ResolutionResult {
        DependencyResolver::new(self.store.as_ref()).resolve(modules)
    }

    /// Install the requested modules into the project described by `ctx`.
    ///
    /// See [`install_with`](Self::install_with).
    pub fn install(
        &self,
        request: &InstallRequest,
        ctx: &mut ProjectContext,
    ) -> KilnResult<InstallReport> {
        self.install_with(request, ctx, |_| {})
    }

    /// Install, reporting each module's start and finish to `observe`.
    ///
    /// # Errors
    ///
    /// - `ResolutionFailed` if any conflict, cycle or missing module was found
    /// - `InvalidParameter` if an assignment targets a module outside the batch
    /// - `MissingParameter` if a required parameter has neither value nor default
    ///
    /// Nothing is written when an error is returned. Failures inside
    /// blueprints are reported in the returned [`InstallReport`] instead.
    #[instrument(
        skip_all,
        fields(
            run_id = %ctx.run_id(),
            modules = request.modules.len(),
            dry_run = request.dry_run
        )
    )]
    pub fn install_with<F>(
        &self,
        request: &InstallRequest,
        ctx: &mut ProjectContext,
        mut observe: F,
    ) -> KilnResult<InstallReport>
    where
        F: FnMut(InstallEvent<'_>),
    {
        let resolution = self.plan(&request.modules);
        if !resolution.is_ok() {
            return Err(ApplicationError::ResolutionFailed { report: resolution }.into());
        }
        info!(order = ?resolution.order, "Resolved installation order");

        let modules = resolution
            .order
            .iter()
            .map(|id| self.store.get(id))
            .collect::<KilnResult<Vec<ModuleDescriptor>>>()?;

        self.seed_parameters(&modules, &request.params, ctx)?;

        let mut report = InstallReport {
            order: resolution.order.clone(),
            modules: Vec::with_capacity(modules.len()),
            not_run: Vec::new(),
            dry_run: request.dry_run,
        };

        let total = modules.len();
        let mut remaining = modules.iter().enumerate();
        for (index, module) in remaining.by_ref() {
            observe(InstallEvent::Started {
                module,
                index,
                total,
            });
            ctx.enter_module(module);
            let result = if request.dry_run {
                self.executor.execute_dry_run(&module.actions, ctx)
            } else {
                self.executor.execute(&module.actions, ctx)
            };
            ctx.leave_module();

            let failed = !result.success;
            if failed {
                warn!(
                    module = %module.id,
                    errors = result.errors.len(),
                    "Module finished with errors"
                );
            } else {
                info!(module = %module.id, "Module installed");
            }
            report.modules.push(ModuleReport {
                id: module.id.clone(),
                name: module.metadata.name.clone(),
                result,
            });
            if let Some(last) = report.modules.last() {
                observe(InstallEvent::Finished(last));
            }

            if failed && self.policy == FailurePolicy::Stop {
                break;
            }
        }
        report.not_run = remaining.map(|(_, m)| m.id.clone()).collect();

        Ok(report)
    }

    /// Write caller values and declared defaults into the context, and
    /// fail fast on required parameters nobody supplied.
    fn seed_parameters(
        &self,
        modules: &[ModuleDescriptor],
        params: &[ParamAssignment],
        ctx: &mut ProjectContext,
    ) -> KilnResult<()> {
        for assignment in params {
            let Some(module) = modules.iter().find(|m| m.id == assignment.module) else {
                return Err(DomainError::InvalidParameter {
                    name: format!("{}.{}", assignment.module, assignment.name),
                    reason: format!("module '{}' is not part of this install", assignment.module),
                }
                .into());
            };
            if module.parameter(&assignment.name).is_none() {
                warn!(
                    module = %module.id,
                    param = %assignment.name,
                    "Parameter is not declared by the module"
                );
            }
            ctx.set_param(&module.id, assignment.name.clone(), assignment.value.clone());
        }

        for module in modules {
            for spec in &module.parameters {
                let supplied = ctx
                    .params_for(&module.id)
                    .is_some_and(|p| p.contains_key(&spec.name));
                if supplied {
                    continue;
                }
                match &spec.default {
                    Some(default) => ctx.set_param(&module.id, spec.name.clone(), default.clone()),
                    None if spec.required => {
                        return Err(RenderError::MissingParameter {
                            module: module.id.to_string(),
                            name: spec.name.clone(),
                        }
                        .into());
                    }
                    None => {}
                }
            }
        }
        Ok(())
    }
}
