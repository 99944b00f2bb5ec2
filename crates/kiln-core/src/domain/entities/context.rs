//! Run-scoped project context.
//!
//! One [`ProjectContext`] exists per scaffolding run. It is owned by the
//! caller and threaded `&mut` through every operation that reads or writes
//! it; nothing else holds a reference between calls.
//!
//! ## Variables exposed to templates
//!
//! | Reference                  | Source                                      |
//! |----------------------------|---------------------------------------------|
//! | `name`, `root`, `framework`, `description` | [`ProjectMetadata`]           |
//! | `author`, `version`, `license`, `year`     | [`ProjectMetadata`]           |
//! | `name_snake`, `name_kebab`, `name_pascal` | derived from `name`          |
//! | `params.X`                 | current module's value, else declared default |
//! | `<module>.X`               | another module's explicit value             |
//! | `module.id/name/version`   | the module currently executing              |
//! | `env.X`                    | the current module's declared env vars      |
//! | `item`                     | element bound by a `repeat_over` iteration  |

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::domain::{
    entities::module::{EnvVar, ModuleDescriptor, ParameterSpec},
    value_objects::{ModuleId, ParamValue},
};

/// Fixed project metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub name: String,
    pub root: PathBuf,
    pub framework: Option<String>,
    pub description: String,
    pub author: String,
    pub version: String,
    pub license: String,
    pub year: String,
}

impl ProjectMetadata {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            framework: None,
            description: String::new(),
            author: String::new(),
            version: "0.1.0".to_string(),
            license: "MIT".to_string(),
            year: String::new(),
        }
    }

    pub fn framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }
}

/// What the context knows about the module whose blueprint is running.
#[derive(Debug, Clone)]
struct ModuleScope {
    id: ModuleId,
    name: String,
    version: String,
    env: Vec<EnvVar>,
    specs: Vec<ParameterSpec>,
}

/// Mutable state of one scaffolding run.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    run_id: Uuid,
    metadata: ProjectMetadata,
    parameters: HashMap<ModuleId, HashMap<String, ParamValue>>,
    scope: Option<ModuleScope>,
    item: Option<String>,
    package_manager: String,
}

impl ProjectContext {
    pub fn new(metadata: ProjectMetadata) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            metadata,
            parameters: HashMap::new(),
            scope: None,
            item: None,
            package_manager: "npm".to_string(),
        }
    }

    pub fn with_package_manager(mut self, pm: impl Into<String>) -> Self {
        self.package_manager = pm.into();
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    pub fn root(&self) -> &Path {
        &self.metadata.root
    }

    pub fn package_manager(&self) -> &str {
        &self.package_manager
    }

    // ── Parameters ────────────────────────────────────────────────────────

    /// Record a resolved parameter value for a module.
    pub fn set_param(&mut self, module: &ModuleId, name: impl Into<String>, value: ParamValue) {
        self.parameters
            .entry(module.clone())
            .or_default()
            .insert(name.into(), value);
    }

    /// Explicit values recorded for a module (defaults excluded).
    pub fn params_for(&self, module: &ModuleId) -> Option<&HashMap<String, ParamValue>> {
        self.parameters.get(module)
    }

    /// Make `module` the current scope. Parameter lookups through
    /// `params.X` and `env.X` resolve against it until the next call.
    pub fn enter_module(&mut self, module: &ModuleDescriptor) {
        self.scope = Some(ModuleScope {
            id: module.id.clone(),
            name: module.metadata.name.clone(),
            version: module.metadata.version.clone(),
            env: module.env_vars.clone(),
            specs: module.parameters.clone(),
        });
        self.item = None;
    }

    pub fn leave_module(&mut self) {
        self.scope = None;
        self.item = None;
    }

    pub fn current_module(&self) -> Option<&ModuleId> {
        self.scope.as_ref().map(|s| &s.id)
    }

    /// Current module's parameter: explicit value, else declared default.
    pub fn param(&self, name: &str) -> Option<Cow<'_, ParamValue>> {
        let scope = self.scope.as_ref()?;
        if let Some(value) = self.parameters.get(&scope.id).and_then(|p| p.get(name)) {
            return Some(Cow::Borrowed(value));
        }
        scope
            .specs
            .iter()
            .find(|s| s.name == name)
            .and_then(|s| s.default.as_ref())
            .map(Cow::Borrowed)
    }

    /// Whether the current module declares `name` as required.
    pub fn param_is_required(&self, name: &str) -> bool {
        self.scope
            .as_ref()
            .and_then(|s| s.specs.iter().find(|p| p.name == name))
            .is_some_and(|p| p.required)
    }

    /// Resolve a dotted reference: `params.X` or `<module>.X`.
    pub fn lookup(&self, reference: &str) -> Option<Cow<'_, ParamValue>> {
        let (namespace, name) = reference.split_once('.')?;
        if namespace == "params" {
            return self.param(name);
        }
        let module = ModuleId::parse(namespace).ok()?;
        if self.current_module() == Some(&module) {
            return self.param(name);
        }
        self.parameters
            .get(&module)
            .and_then(|p| p.get(name))
            .map(Cow::Borrowed)
    }

    // ── Fixed variables ───────────────────────────────────────────────────

    /// Project metadata variables, including derived name casings.
    pub fn metadata_var(&self, key: &str) -> Option<String> {
        let m = &self.metadata;
        match key {
            "name" => Some(m.name.clone()),
            "name_snake" => Some(to_snake_case(&m.name)),
            "name_kebab" => Some(to_kebab_case(&m.name)),
            "name_pascal" => Some(to_pascal_case(&m.name)),
            "root" => Some(m.root.display().to_string()),
            "framework" => Some(m.framework.clone().unwrap_or_default()),
            "description" => Some(m.description.clone()),
            "author" => Some(m.author.clone()),
            "version" => Some(m.version.clone()),
            "license" => Some(m.license.clone()),
            "year" => Some(m.year.clone()),
            _ => None,
        }
    }

    /// `module.id`, `module.name`, `module.version` of the current scope.
    pub fn module_var(&self, key: &str) -> Option<String> {
        let scope = self.scope.as_ref()?;
        match key {
            "id" => Some(scope.id.to_string()),
            "name" => Some(scope.name.clone()),
            "version" => Some(scope.version.clone()),
            _ => None,
        }
    }

    /// Env var declared by the current module.
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.scope
            .as_ref()?
            .env
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.as_str())
    }

    // ── Iteration binding ─────────────────────────────────────────────────

    pub fn item(&self) -> Option<&str> {
        self.item.as_deref()
    }

    pub(crate) fn bind_item(&mut self, item: Option<String>) {
        self.item = item;
    }
}

// ============================================================================
// Name casing
// ============================================================================

/// `My Awesome App` -> `my_awesome_app`
pub fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// `My Awesome App` -> `my-awesome-app`
pub fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

/// `my-awesome-app` -> `MyAwesomeApp`
pub fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    let mut out = String::new();
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                    out
                }
                None => String::new(),
            }
        })
        .collect()
}

/// Split on separators (`_`, `-`, whitespace), camelCase transitions, and
/// acronym boundaries (`HTTPServer` -> `http`, `server`). Words are lowercased.
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(&next) = chars.peek() {
            let lower_to_upper = c.is_lowercase() && next.is_uppercase();
            let acronym_end = c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase());

            if lower_to_upper || acronym_end {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::module::{ModuleMetadata, ParameterSpec};

    fn id(s: &str) -> ModuleId {
        ModuleId::parse(s).unwrap()
    }

    fn prisma() -> ModuleDescriptor {
        ModuleDescriptor::builder(id("prisma"))
            .metadata(ModuleMetadata::new("Prisma").version("5.0.0"))
            .parameter(ParameterSpec::optional("provider", "postgresql"))
            .parameter(ParameterSpec::required("url"))
            .env("DATABASE_URL", "postgresql://localhost:5432/app")
            .build()
            .unwrap()
    }

    #[test]
    fn name_casings_are_derived() {
        let ctx = ProjectContext::new(ProjectMetadata::new("my awesome project", "/tmp/p"));
        assert_eq!(ctx.metadata_var("name_snake").unwrap(), "my_awesome_project");
        assert_eq!(ctx.metadata_var("name_kebab").unwrap(), "my-awesome-project");
        assert_eq!(ctx.metadata_var("name_pascal").unwrap(), "MyAwesomeProject");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
    }

    #[test]
    fn param_falls_back_to_declared_default() {
        let mut ctx = ProjectContext::new(ProjectMetadata::new("app", "/tmp/app"));
        ctx.enter_module(&prisma());

        assert_eq!(
            ctx.param("provider").as_deref(),
            Some(&ParamValue::from("postgresql"))
        );

        ctx.set_param(&id("prisma"), "provider", ParamValue::from("sqlite"));
        assert_eq!(
            ctx.param("provider").as_deref(),
            Some(&ParamValue::from("sqlite"))
        );
        assert!(ctx.param("url").is_none());
        assert!(ctx.param_is_required("url"));
    }

    #[test]
    fn lookup_reads_other_modules_explicit_values() {
        let mut ctx = ProjectContext::new(ProjectMetadata::new("app", "/tmp/app"));
        ctx.set_param(&id("auth"), "social", ParamValue::Bool(true));
        ctx.enter_module(&prisma());

        assert!(ctx.lookup("auth.social").unwrap().is_truthy());
        assert!(ctx.lookup("auth.missing").is_none());
        assert!(ctx.lookup("prisma.provider").is_some());
        assert!(ctx.lookup("no_dot").is_none());
    }

    #[test]
    fn module_scope_exposes_metadata_and_env() {
        let mut ctx = ProjectContext::new(ProjectMetadata::new("app", "/tmp/app"));
        assert!(ctx.module_var("id").is_none());

        ctx.enter_module(&prisma());
        assert_eq!(ctx.module_var("version").unwrap(), "5.0.0");
        assert_eq!(
            ctx.env_var("DATABASE_URL"),
            Some("postgresql://localhost:5432/app")
        );

        ctx.leave_module();
        assert!(ctx.current_module().is_none());
    }
}
