//! Module Service - registry queries.
//!
//! Handles module lookups and listing for the CLI.
//! Separated from InstallService for single responsibility.

use serde::Serialize;

use crate::{
    application::ports::ModuleStore,
    domain::{ModuleDescriptor, ModuleId},
    error::KilnResult,
};

/// Module summary for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub version: String,
    pub dependencies: Vec<String>,
    pub conflicts: Vec<String>,
    pub actions: usize,
}

impl From<&ModuleDescriptor> for ModuleInfo {
    fn from(module: &ModuleDescriptor) -> Self {
        Self {
            id: module.id.to_string(),
            name: module.metadata.name.clone(),
            description: module.metadata.description.clone(),
            category: module.metadata.category.clone(),
            version: module.metadata.version.clone(),
            dependencies: module.dependencies.iter().map(ToString::to_string).collect(),
            conflicts: module.conflicts.iter().map(ToString::to_string).collect(),
            actions: module.actions.len(),
        }
    }
}

/// Service for registry operations.
pub struct ModuleService {
    store: Box<dyn ModuleStore>,
}

impl ModuleService {
    pub fn new(store: Box<dyn ModuleStore>) -> Self {
        Self { store }
    }

    /// Get a module by id.
    pub fn get(&self, id: &ModuleId) -> KilnResult<ModuleDescriptor> {
        self.store.get(id)
    }

    /// Add or replace a module.
    pub fn save(&self, module: ModuleDescriptor) -> KilnResult<()> {
        self.store.insert(module)
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.store.contains(id)
    }

    /// List all modules.
    pub fn list(&self) -> KilnResult<Vec<ModuleDescriptor>> {
        self.store.list()
    }

    /// Summaries of every module, optionally narrowed to one category.
    pub fn summaries(&self, category: Option<&str>) -> KilnResult<Vec<ModuleInfo>> {
        Ok(self
            .store
            .list()?
            .iter()
            .filter(|m| category.is_none_or(|c| m.metadata.category == c))
            .map(ModuleInfo::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockModuleStore;
    use crate::domain::ModuleMetadata;

    fn module(id: &str, category: &str) -> ModuleDescriptor {
        ModuleDescriptor::builder(ModuleId::parse(id).unwrap())
            .metadata(ModuleMetadata::new(id).category(category))
            .build()
            .unwrap()
    }

    #[test]
    fn summaries_filter_by_category() {
        let mut store = MockModuleStore::new();
        store
            .expect_list()
            .returning(|| Ok(vec![module("prisma", "orm"), module("clerk", "auth")]));
        let service = ModuleService::new(Box::new(store));

        let all = service.summaries(None).unwrap();
        assert_eq!(all.len(), 2);

        let orm = service.summaries(Some("orm")).unwrap();
        assert_eq!(orm.len(), 1);
        assert_eq!(orm[0].id, "prisma");
    }

    #[test]
    fn lookups_delegate_to_the_store() {
        let mut store = MockModuleStore::new();
        store
            .expect_contains()
            .returning(|id| id.as_str() == "prisma");
        store
            .expect_get()
            .withf(|id| id.as_str() == "prisma")
            .returning(|_| Ok(module("prisma", "orm")));
        let service = ModuleService::new(Box::new(store));

        let prisma = ModuleId::parse("prisma").unwrap();
        assert!(service.contains(&prisma));
        assert!(!service.contains(&ModuleId::parse("drizzle").unwrap()));
        assert_eq!(service.get(&prisma).unwrap().metadata.category, "orm");
    }

    #[test]
    fn info_carries_relations() {
        let module = ModuleDescriptor::builder(ModuleId::parse("auth").unwrap())
            .metadata(ModuleMetadata::new("Auth"))
            .depends_on(ModuleId::parse("db").unwrap())
            .build()
            .unwrap();
        let info = ModuleInfo::from(&module);
        assert_eq!(info.dependencies, vec!["db"]);
        assert!(info.conflicts.is_empty());
        assert_eq!(info.actions, 0);
    }
}
