use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{ShotError, ShotResult};
use crate::scene::template::Template;

/// Templates indexed by id.
///
/// Loading or reloading a template replaces any previous instance with the same id wholesale;
/// passes already holding the old `Arc<Template>` keep rendering the old instance.
#[derive(Debug, Default)]
pub struct TemplateLibrary {
    templates: BTreeMap<String, Arc<Template>>,
    sources: BTreeMap<String, PathBuf>,
}

impl TemplateLibrary {
    /// Empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` file in `dir` (non-recursive, sorted by file name).
    pub fn load_dir(dir: impl AsRef<Path>) -> ShotResult<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            ShotError::validation(format!("read template dir '{}': {e}", dir.display()))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                ShotError::validation(format!("read template dir '{}': {e}", dir.display()))
            })?;
            let p = entry.path();
            if p.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(p);
            }
        }
        paths.sort();

        let mut lib = Self::new();
        for p in paths {
            lib.load_path(&p)?;
        }
        Ok(lib)
    }

    /// Load (or replace) a template from a file and remember its path for [`Self::reload`].
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> ShotResult<Arc<Template>> {
        let path = path.as_ref();
        let t = Template::from_path(path)?;
        self.sources.insert(t.id.clone(), path.to_path_buf());
        Ok(self.insert(t))
    }

    /// Insert (or replace) an already parsed template.
    pub fn insert(&mut self, template: Template) -> Arc<Template> {
        let t = Arc::new(template);
        self.templates.insert(t.id.clone(), t.clone());
        t
    }

    /// Look up a template by id.
    pub fn get(&self, id: &str) -> Option<Arc<Template>> {
        self.templates.get(id).cloned()
    }

    /// Re-read a file-backed template. The reloaded file must still declare the same id.
    pub fn reload(&mut self, id: &str) -> ShotResult<Arc<Template>> {
        let path = self
            .sources
            .get(id)
            .cloned()
            .ok_or_else(|| ShotError::validation(format!("template \"{id}\" has no source file")))?;
        let t = Template::from_path(&path)?;
        if t.id != id {
            return Err(ShotError::validation(format!(
                "reloaded '{}' declares id \"{}\", expected \"{id}\"",
                path.display(),
                t.id
            )));
        }
        Ok(self.insert(t))
    }

    /// Template ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Number of loaded templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Return `true` when no templates are loaded.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/library.rs"]
mod tests;
