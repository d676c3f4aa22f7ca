use crate::catalog::error::CatalogError;
use crate::catalog::template_file::{CatalogFile, TemplateDefinition};
use crate::catalog::validate::validate_template;
use crate::shared::ids::TemplateId;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

fn io_error(path: &Path, source: std::io::Error) -> CatalogError {
    CatalogError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Immutable, validated template store. Read-only at run time; runs hold a
/// reference and never mutate it.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: BTreeMap<TemplateId, TemplateDefinition>,
}

impl Catalog {
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = TemplateDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut templates = BTreeMap::new();
        for definition in definitions {
            validate_template(&definition)?;
            let id = definition.id.clone();
            if templates.insert(id.clone(), definition).is_some() {
                return Err(CatalogError::DuplicateTemplate {
                    template_id: id.to_string(),
                });
            }
        }
        Ok(Self { templates })
    }

    pub fn get(&self, template_id: &str) -> Option<&TemplateDefinition> {
        self.templates.get(template_id)
    }

    pub fn template(&self, template_id: &str) -> Result<&TemplateDefinition, CatalogError> {
        self.get(template_id)
            .ok_or_else(|| CatalogError::UnknownTemplate {
                template_id: template_id.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateDefinition> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Merge another catalog in; colliding ids are rejected.
    pub fn merge(self, other: Catalog) -> Result<Self, CatalogError> {
        Self::from_definitions(
            self.templates
                .into_values()
                .chain(other.templates.into_values()),
        )
    }
}

pub fn load_catalog_yaml_str(raw: &str) -> Result<Catalog, CatalogError> {
    let file: CatalogFile = serde_yaml::from_str(raw).map_err(|source| CatalogError::Yaml {
        path: "<inline>".to_string(),
        source,
    })?;
    Catalog::from_definitions(file.templates)
}

pub fn load_catalog_json_str(raw: &str) -> Result<Catalog, CatalogError> {
    let file: CatalogFile = serde_json::from_str(raw).map_err(|source| CatalogError::Json {
        path: "<inline>".to_string(),
        source,
    })?;
    Catalog::from_definitions(file.templates)
}

pub fn load_catalog_file(path: &Path) -> Result<Catalog, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase());
    let file: CatalogFile = match extension.as_deref() {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&raw).map_err(|source| CatalogError::Yaml {
                path: path.display().to_string(),
                source,
            })?
        }
        Some("json") => serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
            path: path.display().to_string(),
            source,
        })?,
        _ => {
            return Err(CatalogError::UnsupportedExtension {
                path: path.display().to_string(),
            })
        }
    };
    Catalog::from_definitions(file.templates)
}

/// Load every catalog file in a directory, in sorted path order so repeated
/// loads see a stable template set.
pub fn load_catalog_dir(dir: &Path) -> Result<Catalog, CatalogError> {
    let entries = fs::read_dir(dir).map_err(|source| io_error(dir, source))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| io_error(dir, source))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let supported = path
            .extension()
            .and_then(|value| value.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                ext == "yaml" || ext == "yml" || ext == "json"
            })
            .unwrap_or(false);
        if supported {
            paths.push(path);
        }
    }
    paths.sort();

    let mut catalog = Catalog::default();
    for path in paths {
        catalog = catalog.merge(load_catalog_file(&path)?)?;
    }
    Ok(catalog)
}
