#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("template `{template_id}` is declared more than once")]
    DuplicateTemplate { template_id: String },
    #[error("template `{template_id}` not found in catalog")]
    UnknownTemplate { template_id: String },
    #[error("template `{template_id}` validation failed: {reason}")]
    Validation { template_id: String, reason: String },
    #[error("catalog file `{path}` has unsupported extension; expected .yaml, .yml or .json")]
    UnsupportedExtension { path: String },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("yaml error at {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("json error at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
