pub mod error;
pub mod load;
pub mod template_file;
pub mod typed_fields;
pub mod validate;

pub use error::CatalogError;
pub use load::{
    load_catalog_dir, load_catalog_file, load_catalog_json_str, load_catalog_yaml_str, Catalog,
};
pub use template_file::{
    AiGenerateSpec, CatalogFile, FieldComponent, FieldEnvelope, GenerationFormat, OutputKind,
    OutputSpec, StepDefinition, TemplateDefinition, TemplateMetadata,
};
pub use typed_fields::{
    is_placeholder_identifier, validate_placeholder_identifier, Difficulty, SelectOption, StateKey,
};
