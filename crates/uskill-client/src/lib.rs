//! HTTP client for Unity Editor instances running the skills REST plugin.
//!
//! Resolves which editor instance to talk to through the local instance
//! registry, fetches the skill catalog, and invokes individual skills.
mod client;
mod error;
mod registry;
mod text;
mod types;

pub use client::{
    ClientTarget, SkillsClient, SkillsClientConfig, CALL_TIMEOUT_MS, CATALOG_TIMEOUT_MS,
    DEFAULT_PORT, HEALTH_TIMEOUT_MS,
};
pub use error::{CatalogError, ClientBuildError, InvokeError, ResolutionError};
pub use registry::{default_registry_path, resolve_target, InstanceRecord, InstanceRegistry};
pub use text::{truncate_chars, value_text};
pub use types::{
    CatalogEntry, ParamType, ParameterDescriptor, RawSkillResponse, SkillCatalog, SkillDescriptor,
    SkillInvoker, SkillParams, UNNAMED_SKILL,
};
