use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::InvokeError;

/// JSON object sent as the body of a skill invocation.
pub type SkillParams = Map<String, Value>;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Parameter type tags declared by the skill catalog.
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One declared parameter of a skill.
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub param_type: ParamType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(
        rename = "defaultValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_value: Option<Value>,
}

impl ParameterDescriptor {
    /// Returns the declared default unless it is missing, JSON null, or the
    /// editor's `"null"` sentinel string.
    pub fn usable_default(&self) -> Option<&Value> {
        match self.default_value.as_ref()? {
            Value::Null => None,
            Value::String(text) if text == "null" => None,
            value => Some(value),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A remotely invokable skill and its parameter schema.
pub struct SkillDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Name reported for a catalog entry that carries no usable `name`.
pub const UNNAMED_SKILL: &str = "(unnamed skill)";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
/// One element of the skill catalog.
///
/// Entries are decoded independently so a single malformed descriptor never
/// hides the rest of the catalog.
pub enum CatalogEntry {
    Skill(SkillDescriptor),
    Malformed { name: String, reason: String },
}

impl CatalogEntry {
    pub fn from_value(value: Value) -> Self {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string);
        match serde_json::from_value::<SkillDescriptor>(value) {
            Ok(skill) if name.is_some() => Self::Skill(skill),
            Ok(_) => Self::Malformed {
                name: UNNAMED_SKILL.to_string(),
                reason: "skill name is empty".to_string(),
            },
            Err(error) => Self::Malformed {
                name: name.unwrap_or_else(|| UNNAMED_SKILL.to_string()),
                reason: error.to_string(),
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Skill(skill) => &skill.name,
            Self::Malformed { name, .. } => name,
        }
    }

    pub fn as_skill(&self) -> Option<&SkillDescriptor> {
        match self {
            Self::Skill(skill) => Some(skill),
            Self::Malformed { .. } => None,
        }
    }
}

impl From<SkillDescriptor> for CatalogEntry {
    fn from(skill: SkillDescriptor) -> Self {
        Self::Skill(skill)
    }
}

impl<'de> Deserialize<'de> for CatalogEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Body of `GET /skills`.
pub struct SkillCatalog {
    pub skills: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq)]
/// Status and decoded body of a completed skill request.
pub struct RawSkillResponse {
    pub status: u16,
    pub body: Value,
}

impl RawSkillResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
/// Trait contract for anything that can invoke a skill by name.
pub trait SkillInvoker: Send + Sync {
    async fn invoke(
        &self,
        skill: &str,
        params: &SkillParams,
        timeout: Duration,
    ) -> Result<RawSkillResponse, InvokeError>;
}
