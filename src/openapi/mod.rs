//! The subset of an OpenAPI document the mock server reads: paths,
//! operations, responses and component schemas.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::schema::{DefinitionTable, SchemaNode, ref_name};

pub mod loader;
pub mod matcher;

pub use loader::{LoadError, load_document, load_documents};
pub use matcher::{MatchedSpec, match_request};

/// Reference chains between response objects are followed this many hops.
const MAX_RESPONSE_REF_HOPS: usize = 8;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct OpenApiDocument {
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default)]
    pub components: Option<Components>,
    /// Swagger 2 style top-level schema definitions.
    #[serde(default)]
    pub definitions: Option<Map<String, Value>>,

    #[serde(skip)]
    definition_table: DefinitionTable,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Server {
    pub url: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Components {
    #[serde(default)]
    pub schemas: Option<Map<String, Value>>,
    #[serde(default)]
    pub responses: Option<BTreeMap<String, ResponseOrRef>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PathItem {
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
}

impl PathItem {
    /// The operation declared for `method`, matched case-insensitively.
    pub fn operation(&self, method: &str) -> Option<&Operation> {
        match method.to_ascii_lowercase().as_str() {
            "get" => self.get.as_ref(),
            "put" => self.put.as_ref(),
            "post" => self.post.as_ref(),
            "delete" => self.delete.as_ref(),
            "options" => self.options.as_ref(),
            "head" => self.head.as_ref(),
            "patch" => self.patch.as_ref(),
            "trace" => self.trace.as_ref(),
            _ => None,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Operation {
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    /// Responses keyed by status code (`"200"`, `"4XX"`, `"default"`).
    #[serde(default, deserialize_with = "deserialize_status_keys")]
    pub responses: Option<BTreeMap<String, ResponseOrRef>>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum ResponseOrRef {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Response(ResponseObject),
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ResponseObject {
    pub description: Option<String>,
    pub headers: Option<Map<String, Value>>,
    /// Media types keyed by content type.
    pub content: Option<BTreeMap<String, MediaType>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct MediaType {
    #[serde(default, deserialize_with = "deserialize_schema_node")]
    pub schema: Option<SchemaNode>,
}

impl OpenApiDocument {
    /// Parses a document from an already-loaded JSON value.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value::<Self>(value).map(Self::indexed)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(raw).map(Self::indexed)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<Self>(raw).map(Self::indexed)
    }

    /// Definition table over `components.schemas` and `definitions`.
    pub fn definitions(&self) -> &DefinitionTable {
        &self.definition_table
    }

    /// Follows a `$ref` to `components.responses`.
    pub fn resolve_response(&self, pointer: &str) -> Option<&ResponseObject> {
        let responses = self.components.as_ref()?.responses.as_ref()?;
        let mut pointer = pointer.to_string();

        for _ in 0..MAX_RESPONSE_REF_HOPS {
            match responses.get(&ref_name(&pointer))? {
                ResponseOrRef::Response(response) => return Some(response),
                ResponseOrRef::Reference { reference } => pointer = reference.clone(),
            }
        }

        None
    }

    fn indexed(mut self) -> Self {
        let mut table = DefinitionTable::new();
        if let Some(definitions) = &self.definitions {
            table.extend_from(definitions);
        }
        if let Some(schemas) = self.components.as_ref().and_then(|c| c.schemas.as_ref()) {
            table.extend_from(schemas);
        }
        self.definition_table = table;
        self
    }
}

#[derive(Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(untagged)]
enum StatusKey {
    Code(u64),
    Name(String),
}

// YAML documents usually write status codes as bare integers
fn deserialize_status_keys<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, ResponseOrRef>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<StatusKey, ResponseOrRef>> = Option::deserialize(deserializer)?;

    Ok(raw.map(|responses| {
        responses
            .into_iter()
            .map(|(key, response)| {
                let key = match key {
                    StatusKey::Code(code) => code.to_string(),
                    StatusKey::Name(name) => name,
                };
                (key, response)
            })
            .collect()
    }))
}

fn deserialize_schema_node<'de, D>(deserializer: D) -> Result<Option<SchemaNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(raw.map(|schema| SchemaNode::from_value(&schema)))
}
