use std::collections::HashMap;

use serde_json::Value;

use super::SchemaNode;

/// Flattened name -> schema map used to resolve `$ref` pointers.
///
/// Built once per document and only read afterwards, so a single table can
/// back any number of concurrent generations.
#[derive(Debug, Clone, Default)]
pub struct DefinitionTable {
    definitions: HashMap<String, SchemaNode>,
}

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from an object of raw schemas keyed by name,
    /// e.g. `components.schemas`.
    pub fn from_schemas(schemas: &serde_json::Map<String, Value>) -> Self {
        let mut table = Self::new();
        table.extend_from(schemas);
        table
    }

    /// Adds every schema in `schemas`, replacing entries with the same name.
    pub fn extend_from(&mut self, schemas: &serde_json::Map<String, Value>) {
        for (name, schema) in schemas {
            self.insert(name.clone(), SchemaNode::from_value(schema));
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, node: SchemaNode) {
        self.definitions.insert(name.into(), node);
    }

    /// Looks up a `$ref` pointer by its trailing segment.
    pub fn resolve(&self, pointer: &str) -> Option<&SchemaNode> {
        self.definitions.get(ref_name(pointer).as_str())
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.definitions.get(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Returns the definition name a pointer refers to: its last `/` segment,
/// with JSON pointer escapes decoded.
///
/// `#/components/schemas/Pet` and `#/definitions/Pet` both name `Pet`.
pub fn ref_name(pointer: &str) -> String {
    let segment = pointer.rsplit('/').next().unwrap_or(pointer);
    segment.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ref_name_takes_trailing_segment() {
        assert_eq!(ref_name("#/components/schemas/Pet"), "Pet");
        assert_eq!(ref_name("#/definitions/Pet"), "Pet");
        assert_eq!(ref_name("Pet"), "Pet");
    }

    #[test]
    fn ref_name_decodes_pointer_escapes() {
        assert_eq!(ref_name("#/definitions/a~1b"), "a/b");
        assert_eq!(ref_name("#/definitions/a~0b"), "a~b");
    }

    #[test]
    fn resolves_by_pointer() {
        let schemas = json!({
            "Pet": {"type": "object"},
            "Tag": {"type": "string"}
        });
        let table = DefinitionTable::from_schemas(schemas.as_object().unwrap());

        assert_eq!(table.len(), 2);
        assert!(matches!(
            table.resolve("#/components/schemas/Tag"),
            Some(SchemaNode::String(_))
        ));
        assert!(table.resolve("#/components/schemas/Missing").is_none());
    }

    #[test]
    fn later_schemas_replace_earlier_ones() {
        let mut table = DefinitionTable::from_schemas(json!({"A": {"type": "string"}}).as_object().unwrap());
        table.extend_from(json!({"A": {"type": "integer"}}).as_object().unwrap());

        assert!(matches!(table.get("A"), Some(SchemaNode::Integer(_))));
    }
}
