use serde_json::{Map, Value};

/// One schema fragment, parsed once into the shape the faker dispatches on.
///
/// Raw schemas may carry several shape keys at once (a `$ref` next to a
/// `type`, an `allOf` next to `properties`). Parsing resolves that ambiguity
/// with a fixed precedence: array, `anyOf`, `allOf`, `oneOf`, `not`, `$ref`,
/// object, string, integer, boolean, null, number, and finally `Unknown`.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Array(ArraySchema),
    AnyOf(Vec<SchemaNode>),
    AllOf(Vec<SchemaNode>),
    OneOf(Vec<SchemaNode>),
    Not(Box<SchemaNode>),
    Reference(String),
    Object(ObjectSchema),
    String(StringSchema),
    Integer(NumericSchema),
    Boolean(EnumSchema),
    Null,
    Number(NumericSchema),
    /// Any `type` the faker does not know, or a schema that is not a JSON object.
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    Single(Box<SchemaNode>),
    Tuple(Vec<SchemaNode>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArraySchema {
    pub items: Option<Items>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    /// `additionalProperties: true`
    Any,
    /// `additionalProperties: false`, kept so the key's presence is not lost.
    Forbidden,
    Schema(Box<SchemaNode>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    /// Declared properties in document order.
    pub properties: Vec<(String, SchemaNode)>,
    pub required: Vec<String>,
    pub additional_properties: Option<AdditionalProperties>,
}

impl ObjectSchema {
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringSchema {
    pub enumeration: Option<Vec<Value>>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumericSchema {
    pub enumeration: Option<Vec<Value>>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumSchema {
    pub enumeration: Option<Vec<Value>>,
}

impl SchemaNode {
    pub fn from_value(value: &Value) -> SchemaNode {
        let Some(obj) = value.as_object() else {
            return SchemaNode::Unknown;
        };

        let type_name = obj.get("type").map(|t| t.as_str());

        if type_name == Some(Some("array")) {
            return SchemaNode::Array(parse_array(obj));
        }
        if let Some(branches) = parse_branches(obj, "anyOf") {
            return SchemaNode::AnyOf(branches);
        }
        if let Some(branches) = parse_branches(obj, "allOf") {
            return SchemaNode::AllOf(branches);
        }
        if let Some(branches) = parse_branches(obj, "oneOf") {
            return SchemaNode::OneOf(branches);
        }
        if let Some(inner) = obj.get("not") {
            return SchemaNode::Not(Box::new(SchemaNode::from_value(inner)));
        }
        if let Some(pointer) = obj.get("$ref").and_then(Value::as_str) {
            return SchemaNode::Reference(pointer.to_string());
        }

        match type_name {
            None | Some(Some("object")) => SchemaNode::Object(parse_object(obj)),
            Some(Some("string")) => SchemaNode::String(StringSchema {
                enumeration: parse_enum(obj),
                format: obj.get("format").and_then(Value::as_str).map(String::from),
            }),
            Some(Some("integer")) => SchemaNode::Integer(parse_numeric(obj)),
            Some(Some("boolean")) => SchemaNode::Boolean(EnumSchema {
                enumeration: parse_enum(obj),
            }),
            Some(Some("null")) => SchemaNode::Null,
            Some(Some("number")) => SchemaNode::Number(parse_numeric(obj)),
            _ => SchemaNode::Unknown,
        }
    }
}

fn parse_branches(obj: &Map<String, Value>, key: &str) -> Option<Vec<SchemaNode>> {
    obj.get(key)?
        .as_array()
        .map(|branches| branches.iter().map(SchemaNode::from_value).collect())
}

fn parse_array(obj: &Map<String, Value>) -> ArraySchema {
    let items = obj.get("items").map(|items| match items {
        Value::Array(tuple) => Items::Tuple(tuple.iter().map(SchemaNode::from_value).collect()),
        single => Items::Single(Box::new(SchemaNode::from_value(single))),
    });

    ArraySchema {
        items,
        min_items: obj.get("minItems").and_then(as_count),
        max_items: obj.get("maxItems").and_then(as_count),
    }
}

fn parse_object(obj: &Map<String, Value>) -> ObjectSchema {
    let properties = obj
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, schema)| (name.clone(), SchemaNode::from_value(schema)))
                .collect()
        })
        .unwrap_or_default();

    let required = obj
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let additional_properties = obj.get("additionalProperties").map(|addl| match addl {
        Value::Bool(true) => AdditionalProperties::Any,
        Value::Bool(false) => AdditionalProperties::Forbidden,
        schema => AdditionalProperties::Schema(Box::new(SchemaNode::from_value(schema))),
    });

    ObjectSchema {
        properties,
        required,
        additional_properties,
    }
}

fn parse_numeric(obj: &Map<String, Value>) -> NumericSchema {
    NumericSchema {
        enumeration: parse_enum(obj),
        minimum: obj.get("minimum").and_then(Value::as_f64),
        maximum: obj.get("maximum").and_then(Value::as_f64),
    }
}

fn parse_enum(obj: &Map<String, Value>) -> Option<Vec<Value>> {
    obj.get("enum").and_then(Value::as_array).cloned()
}

// minItems/maxItems occasionally arrive as floats from YAML
fn as_count(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> SchemaNode {
        SchemaNode::from_value(&value)
    }

    #[test]
    fn missing_type_is_object() {
        assert_eq!(parse(json!({})), SchemaNode::Object(ObjectSchema::default()));
    }

    #[test]
    fn non_object_schema_is_unknown() {
        assert_eq!(parse(json!(true)), SchemaNode::Unknown);
        assert_eq!(parse(json!("string")), SchemaNode::Unknown);
    }

    #[test]
    fn unknown_type_is_unknown() {
        assert_eq!(parse(json!({"type": "file"})), SchemaNode::Unknown);
        assert_eq!(parse(json!({"type": ["string", "null"]})), SchemaNode::Unknown);
    }

    #[test]
    fn array_type_wins_over_composition() {
        let node = parse(json!({
            "type": "array",
            "anyOf": [{"type": "string"}],
            "items": {"type": "integer"}
        }));
        assert!(matches!(node, SchemaNode::Array(_)));
    }

    #[test]
    fn composition_wins_over_reference() {
        let node = parse(json!({
            "$ref": "#/components/schemas/Pet",
            "allOf": [{"type": "string"}]
        }));
        assert!(matches!(node, SchemaNode::AllOf(ref b) if b.len() == 1));
    }

    #[test]
    fn any_of_wins_over_all_of() {
        let node = parse(json!({
            "anyOf": [{"type": "string"}],
            "allOf": [{"type": "integer"}]
        }));
        assert!(matches!(node, SchemaNode::AnyOf(_)));
    }

    #[test]
    fn reference_wins_over_type() {
        let node = parse(json!({"$ref": "#/components/schemas/Pet", "type": "string"}));
        assert_eq!(node, SchemaNode::Reference("#/components/schemas/Pet".into()));
    }

    #[test]
    fn not_wins_over_reference() {
        let node = parse(json!({"not": {"type": "string"}, "$ref": "#/definitions/A"}));
        assert!(matches!(node, SchemaNode::Not(_)));
    }

    #[test]
    fn tuple_items_keep_order() {
        let node = parse(json!({
            "type": "array",
            "items": [{"type": "string"}, {"type": "integer"}],
        }));
        let SchemaNode::Array(array) = node else {
            panic!("expected array");
        };
        match array.items {
            Some(Items::Tuple(items)) => {
                assert!(matches!(items[0], SchemaNode::String(_)));
                assert!(matches!(items[1], SchemaNode::Integer(_)));
            }
            other => panic!("expected tuple items, got {:?}", other),
        }
    }

    #[test]
    fn object_keywords_are_parsed() {
        let node = parse(json!({
            "type": "object",
            "required": ["id", 7],
            "properties": {"id": {"type": "integer"}},
            "additionalProperties": {"type": "string"}
        }));
        let SchemaNode::Object(object) = node else {
            panic!("expected object");
        };
        assert_eq!(object.required, vec!["id".to_string()]);
        assert!(matches!(object.property("id"), Some(SchemaNode::Integer(_))));
        assert!(matches!(
            object.additional_properties,
            Some(AdditionalProperties::Schema(_))
        ));
    }

    #[test]
    fn additional_properties_booleans() {
        let any = parse(json!({"additionalProperties": true}));
        let forbidden = parse(json!({"additionalProperties": false}));
        assert!(matches!(
            any,
            SchemaNode::Object(ObjectSchema { additional_properties: Some(AdditionalProperties::Any), .. })
        ));
        assert!(matches!(
            forbidden,
            SchemaNode::Object(ObjectSchema { additional_properties: Some(AdditionalProperties::Forbidden), .. })
        ));
    }

    #[test]
    fn numeric_bounds_accept_floats() {
        let node = parse(json!({"type": "number", "minimum": 1.5, "maximum": 3}));
        assert_eq!(
            node,
            SchemaNode::Number(NumericSchema {
                enumeration: None,
                minimum: Some(1.5),
                maximum: Some(3.0),
            })
        );
    }

    #[test]
    fn item_counts_tolerate_floats() {
        let node = parse(json!({"type": "array", "minItems": 2.0, "maxItems": 4}));
        let SchemaNode::Array(array) = node else {
            panic!("expected array");
        };
        assert_eq!(array.min_items, Some(2));
        assert_eq!(array.max_items, Some(4));
    }
}
