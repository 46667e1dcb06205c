//! Schema-driven value generation.
//!
//! [`SchemaFaker`] walks a [`SchemaNode`] and produces a random JSON value
//! that satisfies its type, composition, enum and range constraints.

mod text;

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};
use tracing::trace;

use crate::schema::{
    AdditionalProperties, ArraySchema, DefinitionTable, EnumSchema, Items, NumericSchema,
    ObjectSchema, SchemaNode, StringSchema,
};

pub use text::{FakeText, TextGenerator};

/// Bounds used when an integer or number schema declares none.
pub const DEFAULT_MINIMUM: i64 = -99_999_999;
pub const DEFAULT_MAXIMUM: i64 = 99_999_999;

const DEFAULT_MIN_ITEMS: u64 = 0;
const DEFAULT_MAX_ITEMS: u64 = 100;
const MAX_ADDITIONAL_PROPERTIES: usize = 4;

/// Hard recursion ceiling; beyond it the faker emits `null`.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Values generated per [`SchemaFaker::fake`] call before the rest become `null`.
pub const DEFAULT_NODE_BUDGET: usize = 10_000;

/// Array counts start halving once depth passes this level.
const ARRAY_DECAY_DEPTH: usize = 2;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FakerError {
    #[error("could not resolve schema reference '{0}'")]
    UnresolvableReference(String),

    #[error("no integer lies within [{minimum}, {maximum}]")]
    EmptyIntegerRange { minimum: f64, maximum: f64 },
}

/// Caps how many optional properties an object at `depth` may emit.
pub fn sane_depth(depth: usize) -> usize {
    3usize.saturating_sub(depth)
}

/// Upper bound on array length at `depth`: halves per level past
/// [`ARRAY_DECAY_DEPTH`], reaching zero well before the depth ceiling.
fn array_cap(depth: usize) -> u64 {
    let shift = depth.saturating_sub(ARRAY_DECAY_DEPTH);
    u32::try_from(shift)
        .ok()
        .and_then(|shift| DEFAULT_MAX_ITEMS.checked_shr(shift))
        .unwrap_or(0)
}

/// Generates values for schema nodes.
///
/// Owns its random source, so one faker serves one generation at a time.
/// Concurrent requests each build their own.
pub struct SchemaFaker<'a, R = StdRng, T = FakeText> {
    rng: R,
    text: T,
    definitions: &'a DefinitionTable,
    max_depth: usize,
    node_budget: usize,
    generated: usize,
}

impl<'a> SchemaFaker<'a> {
    pub fn new(definitions: &'a DefinitionTable) -> Self {
        Self::with_parts(StdRng::from_os_rng(), FakeText, definitions)
    }

    pub fn with_seed(seed: u64, definitions: &'a DefinitionTable) -> Self {
        Self::with_parts(StdRng::seed_from_u64(seed), FakeText, definitions)
    }
}

impl<'a, R, T> SchemaFaker<'a, R, T>
where
    R: RngCore,
    T: TextGenerator,
{
    pub fn with_parts(rng: R, text: T, definitions: &'a DefinitionTable) -> Self {
        Self {
            rng,
            text,
            definitions,
            max_depth: DEFAULT_MAX_DEPTH,
            node_budget: DEFAULT_NODE_BUDGET,
            generated: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_node_budget(mut self, node_budget: usize) -> Self {
        self.node_budget = node_budget;
        self
    }

    /// Generate a value for `schema`, starting at depth 0 with a fresh node
    /// budget.
    pub fn fake(&mut self, schema: &SchemaNode) -> Result<Value, FakerError> {
        self.generated = 0;
        self.generate(schema, 0)
    }

    /// Hands out the random source, for callers that make further choices
    /// around a generation (which path, which status code).
    pub fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    /// A free-text sentence from the configured text generator.
    pub fn sentence(&mut self) -> String {
        self.text.sentence(&mut self.rng)
    }

    /// Central dispatcher. Every call increments depth by one and spends one
    /// unit of the node budget.
    pub fn generate(&mut self, schema: &SchemaNode, depth: usize) -> Result<Value, FakerError> {
        let depth = depth + 1;
        if depth > self.max_depth {
            trace!(depth, "max depth reached, emitting null");
            return Ok(Value::Null);
        }

        self.generated += 1;
        if self.generated > self.node_budget {
            trace!(depth, "node budget spent, emitting null");
            return Ok(Value::Null);
        }

        match schema {
            SchemaNode::Array(array) => self.fake_array(array, depth),
            SchemaNode::AnyOf(branches) | SchemaNode::OneOf(branches) => {
                self.fake_one_branch(branches, depth)
            }
            SchemaNode::AllOf(branches) => self.fake_all_of(branches, depth),
            // `not` is not generated: always an empty object
            SchemaNode::Not(_) => Ok(Value::Object(Map::new())),
            SchemaNode::Reference(pointer) => {
                let resolved = self.resolve(pointer)?;
                self.generate(resolved, depth)
            }
            SchemaNode::Object(object) => self.fake_object(object, depth),
            SchemaNode::String(string) => Ok(self.fake_string(string)),
            SchemaNode::Integer(integer) => self.fake_integer(integer),
            SchemaNode::Boolean(boolean) => Ok(self.fake_boolean(boolean)),
            SchemaNode::Null => Ok(Value::Null),
            SchemaNode::Number(number) => Ok(self.fake_number(number)),
            SchemaNode::Unknown => Ok(Value::Object(Map::new())),
        }
    }

    fn resolve(&self, pointer: &str) -> Result<&'a SchemaNode, FakerError> {
        let definitions: &'a DefinitionTable = self.definitions;
        definitions
            .resolve(pointer)
            .ok_or_else(|| FakerError::UnresolvableReference(pointer.to_string()))
    }

    // =========================================================================
    // Composite values
    // =========================================================================

    fn fake_object(&mut self, schema: &ObjectSchema, depth: usize) -> Result<Value, FakerError> {
        let mut obj = Map::new();

        match &schema.additional_properties {
            Some(AdditionalProperties::Any) => {
                for _ in 0..self.rng.random_range(0..=MAX_ADDITIONAL_PROPERTIES) {
                    let key = self.text.token(&mut self.rng);
                    obj.insert(key, float_value(self.rng.random::<f64>()));
                }
            }
            Some(AdditionalProperties::Schema(addl)) => {
                for _ in 0..self.rng.random_range(0..=MAX_ADDITIONAL_PROPERTIES) {
                    let key = self.text.token(&mut self.rng);
                    let value = self.generate(addl, depth)?;
                    obj.insert(key, value);
                }
            }
            Some(AdditionalProperties::Forbidden) | None => {}
        }

        let mut names: Vec<&str> = schema.properties.iter().map(|(k, _)| k.as_str()).collect();
        names.shuffle(&mut self.rng);
        let keep = if names.is_empty() {
            0
        } else {
            sane_depth(depth).min(self.rng.random_range(0..names.len()))
        };
        names.truncate(keep);

        for required in &schema.required {
            if !names.contains(&required.as_str()) {
                names.push(required.as_str());
            }
        }

        for name in names {
            let value = match schema.property(name) {
                Some(property) => self.generate(property, depth)?,
                None => Value::Object(Map::new()),
            };
            obj.insert(name.to_string(), value);
        }

        Ok(Value::Object(obj))
    }

    fn fake_array(&mut self, schema: &ArraySchema, depth: usize) -> Result<Value, FakerError> {
        let items = match &schema.items {
            None => return Ok(Value::Array(Vec::new())),
            Some(Items::Tuple(positional)) => positional
                .iter()
                .map(|item| self.generate(item, depth))
                .collect::<Result<Vec<_>, _>>()?,
            Some(Items::Single(item)) => {
                let (min, max) = ordered(
                    schema.min_items.unwrap_or(DEFAULT_MIN_ITEMS),
                    schema.max_items.unwrap_or(DEFAULT_MAX_ITEMS),
                );
                // minItems wins over the cap; the node budget bounds what it costs
                let max = max.min(array_cap(depth).max(min));
                let count = self.rng.random_range(min..=max);

                let item_schema = match item.as_ref() {
                    SchemaNode::Reference(pointer) => self.resolve(pointer)?,
                    other => other,
                };
                (0..count)
                    .map(|_| self.generate(item_schema, depth))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(Value::Array(items))
    }

    fn fake_one_branch(
        &mut self,
        branches: &[SchemaNode],
        depth: usize,
    ) -> Result<Value, FakerError> {
        match branches.choose(&mut self.rng) {
            Some(branch) => self.generate(branch, depth),
            None => Ok(Value::Object(Map::new())),
        }
    }

    fn fake_all_of(&mut self, branches: &[SchemaNode], depth: usize) -> Result<Value, FakerError> {
        let mut merged = Map::new();
        for branch in branches {
            if let Value::Object(obj) = self.generate(branch, depth)? {
                merged.extend(obj);
            }
        }
        Ok(Value::Object(merged))
    }

    // =========================================================================
    // Primitive values
    // =========================================================================

    fn pick_enum(&mut self, enumeration: Option<&Vec<Value>>) -> Option<Value> {
        enumeration?.choose(&mut self.rng).cloned()
    }

    fn fake_string(&mut self, schema: &StringSchema) -> Value {
        if let Some(value) = self.pick_enum(schema.enumeration.as_ref()) {
            return value;
        }

        let formatted = schema
            .format
            .as_deref()
            .and_then(|format| self.text.formatted(&mut self.rng, format));

        Value::String(formatted.unwrap_or_else(|| self.text.token(&mut self.rng)))
    }

    fn fake_integer(&mut self, schema: &NumericSchema) -> Result<Value, FakerError> {
        if let Some(value) = self.pick_enum(schema.enumeration.as_ref()) {
            return Ok(value);
        }

        let (minimum, maximum) = ordered(
            schema.minimum.unwrap_or(DEFAULT_MINIMUM as f64),
            schema.maximum.unwrap_or(DEFAULT_MAXIMUM as f64),
        );
        let (min, max) = (minimum.ceil() as i64, maximum.floor() as i64);
        if min > max {
            return Err(FakerError::EmptyIntegerRange { minimum, maximum });
        }

        Ok(Value::Number(self.rng.random_range(min..=max).into()))
    }

    fn fake_number(&mut self, schema: &NumericSchema) -> Value {
        if let Some(value) = self.pick_enum(schema.enumeration.as_ref()) {
            return value;
        }

        let min = schema.minimum.unwrap_or(DEFAULT_MINIMUM as f64);
        let max = schema.maximum.unwrap_or(DEFAULT_MAXIMUM as f64);
        let (min, max) = ordered(min, max);

        let value = min + self.rng.random::<f64>() * (max - min);
        float_value(value.clamp(min, max))
    }

    fn fake_boolean(&mut self, schema: &EnumSchema) -> Value {
        if let Some(value) = self.pick_enum(schema.enumeration.as_ref()) {
            return value;
        }
        Value::Bool(self.rng.random_bool(0.5))
    }
}

fn ordered<N: PartialOrd>(a: N, b: N) -> (N, N) {
    if a <= b { (a, b) } else { (b, a) }
}

fn float_value(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

// =============================================================================
// Tests
// =============================================================================
