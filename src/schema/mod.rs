//! Typed schema fragments and the definition table used to resolve `$ref`s.

mod definitions;
mod node;

pub use definitions::{DefinitionTable, ref_name};
pub use node::{
    AdditionalProperties, ArraySchema, EnumSchema, Items, NumericSchema, ObjectSchema,
    SchemaNode, StringSchema,
};
