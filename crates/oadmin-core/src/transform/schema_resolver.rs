use std::collections::HashSet;

use serde_json::Value;

use crate::catalog::{ResourceSchema, SchemaProperty};
use crate::parse::document::ApiDocument;
use crate::parse::schema::Schema;

use super::name_normalizer::schema_candidates;

/// Nesting limit for `items` and `$ref` chains. Deeper structures are
/// treated as untyped.
const MAX_DEPTH: usize = 16;

/// Resolves resource schemas and their properties against the named
/// schemas of one document.
pub struct SchemaResolver<'a> {
    doc: &'a ApiDocument,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(doc: &'a ApiDocument) -> Self {
        Self { doc }
    }

    /// Find the schema conventionally associated with a tag.
    pub fn schema_for_tag(&self, tag: &str, prefix: &str) -> Option<ResourceSchema> {
        schema_candidates(tag, prefix).into_iter().find_map(|name| {
            let raw = self.doc.schema(&name)?;
            log::debug!("resource `{tag}` uses schema `{name}`");
            Some(self.resource_schema(&name, raw))
        })
    }

    fn resource_schema(&self, name: &str, raw: &Value) -> ResourceSchema {
        let mut visited = HashSet::from([name.to_string()]);
        let schema = self.follow_ref(Schema::from_value(raw), &mut visited, 0);

        let properties = schema
            .properties
            .iter()
            .map(|(prop_name, prop)| (prop_name.clone(), self.property(prop, 0)))
            .collect();

        ResourceSchema {
            name: name.to_string(),
            properties,
            required: schema.required,
        }
    }

    /// Reduce one raw property to a `SchemaProperty`.
    pub fn property(&self, raw: &Value, depth: usize) -> SchemaProperty {
        if depth > MAX_DEPTH {
            log::warn!("schema nesting deeper than {MAX_DEPTH} levels; treating as untyped");
            return SchemaProperty::default();
        }

        let declared = Schema::from_value(raw);
        let ref_path = declared.ref_path.clone();
        let description = declared.description.clone();
        let read_only = declared.read_only.unwrap_or(false);

        let schema = self.follow_ref(declared, &mut HashSet::new(), depth);

        SchemaProperty {
            kind: schema.primary_type(),
            format: schema.format.clone(),
            enum_values: schema.enum_strings(),
            items: schema
                .items
                .as_ref()
                .map(|items| Box::new(self.property(items, depth + 1))),
            description: description.or(schema.description),
            read_only: read_only || schema.read_only.unwrap_or(false),
            ref_path,
        }
    }

    /// Replace an untyped `$ref` schema by its target. Unresolvable or
    /// circular references leave the schema untyped.
    fn follow_ref(&self, mut schema: Schema, visited: &mut HashSet<String>, depth: usize) -> Schema {
        let mut hops = depth;
        while schema.schema_type.is_none() {
            let Some(name) = schema.ref_name().map(str::to_string) else {
                break;
            };
            if hops > MAX_DEPTH || !visited.insert(name.clone()) {
                log::warn!("circular or too deep `$ref` to `{name}`");
                return Schema::default();
            }
            let Some(target) = self.doc.schema(&name) else {
                log::debug!("`$ref` target `{name}` not found");
                break;
            };
            schema = Schema::from_value(target);
            hops += 1;
        }
        schema
    }
}
