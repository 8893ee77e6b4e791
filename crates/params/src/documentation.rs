//! OpenAPI rendering of definitions.
//!
//! Output is a plain `serde_json` value shaped like an OpenAPI schema object.
//! Only what a definition declares is rendered; nothing is inferred.

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::container::{CandidatePolicy, Container};
use crate::definition::ParameterDefinition;
use crate::kind::ParameterType;
use crate::list::ParameterList;

impl ParameterDefinition {
    /// Schema object for this definition.
    #[must_use]
    pub fn documentation(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), json!(self.parameter_type().name()));
        if let Some(format) = self.format() {
            schema.insert("format".into(), json!(format.name()));
        }

        let notes: Vec<String> = self
            .description()
            .map(str::to_owned)
            .into_iter()
            .chain(self.format().and_then(|f| f.documentation()))
            .chain(self.steps().filter_map(|s| s.documentation()))
            .collect();
        if !notes.is_empty() {
            schema.insert("description".into(), json!(notes.join(" ")));
        }

        if let Some(default) = self.default_value() {
            schema.insert("default".into(), default.clone());
        }
        if self.is_nullable() {
            schema.insert("nullable".into(), json!(true));
        }
        if self.is_deprecated() {
            schema.insert("deprecated".into(), json!(true));
        }
        if self.is_sensitive() && self.parameter_type() == ParameterType::String {
            schema.insert("writeOnly".into(), json!(true));
        }
        for (keyword, value) in self.rules().iter().filter_map(|r| r.documentation()) {
            schema.insert(keyword.to_owned(), value.clone());
        }
        if let Some(allowed) = self.enum_values() {
            schema.insert("enum".into(), Value::Array(allowed.to_vec()));
        }

        match self.container() {
            Some(Container::Array(spec)) => {
                let items = match spec.candidates() {
                    [] => json!({}),
                    [only] => only.documentation(),
                    many => {
                        let keyword = match spec.policy() {
                            CandidatePolicy::FirstMatch => "anyOf",
                            CandidatePolicy::ExactlyOne => "oneOf",
                        };
                        json!({ keyword: many.iter().map(Self::documentation).collect::<Vec<_>>() })
                    }
                };
                schema.insert("items".into(), items);
            }
            Some(Container::Object(spec)) => {
                let properties: Map<String, Value> = spec
                    .properties()
                    .iter()
                    .map(|(name, def)| (name.clone(), def.documentation()))
                    .collect();
                let required: Vec<&str> = spec
                    .properties()
                    .values()
                    .filter(|def| def.is_required())
                    .map(ParameterDefinition::name)
                    .collect();
                if !properties.is_empty() {
                    schema.insert("properties".into(), Value::Object(properties));
                }
                if !required.is_empty() {
                    schema.insert("required".into(), json!(required));
                }
                if !spec.allows_additional_properties() {
                    schema.insert("additionalProperties".into(), json!(false));
                }
            }
            None => {}
        }

        Value::Object(schema)
    }
}

impl ParameterList {
    /// Parameter objects by name, in declaration order.
    #[must_use]
    pub fn api_documentation(&self) -> IndexMap<String, Value> {
        self.iter()
            .map(|def| {
                let mut entry = Map::new();
                entry.insert("name".into(), json!(def.name()));
                entry.insert("in".into(), json!(self.context().scope()));
                entry.insert("required".into(), json!(def.is_required()));
                if def.is_deprecated() {
                    entry.insert("deprecated".into(), json!(true));
                }
                entry.insert("schema".into(), def.documentation());
                (def.name().to_owned(), Value::Object(entry))
            })
            .collect()
    }
}
