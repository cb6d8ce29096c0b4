use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::SchemaField;

/// Named JSON Schema the provider must answer with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub name: String,
    pub description: String,
    pub schema: Value,
}

impl ResponseSchema {
    /// Builds a closed object schema (every property required, no extra
    /// properties) from a list of fields. Nullable fields accept `null`.
    pub fn object(name: &str, description: &str, fields: &[SchemaField]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            schema: build_object_schema(fields),
        }
    }
}

pub(crate) fn build_object_schema(fields: &[SchemaField]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in fields {
        let mut field_schema = Map::new();
        field_schema.insert("description".to_string(), Value::String(field.description.clone()));

        let type_value = if field.nullable {
            Value::Array(vec![
                Value::String(field.field_type.clone()),
                Value::String("null".to_string()),
            ])
        } else {
            Value::String(field.field_type.clone())
        };
        field_schema.insert("type".to_string(), type_value);

        if let Some(enum_values) = &field.enum_values {
            let mut values: Vec<Value> = enum_values.iter().map(|v| Value::String(v.clone())).collect();
            if field.nullable {
                values.push(Value::Null);
            }
            field_schema.insert("enum".to_string(), Value::Array(values));
        }

        properties.insert(field.name.clone(), Value::Object(field_schema));
        required.push(Value::String(field.name.clone()));
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), Value::String("object".to_string()));
    schema.insert("properties".to_string(), Value::Object(properties));
    schema.insert("required".to_string(), Value::Array(required));
    schema.insert("additionalProperties".to_string(), Value::Bool(false));
    Value::Object(schema)
}
