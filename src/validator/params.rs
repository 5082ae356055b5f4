/*
 * Licensed to the Apache Software Foundation (ASF) under one or more
 * contributor license agreements.  See the NOTICE file distributed with
 * this work for additional information regarding copyright ownership.
 * The ASF licenses this file to You under the Apache License, Version 2.0
 * (the "License"); you may not use this file except in compliance with
 * the License.  You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use super::{CompiledSchema, Primitive};
use crate::error::{Result, SwaggerError};
use crate::model::parse::{In, Parameter};
use crate::request::RequestParams;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Parameter keywords carried over into the synthesized property schema.
/// `default` is left out: an absent optional parameter adds no key.
const PARAMETER_KEYWORDS: [&str; 9] = [
    "enum",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
    "pattern",
    "multipleOf",
];

#[derive(Debug)]
pub(crate) struct BodyPlan {
    schema: CompiledSchema,
}

impl BodyPlan {
    pub(crate) fn compile(parameter: &Parameter, definitions: Option<&Value>) -> Result<Self, String> {
        let schema = parameter
            .schema
            .clone()
            .or_else(|| parameter.r#type.clone().filter(Value::is_object))
            .unwrap_or_else(|| json!({}));
        let schema = CompiledSchema::compile(schema, definitions)
            .map_err(|e| format!("body parameter '{}': {e}", parameter.name))?;
        Ok(Self { schema })
    }

    /// A JSON body wins over the form body; a null JSON body counts as absent.
    pub(crate) fn check(&self, request: &RequestParams) -> Result<Value> {
        let mut body = match &request.json {
            Some(json) if !json.is_null() => json.clone(),
            _ => Value::Object(string_fields(&request.form)),
        };
        self.schema
            .validate(&mut body)
            .map_err(|message| SwaggerError::ParameterValidation {
                location: In::Body,
                message,
            })?;
        Ok(body)
    }
}

#[derive(Debug)]
struct PrimitiveParam {
    name: String,
    coercion: Option<Primitive>,
}

/// Declared parameters of one primitive location and the object schema they form.
#[derive(Debug)]
pub(crate) struct LocationPlan {
    location: In,
    params: Vec<PrimitiveParam>,
    schema: CompiledSchema,
}

impl LocationPlan {
    pub(crate) fn compile(location: In, parameters: &[&Parameter]) -> Result<Self, String> {
        let mut properties = Map::new();
        let mut required: Vec<String> = Vec::new();
        let mut params = Vec::new();

        for parameter in parameters.iter().filter(|p| p.r#in == location) {
            if parameter.required && !required.contains(&parameter.name) {
                required.push(parameter.name.clone());
            }
            properties.insert(parameter.name.clone(), property_schema(parameter));
            params.push(PrimitiveParam {
                name: parameter.name.clone(),
                coercion: Primitive::for_parameter(parameter),
            });
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::from("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        // Draft 4 rejects an empty `required` array.
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::from(required));
        }

        let schema = CompiledSchema::compile(Value::Object(schema), None)
            .map_err(|e| format!("{location} parameters: {e}"))?;
        Ok(Self {
            location,
            params,
            schema,
        })
    }

    pub(crate) fn location(&self) -> In {
        self.location
    }

    /// Every raw field passes through; declared ones are coerced in place,
    /// then the whole mapping is validated at once. No defaults are filled in.
    pub(crate) fn check(&self, data: &HashMap<String, String>) -> Result<Map<String, Value>> {
        let mut fields = string_fields(data);

        for param in &self.params {
            let Some((key, raw)) = self.lookup(data, &param.name) else {
                continue;
            };
            if key != param.name {
                if let Some(value) = fields.remove(key) {
                    fields.insert(param.name.clone(), value);
                }
            }
            if let Some(value) = param.coercion.as_ref().and_then(|c| c.coerce(raw)) {
                fields.insert(param.name.clone(), value);
            }
        }

        let instance = Value::Object(fields);
        self.schema
            .check(&instance)
            .map_err(|message| SwaggerError::ParameterValidation {
                location: self.location,
                message,
            })?;

        Ok(match instance {
            Value::Object(fields) => fields,
            _ => Map::new(),
        })
    }

    fn lookup<'a>(&self, data: &'a HashMap<String, String>, name: &str) -> Option<(&'a str, &'a str)> {
        if let Some((key, value)) = data.get_key_value(name) {
            return Some((key.as_str(), value.as_str()));
        }
        if self.location != In::Header {
            return None;
        }
        data.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

fn property_schema(parameter: &Parameter) -> Value {
    let mut schema = Map::new();
    match parameter.type_name() {
        // `file` only exists in swagger, not in JSON-Schema.
        Some("file") | None => {}
        Some(type_name) => {
            schema.insert("type".to_string(), Value::from(type_name));
        }
    }
    if let Some(format) = &parameter.format {
        schema.insert("format".to_string(), Value::from(format.as_str()));
    }
    for keyword in PARAMETER_KEYWORDS {
        if let Some(value) = parameter.keywords.get(keyword) {
            schema.insert(keyword.to_string(), value.clone());
        }
    }
    Value::Object(schema)
}

fn string_fields(data: &HashMap<String, String>) -> Map<String, Value> {
    data.iter()
        .map(|(key, value)| (key.clone(), Value::from(value.as_str())))
        .collect()
}
