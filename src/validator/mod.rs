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

mod coerce;
mod coerce_test;
mod params;
mod response;

pub use coerce::{coerce_boolean, coerce_integer, coerce_number, Primitive, FALSY, TRUTHY};

use crate::error::{Result, SwaggerError};
use crate::model::parse::{In, Operation, Parameter, PathItem};
use crate::model::resolve::graft_definitions;
use crate::request::RequestParams;
use jsonschema::Validator;
use params::{BodyPlan, LocationPlan};
use response::ResponsePlan;
use serde_json::map::Entry;
use serde_json::{Map, Value};
use std::fmt;

/// A Draft 4 schema compiled once and reused for every request.
/// `format` is annotation only and never rejects a value.
pub struct CompiledSchema {
    raw: Value,
    validator: Validator,
}

impl CompiledSchema {
    pub fn compile(schema: Value, definitions: Option<&Value>) -> Result<Self, String> {
        let raw = graft_definitions(schema, definitions);
        let validator = jsonschema::draft4::options()
            .should_validate_formats(false)
            .build(&raw)
            .map_err(|e| e.to_string())?;
        Ok(Self { raw, validator })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Fills declared defaults into `instance`, then validates it.
    pub fn validate(&self, instance: &mut Value) -> Result<(), String> {
        apply_defaults(&self.raw, instance);
        self.check(instance)
    }

    /// Validates without touching the instance. Reports the first violation only.
    pub fn check(&self, instance: &Value) -> Result<(), String> {
        self.validator.validate(instance).map_err(|error| {
            let location = error.instance_path.to_string();
            if location.is_empty() {
                error.to_string()
            } else {
                format!("{location}: {error}")
            }
        })
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("raw", &self.raw)
            .finish()
    }
}

/// Inserts `default` values of absent object properties, recursing through
/// present properties, array `items` and `allOf` branches.
pub fn apply_defaults(schema: &Value, instance: &mut Value) {
    let Some(schema) = schema.as_object() else {
        return;
    };

    if let (Some(Value::Object(properties)), Value::Object(fields)) =
        (schema.get("properties"), &mut *instance)
    {
        for (name, property) in properties {
            match fields.entry(name.clone()) {
                Entry::Occupied(mut field) => apply_defaults(property, field.get_mut()),
                Entry::Vacant(field) => {
                    if let Some(default) = property.get("default") {
                        field.insert(default.clone());
                    }
                }
            }
        }
    }

    if let (Some(items), Value::Array(elements)) = (schema.get("items"), &mut *instance) {
        if items.is_object() {
            for element in elements {
                apply_defaults(items, element);
            }
        }
    }

    if let Some(Value::Array(branches)) = schema.get("allOf") {
        for branch in branches {
            apply_defaults(branch, instance);
        }
    }
}

/// Everything needed to validate one method of one resource.
#[derive(Debug)]
pub struct OperationPlan {
    body: Option<BodyPlan>,
    locations: Vec<LocationPlan>,
    responses: Option<ResponsePlan>,
}

impl OperationPlan {
    /// Path-item parameters come first, then operation parameters. Names
    /// declared at both levels are kept twice; the later declaration wins.
    pub fn compile(
        item: &PathItem,
        operation: Option<&Operation>,
        definitions: Option<&Value>,
    ) -> Result<Self, String> {
        let parameters: Vec<&Parameter> = item
            .parameters
            .iter()
            .chain(operation.into_iter().flat_map(|op| op.parameters.iter()))
            .collect();

        let body = parameters
            .iter()
            .find(|p| p.r#in == In::Body)
            .map(|p| BodyPlan::compile(p, definitions))
            .transpose()?;

        let locations = In::PRIMITIVE
            .into_iter()
            .map(|location| LocationPlan::compile(location, &parameters))
            .collect::<Result<Vec<_>, _>>()?;

        let responses = operation
            .map(|op| ResponsePlan::compile(&op.responses, definitions))
            .transpose()?;

        Ok(Self {
            body,
            locations,
            responses,
        })
    }

    pub fn validate_parameters(&self, request: &RequestParams) -> Result<Map<String, Value>> {
        let mut params = Map::new();

        if let Some(body) = &self.body {
            params.insert("body".to_string(), body.check(request)?);
        }

        for location in &self.locations {
            params.extend(location.check(request.location(location.location()))?);
        }

        Ok(params)
    }

    pub fn validate_response(&self, status: u16, body: &[u8]) -> Result<()> {
        match &self.responses {
            Some(responses) => responses.validate(status, body),
            None => Err(SwaggerError::UnknownResponseCode { status }),
        }
    }
}
