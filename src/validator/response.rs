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

use super::CompiledSchema;
use crate::error::{Result, SwaggerError};
use crate::model::parse::Response;
use serde_json::Value;
use std::collections::HashMap;

/// Declared responses of one operation, keyed by status code string.
/// A `None` schema leaves the body unconstrained.
#[derive(Debug)]
pub(crate) struct ResponsePlan {
    schemas: HashMap<String, Option<CompiledSchema>>,
}

impl ResponsePlan {
    pub(crate) fn compile(
        responses: &HashMap<String, Response>,
        definitions: Option<&Value>,
    ) -> Result<Self, String> {
        let mut schemas = HashMap::with_capacity(responses.len());
        for (status, response) in responses {
            let schema = match &response.schema {
                Some(schema) if !is_file(schema) => Some(
                    CompiledSchema::compile(schema.clone(), definitions)
                        .map_err(|e| format!("response '{status}': {e}"))?,
                ),
                _ => None,
            };
            schemas.insert(status.clone(), schema);
        }
        Ok(Self { schemas })
    }

    pub(crate) fn validate(&self, status: u16, body: &[u8]) -> Result<()> {
        let schema = self
            .schemas
            .get(&status.to_string())
            .ok_or(SwaggerError::UnknownResponseCode { status })?;

        let Some(schema) = schema else {
            return Ok(());
        };

        let value: Value =
            serde_json::from_slice(body).map_err(|e| SwaggerError::ResponseValidation {
                status,
                message: format!("response body is not valid JSON: {e}"),
            })?;

        schema
            .check(&value)
            .map_err(|message| SwaggerError::ResponseValidation { status, message })
    }
}

fn is_file(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("file")
}
