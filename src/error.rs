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

use crate::model::parse::In;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwaggerError {
    #[error("failed to load swagger spec from '{url}': {source:#}")]
    SchemaLoad {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid swagger spec: {0}")]
    InvalidSpec(String),

    #[error("Unknown response code {status}")]
    UnknownResponseCode { status: u16 },

    #[error("invalid {location} parameters: {message}")]
    ParameterValidation { location: In, message: String },

    #[error("response with status {status} violates the declared schema: {message}")]
    ResponseValidation { status: u16, message: String },
}

impl SwaggerError {
    pub fn schema_load(url: impl Into<String>, source: anyhow::Error) -> Self {
        SwaggerError::SchemaLoad {
            url: url.into(),
            source,
        }
    }

    /// Short machine-readable name, used as the `error` field of adapter responses.
    pub fn kind(&self) -> &'static str {
        match self {
            SwaggerError::SchemaLoad { .. } => "schema_load_failure",
            SwaggerError::InvalidSpec(_) => "invalid_spec",
            SwaggerError::UnknownResponseCode { .. } => "unknown_response_code",
            SwaggerError::ParameterValidation { .. } => "parameter_validation",
            SwaggerError::ResponseValidation { .. } => "response_validation",
        }
    }

    /// Whether the client is at fault. Response-side failures are contract bugs of the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SwaggerError::ParameterValidation { .. })
    }
}

pub type Result<T, E = SwaggerError> = std::result::Result<T, E>;
