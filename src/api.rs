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

use crate::config::SwaggerConfig;
use crate::error::{Result, SwaggerError};
use crate::model::index::SpecIndex;
use crate::model::{load, parse, resolve};
use crate::observability::{Stage, ValidationMetrics};
use crate::request::RequestParams;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Loaded swagger document plus the index validation runs against.
///
/// Built once at startup and shared read-only between request handlers;
/// adapters hold it in an `Arc`.
#[derive(Debug)]
pub struct SwaggerApi {
    config: SwaggerConfig,
    spec: Arc<str>,
    index: SpecIndex,
}

impl SwaggerApi {
    /// Fetches `config.spec_url`, then builds the index. Any failure here is fatal.
    pub async fn load(config: SwaggerConfig) -> Result<Self> {
        let contents = load::fetch(&config.spec_url)
            .await
            .map_err(|e| SwaggerError::schema_load(&config.spec_url, e))?;
        Self::from_spec(contents, config)
    }

    /// Builds from an already fetched document; `config.spec_url` is only used in errors.
    pub fn from_spec(contents: impl Into<String>, config: SwaggerConfig) -> Result<Self> {
        let contents: String = contents.into();
        let document = parse::parse_document(&contents)
            .and_then(|document| resolve::resolve_refs(&document))
            .map_err(|e| SwaggerError::schema_load(&config.spec_url, e))?;
        let index = SpecIndex::build(&document, config.resource_module.as_deref())?;

        log::info!(
            "loaded swagger spec from '{}' with {} validated resources",
            config.spec_url,
            index.len()
        );

        Ok(Self {
            config,
            spec: contents.into(),
            index,
        })
    }

    pub fn config(&self) -> &SwaggerConfig {
        &self.config
    }

    pub fn index(&self) -> &SpecIndex {
        &self.index
    }

    /// The document as loaded, before dereferencing.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    pub fn spec_content_type(&self) -> &'static str {
        if self.spec.trim_start().starts_with('{') {
            "application/json"
        } else {
            "application/yaml"
        }
    }

    pub fn docs_path(&self) -> Option<String> {
        self.config.docs_path()
    }

    pub fn validates_responses(&self) -> bool {
        self.config.validate_responses
    }

    pub fn body_limit(&self) -> usize {
        self.config.body_limit
    }

    /// Validates and coerces the parameters of a request handled by `resource_id`.
    ///
    /// The result holds every raw path, query, header and form field, with
    /// declared ones coerced, plus the validated body under `body`.
    pub fn validate_parameters(
        &self,
        resource_id: &str,
        request: &RequestParams,
    ) -> Result<Map<String, Value>> {
        let metrics = ValidationMetrics::new(resource_id, &request.method, Stage::Request);
        let outcome = self
            .index
            .plan(resource_id, &request.method)
            .validate_parameters(request);
        metrics.record(outcome)
    }

    /// Checks a produced response against the declared one for `status`.
    ///
    /// A no-op when response validation is disabled or the resource is not in the index.
    pub fn validate_response(
        &self,
        resource_id: &str,
        method: &str,
        status: u16,
        body: &[u8],
    ) -> Result<()> {
        if !self.config.validate_responses {
            return Ok(());
        }
        let Some(indexed) = self.index.get(resource_id) else {
            return Ok(());
        };
        let metrics = ValidationMetrics::new(resource_id, method, Stage::Response);
        metrics.record(indexed.plan(method).validate_response(status, body))
    }
}
