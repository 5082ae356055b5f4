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

use serde::{Deserialize, Deserializer};

pub const DEFAULT_DOCS_PREFIX: &str = "/_docs";
pub const DOCS_FILE_NAME: &str = "swagger.yaml";
/// `serve_docs` value that turns the docs endpoint off.
pub const DOCS_DISABLED: &str = "none";
/// Largest request or response body buffered for validation, in bytes.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct SwaggerConfig {
    /// URL or filesystem path of the swagger document.
    pub spec_url: String,
    /// Prefix joined with `.` to every `x-resource` value.
    #[serde(default)]
    pub resource_module: Option<String>,
    #[serde(default = "default_validate_responses")]
    pub validate_responses: bool,
    #[serde(
        default = "default_serve_docs",
        deserialize_with = "deserialize_serve_docs"
    )]
    pub serve_docs: Option<String>,
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

fn default_validate_responses() -> bool {
    true
}

fn default_body_limit() -> usize {
    DEFAULT_BODY_LIMIT
}

fn default_serve_docs() -> Option<String> {
    Some(DEFAULT_DOCS_PREFIX.to_string())
}

fn deserialize_serve_docs<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(docs_prefix))
}

fn docs_prefix(value: String) -> Option<String> {
    if value.eq_ignore_ascii_case(DOCS_DISABLED) {
        None
    } else {
        Some(value)
    }
}

impl SwaggerConfig {
    pub fn new(spec_url: impl Into<String>) -> Self {
        Self {
            spec_url: spec_url.into(),
            resource_module: None,
            validate_responses: default_validate_responses(),
            serve_docs: default_serve_docs(),
            body_limit: default_body_limit(),
        }
    }

    pub fn yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    pub fn with_resource_module(mut self, resource_module: impl Into<String>) -> Self {
        self.resource_module = Some(resource_module.into());
        self
    }

    pub fn with_validate_responses(mut self, validate_responses: bool) -> Self {
        self.validate_responses = validate_responses;
        self
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    /// `"none"` disables the docs endpoint.
    pub fn with_serve_docs(mut self, prefix: impl Into<String>) -> Self {
        self.serve_docs = docs_prefix(prefix.into());
        self
    }

    /// Path the raw spec is served at, if enabled.
    pub fn docs_path(&self) -> Option<String> {
        self.serve_docs
            .as_deref()
            .map(|prefix| format!("{}/{DOCS_FILE_NAME}", prefix.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SwaggerConfig::yaml("spec_url: api.yaml").unwrap();
        assert_eq!(config.spec_url, "api.yaml");
        assert!(config.resource_module.is_none());
        assert!(config.validate_responses);
        assert_eq!(config.docs_path().as_deref(), Some("/_docs/swagger.yaml"));
        assert_eq!(config.body_limit, DEFAULT_BODY_LIMIT);
    }

    #[test]
    fn test_serve_docs_sentinel() {
        let config = SwaggerConfig::yaml("spec_url: api.yaml\nserve_docs: None").unwrap();
        assert!(config.serve_docs.is_none());
        assert!(config.docs_path().is_none());

        let config = SwaggerConfig::new("api.yaml").with_serve_docs("/api/docs/");
        assert_eq!(config.docs_path().as_deref(), Some("/api/docs/swagger.yaml"));
        assert!(SwaggerConfig::new("api.yaml")
            .with_serve_docs("none")
            .docs_path()
            .is_none());
    }

    #[test]
    fn test_full_config() {
        let config = SwaggerConfig::yaml(
            r#"
spec_url: file:///etc/service/swagger.yaml
resource_module: service.resources
validate_responses: false
serve_docs: /meta
body_limit: 65536
"#,
        )
        .unwrap();
        assert_eq!(config.resource_module.as_deref(), Some("service.resources"));
        assert!(!config.validate_responses);
        assert_eq!(config.docs_path().as_deref(), Some("/meta/swagger.yaml"));
        assert_eq!(config.body_limit, 65536);
    }
}
