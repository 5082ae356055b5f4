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

#[cfg(feature = "actix-web")]
pub mod actix_web;
#[cfg(feature = "axum")]
pub mod axum;

use crate::model::parse::In;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::ops::Deref;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Inbound request data as the validator sees it. All transport values are strings.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    pub method: String,
    pub path: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub form: HashMap<String, String>,
    pub json: Option<Value>,
}

impl RequestParams {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Default::default()
        }
    }

    pub fn with_path(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_query_string(mut self, query_string: &str) -> Self {
        self.query = parse_pairs(query_string);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_form(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }

    pub fn with_json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    /// Raw data of a location. The body location falls back to the form fields.
    pub fn location(&self, location: In) -> &HashMap<String, String> {
        match location {
            In::Path => &self.path,
            In::Query => &self.query,
            In::Header => &self.headers,
            In::Form | In::Body => &self.form,
        }
    }

    /// Fills `form` or `json` from a buffered request body according to its content type.
    pub fn with_body(mut self, content_type: Option<&str>, body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.is_empty() {
            return Ok(self);
        }
        let mime = content_type
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default();
        if mime == FORM_CONTENT_TYPE {
            self.form = parse_pairs(&String::from_utf8_lossy(body));
        } else if mime.ends_with("json") {
            self.json = Some(serde_json::from_slice(body)?);
        }
        Ok(self)
    }
}

/// Coerced parameters of a validated request, as handed to handlers by the adapters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedParams(pub Map<String, Value>);

impl ValidatedParams {
    pub fn body(&self) -> Option<&Value> {
        self.0.get("body")
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Deref for ValidatedParams {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Decodes `application/x-www-form-urlencoded` pairs. The first value of a repeated key wins.
pub fn parse_pairs(input: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
        pairs.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_pairs_keeps_first_value() {
        let pairs = parse_pairs("tag=a&limit=10&tag=b&name=big%20dog");
        assert_eq!(pairs.get("tag").map(String::as_str), Some("a"));
        assert_eq!(pairs.get("limit").map(String::as_str), Some("10"));
        assert_eq!(pairs.get("name").map(String::as_str), Some("big dog"));
    }

    #[test]
    fn test_body_by_content_type() {
        let request = RequestParams::new("post")
            .with_body(Some("application/json; charset=utf-8"), br#"{"name":"x"}"#)
            .unwrap();
        assert_eq!(request.json, Some(json!({"name": "x"})));
        assert!(request.form.is_empty());

        let request = RequestParams::new("post")
            .with_body(Some(FORM_CONTENT_TYPE), b"name=x&age=3")
            .unwrap();
        assert!(request.json.is_none());
        assert_eq!(request.form.get("age").map(String::as_str), Some("3"));

        assert!(RequestParams::new("post")
            .with_body(Some("application/json"), b"{not json")
            .is_err());
    }
}
