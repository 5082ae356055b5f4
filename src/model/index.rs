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

use crate::error::{Result, SwaggerError};
use crate::model::parse::{Method, PathItem, RESOURCE_EXTENSION};
use crate::validator::OperationPlan;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

/// A path-item owned by a resource, with its validation plans compiled.
#[derive(Debug)]
pub struct IndexedPath {
    pub path: String,
    pub item: PathItem,
    operations: HashMap<Method, OperationPlan>,
    /// Used for methods the path-item does not declare: path-level parameters only.
    undeclared: OperationPlan,
}

impl IndexedPath {
    fn compile(path: &str, item: PathItem, definitions: Option<&Value>) -> Result<Self> {
        let invalid = |e: String| SwaggerError::InvalidSpec(format!("path '{path}': {e}"));

        let mut operations = HashMap::new();
        for (method, operation) in item.operations() {
            let plan = OperationPlan::compile(&item, Some(operation), definitions)
                .map_err(|e| invalid(format!("{method}: {e}")))?;
            operations.insert(method, plan);
        }
        let undeclared = OperationPlan::compile(&item, None, definitions).map_err(invalid)?;

        Ok(Self {
            path: path.to_string(),
            item,
            operations,
            undeclared,
        })
    }

    /// Method names are matched case-insensitively.
    pub fn plan(&self, method: &str) -> &OperationPlan {
        Method::from_str(method)
            .ok()
            .and_then(|method| self.operations.get(&method))
            .unwrap_or(&self.undeclared)
    }
}

/// Resource identifier to path-item lookup, built once from a dereferenced document.
#[derive(Debug)]
pub struct SpecIndex {
    resources: HashMap<String, IndexedPath>,
    /// Stands in for resources the document does not mention.
    unvalidated: OperationPlan,
}

impl SpecIndex {
    /// Indexes every path-item carrying `x-resource`, qualified with
    /// `resource_module` when one is given. Path-items without it are skipped.
    ///
    /// Two path-items naming the same resource do not fail the build: the later
    /// one in document order replaces the earlier one.
    pub fn build(document: &Value, resource_module: Option<&str>) -> Result<Self> {
        let paths = document
            .get("paths")
            .and_then(Value::as_object)
            .ok_or_else(|| SwaggerError::InvalidSpec("'paths' must be a mapping".to_string()))?;
        let definitions = document.get("definitions");

        let mut resources: HashMap<String, IndexedPath> = HashMap::new();
        for (path, spec) in paths {
            let Some(resource) = spec
                .get(RESOURCE_EXTENSION)
                .and_then(Value::as_str)
                .filter(|r| !r.is_empty())
            else {
                log::debug!("path '{path}' has no {RESOURCE_EXTENSION}, requests to it are not validated");
                continue;
            };

            let item: PathItem = serde_json::from_value(spec.clone())
                .map_err(|e| SwaggerError::InvalidSpec(format!("path '{path}': {e}")))?;
            let resource_id = qualify(resource_module, resource);
            let indexed = IndexedPath::compile(path, item, definitions)?;

            log::debug!("indexed path '{path}' for resource '{resource_id}'");
            if let Some(previous) = resources.insert(resource_id.clone(), indexed) {
                log::warn!(
                    "resource '{resource_id}' is claimed by '{}' and '{path}', only '{path}' is validated",
                    previous.path
                );
            }
        }

        let unvalidated = OperationPlan::compile(&PathItem::default(), None, None)
            .map_err(SwaggerError::InvalidSpec)?;

        Ok(Self {
            resources,
            unvalidated,
        })
    }

    pub fn get(&self, resource_id: &str) -> Option<&IndexedPath> {
        self.resources.get(resource_id)
    }

    pub fn contains(&self, resource_id: &str) -> bool {
        self.resources.contains_key(resource_id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn resource_ids(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Plan for `method` on `resource_id`; unknown resources get a plan declaring nothing.
    pub fn plan(&self, resource_id: &str, method: &str) -> &OperationPlan {
        self.get(resource_id)
            .map(|indexed| indexed.plan(method))
            .unwrap_or(&self.unvalidated)
    }
}

pub fn qualify(resource_module: Option<&str>, resource: &str) -> String {
    match resource_module.filter(|prefix| !prefix.is_empty()) {
        Some(prefix) => format!("{prefix}.{resource}"),
        None => resource.to_string(),
    }
}
