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

use anyhow::{anyhow, bail, Result};
use serde_json::{Map, Value};

const REF: &str = "$ref";

/// Replaces local JSON references (`{"$ref": "#/..."}`) by copies of their targets.
///
/// A reference met again while its own target is being expanded is circular.
/// It stays in place as a `$ref`, which is why [`graft_definitions`] exists.
pub fn resolve_refs(document: &Value) -> Result<Value> {
    let mut stack = Vec::new();
    resolve(document, document, &mut stack)
}

fn resolve(root: &Value, node: &Value, stack: &mut Vec<String>) -> Result<Value> {
    match node {
        Value::Object(map) => {
            if let Some(reference) = map.get(REF).and_then(Value::as_str) {
                return resolve_reference(root, node, reference, stack);
            }
            let mut resolved = Map::with_capacity(map.len());
            for (key, value) in map {
                resolved.insert(key.clone(), resolve(root, value, stack)?);
            }
            Ok(Value::Object(resolved))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| resolve(root, item, stack))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

fn resolve_reference(
    root: &Value,
    node: &Value,
    reference: &str,
    stack: &mut Vec<String>,
) -> Result<Value> {
    let Some(pointer) = reference.strip_prefix('#') else {
        bail!("external reference '{reference}' is not supported");
    };
    if stack.iter().any(|seen| seen == reference) {
        return Ok(node.clone());
    }
    let target = root
        .pointer(pointer)
        .ok_or_else(|| anyhow!("reference '{reference}' does not point into the document"))?;

    stack.push(reference.to_string());
    let resolved = resolve(root, target, stack);
    stack.pop();
    resolved
}

pub fn contains_ref(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key(REF) || map.values().any(contains_ref),
        Value::Array(items) => items.iter().any(contains_ref),
        _ => false,
    }
}

/// Copies the document's `definitions` into a schema fragment that still holds
/// (circular) references, so `#/definitions/...` resolves against the fragment.
pub fn graft_definitions(fragment: Value, definitions: Option<&Value>) -> Value {
    match (fragment, definitions) {
        (Value::Object(mut schema), Some(definitions))
            if !schema.contains_key("definitions")
                && (schema.contains_key(REF) || schema.values().any(contains_ref)) =>
        {
            schema.insert("definitions".to_string(), definitions.clone());
            Value::Object(schema)
        }
        (fragment, _) => fragment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolves_nested_references() {
        let document = json!({
            "definitions": {
                "Tag": {"type": "string"},
                "Pet": {
                    "type": "object",
                    "properties": {"tag": {"$ref": "#/definitions/Tag"}}
                }
            },
            "paths": {"/pets": {"get": {"responses": {"200": {"schema": {"$ref": "#/definitions/Pet"}}}}}}
        });

        let resolved = resolve_refs(&document).unwrap();
        assert_eq!(
            resolved
                .pointer("/paths/~1pets/get/responses/200/schema/properties/tag")
                .unwrap(),
            &json!({"type": "string"})
        );
        assert!(!contains_ref(&resolved));
    }

    #[test]
    fn test_circular_reference_is_kept() {
        let document = json!({
            "definitions": {
                "Node": {
                    "type": "object",
                    "properties": {"child": {"$ref": "#/definitions/Node"}}
                }
            },
            "root": {"$ref": "#/definitions/Node"}
        });

        let resolved = resolve_refs(&document).unwrap();
        assert_eq!(
            resolved.pointer("/root/properties/child").unwrap(),
            &json!({"$ref": "#/definitions/Node"})
        );

        let grafted = graft_definitions(
            resolved["root"].clone(),
            resolved.get("definitions"),
        );
        assert!(grafted.get("definitions").is_some());
    }

    #[test]
    fn test_dangling_and_external_references_fail() {
        assert!(resolve_refs(&json!({"a": {"$ref": "#/missing"}})).is_err());
        assert!(resolve_refs(&json!({"a": {"$ref": "other.yaml#/Pet"}})).is_err());
    }
}
