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

use crate::model::parse::Parameter;
use serde_json::{Number, Value};

pub const TRUTHY: [&str; 6] = ["true", "t", "yes", "y", "on", "1"];
pub const FALSY: [&str; 6] = ["false", "f", "no", "n", "off", "0"];

/// Conversion applied to a string-typed transport value before schema validation.
/// Any other declared type, `array` included, keeps the raw string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Integer,
    Number,
    Boolean,
}

impl Primitive {
    pub fn from_type(type_name: &str) -> Option<Self> {
        match type_name {
            "integer" => Some(Primitive::Integer),
            "number" => Some(Primitive::Number),
            "boolean" => Some(Primitive::Boolean),
            _ => None,
        }
    }

    pub fn for_parameter(parameter: &Parameter) -> Option<Self> {
        parameter.type_name().and_then(Primitive::from_type)
    }

    /// `None` means the raw value could not be converted and stays a string;
    /// schema validation then decides whether that is acceptable.
    pub fn coerce(&self, raw: &str) -> Option<Value> {
        match self {
            Primitive::Integer => coerce_integer(raw),
            Primitive::Number => coerce_number(raw),
            Primitive::Boolean => coerce_boolean(raw),
        }
    }
}

pub fn coerce_integer(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .map(Value::from)
        .or_else(|_| trimmed.parse::<u64>().map(Value::from))
        .ok()
}

pub fn coerce_number(raw: &str) -> Option<Value> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

pub fn coerce_boolean(raw: &str) -> Option<Value> {
    let lowered = raw.to_lowercase();
    if TRUTHY.contains(&lowered.as_str()) {
        Some(Value::Bool(true))
    } else if FALSY.contains(&lowered.as_str()) {
        Some(Value::Bool(false))
    } else {
        None
    }
}
