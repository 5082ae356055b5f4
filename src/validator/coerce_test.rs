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

#[cfg(test)]
mod tests {
    use crate::validator::{coerce_boolean, coerce_integer, coerce_number, Primitive, FALSY, TRUTHY};
    use serde_json::{json, Value};

    #[test]
    fn test_truthy_values_any_case() {
        for value in TRUTHY {
            assert_eq!(coerce_boolean(value), Some(Value::Bool(true)), "{value}");
            assert_eq!(
                coerce_boolean(&value.to_uppercase()),
                Some(Value::Bool(true)),
                "{value}"
            );
        }
        assert_eq!(coerce_boolean("YeS"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_falsy_values_any_case() {
        for value in FALSY {
            assert_eq!(coerce_boolean(value), Some(Value::Bool(false)), "{value}");
            assert_eq!(
                coerce_boolean(&value.to_uppercase()),
                Some(Value::Bool(false)),
                "{value}"
            );
        }
        assert_eq!(coerce_boolean("Off"), Some(Value::Bool(false)));
    }

    #[test]
    fn test_other_strings_are_not_booleans() {
        for value in ["", "maybe", "2", "truee", " true", "nope"] {
            assert_eq!(coerce_boolean(value), None, "{value:?}");
        }
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(coerce_integer("42"), Some(json!(42)));
        assert_eq!(coerce_integer("-7"), Some(json!(-7)));
        assert_eq!(coerce_integer(" 12 "), Some(json!(12)));
        assert_eq!(coerce_integer("18446744073709551615"), Some(json!(u64::MAX)));
        assert_eq!(coerce_integer("abc"), None);
        assert_eq!(coerce_integer("4.2"), None);
        assert_eq!(coerce_integer(""), None);
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(coerce_number("1.5"), Some(json!(1.5)));
        assert_eq!(coerce_number("3"), Some(json!(3.0)));
        assert_eq!(coerce_number("-2e3"), Some(json!(-2000.0)));
        assert_eq!(coerce_number("inf"), None);
        assert_eq!(coerce_number("NaN"), None);
        assert_eq!(coerce_number("one"), None);
    }

    #[test]
    fn test_primitive_from_type() {
        assert_eq!(Primitive::from_type("integer"), Some(Primitive::Integer));
        assert_eq!(Primitive::from_type("number"), Some(Primitive::Number));
        assert_eq!(Primitive::from_type("boolean"), Some(Primitive::Boolean));
        assert_eq!(Primitive::from_type("string"), None);
        assert_eq!(Primitive::from_type("array"), None);
    }
}
