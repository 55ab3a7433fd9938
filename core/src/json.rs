// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Render a request object as a nested JSON document.
//!
//! Some endpoints take the request object as an `application/json` body
//! instead of flat parameters. The tree is kept as is, keyed by wire names.

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use crate::field::Element;
use crate::field::Field;
use crate::field::FieldValue;
use crate::field::RequestObject;
use crate::field::Scalar;
use crate::Error;
use crate::Result;

/// Render `root` as a JSON object.
///
/// Untagged scalars are skipped, untagged non-empty lists and untagged
/// objects fail with a [`Mapping`](crate::ErrorKind::Mapping) error.
pub fn to_json(root: &dyn RequestObject) -> Result<Value> {
    object_to_json(root).map(Value::Object)
}

fn object_to_json(node: &dyn RequestObject) -> Result<Map<String, Value>> {
    let mut map = Map::new();

    for Field { descriptor, value } in node.fields() {
        let Some(value) = value else {
            continue;
        };

        let name = match (descriptor, &value) {
            (Some(d), _) if !d.wire_name.is_empty() => d.wire_name,
            (_, FieldValue::Scalar(_)) => continue,
            (_, FieldValue::List(elements)) if elements.is_empty() => continue,
            (_, value) => {
                return Err(Error::mapping(format!(
                    "{} field can't be rendered as json without a wire name",
                    value.shape()
                )))
            }
        };

        let rendered = match value {
            FieldValue::Scalar(scalar) => scalar_to_json(scalar)?,
            FieldValue::List(elements) => Value::Array(
                elements
                    .into_iter()
                    .map(|element| match element {
                        Element::Null => Ok(Value::Null),
                        Element::Scalar(scalar) => scalar_to_json(scalar),
                        Element::Object(obj) => object_to_json(obj).map(Value::Object),
                    })
                    .collect::<Result<_>>()?,
            ),
            FieldValue::Object(obj) => Value::Object(object_to_json(obj)?),
        };
        map.insert(name.to_string(), rendered);
    }

    Ok(map)
}

fn scalar_to_json(scalar: Scalar) -> Result<Value> {
    let v = match scalar {
        Scalar::Int(v) => Value::from(v),
        Scalar::Long(v) => Value::from(v),
        Scalar::Float(v) => float_to_json(f64::from(v))?,
        Scalar::Double(v) => float_to_json(v)?,
        Scalar::Bool(v) => Value::Bool(v),
        Scalar::Decimal(v) => {
            let n: Number = v.as_str().parse().map_err(|e| {
                Error::mapping(format!("decimal {v} is not a json number")).with_source(e)
            })?;
            Value::Number(n)
        }
        Scalar::String(v) => Value::String(v),
        Scalar::Char(v) => Value::String(v.to_string()),
    };
    Ok(v)
}

fn float_to_json(v: f64) -> Result<Value> {
    Number::from_f64(v)
        .map(Value::Number)
        .ok_or_else(|| Error::mapping(format!("non-finite float {v} can't be rendered as json")))
}
