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

//! Flatten a request object tree into wire parameters.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::field::Element;
use crate::field::Field;
use crate::field::FieldValue;
use crate::field::RequestObject;
use crate::Error;
use crate::Result;

/// Flat mapping of wire keys to string values.
///
/// Keys are unique and kept sorted, so iteration order never depends on how
/// the set was built. Inserting an existing key overwrites its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet(BTreeMap<String, String>);

impl ParameterSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, returning the previous value of `key` if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for ParameterSet {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut set = ParameterSet::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for ParameterSet {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Flatten `root` into a [`ParameterSet`], prefixing every key with `prefix`.
///
/// - Absent fields and null list elements contribute nothing. A null element
///   still occupies its index, later elements are not renumbered.
/// - Nested objects are keyed `{prefix}{name}.{child}`. An object whose
///   descriptor has an empty name adds no segment, its children are keyed
///   `{prefix}{child}` as if they were fields of the parent.
/// - List elements are keyed `{name}.{i+1}` in `Filter` mode and `{name}[{i}]`
///   in `Array` mode, object elements get a trailing `.` and are recursed into.
/// - A scalar without descriptor takes the prefix itself as its key and is
///   dropped when there is none.
///
/// Returns a [`Mapping`](crate::ErrorKind::Mapping) error when a nested
/// object or a non-empty list has no descriptor.
pub fn flatten(root: &dyn RequestObject, prefix: &str) -> Result<ParameterSet> {
    let mut params = ParameterSet::new();
    walk(root, prefix, &mut params)?;
    Ok(params)
}

fn walk(node: &dyn RequestObject, prefix: &str, params: &mut ParameterSet) -> Result<()> {
    for field in node.fields() {
        let Field { descriptor, value } = field;
        let Some(value) = value else {
            continue;
        };

        match value {
            FieldValue::Scalar(scalar) => {
                let key = match descriptor {
                    Some(d) => format!("{prefix}{}", d.wire_name),
                    None => prefix.to_string(),
                };
                if key.is_empty() {
                    log::debug!("dropping scalar field without wire name: {scalar:?}");
                    continue;
                }

                log::trace!("flatten emit {key}={scalar}");
                params.insert(key, scalar.to_string());
            }
            FieldValue::List(elements) => {
                if elements.is_empty() {
                    continue;
                }
                let descriptor = descriptor.ok_or_else(|| {
                    Error::mapping(format!(
                        "list field under prefix '{prefix}' has {} elements but no field descriptor",
                        elements.len()
                    ))
                })?;

                for (i, element) in elements.into_iter().enumerate() {
                    match element {
                        Element::Null => continue,
                        Element::Scalar(scalar) => {
                            let key = descriptor.element_key(prefix, i);
                            log::trace!("flatten emit {key}={scalar}");
                            params.insert(key, scalar.to_string());
                        }
                        Element::Object(obj) => {
                            let child = format!("{}.", descriptor.element_key(prefix, i));
                            walk(obj, &child, params)?;
                        }
                    }
                }
            }
            FieldValue::Object(obj) => {
                let descriptor = descriptor.ok_or_else(|| {
                    Error::mapping(format!(
                        "object field under prefix '{prefix}' has no field descriptor"
                    ))
                })?;

                // An unnamed object shares the key space of its parent.
                let child = if descriptor.wire_name.is_empty() {
                    prefix.to_string()
                } else {
                    format!("{prefix}{}.", descriptor.wire_name)
                };
                walk(obj, &child, params)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Decimal;
    use crate::field::FieldDescriptor;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    fn params(pairs: &[(&str, &str)]) -> ParameterSet {
        pairs.iter().copied().collect()
    }

    struct Simple {
        test_int: Option<i32>,
        test_str_list: Option<Vec<String>>,
    }

    impl RequestObject for Simple {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::scalar(FieldDescriptor::new("testInt"), &self.test_int),
                Field::scalars(
                    FieldDescriptor::array("testStrList"),
                    self.test_str_list.as_ref(),
                ),
            ]
        }
    }

    struct Second {
        value: Option<String>,
    }

    impl RequestObject for Second {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![Field::scalar(FieldDescriptor::new("str"), &self.value)]
        }
    }

    struct Outer {
        second: Option<Second>,
    }

    impl RequestObject for Outer {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![Field::object(FieldDescriptor::new("second"), self.second.as_ref())]
        }
    }

    struct Filter {
        name: String,
        values: Vec<Option<String>>,
    }

    impl RequestObject for Filter {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::scalar(FieldDescriptor::new("Name"), &self.name),
                Field::scalars(FieldDescriptor::new("Value"), Some(&self.values)),
            ]
        }
    }

    struct DescribeInstances {
        filters: Vec<Option<Filter>>,
        tags: Vec<Filter>,
        max_results: i64,
        price: Option<Decimal>,
        dry_run: bool,
    }

    impl RequestObject for DescribeInstances {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::nullable_objects(FieldDescriptor::new("Filter"), Some(&self.filters)),
                Field::objects(FieldDescriptor::array("Tag"), Some(&self.tags)),
                Field::scalar(FieldDescriptor::new("MaxResults"), &self.max_results),
                Field::scalar(FieldDescriptor::new("Price"), &self.price),
                Field::scalar(FieldDescriptor::new("DryRun"), &self.dry_run),
            ]
        }
    }

    #[test]
    fn test_flatten_array_scalars() {
        let _ = env_logger::builder().is_test(true).try_init();

        let obj = Simple {
            test_int: Some(1),
            test_str_list: Some(vec!["3".to_string(), "4".to_string()]),
        };

        let got = flatten(&obj, "").unwrap();
        assert_eq!(
            got,
            params(&[
                ("testInt", "1"),
                ("testStrList[0]", "3"),
                ("testStrList[1]", "4"),
            ])
        );
    }

    #[test]
    fn test_flatten_filter_scalars() {
        let obj = Filter {
            name: "instance-type".to_string(),
            values: vec![Some("S6".to_string()), Some("N3".to_string())],
        };

        let got = flatten(&obj, "").unwrap();
        assert_eq!(
            got,
            params(&[("Name", "instance-type"), ("Value.1", "S6"), ("Value.2", "N3")])
        );
    }

    #[test]
    fn test_flatten_nested_object() {
        let obj = Outer {
            second: Some(Second {
                value: Some("x".to_string()),
            }),
        };

        assert_eq!(flatten(&obj, "").unwrap(), params(&[("second.str", "x")]));
    }

    struct Inline {
        second: Second,
        name: String,
    }

    impl RequestObject for Inline {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::object(FieldDescriptor::new(""), Some(&self.second)),
                Field::scalar(FieldDescriptor::new("name"), &self.name),
            ]
        }
    }

    #[test]
    fn test_flatten_unnamed_object_shares_parent_keys() {
        let obj = Inline {
            second: Second {
                value: Some("x".to_string()),
            },
            name: "n".to_string(),
        };

        assert_eq!(
            flatten(&obj, "").unwrap(),
            params(&[("name", "n"), ("str", "x")])
        );
        assert_eq!(
            flatten(&obj, "Instance.").unwrap(),
            params(&[("Instance.name", "n"), ("Instance.str", "x")])
        );
    }

    #[test]
    fn test_flatten_with_prefix() {
        let obj = Outer {
            second: Some(Second {
                value: Some("x".to_string()),
            }),
        };

        assert_eq!(
            flatten(&obj, "Instance.").unwrap(),
            params(&[("Instance.second.str", "x")])
        );
    }

    #[test]
    fn test_flatten_skips_absent_values() {
        let obj = Outer {
            second: Some(Second { value: None }),
        };
        assert!(flatten(&obj, "").unwrap().is_empty());

        let obj = Simple {
            test_int: None,
            test_str_list: Some(vec![]),
        };
        assert!(flatten(&obj, "").unwrap().is_empty());
    }

    #[test]
    fn test_flatten_object_lists() {
        let obj = DescribeInstances {
            filters: vec![
                Some(Filter {
                    name: "vpc-id".to_string(),
                    values: vec![Some("vpc-1".to_string())],
                }),
                None,
                Some(Filter {
                    name: "subnet-id".to_string(),
                    values: vec![None, Some("subnet-2".to_string())],
                }),
            ],
            tags: vec![
                Filter {
                    name: "env".to_string(),
                    values: vec![Some("prod".to_string())],
                },
                Filter {
                    name: "team".to_string(),
                    values: vec![],
                },
            ],
            max_results: 100,
            price: Some("0.35".parse().unwrap()),
            dry_run: false,
        };

        let got = flatten(&obj, "").unwrap();
        assert_eq!(
            got,
            params(&[
                ("DryRun", "false"),
                ("Filter.1.Name", "vpc-id"),
                ("Filter.1.Value.1", "vpc-1"),
                ("Filter.3.Name", "subnet-id"),
                ("Filter.3.Value.2", "subnet-2"),
                ("MaxResults", "100"),
                ("Price", "0.35"),
                ("Tag[0].Name", "env"),
                ("Tag[0].Value.1", "prod"),
                ("Tag[1].Name", "team"),
            ])
        );
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let obj = Simple {
            test_int: Some(7),
            test_str_list: Some(vec!["a".to_string()]),
        };

        assert_eq!(flatten(&obj, "").unwrap(), flatten(&obj, "").unwrap());
    }

    struct Wrapper {
        inner: Option<Second>,
        value: Option<String>,
    }

    impl RequestObject for Wrapper {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::untagged_scalar(&self.value),
                Field::object(FieldDescriptor::new(""), self.inner.as_ref()),
            ]
        }
    }

    struct Holder {
        wrapper: Wrapper,
    }

    impl RequestObject for Holder {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![Field::object(FieldDescriptor::new("Holder"), Some(&self.wrapper))]
        }
    }

    #[test]
    fn test_flatten_untagged_scalar_takes_prefix() {
        let obj = Holder {
            wrapper: Wrapper {
                inner: Some(Second {
                    value: Some("y".to_string()),
                }),
                value: Some("whole".to_string()),
            },
        };

        assert_eq!(
            flatten(&obj, "").unwrap(),
            params(&[("Holder.", "whole"), ("Holder.str", "y")])
        );
    }

    #[test]
    fn test_flatten_untagged_scalar_without_prefix_is_dropped() {
        let obj = Wrapper {
            inner: None,
            value: Some("lost".to_string()),
        };

        assert!(flatten(&obj, "").unwrap().is_empty());
    }

    struct Untagged {
        list: Vec<i32>,
        object: Option<Second>,
    }

    impl RequestObject for Untagged {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::new(
                    None,
                    Some(FieldValue::List(
                        self.list
                            .iter()
                            .map(|v| Element::Scalar(crate::field::Scalar::Int(*v)))
                            .collect(),
                    )),
                ),
                Field::new(
                    None,
                    self.object
                        .as_ref()
                        .map(|v| FieldValue::Object(v as &dyn RequestObject)),
                ),
            ]
        }
    }

    #[test]
    fn test_flatten_untagged_list_fails() {
        let obj = Untagged {
            list: vec![1],
            object: None,
        };

        let err = flatten(&obj, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Mapping);
    }

    #[test]
    fn test_flatten_untagged_empty_list_is_ignored() {
        let obj = Untagged {
            list: vec![],
            object: None,
        };

        assert!(flatten(&obj, "").unwrap().is_empty());
    }

    #[test]
    fn test_flatten_untagged_object_fails() {
        let obj = Untagged {
            list: vec![],
            object: Some(Second { value: None }),
        };

        let err = flatten(&obj, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Mapping);
    }

    #[test]
    fn test_parameter_set_last_write_wins() {
        let mut set = ParameterSet::new();
        assert_eq!(set.insert("b", "1"), None);
        assert_eq!(set.insert("a", "2"), None);
        assert_eq!(set.insert("b", "3"), Some("1".to_string()));

        let keys: Vec<_> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(set.get("b"), Some("3"));
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"{"a":"2","b":"3"}"#);
    }
}
