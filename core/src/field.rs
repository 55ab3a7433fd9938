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

//! Serialization metadata for request objects.
//!
//! Request types describe themselves through [`RequestObject::fields`]: an
//! explicit, declaration-ordered list of fields, each optionally tagged with a
//! [`FieldDescriptor`] that names the field on the wire. There is no runtime
//! type inspection, the value shapes form a closed set:
//!
//! - [`Scalar`]: one of the supported leaf types.
//! - a list whose elements are scalars or nested objects.
//! - a nested object implementing [`RequestObject`].
//!
//! ```
//! use ksign_core::field::{Field, FieldDescriptor, RequestObject};
//!
//! struct Placement {
//!     zone: Option<String>,
//! }
//!
//! impl RequestObject for Placement {
//!     fn fields(&self) -> Vec<Field<'_>> {
//!         vec![Field::scalar(FieldDescriptor::new("Zone"), &self.zone)]
//!     }
//! }
//!
//! struct RunInstances {
//!     image_id: String,
//!     security_group_ids: Vec<String>,
//!     placement: Option<Placement>,
//! }
//!
//! impl RequestObject for RunInstances {
//!     fn fields(&self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::scalar(FieldDescriptor::new("ImageId"), &self.image_id),
//!             Field::scalars(
//!                 FieldDescriptor::new("SecurityGroupId"),
//!                 Some(&self.security_group_ids),
//!             ),
//!             Field::object(FieldDescriptor::new("Placement"), self.placement.as_ref()),
//!         ]
//!     }
//! }
//! ```

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::LowerExp;
use std::str::FromStr;

use crate::Error;

/// How repeated values of a list field are keyed on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IndexMode {
    /// Dotted, one-based: `Name.1`, `Name.2`.
    #[default]
    Filter,
    /// Bracketed, zero-based: `Name[0]`, `Name[1]`.
    Array,
}

/// Per-field serialization descriptor, fixed when the request type is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    /// Wire key of this field.
    ///
    /// Empty means the field has no name of its own and is keyed by the
    /// prefix it is reached under.
    pub wire_name: &'static str,
    /// Indexing convention for list values.
    pub index_mode: IndexMode,
}

impl FieldDescriptor {
    /// Descriptor in [`IndexMode::Filter`] mode.
    pub const fn new(wire_name: &'static str) -> Self {
        Self {
            wire_name,
            index_mode: IndexMode::Filter,
        }
    }

    /// Descriptor in [`IndexMode::Array`] mode.
    pub const fn array(wire_name: &'static str) -> Self {
        Self {
            wire_name,
            index_mode: IndexMode::Array,
        }
    }

    /// Key of the element at zero-based position `i` of a list field.
    ///
    /// `Filter` uses the one-based position and `Array` the zero-based one.
    /// Both conventions are consumed by different endpoints, keep them apart.
    pub(crate) fn element_key(&self, prefix: &str, i: usize) -> String {
        match self.index_mode {
            IndexMode::Filter => format!("{prefix}{}.{}", self.wire_name, i + 1),
            IndexMode::Array => format!("{prefix}{}[{i}]", self.wire_name),
        }
    }
}

/// A decimal literal such as `-12.50`.
///
/// The textual form is kept as given so no precision is lost on the way to
/// the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal(String);

impl Decimal {
    /// Textual form of this decimal.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Decimal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('-').unwrap_or(s);
        let (int, frac) = match digits.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (digits, None),
        };

        let all_digits = |v: &str| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int) || !frac.map_or(true, all_digits) {
            return Err(Error::mapping(format!("'{s}' is not a valid decimal")));
        }

        Ok(Decimal(s.to_string()))
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Leaf value of a request object.
///
/// The `Display` form is the wire value. Floats render like the services
/// expect them: always with a fraction (`1.0`), in scientific notation
/// outside `[1e-3, 1e7)` (`1.0E10`, `1.5E-4`), and `NaN` / `Infinity`
/// for non-finite values.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Boolean, rendered as `true` / `false`.
    Bool(bool),
    /// Arbitrary precision decimal.
    Decimal(Decimal),
    /// UTF-8 string.
    String(String),
    /// Single character.
    Char(char),
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Long(v) => write!(f, "{v}"),
            Scalar::Float(v) => write_float(f, *v),
            Scalar::Double(v) => write_float(f, *v),
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Decimal(v) => write!(f, "{v}"),
            Scalar::String(v) => f.write_str(v),
            Scalar::Char(v) => write!(f, "{v}"),
        }
    }
}

fn write_float<T>(f: &mut Formatter<'_>, v: T) -> fmt::Result
where
    T: Copy + Display + LowerExp + Into<f64>,
{
    let x: f64 = v.into();
    if x.is_nan() {
        return f.write_str("NaN");
    }
    if x.is_infinite() {
        return f.write_str(if x > 0.0 { "Infinity" } else { "-Infinity" });
    }

    let abs = x.abs();
    if abs == 0.0 || (1e-3..1e7).contains(&abs) {
        let s = v.to_string();
        if s.contains('.') {
            f.write_str(&s)
        } else {
            write!(f, "{s}.0")
        }
    } else {
        let s = format!("{v:e}");
        let (mantissa, exp) = s.split_once('e').unwrap_or((s.as_str(), "0"));
        if mantissa.contains('.') {
            write!(f, "{mantissa}E{exp}")
        } else {
            write!(f, "{mantissa}.0E{exp}")
        }
    }
}

/// Conversion of a Rust value into an optional [`Scalar`].
///
/// `None` stands for null: the value is skipped entirely.
pub trait ToScalar {
    /// Convert into a scalar, `None` if the value is null.
    fn to_scalar(&self) -> Option<Scalar>;
}

macro_rules! impl_to_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ToScalar for $ty {
                fn to_scalar(&self) -> Option<Scalar> {
                    Some(Scalar::$variant(self.clone()))
                }
            }
        )*
    };
}

impl_to_scalar! {
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    bool => Bool,
    Decimal => Decimal,
    String => String,
    char => Char,
}

impl ToScalar for str {
    fn to_scalar(&self) -> Option<Scalar> {
        Some(Scalar::String(self.to_string()))
    }
}

impl ToScalar for &str {
    fn to_scalar(&self) -> Option<Scalar> {
        Some(Scalar::String(self.to_string()))
    }
}

impl ToScalar for Scalar {
    fn to_scalar(&self) -> Option<Scalar> {
        Some(self.clone())
    }
}

impl<T: ToScalar> ToScalar for Option<T> {
    fn to_scalar(&self) -> Option<Scalar> {
        self.as_ref().and_then(ToScalar::to_scalar)
    }
}

/// A request object: a node of the request tree that lists its fields.
///
/// Implementations return fields in declaration order. The list is the
/// registration of `(accessor, descriptor)` pairs for the type, so it must
/// not depend on anything but the field values.
pub trait RequestObject {
    /// Fields of this node.
    fn fields(&self) -> Vec<Field<'_>>;
}

/// Element of a list field.
#[derive(Clone)]
pub enum Element<'a> {
    /// A null element, skipped but still occupying its index.
    Null,
    /// A scalar element.
    Scalar(Scalar),
    /// A nested object element.
    Object(&'a dyn RequestObject),
}

/// Value of a present field.
#[derive(Clone)]
pub enum FieldValue<'a> {
    /// Scalar leaf.
    Scalar(Scalar),
    /// List of scalars and/or nested objects.
    List(Vec<Element<'a>>),
    /// Nested object.
    Object(&'a dyn RequestObject),
}

impl FieldValue<'_> {
    /// Name of the value shape, used in error messages.
    pub(crate) fn shape(&self) -> &'static str {
        match self {
            FieldValue::Scalar(_) => "scalar",
            FieldValue::List(_) => "list",
            FieldValue::Object(_) => "object",
        }
    }
}

/// One field of a [`RequestObject`].
#[derive(Clone)]
pub struct Field<'a> {
    /// Serialization descriptor, `None` for untagged fields.
    pub descriptor: Option<FieldDescriptor>,
    /// Field value, `None` when the field is absent (null/unset).
    pub value: Option<FieldValue<'a>>,
}

impl<'a> Field<'a> {
    /// Build a field from its raw parts.
    pub fn new(descriptor: Option<FieldDescriptor>, value: Option<FieldValue<'a>>) -> Self {
        Self { descriptor, value }
    }

    /// A tagged scalar field.
    pub fn scalar(descriptor: FieldDescriptor, value: &(impl ToScalar + ?Sized)) -> Self {
        Self::new(Some(descriptor), value.to_scalar().map(FieldValue::Scalar))
    }

    /// A scalar field without descriptor.
    ///
    /// It is emitted under the key of the enclosing object, and dropped when
    /// there is no enclosing key.
    pub fn untagged_scalar(value: &(impl ToScalar + ?Sized)) -> Self {
        Self::new(None, value.to_scalar().map(FieldValue::Scalar))
    }

    /// A tagged list of scalars, elements may be nullable.
    pub fn scalars<T: ToScalar>(descriptor: FieldDescriptor, values: Option<&'a Vec<T>>) -> Self {
        let value = values.map(|values| {
            FieldValue::List(
                values
                    .iter()
                    .map(|v| v.to_scalar().map_or(Element::Null, Element::Scalar))
                    .collect(),
            )
        });
        Self::new(Some(descriptor), value)
    }

    /// A tagged nested object.
    pub fn object<T: RequestObject>(descriptor: FieldDescriptor, value: Option<&'a T>) -> Self {
        Self::new(
            Some(descriptor),
            value.map(|v| FieldValue::Object(v as &dyn RequestObject)),
        )
    }

    /// A tagged list of nested objects.
    pub fn objects<T: RequestObject>(descriptor: FieldDescriptor, values: Option<&'a Vec<T>>) -> Self {
        let value = values.map(|values| {
            FieldValue::List(
                values
                    .iter()
                    .map(|v| Element::Object(v as &dyn RequestObject))
                    .collect(),
            )
        });
        Self::new(Some(descriptor), value)
    }

    /// A tagged list of nested objects that may contain nulls.
    pub fn nullable_objects<T: RequestObject>(
        descriptor: FieldDescriptor,
        values: Option<&'a Vec<Option<T>>>,
    ) -> Self {
        let value = values.map(|values| {
            FieldValue::List(
                values
                    .iter()
                    .map(|v| match v {
                        Some(v) => Element::Object(v as &dyn RequestObject),
                        None => Element::Null,
                    })
                    .collect(),
            )
        });
        Self::new(Some(descriptor), value)
    }
}
