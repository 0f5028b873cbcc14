//! Attribute value and type definitions

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::columns::dynamic::TimestampMap;

/// Scalar type carried by plain columns and by the entries of dynamic maps
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// Boolean
    Bool,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// UTF-8 string
    String,
}

impl ScalarType {
    /// Whether values of this type are numbers
    pub fn is_number(self) -> bool {
        matches!(self, ScalarType::Int | ScalarType::Long | ScalarType::Float | ScalarType::Double)
    }
}

/// Semantic type of a column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Boolean
    Bool,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// UTF-8 string
    String,
    /// Array of 32-bit integers
    IntArray,
    /// Array of 64-bit floats
    DoubleArray,
    /// Array of strings
    StringArray,
    /// Time-varying map of timestamp to scalar
    Dynamic(ScalarType),
}

impl ValueType {
    /// Whether the type is a time-varying map type
    pub fn is_dynamic(self) -> bool {
        matches!(self, ValueType::Dynamic(_))
    }

    /// Whether the type is an array type
    pub fn is_array(self) -> bool {
        matches!(self, ValueType::IntArray | ValueType::DoubleArray | ValueType::StringArray)
    }

    /// Whether the type is a plain numeric type
    pub fn is_number(self) -> bool {
        matches!(self, ValueType::Int | ValueType::Long | ValueType::Float | ValueType::Double)
    }

    /// Scalar counterpart of a plain type
    pub fn scalar(self) -> Option<ScalarType> {
        match self {
            ValueType::Bool => Some(ScalarType::Bool),
            ValueType::Int => Some(ScalarType::Int),
            ValueType::Long => Some(ScalarType::Long),
            ValueType::Float => Some(ScalarType::Float),
            ValueType::Double => Some(ScalarType::Double),
            ValueType::String => Some(ScalarType::String),
            _ => None,
        }
    }
}

/// Aggregation used to collapse a dynamic value to a scalar
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Estimator {
    /// Arithmetic mean
    Average,
    /// Middle value of the sorted values
    Median,
    /// Most frequent value
    Mode,
    /// Sum of values
    Sum,
    /// Smallest value
    Min,
    /// Largest value
    Max,
    /// Value at the earliest timestamp
    First,
    /// Value at the latest timestamp
    Last,
}

/// Attribute value
///
/// Floats compare and hash by their total ordering so that values can key the
/// value index directly.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// No value
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit float
    Float(OrderedFloat<f32>),
    /// 64-bit float
    Double(OrderedFloat<f64>),
    /// UTF-8 string
    String(Arc<str>),
    /// Array of 32-bit integers
    IntArray(Arc<[i32]>),
    /// Array of 64-bit floats
    DoubleArray(Arc<[OrderedFloat<f64>]>),
    /// Array of strings
    StringArray(Arc<[Arc<str>]>),
    /// Time-varying value
    Dynamic(TimestampMap),
}

impl Value {
    /// Build a double value
    pub fn double(v: f64) -> Self {
        Value::Double(OrderedFloat(v))
    }

    /// Build a float value
    pub fn float(v: f32) -> Self {
        Value::Float(OrderedFloat(v))
    }

    /// Build a string value
    pub fn string(s: &str) -> Self {
        Value::String(Arc::from(s))
    }

    /// Whether this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type of the value, `None` for null
    pub fn value_type(&self) -> Option<ValueType> {
        Some(match self {
            Value::Null => return None,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Long(_) => ValueType::Long,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::IntArray(_) => ValueType::IntArray,
            Value::DoubleArray(_) => ValueType::DoubleArray,
            Value::StringArray(_) => ValueType::StringArray,
            Value::Dynamic(map) => ValueType::Dynamic(map.scalar_type()),
        })
    }

    /// Whether the value may be stored in a column of type `ty`
    pub fn conforms_to(&self, ty: ValueType) -> bool {
        match self.value_type() {
            None => true,
            Some(own) => own == ty,
        }
    }

    /// Numeric view of a scalar number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Long(v) => Some(*v as f64),
            Value::Float(v) => Some(v.0 as f64),
            Value::Double(v) => Some(v.0),
            _ => None,
        }
    }

    /// Dynamic map carried by this value
    pub fn as_dynamic(&self) -> Option<&TimestampMap> {
        match self {
            Value::Dynamic(map) => Some(map),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::IntArray(v) => write!(f, "{:?}", v),
            Value::DoubleArray(v) => write!(f, "{:?}", v),
            Value::StringArray(v) => write!(f, "{:?}", v),
            Value::Dynamic(map) => write!(f, "{}", map),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}
