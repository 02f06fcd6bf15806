use std::fmt;

use crate::{
    property::PropertyOwner,
    value::{ArrayInstance, FixedDictInstance},
};

/// A replicated property value.
///
/// Integers are widened to 64 bits; the owning [`DataType`](crate::DataType)
/// decides the width used on the wire and the range a value may hold.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Array(ArrayInstance),
    FixedDict(FixedDictInstance),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "BOOL",
            Value::Int(_) => "INT",
            Value::UInt(_) => "UINT",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::Array(_) => "ARRAY",
            Value::FixedDict(_) => "FIXED_DICT",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayInstance> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_fixed_dict(&self) -> Option<&FixedDictInstance> {
        match self {
            Value::FixedDict(dict) => Some(dict),
            _ => None,
        }
    }

    /// The value viewed as an owner of further properties, if it is a container
    pub fn as_owner_mut(&mut self) -> Option<&mut dyn PropertyOwner> {
        match self {
            Value::Array(array) => Some(array),
            Value::FixedDict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_owner(&self) -> Option<&dyn PropertyOwner> {
        match self {
            Value::Array(array) => Some(array),
            Value::FixedDict(dict) => Some(dict),
            _ => None,
        }
    }

    /// The slot this container occupies in its parent, or None if detached
    pub fn owner_ref(&self) -> Option<usize> {
        match self {
            Value::Array(array) => array.owner_ref(),
            Value::FixedDict(dict) => dict.owner_ref(),
            _ => None,
        }
    }

    /// Records that this value now lives in slot `index` of its owner
    pub(crate) fn attach(&mut self, index: usize) {
        match self {
            Value::Array(array) => array.set_owner_ref(Some(index)),
            Value::FixedDict(dict) => dict.set_owner_ref(Some(index)),
            _ => {}
        }
    }

    pub(crate) fn detach(&mut self) {
        match self {
            Value::Array(array) => array.set_owner_ref(None),
            Value::FixedDict(dict) => dict.set_owner_ref(None),
            _ => {}
        }
    }
}

/// Puts `value` into `slot` at `index`, returning the detached previous value
pub(crate) fn rehome(slot: &mut Value, mut value: Value, index: usize) -> Value {
    value.attach(index);
    let mut old_value = std::mem::replace(slot, value);
    old_value.detach();
    old_value
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{}", value),
            Value::Int(value) => write!(f, "{}", value),
            Value::UInt(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{:?}", value),
            Value::Array(array) => {
                write!(f, "[")?;
                for (index, element) in array.values().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Value::FixedDict(dict) => {
                write!(f, "{{")?;
                for (index, (field, element)) in dict
                    .data_type()
                    .fields()
                    .iter()
                    .zip(dict.values())
                    .enumerate()
                {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name(), element)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::UInt(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<ArrayInstance> for Value {
    fn from(value: ArrayInstance) -> Self {
        Value::Array(value)
    }
}

impl From<FixedDictInstance> for Value {
    fn from(value: FixedDictInstance) -> Self {
        Value::FixedDict(value)
    }
}
