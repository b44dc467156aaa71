use std::error::Error;
use std::fmt;

use rustc_hash::FxHashMap;

/// Value of an operator attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum Attribute {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float(f32),
    String(String),
    Array(Vec<Attribute>),
}

impl Attribute {
    /// Return a short name for the kind of attribute, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
        }
    }
}

impl From<bool> for Attribute {
    fn from(val: bool) -> Self {
        Attribute::Bool(val)
    }
}

impl From<&str> for Attribute {
    fn from(val: &str) -> Self {
        Attribute::String(val.to_string())
    }
}

impl From<Vec<i64>> for Attribute {
    fn from(vals: Vec<i64>) -> Self {
        Attribute::Array(vals.into_iter().map(Attribute::Int64).collect())
    }
}

impl From<Vec<i32>> for Attribute {
    fn from(vals: Vec<i32>) -> Self {
        Attribute::Array(vals.into_iter().map(Attribute::Int32).collect())
    }
}

/// Errors when reading a typed attribute from an operator.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrError {
    /// The operator has no attribute with this name.
    Missing(String),

    /// The attribute exists but has a different kind.
    WrongType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The attribute is an array, but an element has the wrong kind.
    WrongElementType {
        name: String,
        index: usize,
        expected: &'static str,
    },
}

impl fmt::Display for AttrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "missing attribute \"{}\"", name),
            Self::WrongType {
                name,
                expected,
                actual,
            } => write!(
                f,
                "attribute \"{}\" should be {} but is {}",
                name, expected, actual
            ),
            Self::WrongElementType {
                name,
                index,
                expected,
            } => write!(
                f,
                "element {} of attribute \"{}\" should be {}",
                index, name, expected
            ),
        }
    }
}

impl Error for AttrError {}

/// Named attributes of an operator.
#[derive(Clone, Debug, Default)]
pub struct Attributes {
    attrs: FxHashMap<String, Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute, returning the updated set.
    ///
    /// This is a convenience for building attribute sets in one expression.
    pub fn with(mut self, name: &str, value: impl Into<Attribute>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Attribute>) {
        self.attrs.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attrs.get(name)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    fn require(&self, name: &str) -> Result<&Attribute, AttrError> {
        self.get(name)
            .ok_or_else(|| AttrError::Missing(name.to_string()))
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, AttrError> {
        match self.require(name)? {
            Attribute::Bool(val) => Ok(*val),
            other => Err(AttrError::WrongType {
                name: name.to_string(),
                expected: "bool",
                actual: other.kind(),
            }),
        }
    }

    /// Read an array attribute whose elements are all of one kind.
    fn get_array<T>(
        &self,
        name: &str,
        expected: &'static str,
        extract: impl Fn(&Attribute) -> Option<T>,
    ) -> Result<Vec<T>, AttrError> {
        let elements = match self.require(name)? {
            Attribute::Array(elements) => elements,
            other => {
                return Err(AttrError::WrongType {
                    name: name.to_string(),
                    expected: "array",
                    actual: other.kind(),
                });
            }
        };
        elements
            .iter()
            .enumerate()
            .map(|(index, elem)| {
                extract(elem).ok_or_else(|| AttrError::WrongElementType {
                    name: name.to_string(),
                    index,
                    expected,
                })
            })
            .collect()
    }

    pub fn get_i64_array(&self, name: &str) -> Result<Vec<i64>, AttrError> {
        self.get_array(name, "int64", |attr| match attr {
            Attribute::Int64(val) => Some(*val),
            _ => None,
        })
    }

    pub fn get_i32_array(&self, name: &str) -> Result<Vec<i32>, AttrError> {
        self.get_array(name, "int32", |attr| match attr {
            Attribute::Int32(val) => Some(*val),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AttrError, Attribute, Attributes};

    #[test]
    fn test_get_bool() {
        let attrs = Attributes::new().with("keepdim", true).with("axis", vec![0i64]);
        assert_eq!(attrs.get_bool("keepdim"), Ok(true));
        assert_eq!(
            attrs.get_bool("missing"),
            Err(AttrError::Missing("missing".into()))
        );
        assert_eq!(
            attrs.get_bool("axis"),
            Err(AttrError::WrongType {
                name: "axis".into(),
                expected: "bool",
                actual: "array",
            })
        );
    }

    #[test]
    fn test_get_int_arrays() {
        let attrs = Attributes::new()
            .with("axes", vec![1i64, -1])
            .with("perm", vec![2i32, 0, 1])
            .with("empty", Vec::<i64>::new())
            .with(
                "mixed",
                Attribute::Array(vec![Attribute::Int64(0), Attribute::Int32(1)]),
            );

        assert_eq!(attrs.get_i64_array("axes"), Ok(vec![1, -1]));
        assert_eq!(attrs.get_i32_array("perm"), Ok(vec![2, 0, 1]));
        assert_eq!(attrs.get_i64_array("empty"), Ok(vec![]));

        // Arrays of the other integer width are rejected.
        assert_eq!(
            attrs.get_i64_array("perm"),
            Err(AttrError::WrongElementType {
                name: "perm".into(),
                index: 0,
                expected: "int64",
            })
        );
        assert_eq!(
            attrs.get_i64_array("mixed"),
            Err(AttrError::WrongElementType {
                name: "mixed".into(),
                index: 1,
                expected: "int64",
            })
        );
    }

    #[test]
    fn test_attr_error_display() {
        let err = AttrError::WrongElementType {
            name: "axes".into(),
            index: 2,
            expected: "int64",
        };
        assert_eq!(err.to_string(), "element 2 of attribute \"axes\" should be int64");
    }
}
