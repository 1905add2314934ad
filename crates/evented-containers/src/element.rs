//! Element type predicates for typed sequences.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ContainerError;

type CheckFn<T> = dyn Fn(&T) -> Result<(), String> + Send + Sync;

/// A named predicate every element of a typed sequence must satisfy.
///
/// The check returns `Err(description)` naming what was found; it ends up in
/// [`ContainerError::TypeMismatch`].
pub struct ElementType<T> {
    name: Arc<str>,
    check: Arc<CheckFn<T>>,
}

impl<T> Clone for ElementType<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            check: Arc::clone(&self.check),
        }
    }
}

impl<T> fmt::Debug for ElementType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ElementType").field(&self.name).finish()
    }
}

impl<T> ElementType<T> {
    /// Accepts everything.
    pub fn any() -> Self {
        Self::with_check("any", |_| Ok(()))
    }

    pub fn new<F>(name: &str, pred: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::with_check(name, move |v| {
            if pred(v) {
                Ok(())
            } else {
                Err("a rejected value".to_string())
            }
        })
    }

    pub fn with_check<F>(name: &str, check: F) -> Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accepts(&self, value: &T) -> bool {
        (self.check)(value).is_ok()
    }

    pub fn check(&self, value: &T) -> Result<(), ContainerError> {
        (self.check)(value).map_err(|found| ContainerError::TypeMismatch {
            expected: self.name.to_string(),
            found,
        })
    }

    /// Checks every value, failing on the first rejected one.
    pub fn check_all<'a, I>(&self, values: I) -> Result<(), ContainerError>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        values.into_iter().try_for_each(|v| self.check(v))
    }
}

impl<T: 'static> ElementType<T> {
    /// Accepts a value satisfying any of `types`.
    pub fn union(types: Vec<ElementType<T>>) -> Self {
        let name = types.iter().map(|t| t.name()).collect::<Vec<_>>().join(" | ");
        Self::with_check(&name, move |v| {
            let mut found = String::new();
            for t in &types {
                match (t.check)(v) {
                    Ok(()) => return Ok(()),
                    Err(desc) => found = desc,
                }
            }
            Err(found)
        })
    }
}

fn json_type_name(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

fn json_kind(name: &str, pred: fn(&Value) -> bool) -> ElementType<Value> {
    ElementType::with_check(name, move |v| {
        if pred(v) {
            Ok(())
        } else {
            Err(json_type_name(v))
        }
    })
}

// Built-in types for dynamically typed JSON elements.
impl ElementType<Value> {
    pub fn integer() -> Self {
        json_kind("integer", |v| v.is_i64() || v.is_u64())
    }

    pub fn number() -> Self {
        json_kind("number", Value::is_number)
    }

    pub fn string() -> Self {
        json_kind("string", Value::is_string)
    }

    pub fn boolean() -> Self {
        json_kind("boolean", Value::is_boolean)
    }

    pub fn array() -> Self {
        json_kind("array", Value::is_array)
    }

    pub fn object() -> Self {
        json_kind("object", Value::is_object)
    }
}
