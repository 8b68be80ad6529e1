use std::fmt::Debug;

use anyhow::{anyhow, Error, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::error::ParseError;

/// An untyped (JSON) Object from which [TypedParameters](TypedParameter) can be parsed.
///
/// Represents the payload of any envelope before its kind is known.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UntypedObject(pub(crate) Map<String, Json>);

/// A strongly typed wire field, named by its short key.
///
/// Each parameter knows how to read itself from, and write itself to, the JSON value stored under
/// [KEY](TypedParameter::KEY); envelope codecs are assembled from these in both directions.
pub trait TypedParameter:
    TryFrom<Json, Error = Error> + TryInto<Json, Error = Error> + Clone + Debug
{
    const KEY: &'static str;
}

impl UntypedObject {
    /// Get a [TypedParameter] from the Object.
    ///
    /// Note that this method clones the underlying data.
    pub fn get<T: TypedParameter>(&self) -> Option<Result<T>> {
        Some(self.0.get(T::KEY)?.clone().try_into())
    }

    /// Get the raw value stored under `key`.
    pub fn get_raw(&self, key: &str) -> Option<&Json> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert a [TypedParameter], returning the raw value it replaced.
    pub fn insert<T: TypedParameter>(&mut self, t: T) -> Result<Option<Json>> {
        Ok(self.0.insert(T::KEY.to_owned(), t.try_into()?))
    }

    /// Insert a [TypedParameter] when present.
    pub fn insert_opt<T: TypedParameter>(&mut self, t: Option<T>) -> Result<()> {
        if let Some(t) = t {
            self.insert(t)?;
        }
        Ok(())
    }
}

impl From<UntypedObject> for Json {
    fn from(value: UntypedObject) -> Self {
        value.0.into()
    }
}

impl TryFrom<Json> for UntypedObject {
    type Error = ParseError;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        match value {
            Json::Object(map) => Ok(Self(map)),
            other => Err(ParseError::shape(format!(
                "Invalid value {other} supplied to Envelope: expected an object"
            ))),
        }
    }
}

/// Deserialize a field value, qualifying any failure with the JSON path inside that value.
pub(crate) fn from_json<T: DeserializeOwned>(value: Json) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        let path = e.path().to_string();
        if path == "." {
            anyhow!("{}", e.into_inner())
        } else {
            anyhow!("at '{path}': {}", e.into_inner())
        }
    })
}

/// Reads typed fields from an [UntypedObject], collecting every violation instead of stopping at
/// the first one.
#[derive(Debug)]
pub struct ShapeCheck<'a> {
    context: &'static str,
    object: &'a UntypedObject,
    violations: Vec<String>,
}

impl<'a> ShapeCheck<'a> {
    pub fn new(context: &'static str, object: &'a UntypedObject) -> Self {
        Self {
            context,
            object,
            violations: Vec::new(),
        }
    }

    /// Read a field that must be present.
    pub fn required<T: TypedParameter>(&mut self) -> Option<T> {
        if !self.object.contains_key(T::KEY) {
            self.violations.push(format!(
                "Invalid value undefined supplied to {}/{}",
                self.context,
                T::KEY
            ));
            return None;
        }
        self.optional()
    }

    /// Read a field that may be absent.
    pub fn optional<T: TypedParameter>(&mut self) -> Option<T> {
        match self.object.get::<T>()? {
            Ok(t) => Some(t),
            Err(e) => {
                let value = self.object.get_raw(T::KEY).cloned().unwrap_or_default();
                self.violations.push(format!(
                    "Invalid value {value} supplied to {}/{}: {e:#}",
                    self.context,
                    T::KEY
                ));
                None
            }
        }
    }

    /// Require `key` to hold exactly the string `expected`.
    pub fn literal(&mut self, key: &str, expected: &str) {
        match self.object.get_raw(key) {
            Some(Json::String(s)) if s == expected => {}
            other => {
                let value = other.map_or_else(|| "undefined".to_owned(), Json::to_string);
                self.violations.push(format!(
                    "Invalid value {value} supplied to {}/{key}: expected \"{expected}\"",
                    self.context
                ))
            }
        }
    }

    /// Fail with every violation collected so far, if any.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    pub fn into_error(self) -> ParseError {
        ParseError::shape(self.violations.join("\n"))
    }
}

/// Declares wire fields as [TypedParameter] newtypes over serde-representable values.
///
/// `Name(T as W) => "key"` reads the value as `W` and converts it into `T`.
macro_rules! wire_fields {
    (@wire $ty:ty) => { $ty };
    (@wire $ty:ty, $wire:ty) => { $wire };
    ($($(#[$meta:meta])* $name:ident($ty:ty $(as $wire:ty)?) => $key:literal;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq)]
            pub struct $name(pub $ty);

            impl $crate::core::object::TypedParameter for $name {
                const KEY: &'static str = $key;
            }

            impl TryFrom<serde_json::Value> for $name {
                type Error = anyhow::Error;

                fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
                    $crate::core::object::from_json::<
                        $crate::core::object::wire_fields!(@wire $ty $(, $wire)?),
                    >(value)
                    .map(|wire| Self(wire.into()))
                }
            }

            impl TryFrom<$name> for serde_json::Value {
                type Error = anyhow::Error;

                fn try_from(value: $name) -> Result<Self, Self::Error> {
                    serde_json::to_value(value.0).map_err(Into::into)
                }
            }
        )+
    };
}

pub(crate) use wire_fields;
