//! Small builders over `serde_yaml::Value`. Mappings keep insertion order,
//! which keeps rendered output byte-stable.

use fops_core::errors::CompositionError;
use serde_yaml::{Mapping, Value};

pub(crate) fn s(v: impl Into<String>) -> Value {
    Value::String(v.into())
}

pub(crate) fn seq(items: impl IntoIterator<Item = Value>) -> Value {
    Value::Sequence(items.into_iter().collect())
}

pub(crate) fn strs<'a>(items: impl IntoIterator<Item = &'a str>) -> Value {
    seq(items.into_iter().map(s))
}

#[derive(Default)]
pub(crate) struct Map(Mapping);

impl Map {
    pub(crate) fn new() -> Self {
        Self(Mapping::new())
    }

    pub(crate) fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub(crate) fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(s(key), value.into());
    }

    pub(crate) fn build(self) -> Value {
        Value::Mapping(self.0)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        map.build()
    }
}

pub(crate) fn to_yaml(file: &str, value: &Value) -> Result<String, CompositionError> {
    serde_yaml::to_string(value).map_err(|e| CompositionError::ParseFailure {
        file: file.to_string(),
        format: "yaml".to_string(),
        line: 0,
        message: e.to_string(),
    })
}
