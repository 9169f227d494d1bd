use std::path::PathBuf;

use crate::cgroup::{FlatKeyedRow, Int64OrMax, NestedKeyedRow};
use crate::mountinfo::CgroupMode;

#[derive(Debug, serde::Serialize)]
pub struct ModeResponse {
    pub mode: String,
}

impl From<CgroupMode> for ModeResponse {
    fn from(mode: CgroupMode) -> Self {
        Self {
            mode: mode.to_string(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ContainerizedResponse {
    pub containerized: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct ControllerPath {
    pub controller: String,
    pub path: String,
}

impl From<&(String, PathBuf)> for ControllerPath {
    fn from((controller, path): &(String, PathBuf)) -> Self {
        Self {
            controller: controller.clone(),
            path: path.display().to_string(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ProcessCount {
    pub count: usize,
}

#[derive(Debug, serde::Serialize)]
pub struct Scalar {
    pub file: String,
    pub value: ScalarValue,
}

/// Wire form of [`Int64OrMax`]: a JSON number, or the string `"max"` for
/// the unbounded marker.
#[derive(Debug)]
pub struct ScalarValue(Int64OrMax);

impl From<Int64OrMax> for ScalarValue {
    fn from(value: Int64OrMax) -> Self {
        Self(value)
    }
}

impl serde::Serialize for ScalarValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.0 {
            Int64OrMax::Value(v) => serializer.serialize_i64(v),
            Int64OrMax::Max => serializer.serialize_str("max"),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct FlatRow {
    pub key: String,
    pub value: i64,
}

impl From<FlatKeyedRow> for FlatRow {
    fn from(row: FlatKeyedRow) -> Self {
        Self {
            key: row.key,
            value: row.value,
        }
    }
}

/// Wire form of [`NestedKeyedRow`]: one JSON object per row, the category
/// under `"key"` plus one member per sub-key, in file order.
#[derive(Debug)]
pub struct NestedRow(NestedKeyedRow);

impl From<NestedKeyedRow> for NestedRow {
    fn from(row: NestedKeyedRow) -> Self {
        Self(row)
    }
}

impl serde::Serialize for NestedRow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.entries.len() + 1))?;
        map.serialize_entry("key", &self.0.key)?;
        for (subkey, value) in &self.0.entries {
            map.serialize_entry(subkey, value)?;
        }
        map.end()
    }
}
