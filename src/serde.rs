//! # Serde module for RunReport
//!
//! This module provides serde-based (serialization and deserialization) features for
//! `RunReport`, used by the `--format json` output of the command line tool.
//!
//! `RunReport` is serialized as a map with `distinct`, `accepted_lines`, `rejected_lines`
//! and `bytes_read` fields. During deserialization the report is checked for consistency:
//! a report can never claim more distinct addresses than accepted lines.
//!
//! The presence bitmap itself is never serialized.
use serde::de::Error;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

use crate::pipeline::RunReport;

impl Serialize for RunReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut st = serializer.serialize_struct("RunReport", 4)?;
        st.serialize_field("distinct", &self.distinct)?;
        st.serialize_field("accepted_lines", &self.accepted_lines)?;
        st.serialize_field("rejected_lines", &self.rejected_lines)?;
        st.serialize_field("bytes_read", &self.bytes_read)?;
        st.end()
    }
}

/// Wire shape of `RunReport`, validated before conversion
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReport {
    distinct: u64,
    accepted_lines: u64,
    rejected_lines: u64,
    #[serde(default)]
    bytes_read: u64,
}

impl<'de> Deserialize<'de> for RunReport {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawReport::deserialize(deserializer)?;
        if raw.distinct > raw.accepted_lines {
            return Err(Error::custom(format!(
                "distinct count {} exceeds accepted lines {}",
                raw.distinct, raw.accepted_lines
            )));
        }
        Ok(RunReport {
            distinct: raw.distinct,
            accepted_lines: raw.accepted_lines,
            rejected_lines: raw.rejected_lines,
            bytes_read: raw.bytes_read,
        })
    }
}
