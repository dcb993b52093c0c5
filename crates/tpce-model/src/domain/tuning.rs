use std::fmt;

use serde::{Deserialize, Serialize};

/// Typed scalar assigned to a cluster setting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Int(i64),
    Bool(bool),
    String(String),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Int(v) => write!(f, "{v}"),
            SettingValue::Bool(v) => write!(f, "{v}"),
            SettingValue::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
        }
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        SettingValue::Int(v)
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        SettingValue::Bool(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::String(v.to_string())
    }
}

/// A single runtime override applied over an administrative connection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuningDirective {
    pub setting_key: String,
    pub value: SettingValue,
}

impl TuningDirective {
    pub fn new(setting_key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        Self {
            setting_key: setting_key.into(),
            value: value.into(),
        }
    }

    /// `SET CLUSTER SETTING <key> = <value>`
    pub fn statement(&self) -> String {
        format!("SET CLUSTER SETTING {} = {}", self.setting_key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_renders_typed_values() {
        let d = TuningDirective::new("kv.bulk_io_write.concurrent_addsstable_requests", 8_i64);
        assert_eq!(
            d.statement(),
            "SET CLUSTER SETTING kv.bulk_io_write.concurrent_addsstable_requests = 8"
        );

        let d = TuningDirective::new("sql.stats.automatic_collection.enabled", false);
        assert_eq!(
            d.statement(),
            "SET CLUSTER SETTING sql.stats.automatic_collection.enabled = false"
        );
    }

    #[test]
    fn string_values_are_quoted() {
        let d = TuningDirective::new("cluster.organization", "it's");
        assert_eq!(d.statement(), "SET CLUSTER SETTING cluster.organization = 'it''s'");
    }
}
