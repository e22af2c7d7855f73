//! Data-transfer shapes of the portal's OpenAPI.
//!
//! Response types default every missing field so that older or newer portals
//! that omit a field still decode. Field names follow the portal's camelCase.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespace file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Properties,
    Xml,
    Yml,
    Yaml,
    Json,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Properties,
        Format::Xml,
        Format::Yml,
        Format::Yaml,
        Format::Json,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Properties => "properties",
            Format::Xml => "xml",
            Format::Yml => "yml",
            Format::Yaml => "yaml",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct App {
    pub name: String,
    pub app_id: String,
    pub org_id: String,
    pub org_name: String,
    pub owner_name: String,
    pub owner_email: String,
    pub data_change_created_by: String,
    pub data_change_last_modified_by: String,
    pub data_change_created_time: String,
    pub data_change_last_modified_time: String,
}

/// The clusters an application has in one environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvWithClusters {
    pub env: String,
    pub clusters: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    pub key: String,
    pub value: String,
    pub comment: String,
    pub data_change_created_by: String,
    pub data_change_last_modified_by: String,
    pub data_change_created_time: String,
    pub data_change_last_modified_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Namespace {
    pub app_id: String,
    pub cluster_name: String,
    pub namespace_name: String,
    pub comment: String,
    pub format: String,
    pub is_public: bool,
    pub items: Vec<Item>,
    pub data_change_created_by: String,
    pub data_change_last_modified_by: String,
    pub data_change_created_time: String,
    pub data_change_last_modified_time: String,
}

/// An application-level namespace definition, as returned on creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppNamespace {
    pub name: String,
    pub app_id: String,
    pub format: String,
    pub is_public: bool,
    pub comment: String,
    pub data_change_created_by: String,
    pub data_change_last_modified_by: String,
    pub data_change_created_time: String,
    pub data_change_last_modified_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNamespaceRequest {
    pub name: String,
    pub app_id: String,
    pub format: Format,
    pub is_public: bool,
    /// Creator's user id.
    pub data_change_created_by: String,
    pub comment: String,
    /// Sent as the `appendNamespacePrefix` query parameter, not in the body.
    #[serde(skip)]
    pub append_namespace_prefix: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamespaceLock {
    pub namespace_name: String,
    pub is_locked: bool,
    /// Lock owner; empty when unlocked.
    pub locked_by: String,
}

/// For non-properties namespaces the key is always `content` and the value
/// is the whole file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub key: String,
    pub value: String,
    pub comment: String,
    pub data_change_created_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub key: String,
    pub value: String,
    pub comment: String,
    pub data_change_last_modified_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReleaseRequest {
    pub release_title: String,
    pub release_comment: String,
    /// Must differ from the last editor when the portal enforces namespace locks.
    pub released_by: String,
}

/// A published snapshot of a namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Release {
    pub app_id: String,
    pub cluster_name: String,
    pub namespace_name: String,
    pub name: String,
    pub configurations: HashMap<String, String>,
    pub comment: String,
    pub data_change_created_by: String,
    pub data_change_last_modified_by: String,
    pub data_change_created_time: String,
    pub data_change_last_modified_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_serializes_lowercase() {
        for format in Format::ALL {
            let json = serde_json::to_value(format).unwrap();
            assert_eq!(json, format.as_str());
        }
    }

    #[test]
    fn create_namespace_request_keeps_prefix_flag_out_of_body() {
        let req = CreateNamespaceRequest {
            name: "express".to_string(),
            app_id: "SampleApp".to_string(),
            format: Format::Yml,
            is_public: true,
            data_change_created_by: "apollo".to_string(),
            comment: "c".to_string(),
            append_namespace_prefix: true,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["appId"], "SampleApp");
        assert_eq!(json["format"], "yml");
        assert_eq!(json["isPublic"], true);
        assert_eq!(json["dataChangeCreatedBy"], "apollo");
        assert!(json.get("appendNamespacePrefix").is_none());
    }

    #[test]
    fn namespace_tolerates_missing_fields() {
        let ns: Namespace =
            serde_json::from_str(r#"{"namespaceName":"application","isPublic":false}"#).unwrap();
        assert_eq!(ns.namespace_name, "application");
        assert!(ns.items.is_empty());
        assert!(ns.app_id.is_empty());
    }

    #[test]
    fn release_decodes_configurations() {
        let release: Release = serde_json::from_str(
            r#"{"appId":"SampleApp","name":"r1","configurations":{"timeout":"100"}}"#,
        )
        .unwrap();
        assert_eq!(release.configurations.get("timeout").map(String::as_str), Some("100"));
    }
}
