//! SCIM 2.0 resource shapes (RFC 7643), trimmed to what rolesync reads and writes.

use serde::{Deserialize, Serialize};

pub const USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const PATCH_OP_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

/// SCIM User resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimUser {
    #[serde(default)]
    pub schemas: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub user_name: String,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ScimUser {
    /// New active user for a POST /Users body.
    #[must_use]
    pub fn new(user_name: &str) -> Self {
        Self {
            schemas: vec![USER_SCHEMA.to_string()],
            id: None,
            user_name: user_name.to_string(),
            active: true,
        }
    }
}

/// Group member reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScimMember {
    /// Member resource id.
    pub value: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// SCIM Group resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimGroup {
    #[serde(default)]
    pub schemas: Vec<String>,

    pub id: String,

    pub display_name: String,

    #[serde(default)]
    pub members: Vec<ScimMember>,
}

impl ScimGroup {
    #[must_use]
    pub fn has_member(&self, member_id: &str) -> bool {
        self.members.iter().any(|m| m.value == member_id)
    }
}

/// List response (RFC 7644 Section 3.4.2).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimListResponse<T> {
    #[serde(default)]
    pub total_results: i64,

    #[serde(rename = "Resources", default = "Vec::new")]
    pub resources: Vec<T>,
}

/// PATCH request body.
#[derive(Debug, Clone, Serialize)]
pub struct ScimPatchRequest {
    pub schemas: Vec<String>,

    #[serde(rename = "Operations")]
    pub operations: Vec<ScimPatchOp>,
}

/// Single PATCH operation.
#[derive(Debug, Clone, Serialize)]
pub struct ScimPatchOp {
    pub op: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl ScimPatchRequest {
    /// Add one member to a group.
    #[must_use]
    pub fn add_member(member_id: &str) -> Self {
        Self {
            schemas: vec![PATCH_OP_SCHEMA.to_string()],
            operations: vec![ScimPatchOp {
                op: "add".to_string(),
                path: Some("members".to_string()),
                value: Some(serde_json::json!([{ "value": member_id }])),
            }],
        }
    }

    /// Remove one member from a group.
    #[must_use]
    pub fn remove_member(member_id: &str) -> Self {
        Self {
            schemas: vec![PATCH_OP_SCHEMA.to_string()],
            operations: vec![ScimPatchOp {
                op: "remove".to_string(),
                path: Some(format!(
                    "members[value eq \"{}\"]",
                    escape_filter_value(member_id)
                )),
                value: None,
            }],
        }
    }
}

/// Escape a value for use inside a SCIM filter string literal.
///
/// String values in filter expressions are enclosed in double-quotes
/// (RFC 7644 Section 3.4.2.2); backslashes and quotes are escaped.
pub fn escape_filter_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
