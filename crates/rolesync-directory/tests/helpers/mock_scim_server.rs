//! Mock SCIM server using wiremock for integration testing.
//!
//! Mounts canned responses for the handful of SCIM endpoints the directory
//! uses: filtered user/group lookups, group reads, member PATCH and user
//! create/delete.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rolesync_directory::scim::{ScimClient, ScimConfig, ScimCredentials, ScimDirectory};

pub const TEST_TOKEN: &str = "test-token-123";

pub struct MockScimServer {
    server: MockServer,
}

impl MockScimServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Directory configured to talk to this mock server.
    pub fn directory(&self) -> ScimDirectory {
        let config = ScimConfig {
            base_url: self.uri(),
            credentials: ScimCredentials::bearer(TEST_TOKEN),
            timeout: Duration::from_secs(5),
        };
        ScimDirectory::new(&config).expect("directory builds")
    }

    /// Directory built from a bare client (no timeout).
    pub fn directory_with_token(&self, token: &str) -> ScimDirectory {
        ScimDirectory::with_client(ScimClient::new(
            &self.uri(),
            ScimCredentials::bearer(token),
            reqwest::Client::new(),
        ))
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// `GET /Users?filter=userName eq "<name>"` returns one user.
    pub async fn mock_user(&self, user_name: &str, id: &str) {
        Mock::given(method("GET"))
            .and(path("/Users"))
            .and(query_param("filter", format!("userName eq \"{user_name}\"")))
            .and(header("Authorization", format!("Bearer {TEST_TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_response(vec![json!({
                "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                "id": id,
                "userName": user_name,
                "active": true
            })])))
            .mount(&self.server)
            .await;
    }

    /// `GET /Users?filter=userName eq "<name>"` returns an empty list.
    pub async fn mock_user_absent(&self, user_name: &str) {
        Mock::given(method("GET"))
            .and(path("/Users"))
            .and(query_param("filter", format!("userName eq \"{user_name}\"")))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_response(vec![])))
            .mount(&self.server)
            .await;
    }

    /// Group lookup by display name plus `GET /Groups/<id>` with members.
    pub async fn mock_group(&self, display_name: &str, id: &str, member_ids: &[&str]) {
        let members: Vec<Value> = member_ids
            .iter()
            .map(|m| json!({ "value": m }))
            .collect();
        let group = json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Group"],
            "id": id,
            "displayName": display_name,
            "members": members
        });

        Mock::given(method("GET"))
            .and(path("/Groups"))
            .and(query_param(
                "filter",
                format!("displayName eq \"{display_name}\""),
            ))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(list_response(vec![json!({
                    "id": id,
                    "displayName": display_name
                })])),
            )
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/Groups/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(group))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_group_absent(&self, display_name: &str) {
        Mock::given(method("GET"))
            .and(path("/Groups"))
            .and(query_param(
                "filter",
                format!("displayName eq \"{display_name}\""),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_response(vec![])))
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// `PATCH /Groups/<id>` answered with 204, expected `times` times.
    pub async fn expect_group_patch(&self, id: &str, times: u64) {
        Mock::given(method("PATCH"))
            .and(path(format!("/Groups/{id}")))
            .and(header("Content-Type", "application/scim+json"))
            .respond_with(ResponseTemplate::new(204))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_create_user(&self, status: u16, id: &str, user_name: &str) {
        let template = if status == 201 {
            ResponseTemplate::new(201).set_body_json(json!({
                "id": id,
                "userName": user_name,
                "active": true
            }))
        } else {
            ResponseTemplate::new(status).set_body_json(json!({
                "schemas": ["urn:ietf:params:scim:api:messages:2.0:Error"],
                "status": status.to_string(),
                "detail": "conflict"
            }))
        };

        Mock::given(method("POST"))
            .and(path("/Users"))
            .respond_with(template)
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_delete_user(&self, id: &str, status: u16) {
        Mock::given(method("DELETE"))
            .and(path(format!("/Users/{id}")))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Every `GET /Users` answered with the given status.
    pub async fn mock_users_status(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/Users"))
            .respond_with(ResponseTemplate::new(status).set_body_string("failure"))
            .mount(&self.server)
            .await;
    }
}

pub fn list_response(resources: Vec<Value>) -> Value {
    json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:ListResponse"],
        "totalResults": resources.len(),
        "Resources": resources
    })
}
