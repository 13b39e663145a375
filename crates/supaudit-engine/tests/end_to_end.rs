//! Full audit passes against a mock management and auth admin API.

use std::num::NonZeroU32;
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use supaudit_client::{Endpoints, SupabaseClient};
use supaudit_core::{AuditError, SecretKey};
use supaudit_engine::checks::RLS_INTROSPECTION_SQL;
use supaudit_engine::{AuditOptions, CheckOrchestrator, CryptoBox, MemoryRepository, Repository};

fn crypto() -> CryptoBox {
    CryptoBox::with_iterations("e2e-passphrase", NonZeroU32::new(1_000).unwrap()).unwrap()
}

fn client_for(server: &MockServer) -> Arc<SupabaseClient> {
    Arc::new(
        SupabaseClient::builder()
            .endpoints(
                Endpoints::new()
                    .management_url(server.uri())
                    .project_url(server.uri()),
            )
            .build()
            .unwrap(),
    )
}

async fn mount_project(server: &MockServer, pitr_enabled: bool) {
    Mock::given(method("GET"))
        .and(path("/v1/projects/abc123/api-keys"))
        .and(header("Authorization", "Bearer sk_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "anon", "api_key": "anon-key" },
            { "name": "service_role", "api_key": "role-key" }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/admin/users"))
        .and(header("apikey", "role-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{ "id": "u1" }, { "id": "u2" }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/admin/users/u1/factors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "f1", "factor_type": "totp", "status": "verified" }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/admin/users/u2/factors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/abc123/database/backups"))
        .and(header("Authorization", "Bearer sk_test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "pitr_enabled": pitr_enabled })),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/abc123/database/query"))
        .and(body_json(json!({ "query": RLS_INTROSPECTION_SQL })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "relname": "orders", "relrowsecurity": false, "relforcerowsecurity": false }
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn audit_scenario_with_remediation() {
    let server = MockServer::start().await;
    mount_project(&server, false).await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/abc123/database/query"))
        .and(body_json(json!({
            "query": "alter table orders enable row level security;"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let repo = Arc::new(MemoryRepository::new());
    let orchestrator = CheckOrchestrator::new(repo.clone(), crypto(), client_for(&server));

    let report = orchestrator
        .run(
            "abc123",
            Some(SecretKey::new("sk_test")),
            AuditOptions::default().with_remediation(),
        )
        .await
        .unwrap();

    let wire = serde_json::to_value(&report).unwrap();
    assert_eq!(
        wire["mfaData"]["mfaStatus"],
        json!([{ "userId": "u2", "mfaStatus": false }])
    );
    assert!(wire["mfaData"]["resolution"].is_string());
    assert!(wire["mfaData"]["link"].is_string());

    assert_eq!(wire["pitrData"]["pitrStatus"], json!(false));
    assert!(wire["pitrData"]["resolution"].is_string());
    assert_eq!(
        wire["pitrData"]["link"],
        json!("https://supabase.com/dashboard/project/abc123/database/backups/pitr")
    );

    let rls = wire["rlsData"]["rlsStatus"].as_array().unwrap();
    assert_eq!(rls.len(), 1);
    assert_eq!(rls[0]["tableName"], json!("orders"));
    assert_eq!(rls[0]["rlsStatus"], json!(false));
    assert_eq!(
        rls[0]["command"],
        json!("alter table orders enable row level security;")
    );

    assert_eq!(repo.all_audit_entries().await.len(), 3);

    let credential = repo.find_credential("abc123").await.unwrap().unwrap();
    assert_ne!(credential.encrypted_access_key, "sk_test");
    assert!(repo
        .all_audit_entries()
        .await
        .iter()
        .all(|e| e.project_id == credential.id));

    // The remediation mock's `expect(1)` is verified when the server drops
}

#[tokio::test]
async fn report_only_pass_issues_no_ddl() {
    let server = MockServer::start().await;
    mount_project(&server, true).await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/abc123/database/query"))
        .and(body_json(json!({
            "query": "alter table orders enable row level security;"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let repo = Arc::new(MemoryRepository::new());
    let orchestrator = CheckOrchestrator::new(repo.clone(), crypto(), client_for(&server));

    let report = orchestrator
        .run("abc123", Some(SecretKey::new("sk_test")), AuditOptions::default())
        .await
        .unwrap();

    assert!(report.pitr_data.enabled);
    assert!(report.pitr_data.resolution_hint.is_none());
    assert_eq!(report.rls_data.violations.len(), 1);
    assert!(!report.rls_data.remediated);
    assert_eq!(repo.all_audit_entries().await.len(), 3);
}

#[tokio::test]
async fn rejected_access_key_maps_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/abc123/api-keys"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid token" })),
        )
        .mount(&server)
        .await;

    let repo = Arc::new(MemoryRepository::new());
    let orchestrator = CheckOrchestrator::new(repo.clone(), crypto(), client_for(&server));

    let err = orchestrator
        .run("abc123", Some(SecretKey::new("sk_bad")), AuditOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AuditError::ServiceCall {
            status_code: Some(401),
            ..
        }
    ));
    assert_eq!(err.http_status(), 401);
    assert!(repo.all_audit_entries().await.is_empty());
}
