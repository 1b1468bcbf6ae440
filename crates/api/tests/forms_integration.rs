//! End-to-end tests for the form pipeline against PostgreSQL.
//!
//! Each test works in its own organization, so no cleanup between tests is
//! needed. Skipped when `TEST_DATABASE_URL` is not set.

mod common;

use axum::http::{header, Method, StatusCode};
use axum::Router;
use common::{
    body_text, create_authenticated_user, create_test_app, create_test_organization,
    create_test_pool, create_test_question, request, send, send_raw, test_config,
    AuthenticatedUser, TestUser,
};
use serde_json::{json, Value};

struct Catalog {
    org_id: String,
    template_id: String,
    bank_id: String,
    value_id: String,
}

/// Organization with `Banco` (select) and `Valor` (number) questions and a
/// template using both.
async fn setup_catalog(app: &Router, owner: &AuthenticatedUser) -> Catalog {
    let org_id = create_test_organization(app, owner).await;
    let token = owner.access_token.as_str();

    let bank_id = create_test_question(
        app,
        token,
        &org_id,
        json!({
            "title": "Banco",
            "input_type": "select",
            "options": ["Millennium BCP", "Caixa Geral"]
        }),
    )
    .await;
    let value_id = create_test_question(
        app,
        token,
        &org_id,
        json!({ "title": "Valor", "input_type": "number" }),
    )
    .await;

    let (status, template) = send(
        app,
        request(
            Method::POST,
            &format!("/api/v1/organizations/{}/templates", org_id),
            Some(token),
            Some(json!({
                "title": "Crédito habitação",
                "question_ids": [value_id, bank_id, value_id]
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create template: {}", template);
    assert_eq!(template["questions"].as_array().unwrap().len(), 2);

    Catalog {
        org_id,
        template_id: template["id"].as_str().unwrap().to_string(),
        bank_id,
        value_id,
    }
}

async fn submit(
    app: &Router,
    token: &str,
    catalog: &Catalog,
    bank: &str,
    value: &str,
) -> (StatusCode, Value) {
    send(
        app,
        request(
            Method::POST,
            &format!("/api/v1/organizations/{}/submissions", catalog.org_id),
            Some(token),
            Some(json!({
                "template_id": catalog.template_id,
                "answers": [
                    { "question_id": catalog.bank_id, "answer": bank },
                    { "question_id": catalog.value_id, "answer": value }
                ]
            })),
        ),
    )
    .await
}

fn org_uri(catalog: &Catalog, path: &str) -> String {
    format!("/api/v1/organizations/{}{}", catalog.org_id, path)
}

#[tokio::test]
async fn test_submission_pipeline() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let app = create_test_app(test_config(), pool);
    let owner = create_authenticated_user(&app, &TestUser::new()).await;
    let token = owner.access_token.as_str();
    let catalog = setup_catalog(&app, &owner).await;

    // Schema lists both fields
    let (status, schema) = send(
        &app,
        request(
            Method::GET,
            &org_uri(&catalog, &format!("/templates/{}/schema", catalog.template_id)),
            Some(token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schema["fields"].as_array().unwrap().len(), 2);

    // Select answers are stored with the option's spelling
    let (status, first) = submit(&app, token, &catalog, "millennium bcp", "1500").await;
    assert_eq!(status, StatusCode::CREATED, "{}", first);
    let stored_bank = first["answers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["question_title"] == "Banco")
        .unwrap()["answer"]
        .clone();
    assert_eq!(stored_bank, "Millennium BCP");

    let (status, _) = submit(&app, token, &catalog, "Caixa Geral", "300").await;
    assert_eq!(status, StatusCode::CREATED);

    // Invalid answers are reported per field
    let (status, body) = submit(&app, token, &catalog, "Banco Fantasma", "-5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"].as_array().unwrap().len(), 2);

    // Listing and answer filters
    let (status, all) = send(
        &app,
        request(Method::GET, &org_uri(&catalog, "/submissions"), Some(token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["count"], 2);

    let (_, by_bank) = send(
        &app,
        request(
            Method::GET,
            &org_uri(&catalog, "/submissions?bank=MILLENNIUM%20BCP"),
            Some(token),
            None,
        ),
    )
    .await;
    assert_eq!(by_bank["count"], 1);

    let (_, by_value) = send(
        &app,
        request(
            Method::GET,
            &org_uri(&catalog, "/submissions?min_value=1000"),
            Some(token),
            None,
        ),
    )
    .await;
    assert_eq!(by_value["count"], 1);

    let (status, _) = send(
        &app,
        request(
            Method::GET,
            &org_uri(&catalog, "/submissions?min_value=10&max_value=1"),
            Some(token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Cursor pagination
    let (_, page1) = send(
        &app,
        request(
            Method::GET,
            &org_uri(&catalog, "/submissions?limit=1"),
            Some(token),
            None,
        ),
    )
    .await;
    assert_eq!(page1["count"], 1);
    let cursor = page1["next_cursor"].as_str().unwrap().to_string();

    let (_, page2) = send(
        &app,
        request(
            Method::GET,
            &org_uri(&catalog, &format!("/submissions?limit=1&cursor={}", cursor)),
            Some(token),
            None,
        ),
    )
    .await;
    assert_eq!(page2["count"], 1);
    assert!(page2.get("next_cursor").is_none());
    assert_ne!(page1["data"][0]["id"], page2["data"][0]["id"]);

    // Export
    let response = send_raw(
        &app,
        request(Method::GET, &org_uri(&catalog, "/submissions/export"), Some(token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(!response.headers().contains_key("x-export-truncated"));
    let csv = body_text(response).await;
    assert!(csv.starts_with("id,template,submitted_at,form_date,submitted_by"));
    assert!(csv.contains("Banco"));
    assert_eq!(csv.lines().count(), 3);

    // Aggregation
    let (status, summary) = send(
        &app,
        request(
            Method::GET,
            &org_uri(&catalog, "/submissions/aggregate?group_by=bank"),
            Some(token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_count"], 2);
    assert_eq!(summary["total_value"].as_f64().unwrap(), 1800.0);
    assert_eq!(summary["rows"].as_array().unwrap().len(), 2);
    assert_eq!(summary["truncated"], false);

    // Dashboard
    let (status, dashboard) = send(
        &app,
        request(Method::GET, &org_uri(&catalog, "/dashboard"), Some(token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_submissions"], 2);
    assert_eq!(dashboard["by_month"].as_array().unwrap().len(), 12);

    // Referenced catalog entries cannot be deleted
    let (status, _) = send(
        &app,
        request(
            Method::DELETE,
            &org_uri(&catalog, &format!("/templates/{}", catalog.template_id)),
            Some(token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        request(
            Method::DELETE,
            &org_uri(&catalog, &format!("/questions/{}", catalog.bank_id)),
            Some(token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_duplicate_question_title_conflicts() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let app = create_test_app(test_config(), pool);
    let owner = create_authenticated_user(&app, &TestUser::new()).await;
    let org_id = create_test_organization(&app, &owner).await;

    create_test_question(
        &app,
        &owner.access_token,
        &org_id,
        json!({ "title": "Distrito", "input_type": "text" }),
    )
    .await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/v1/organizations/{}/questions", org_id),
            Some(&owner.access_token),
            Some(json!({ "title": "DISTRITO", "input_type": "text" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_member_scoping() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let app = create_test_app(test_config(), pool);
    let owner = create_authenticated_user(&app, &TestUser::new()).await;
    let catalog = setup_catalog(&app, &owner).await;

    let member_user = TestUser::new();
    let member = create_authenticated_user(&app, &member_user).await;
    let outsider = create_authenticated_user(&app, &TestUser::new()).await;

    let (status, added) = send(
        &app,
        request(
            Method::POST,
            &org_uri(&catalog, "/members"),
            Some(&owner.access_token),
            Some(json!({ "email": member_user.email })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", added);
    assert_eq!(added["role"], "member");

    // Outsiders see nothing
    let (status, _) = send(
        &app,
        request(
            Method::GET,
            &org_uri(&catalog, ""),
            Some(&outsider.access_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Members read the catalog but cannot change it
    let (status, _) = send(
        &app,
        request(
            Method::GET,
            &org_uri(&catalog, "/questions"),
            Some(&member.access_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &org_uri(&catalog, "/questions"),
            Some(&member.access_token),
            Some(json!({ "title": "Agente", "input_type": "text" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Each side submits once; the member only sees their own
    let (status, _) = submit(&app, &owner.access_token, &catalog, "Caixa Geral", "100").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, mine) = submit(&app, &member.access_token, &catalog, "Caixa Geral", "200").await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, member_view) = send(
        &app,
        request(
            Method::GET,
            &org_uri(&catalog, "/submissions"),
            Some(&member.access_token),
            None,
        ),
    )
    .await;
    assert_eq!(member_view["count"], 1);
    assert_eq!(member_view["data"][0]["id"], mine["id"]);

    let (_, owner_view) = send(
        &app,
        request(
            Method::GET,
            &org_uri(&catalog, "/submissions"),
            Some(&owner.access_token),
            None,
        ),
    )
    .await;
    assert_eq!(owner_view["count"], 2);

    // The only owner cannot leave
    let (status, _) = send(
        &app,
        request(
            Method::DELETE,
            &org_uri(&catalog, &format!("/members/{}", owner.user_id)),
            Some(&owner.access_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Members may leave
    let (status, _) = send(
        &app,
        request(
            Method::DELETE,
            &org_uri(&catalog, &format!("/members/{}", member.user_id)),
            Some(&member.access_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_refresh_token_rotation() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let app = create_test_app(test_config(), pool);
    let user = create_authenticated_user(&app, &TestUser::new()).await;

    let (status, rotated) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": user.refresh_token })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let next_refresh = rotated["refresh_token"].as_str().unwrap().to_string();

    // The old token was consumed by the rotation
    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": user.refresh_token })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/auth/logout",
            None,
            Some(json!({ "refresh_token": next_refresh })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, me) = send(
        &app,
        request(Method::GET, "/api/v1/users/me", Some(&user.access_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], user.email);
}
