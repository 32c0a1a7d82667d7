//! End-to-end handler tests against an in-memory store.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::web::Data;
use actix_web::{App, test};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::auth::jwt::issue_token;
use crate::auth::password::hash_password;
use crate::config::Config;
use crate::db::create_schema;
use crate::model::role::{Principal, Role};
use crate::models::Claims;
use crate::routes;
use crate::utils::identity_cache::IdentityCache;

const TEST_SECRET: &str = "test-secret";

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        server_addr: "127.0.0.1:0".to_string(),
        token_ttl: 1800,
        hr_username: "hr@company.com".to_string(),
        hr_password_hash: hash_password("hr123"),
        rate_login_per_min: 600,
        rate_protected_per_min: 6000,
    }
}

/// Single-connection pool: each sqlite::memory: connection is its own
/// database, so the pool must never open a second one.
async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    create_schema(&pool).await.unwrap();
    pool
}

macro_rules! test_app {
    ($pool:expr) => {{
        let config = test_config();
        let config_for_routes = config.clone();
        test::init_service(
            App::new()
                .wrap(actix_web::middleware::NormalizePath::trim())
                .app_data(Data::new($pool.clone()))
                .app_data(Data::new(config))
                .app_data(Data::new(IdentityCache::new()))
                .configure(move |cfg| routes::configure(cfg, &config_for_routes)),
        )
        .await
    }};
}

fn peer() -> std::net::SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

fn hr_token() -> String {
    issue_token(Principal::Hr, TEST_SECRET, 1800)
}

fn employee_token(id: i64) -> String {
    issue_token(Principal::Employee(id), TEST_SECRET, 1800)
}

fn expired_token() -> String {
    let claims = Claims {
        sub: "1".to_string(),
        role: Role::Employee,
        exp: 1_000_000, // long past
        jti: "expired".to_string(),
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

fn get(path: &str, token: &str) -> Request {
    test::TestRequest::get()
        .uri(path)
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request()
}

fn post(path: &str, token: &str, body: Value) -> Request {
    test::TestRequest::post()
        .uri(path)
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(body)
        .to_request()
}

async fn call<S, B>(app: &S, req: Request) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

async fn create_employee<S, B>(app: &S, name: &str, email: &str, joining: &str) -> i64
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = call(
        app,
        post(
            "/employees",
            &hr_token(),
            json!({
                "name": name,
                "email": email,
                "department": "Engineering",
                "joining_date": joining,
            }),
        ),
    )
    .await;
    assert_eq!(status, 201, "create employee failed: {body}");
    body["id"].as_i64().unwrap()
}

async fn apply<S, B>(app: &S, employee_id: i64, start: &str, end: &str) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    call(
        app,
        post(
            "/employee/leaves",
            &employee_token(employee_id),
            json!({
                "employee_id": employee_id,
                "start_date": start,
                "end_date": end,
            }),
        ),
    )
    .await
}

#[actix_web::test]
async fn submit_approve_overlap_scenario() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let id = create_employee(&app, "Jane Doe", "jane.doe@company.com", "2024-01-01").await;

    // login with email + id, then drive everything with the issued token
    let (status, body) = call(
        &app,
        test::TestRequest::post()
            .uri("/auth/employee/login")
            .peer_addr(peer())
            .set_json(json!({ "email": "jane.doe@company.com", "employee_id": id }))
            .to_request(),
    )
    .await;
    assert_eq!(status, 200, "login failed: {body}");
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["leave_balance"], 20);
    let token = body["access_token"].as_str().unwrap().to_string();

    // Mon..Fri = 5 business days
    let (status, body) = call(
        &app,
        post(
            "/employee/leaves/", // trailing slash is normalized away
            &token,
            json!({ "employee_id": id, "start_date": "2024-06-03", "end_date": "2024-06-07" }),
        ),
    )
    .await;
    assert_eq!(status, 201, "submit failed: {body}");
    assert_eq!(body["days"], 5);
    assert_eq!(body["status"], "pending");
    let leave_id = body["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        post(&format!("/leaves/{leave_id}/approve"), &hr_token(), json!({})),
    )
    .await;
    assert_eq!(status, 200, "approve failed: {body}");
    assert_eq!(body["status"], "approved");

    let (status, body) = call(&app, get("/employee/balance", &token)).await;
    assert_eq!(status, 200);
    assert_eq!(body["balance"], 15);

    // approved request still blocks the overlapping resubmission
    let (status, body) = apply(&app, id, "2024-06-05", "2024-06-10").await;
    assert_eq!(status, 409, "expected overlap, got: {body}");
    assert_eq!(body["error"], "overlapping leave request");

    let (status, body) = call(&app, get("/leaves", &hr_token())).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["employee_name"], "Jane Doe");
    assert_eq!(body["data"][0]["employee_department"], "Engineering");
    assert_eq!(body["data"][0]["status"], "approved");

    let (status, body) = call(&app, get("/stats", &hr_token())).await;
    assert_eq!(status, 200);
    assert_eq!(body["total_employees"], 1);
    assert_eq!(body["total_leaves"], 1);
    assert_eq!(body["approved_leaves"], 1);
    assert_eq!(body["pending_leaves"], 0);

    let (status, body) = call(&app, get("/employee/leaves", &token)).await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["status"], "approved");
}

#[actix_web::test]
async fn insufficient_balance_leaves_no_row() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let id = create_employee(&app, "Sam Low", "sam.low@company.com", "2024-01-01").await;

    // six full weeks = 30 business days > 20
    let (status, body) = apply(&app, id, "2024-06-03", "2024-07-12").await;
    assert_eq!(status, 409, "expected insufficient balance, got: {body}");
    assert_eq!(
        body["error"],
        "insufficient leave balance: requested 30 days, 20 available"
    );

    let (status, body) = call(&app, get("/employee/leaves", &employee_token(id))).await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn decision_is_one_shot() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let id = create_employee(&app, "Ada One", "ada.one@company.com", "2024-01-01").await;

    let (_, body) = apply(&app, id, "2024-06-03", "2024-06-07").await;
    let leave_id = body["id"].as_i64().unwrap();

    let (status, _) = call(
        &app,
        post(&format!("/leaves/{leave_id}/approve"), &hr_token(), json!({})),
    )
    .await;
    assert_eq!(status, 200);

    // both re-decisions must fail, and the balance is only charged once
    let (status, body) = call(
        &app,
        post(&format!("/leaves/{leave_id}/approve"), &hr_token(), json!({})),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], "leave request already processed");

    let (status, _) = call(
        &app,
        post(&format!("/leaves/{leave_id}/reject"), &hr_token(), json!({})),
    )
    .await;
    assert_eq!(status, 409);

    let (status, body) = call(&app, get("/employee/balance", &employee_token(id))).await;
    assert_eq!(status, 200);
    assert_eq!(body["balance"], 15);
}

#[actix_web::test]
async fn reject_does_not_touch_balance() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let id = create_employee(&app, "Rae Vet", "rae.vet@company.com", "2024-01-01").await;

    let (_, body) = apply(&app, id, "2024-06-03", "2024-06-07").await;
    let leave_id = body["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        post(&format!("/leaves/{leave_id}/reject"), &hr_token(), json!({})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "rejected");

    let (status, body) = call(&app, get("/employee/balance", &employee_token(id))).await;
    assert_eq!(status, 200);
    assert_eq!(body["balance"], 20);

    // a rejected request no longer blocks the range
    let (status, body) = apply(&app, id, "2024-06-03", "2024-06-07").await;
    assert_eq!(status, 201, "resubmission after reject failed: {body}");
}

#[actix_web::test]
async fn start_before_joining_is_rejected() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let id = create_employee(&app, "New Hire", "new.hire@company.com", "2024-01-01").await;

    let (status, body) = apply(&app, id, "2023-12-29", "2024-01-05").await;
    assert_eq!(status, 400, "expected invalid request, got: {body}");
    assert_eq!(body["error"], "leave cannot start before joining date");
}

#[actix_web::test]
async fn weekend_request_counts_zero_days() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let id = create_employee(&app, "Wes End", "wes.end@company.com", "2024-01-01").await;

    // Sat..Sun: accepted, worth nothing
    let (status, body) = apply(&app, id, "2024-06-08", "2024-06-09").await;
    assert_eq!(status, 201);
    assert_eq!(body["days"], 0);
    let leave_id = body["id"].as_i64().unwrap();

    let (status, _) = call(
        &app,
        post(&format!("/leaves/{leave_id}/approve"), &hr_token(), json!({})),
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = call(&app, get("/employee/balance", &employee_token(id))).await;
    assert_eq!(status, 200);
    assert_eq!(body["balance"], 20);
}

#[actix_web::test]
async fn role_gates_are_enforced() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let id = create_employee(&app, "Eve Plain", "eve.plain@company.com", "2024-01-01").await;
    let emp = employee_token(id);

    for req in [
        get("/leaves", &emp),
        get("/employees", &emp),
        get("/stats", &emp),
        post("/leaves/1/approve", &emp, json!({})),
        post("/leaves/1/reject", &emp, json!({})),
    ] {
        let (status, body) = call(&app, req).await;
        assert_eq!(status, 403, "expected forbidden, got: {body}");
    }

    // HR is not an employee
    let (status, _) = call(
        &app,
        post(
            "/employee/leaves",
            &hr_token(),
            json!({ "employee_id": id, "start_date": "2024-06-03", "end_date": "2024-06-07" }),
        ),
    )
    .await;
    assert_eq!(status, 403);

    let (status, _) = call(&app, get("/employee/balance", &hr_token())).await;
    assert_eq!(status, 403);
}

#[actix_web::test]
async fn ownership_is_enforced() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let first = create_employee(&app, "Ann First", "ann.first@company.com", "2024-01-01").await;
    let second = create_employee(&app, "Bob Second", "bob.second@company.com", "2024-01-01").await;

    // submitting on someone else's behalf
    let (status, body) = call(
        &app,
        post(
            "/employee/leaves",
            &employee_token(first),
            json!({ "employee_id": second, "start_date": "2024-06-03", "end_date": "2024-06-07" }),
        ),
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "You can only apply for your own leave");

    // peeking at someone else's balance
    let (status, _) = call(
        &app,
        get(&format!("/employees/{second}/balance"), &employee_token(first)),
    )
    .await;
    assert_eq!(status, 403);

    let (status, body) = call(
        &app,
        get(&format!("/employees/{first}/balance"), &employee_token(first)),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["balance"], 20);

    // HR can query anyone
    let (status, _) = call(&app, get(&format!("/employees/{second}/balance"), &hr_token())).await;
    assert_eq!(status, 200);
}

#[actix_web::test]
async fn bad_tokens_are_unauthenticated() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let (status, _) = call(
        &app,
        test::TestRequest::get()
            .uri("/employee/balance")
            .peer_addr(peer())
            .to_request(),
    )
    .await;
    assert_eq!(status, 401);

    let (status, _) = call(&app, get("/employee/balance", "not-a-jwt")).await;
    assert_eq!(status, 401);

    let (status, body) = call(&app, get("/employee/balance", &expired_token())).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[actix_web::test]
async fn employee_login_requires_matching_pair() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let id = create_employee(&app, "Lia Match", "lia.match@company.com", "2024-01-01").await;

    let login = |email: &str, employee_id: i64| {
        test::TestRequest::post()
            .uri("/auth/employee/login")
            .peer_addr(peer())
            .set_json(json!({ "email": email, "employee_id": employee_id }))
            .to_request()
    };

    let (status, _) = call(&app, login("lia.match@company.com", id + 100)).await;
    assert_eq!(status, 401);

    let (status, _) = call(&app, login("someone.else@company.com", id)).await;
    assert_eq!(status, 401);

    let (status, body) = call(&app, login("lia.match@company.com", id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["user"]["name"], "Lia Match");
    assert_eq!(body["user"]["department"], "Engineering");
}

#[actix_web::test]
async fn hr_login_issues_usable_token() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let (status, _) = call(
        &app,
        test::TestRequest::post()
            .uri("/auth/hr/login")
            .peer_addr(peer())
            .set_json(json!({ "username": "hr@company.com", "password": "wrong" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, 401);

    let (status, body) = call(
        &app,
        test::TestRequest::post()
            .uri("/auth/hr/login")
            .peer_addr(peer())
            .set_json(json!({ "username": "hr@company.com", "password": "hr123" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["user"]["id"], 999);
    assert_eq!(body["user"]["name"], "HR Admin");

    let token = body["access_token"].as_str().unwrap().to_string();
    let (status, _) = call(&app, get("/stats", &token)).await;
    assert_eq!(status, 200);
}

#[actix_web::test]
async fn duplicate_email_conflicts() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    create_employee(&app, "Dup One", "dup@company.com", "2024-01-01").await;

    let (status, body) = call(
        &app,
        post(
            "/employees",
            &hr_token(),
            json!({
                "name": "Dup Two",
                "email": "dup@company.com",
                "department": "Sales",
                "joining_date": "2024-02-01",
            }),
        ),
    )
    .await;
    assert_eq!(status, 409, "expected conflict, got: {body}");
    assert_eq!(body["error"], "email already registered");

    let (status, body) = call(&app, get("/employees", &hr_token())).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 1);
}

#[actix_web::test]
async fn leave_listing_filters_by_status() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let id = create_employee(&app, "Fil Ter", "fil.ter@company.com", "2024-01-01").await;

    let (_, body) = apply(&app, id, "2024-06-03", "2024-06-04").await;
    let first = body["id"].as_i64().unwrap();
    let (status, _) = apply(&app, id, "2024-06-10", "2024-06-11").await;
    assert_eq!(status, 201);

    let (status, _) = call(
        &app,
        post(&format!("/leaves/{first}/approve"), &hr_token(), json!({})),
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = call(&app, get("/leaves?status=approved", &hr_token())).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["id"], first);

    let (status, body) = call(&app, get("/leaves?status=pending", &hr_token())).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 1);

    let (status, body) = call(&app, get("/leaves?status=bogus", &hr_token())).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "unknown status: bogus");
}

#[actix_web::test]
async fn balance_lookup_for_missing_employee_is_not_found() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let (status, body) = call(&app, get("/employees/12345/balance", &hr_token())).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "employee not found");
}
