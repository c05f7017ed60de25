// tests/supabase_store.rs
//
// Wire-level checks of the PostgREST client against a local axum stand-in.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use calamine::{Data, Range};
use gpt_catalog_migrate::{
    apply_statement, ApplyOutcome, MigrationRunner, PromptStore, RunSettings, SourceRecord,
    StoreConfig, SupabaseStore, Table, Transformer,
};

#[derive(Debug, Clone)]
struct Call {
    method: Method,
    path: String,
    query: Option<String>,
    apikey: Option<String>,
    auth: Option<String>,
    prefer: Option<String>,
    body: String,
}

#[derive(Clone, Default)]
struct Mock {
    calls: Arc<Mutex<Vec<Call>>>,
    /// Rows per table, reported once by DELETE and then zeroed.
    rows: Arc<Mutex<HashMap<String, u64>>>,
    /// Inserts whose body contains this text are refused.
    refuse_insert: Option<String>,
    /// Status returned by `rpc/exec`.
    exec_status: StatusCode,
}

fn header(h: &HeaderMap, name: &str) -> Option<String> {
    h.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

async fn handle(
    State(mock): State<Mock>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    mock.calls.lock().unwrap().push(Call {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        apikey: header(&headers, "apikey"),
        auth: header(&headers, "authorization"),
        prefer: header(&headers, "prefer"),
        body: body.clone(),
    });

    if method == Method::DELETE {
        let table = path.trim_start_matches("/rest/v1/").to_string();
        let n = mock.rows.lock().unwrap().insert(table, 0).unwrap_or(0);
        return (StatusCode::NO_CONTENT, [("content-range", format!("*/{n}"))]).into_response();
    }
    if path == "/rest/v1/rpc/exec" {
        let msg = r#"{"code":"42501","message":"permission denied for schema public"}"#;
        return (mock.exec_status, msg).into_response();
    }
    if let Some(bad) = &mock.refuse_insert {
        if body.contains(bad.as_str()) {
            return (StatusCode::CONFLICT, r#"{"message":"duplicate key"}"#).into_response();
        }
    }
    StatusCode::CREATED.into_response()
}

async fn spawn(mock: Mock) -> StoreConfig {
    let app = Router::new().fallback(handle).with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    StoreConfig {
        url: format!("http://{addr}"),
        api_key: "anon-key".into(),
    }
}

fn mock_with_rows(rows: &[(&str, u64)]) -> Mock {
    let mock = Mock {
        exec_status: StatusCode::OK,
        ..Mock::default()
    };
    {
        let mut m = mock.rows.lock().unwrap();
        for (t, n) in rows {
            m.insert(t.to_string(), *n);
        }
    }
    mock
}

#[tokio::test]
async fn delete_all_uses_sentinel_filter_and_reads_count() {
    let mock = mock_with_rows(&[("prompts", 4)]);
    let cfg = spawn(mock.clone()).await;
    let store = SupabaseStore::new(&cfg).unwrap();

    assert_eq!(store.delete_all(Table::Prompts).await.unwrap(), 4);
    assert_eq!(store.delete_all(Table::Prompts).await.unwrap(), 0);

    let calls = mock.calls.lock().unwrap().clone();
    let first = &calls[0];
    assert_eq!(first.method, Method::DELETE);
    assert_eq!(first.path, "/rest/v1/prompts");
    assert_eq!(
        first.query.as_deref(),
        Some("id=neq.00000000-0000-0000-0000-000000000000")
    );
    assert_eq!(first.apikey.as_deref(), Some("anon-key"));
    assert_eq!(first.auth.as_deref(), Some("Bearer anon-key"));
    assert_eq!(first.prefer.as_deref(), Some("count=exact"));
}

#[tokio::test]
async fn insert_posts_the_row_as_json() {
    let mock = mock_with_rows(&[]);
    let cfg = spawn(mock.clone()).await;
    let store = SupabaseStore::new(&cfg).unwrap();

    let rec = Transformer::default()
        .transform(&SourceRecord {
            tags: Some("Math; Science".into()),
            ..SourceRecord::new("g-42")
        })
        .unwrap();
    store.insert_prompt(&rec).await.unwrap();

    let call = mock.calls.lock().unwrap()[0].clone();
    assert_eq!(call.method, Method::POST);
    assert_eq!(call.path, "/rest/v1/prompts");
    assert_eq!(call.prefer.as_deref(), Some("return=minimal"));
    let body: serde_json::Value = serde_json::from_str(&call.body).unwrap();
    assert_eq!(body["url"], "https://chatgpt.com/g/g-42");
    assert_eq!(body["tags"], serde_json::json!(["Math", "Science"]));
    assert_eq!(body["user_token"], "a1b2c3d4-e5f6-4a7b-8c9d-0e1f2a3b4c5d");
}

#[tokio::test]
async fn refused_exec_becomes_manual_step() {
    let mock = Mock {
        exec_status: StatusCode::FORBIDDEN,
        ..Mock::default()
    };
    let cfg = spawn(mock.clone()).await;
    let store = SupabaseStore::new(&cfg).unwrap();

    let sql = "ALTER TABLE prompts ADD COLUMN is_broken boolean DEFAULT false;";
    let out = apply_statement(&store, sql, cfg.sql_editor_url()).await;
    let ApplyOutcome::NeedsManualStep(step) = out else {
        panic!("expected manual step");
    };
    assert_eq!(step.statement, sql);
    assert!(step.reason.unwrap().contains("403"));

    let call = mock.calls.lock().unwrap()[0].clone();
    assert_eq!(call.path, "/rest/v1/rpc/exec");
    let body: serde_json::Value = serde_json::from_str(&call.body).unwrap();
    assert_eq!(body["query"], sql);
}

#[tokio::test]
async fn accepted_exec_is_applied() {
    let cfg = spawn(mock_with_rows(&[])).await;
    let store = SupabaseStore::new(&cfg).unwrap();
    let out = apply_statement(&store, "SELECT 1;", None).await;
    assert_eq!(out, ApplyOutcome::Applied);
}

#[tokio::test]
async fn full_run_over_http_resets_in_order_and_tolerates_a_conflict() {
    let mut mock = mock_with_rows(&[("prompt_upvotes", 5), ("saved_prompts", 2), ("prompts", 3)]);
    mock.refuse_insert = Some("g-dup".into());
    let cfg = spawn(mock.clone()).await;

    let mut sheet = Range::new((0, 0), (3, 15));
    for (i, (id, score)) in [("g-a", 1.0), ("g-dup", 3.0), ("g-c", 2.0)].iter().enumerate() {
        let y = i as u32 + 1;
        sheet.set_value((y, 0), Data::String(id.to_string()));
        sheet.set_value((y, 15), Data::Float(*score));
    }

    let runner = MigrationRunner::connect(&cfg, sheet, RunSettings::default()).unwrap();
    let report = runner.run().await.unwrap();

    assert_eq!(report.reset.total(), 10);
    assert_eq!((report.attempted(), report.inserted()), (3, 2));

    let calls = mock.calls.lock().unwrap().clone();
    let deletes: Vec<_> = calls
        .iter()
        .filter(|c| c.method == Method::DELETE)
        .map(|c| c.path.as_str())
        .collect();
    assert_eq!(
        deletes,
        vec!["/rest/v1/prompt_upvotes", "/rest/v1/saved_prompts", "/rest/v1/prompts"]
    );
    // All deletes happen before the first insert.
    let first_insert = calls.iter().position(|c| c.method == Method::POST).unwrap();
    assert!(calls[..first_insert].iter().all(|c| c.method == Method::DELETE));

    let inserted: Vec<String> = calls
        .iter()
        .filter(|c| c.method == Method::POST)
        .map(|c| {
            let v: serde_json::Value = serde_json::from_str(&c.body).unwrap();
            v["url"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(
        inserted,
        vec![
            "https://chatgpt.com/g/g-dup",
            "https://chatgpt.com/g/g-c",
            "https://chatgpt.com/g/g-a"
        ]
    );
}
