use futures::future::join_all;
use pretty_assertions::assert_eq;
use tuneup_db::LicenseDb;
use tuneup_license_server::{build_router, AppState};
use tuneup_types::{ActivationKey, Binding, CheckResponse, LicenseRecord};

/// Spin up the HTTP server on an OS-assigned port, returning the base URL.
async fn spawn_test_server(db: LicenseDb) -> String {
    let app = build_router(AppState { db });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

fn db_with_key(key: &str) -> LicenseDb {
    let db = LicenseDb::open_in_memory().unwrap();
    db.insert(&LicenseRecord::provisioned("sub-1", ActivationKey::parse(key).unwrap()))
        .unwrap();
    db
}

async fn check(base: &str, query: &[(&str, &str)]) -> (u16, CheckResponse) {
    let resp = reqwest::Client::new()
        .get(format!("{}/check_license", base))
        .query(query)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

fn body(valid: bool, message: &str) -> CheckResponse {
    CheckResponse {
        valid,
        message: message.to_string(),
    }
}

#[tokio::test]
async fn first_use_binds_then_mismatch_then_match() {
    let db = db_with_key("ABC");
    let base = spawn_test_server(db.clone()).await;

    let (status, resp) = check(&base, &[("key", "ABC"), ("hash", "h1")]).await;
    assert_eq!(status, 200);
    assert_eq!(resp, body(true, "activated"));

    let (status, resp) = check(&base, &[("key", "ABC"), ("hash", "h2")]).await;
    assert_eq!(status, 403);
    assert_eq!(resp, body(false, "hash mismatch"));

    let (status, resp) = check(&base, &[("key", "ABC"), ("hash", "h1")]).await;
    assert_eq!(status, 200);
    assert_eq!(resp, body(true, "validated"));

    let record = db
        .get_license(&ActivationKey::parse("ABC").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(record.binding.fingerprint().unwrap().as_str(), "h1");
}

#[tokio::test]
async fn repeated_validation_keeps_activation_time() {
    let db = db_with_key("ABC");
    let base = spawn_test_server(db.clone()).await;
    let key = ActivationKey::parse("ABC").unwrap();

    check(&base, &[("key", "ABC"), ("hash", "h1")]).await;
    let first = db.get_license(&key).unwrap().unwrap().activated_on;
    assert!(first.is_some());

    for _ in 0..3 {
        let (status, resp) = check(&base, &[("key", "ABC"), ("hash", "h1")]).await;
        assert_eq!(status, 200);
        assert!(resp.valid);
    }
    assert_eq!(db.get_license(&key).unwrap().unwrap().activated_on, first);
}

#[tokio::test]
async fn unknown_key_is_not_found_and_creates_nothing() {
    let db = db_with_key("ABC");
    let base = spawn_test_server(db.clone()).await;

    let (status, resp) = check(&base, &[("key", "XYZ"), ("hash", "h1")]).await;
    assert_eq!(status, 404);
    assert_eq!(resp, body(false, "license does not exist"));
    assert_eq!(db.count().unwrap(), 1);
    assert!(db.get_license(&ActivationKey::parse("XYZ").unwrap()).unwrap().is_none());
}

#[tokio::test]
async fn missing_parameters_are_rejected() {
    let db = db_with_key("ABC");
    let base = spawn_test_server(db.clone()).await;

    for query in [
        vec![],
        vec![("key", "ABC")],
        vec![("hash", "h1")],
        vec![("key", ""), ("hash", "h1")],
        vec![("key", "ABC"), ("hash", "")],
    ] {
        let (status, resp) = check(&base, &query).await;
        assert_eq!(status, 400, "query {query:?}");
        assert_eq!(resp, body(false, "activation key or hash missing"));
    }

    let record = db
        .get_license(&ActivationKey::parse("ABC").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(record.binding, Binding::Unbound);
}

#[tokio::test]
async fn sentinel_hash_cannot_unbind_or_validate() {
    let db = db_with_key("ABC");
    let base = spawn_test_server(db.clone()).await;

    let (status, _) = check(&base, &[("key", "ABC"), ("hash", "default_hash_value")]).await;
    assert_eq!(status, 400);
    assert_eq!(db.get_license(&ActivationKey::parse("ABC").unwrap()).unwrap().unwrap().binding, Binding::Unbound);
}

#[tokio::test]
async fn concurrent_first_use_has_one_winner() {
    let db = db_with_key("ABC");
    let base = spawn_test_server(db.clone()).await;

    let hashes: Vec<String> = (0..12).map(|i| format!("h{i}")).collect();
    let results = join_all(
        hashes
            .iter()
            .map(|h| {
                let base = &base;
                async move { check(base, &[("key", "ABC"), ("hash", h.as_str())]).await }
            }),
    )
    .await;

    let winners: Vec<&str> = results
        .iter()
        .zip(&hashes)
        .filter(|((_, resp), _)| resp.valid)
        .map(|(_, h)| h.as_str())
        .collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(
        results.iter().filter(|(status, _)| *status == 403).count(),
        hashes.len() - 1
    );

    let record = db
        .get_license(&ActivationKey::parse("ABC").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(record.binding.fingerprint().unwrap().as_str(), winners[0]);

    for h in &hashes {
        let (_, resp) = check(&base, &[("key", "ABC"), ("hash", h.as_str())]).await;
        assert_eq!(resp.valid, h == winners[0]);
    }
}

#[tokio::test]
async fn response_content_type_is_json() {
    let base = spawn_test_server(db_with_key("ABC")).await;
    let resp = reqwest::get(format!("{}/check_license?key=ABC&hash=h1", base))
        .await
        .unwrap();

    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("application/json"));
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let base = spawn_test_server(db_with_key("ABC")).await;
    let resp = reqwest::get(format!("{}/api/v1/nonexistent", base))
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn file_database_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("licenses.db");
    let key = {
        let db = LicenseDb::open(&path).unwrap();
        db.create_license("sub-9").unwrap()
    };

    let base = spawn_test_server(LicenseDb::open(&path).unwrap()).await;
    let (status, _) = check(&base, &[("key", key.as_str()), ("hash", "h1")]).await;
    assert_eq!(status, 200);

    let reopened = LicenseDb::open(&path).unwrap();
    let record = reopened.get_license(&key).unwrap().unwrap();
    assert!(record.binding.is_bound());
}

#[tokio::test]
async fn values_are_compared_exactly_as_sent() {
    let db = db_with_key("ABC");
    let base = spawn_test_server(db.clone()).await;

    check(&base, &[("key", "ABC"), ("hash", "h1")]).await;

    let (status, resp) = check(&base, &[("key", "ABC"), ("hash", " h1")]).await;
    assert_eq!(status, 403);
    assert_eq!(resp, body(false, "hash mismatch"));

    let (status, _) = check(&base, &[("key", " ABC"), ("hash", "h1")]).await;
    assert_eq!(status, 404);
}

// ── Storage failures ─────────────────────────────────────────────

fn file_db_with_key(dir: &tempfile::TempDir, key: &str) -> (std::path::PathBuf, LicenseDb) {
    let path = dir.path().join("licenses.db");
    let db = LicenseDb::open(&path).unwrap();
    db.insert(&LicenseRecord::provisioned("sub-1", ActivationKey::parse(key).unwrap()))
        .unwrap();
    (path, db)
}

#[tokio::test]
async fn missing_table_is_an_opaque_internal_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let (path, db) = file_db_with_key(&dir, "ABC");
    let base = spawn_test_server(db).await;

    rusqlite::Connection::open(&path)
        .unwrap()
        .execute_batch("DROP TABLE licenses;")
        .unwrap();

    let (status, resp) = check(&base, &[("key", "ABC"), ("hash", "h1")]).await;
    assert_eq!(status, 500);
    assert_eq!(resp, body(false, "internal server error"));
}

#[tokio::test]
async fn failed_bind_leaves_record_unbound() {
    let dir = tempfile::TempDir::new().unwrap();
    let (path, db) = file_db_with_key(&dir, "ABC");
    let base = spawn_test_server(db.clone()).await;
    let key = ActivationKey::parse("ABC").unwrap();

    let admin = rusqlite::Connection::open(&path).unwrap();
    admin
        .execute_batch(
            "CREATE TRIGGER reject_bind BEFORE UPDATE ON licenses
             BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
        )
        .unwrap();

    let (status, resp) = check(&base, &[("key", "ABC"), ("hash", "h1")]).await;
    assert_eq!(status, 500);
    assert_eq!(resp, body(false, "internal server error"));

    let record = db.get_license(&key).unwrap().unwrap();
    assert_eq!(record.binding, Binding::Unbound);
    assert_eq!(record.activated_on, None);

    admin.execute_batch("DROP TRIGGER reject_bind;").unwrap();
    let (status, resp) = check(&base, &[("key", "ABC"), ("hash", "h2")]).await;
    assert_eq!(status, 200);
    assert_eq!(resp, body(true, "activated"));
}
