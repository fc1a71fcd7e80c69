use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use stockroom::auth::password;
use stockroom::config::{Config, StorageBackend, StorageConfig};
use stockroom::db;
use stockroom::models::Role;
use stockroom::storage::{BlobStore, MemoryBlobStore, StorageError};
use tokio::sync::Notify;

pub const PASSWORD: &str = "password123";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub storage: Arc<MemoryBlobStore>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Insert a user directly, with a profile when `role` is given.
    pub async fn seed_user(&self, email: &str, name: &str, role: Option<Role>) -> Uuid {
        let hash = password::hash(PASSWORD).unwrap();
        let user = db::users::create(&self.pool, email, &hash)
            .await
            .expect("seed user failed");
        if let Some(role) = role {
            db::profiles::create(&self.pool, user.id, name, role)
                .await
                .expect("seed profile failed");
        }
        user.id
    }

    /// Login and return the auth response body + status.
    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Seed a user with `role` and return an access token for them.
    pub async fn token_for(&self, email: &str, role: Role) -> String {
        self.seed_user(email, &format!("{role} user"), Some(role)).await;
        let (body, status) = self.login(email, PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Create a product through the API, return the product JSON.
    pub async fn create_product(&self, token: &str, name: &str, stock: i32, min_stock: i32) -> Value {
        let (body, status) = self
            .post_auth(
                "/api/v1/products",
                token,
                &json!({
                    "name": name,
                    "category": "Hardware",
                    "stock": stock,
                    "min_stock": min_stock,
                    "entry_price": 2.5,
                    "exit_price": 4.0,
                    "supplier": "Acme",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create product failed: {body}");
        body
    }

    pub async fn movement_count(&self, product_id: &str) -> i64 {
        let id: Uuid = product_id.parse().unwrap();
        sqlx::query_scalar("SELECT COUNT(*) FROM movements WHERE product_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// Send a bearer-authenticated request, optionally with a JSON body.
    pub async fn send_json(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<&Value>,
    ) -> (Value, StatusCode) {
        let mut req = self.client.request(method, self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await.expect("api request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        self.send_json(Method::GET, path, token, None).await
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        self.send_json(Method::POST, path, token, Some(body)).await
    }

    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        self.send_json(Method::PUT, path, token, Some(body)).await
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        self.send_json(Method::DELETE, path, token, None).await
    }

    /// Upload an image through the multipart API endpoint.
    pub async fn upload_image(&self, product_id: &str, token: &str) -> (Value, StatusCode) {
        let body = concat!(
            "--TESTBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"image\"; filename=\"photo.png\"\r\n",
            "Content-Type: image/png\r\n\r\n",
            "PNGDATA\r\n",
            "--TESTBOUNDARY--\r\n",
        );
        let resp = self
            .client
            .put(self.url(&format!("/api/v1/products/{product_id}/image")))
            .bearer_auth(token)
            .header("content-type", "multipart/form-data; boundary=TESTBOUNDARY")
            .body(body)
            .send()
            .await
            .expect("upload request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// GET a page with the session cookie, return (html, status, location).
    pub async fn get_page(&self, path: &str, token: Option<&str>) -> (String, StatusCode, Option<String>) {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.header("cookie", format!("access_token={token}"));
        }
        let resp = req.send().await.expect("page request failed");
        page_parts(resp).await
    }

    /// POST an urlencoded form with the session cookie.
    pub async fn post_form(&self, path: &str, token: &str, body: &str) -> (String, StatusCode, Option<String>) {
        let resp = self
            .client
            .post(self.url(path))
            .header("cookie", format!("access_token={token}"))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body.to_string())
            .send()
            .await
            .expect("form request failed");
        page_parts(resp).await
    }
}

async fn page_parts(resp: reqwest::Response) -> (String, StatusCode, Option<String>) {
    let status = resp.status();
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let html = resp.text().await.unwrap_or_default();
    (html, status, location)
}

/// Blob store whose uploads wait for `release` after announcing themselves on `entered`.
pub struct GatedBlobStore {
    inner: MemoryBlobStore,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedBlobStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            inner: MemoryBlobStore::new(bucket),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl BlobStore for GatedBlobStore {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.upload(path, bytes, content_type, upsert).await
    }

    fn public_url(&self, path: &str) -> String {
        self.inner.public_url(path)
    }

    async fn delete(&self, paths: &[String]) -> Result<(), StorageError> {
        self.inner.delete(paths).await
    }
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!("stockroom_test_{}", Uuid::now_v7().to_string().replace('-', ""));

    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://localhost:0".to_string(),
        max_upload_size: 1_048_576,
        dashboard_sample_limit: 1000,
        cookie_secure: false,
        log_level: "warn".to_string(),
        storage: StorageConfig {
            bucket: "products".to_string(),
            backend: StorageBackend::Local {
                dir: std::env::temp_dir().join(&db_name),
            },
        },
        bootstrap_admin: None,
    };

    let storage = Arc::new(MemoryBlobStore::new("products"));
    let app = stockroom::build_app_with_storage(pool.clone(), config, storage.clone());

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
        storage,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
