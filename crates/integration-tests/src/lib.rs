//! Integration tests for the Under One Roof admin library.
//!
//! The tests run the real [`u1r_admin::CatalogClient`] and services against
//! [`FakeCatalogStore`], an in-process axum server bound to `127.0.0.1:0`
//! that serves the admin REST routes from in-memory JSON and records every
//! request it receives.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p u1r-integration-tests
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::body::{Body, to_bytes};
use axum::extract::{Multipart, Path, Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use u1r_admin::{AdminConfig, CatalogClient, Session};

pub const ADMIN_EMAIL: &str = "admin@u1rfoods.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery";

/// 2100-01-01T00:00:00Z
const FAR_FUTURE: i64 = 4_102_444_800;

/// An unsigned JWT-shaped token whose payload is `claims`.
#[must_use]
pub fn token_with(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Admin token expiring at `exp` (seconds since the epoch).
#[must_use]
pub fn admin_token(exp: i64) -> String {
    token_with(&json!({ "sub": "admin", "role": "admin", "exp": exp }))
}

// ============================================================================
// Fixtures
// ============================================================================

#[must_use]
pub fn category(id: &str, name: &str, has_subcategory: bool) -> Value {
    json!({
        "_id": id,
        "name": name,
        "hasSubcategory": has_subcategory,
        "isWholesale": true,
    })
}

#[must_use]
pub fn subcategory(id: &str, name: &str, category: &str, position: u32) -> Value {
    json!({
        "_id": id,
        "name": name,
        "categoryId": { "_id": category, "name": "owner" },
        "position": position,
        "isWholesale": true,
    })
}

#[must_use]
pub fn product(id: &str, category: &str, subcategory: Option<&str>, position: u32) -> Value {
    let mut value = json!({
        "_id": id,
        "name": format!("Product {id}"),
        "price": "120.00",
        "stock": 10,
        "moq": 2,
        "weight": "1kg",
        "status": true,
        "position": position,
        "categoryId": category,
        "isWholesale": true,
    });
    if let (Some(sub), Some(object)) = (subcategory, value.as_object_mut()) {
        object.insert("subcategoryId".to_string(), json!(sub));
    }
    value
}

// ============================================================================
// Recorded requests
// ============================================================================

/// One request as the fake server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl Recorded {
    /// The body parsed as JSON (`Null` if it is not JSON).
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }

    #[must_use]
    pub fn is(&self, method: &Method, path: &str) -> bool {
        &self.method == method && self.path == path
    }

    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("multipart/form-data"))
    }
}

// ============================================================================
// Fake Catalog Store
// ============================================================================

#[derive(Default)]
struct Catalog {
    categories: Vec<Value>,
    subcategories: Vec<Value>,
    products: Vec<Value>,
    bare_lists: bool,
    token: String,
    failures: HashMap<(Method, String), (StatusCode, Value)>,
    requests: Vec<Recorded>,
}

impl Catalog {
    fn product_mut(&mut self, id: &str) -> Option<&mut serde_json::Map<String, Value>> {
        self.products
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|p| p.get("_id").and_then(Value::as_str) == Some(id))
    }

    fn list(&self, items: &[Value]) -> Json<Value> {
        if self.bare_lists {
            Json(Value::Array(items.to_vec()))
        } else {
            Json(json!({ "success": true, "data": items }))
        }
    }
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<Catalog>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Catalog> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-process Catalog Store.
///
/// Admin routes require `Authorization: Bearer <token>` with the token
/// handed out by the login route. Failures can be injected per route with
/// [`FakeCatalogStore::fail`].
pub struct FakeCatalogStore {
    addr: SocketAddr,
    shared: Shared,
    server: JoinHandle<()>,
}

impl Drop for FakeCatalogStore {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl FakeCatalogStore {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let shared = Shared::default();
        shared.lock().token = admin_token(FAR_FUTURE);

        let app = router(shared.clone());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Catalog Store");
        let addr = listener.local_addr().expect("Failed to read local address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            shared,
            server,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The token the login route hands out and the admin routes accept.
    #[must_use]
    pub fn token(&self) -> String {
        self.shared.lock().token.clone()
    }

    /// Configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected.
    #[must_use]
    pub fn config(&self) -> AdminConfig {
        AdminConfig::for_base(&self.base_url()).expect("valid base URL")
    }

    /// Client logged in with the server's token.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self) -> CatalogClient {
        let session = Session::new(SecretString::from(self.token()));
        CatalogClient::new(&self.config(), session).expect("client builds")
    }

    pub fn set_categories(&self, categories: Vec<Value>) {
        self.shared.lock().categories = categories;
    }

    pub fn set_subcategories(&self, subcategories: Vec<Value>) {
        self.shared.lock().subcategories = subcategories;
    }

    pub fn set_products(&self, products: Vec<Value>) {
        self.shared.lock().products = products;
    }

    /// Answer list routes with a bare array instead of `{"data": [...]}`.
    pub fn serve_bare_lists(&self, bare: bool) {
        self.shared.lock().bare_lists = bare;
    }

    /// Make `method path` answer `status` with `body` from now on.
    pub fn fail(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.shared
            .lock()
            .failures
            .insert((method, path.to_string()), (status, body));
    }

    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.lock().requests.clone()
    }

    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.is(method, path))
            .collect()
    }

    /// Current server-side state of one product.
    #[must_use]
    pub fn product(&self, id: &str) -> Option<Value> {
        self.shared
            .lock()
            .product_mut(id)
            .map(|p| Value::Object(p.clone()))
    }
}

fn router(shared: Shared) -> Router {
    Router::new()
        .route("/api/admin/auth/login", post(login))
        .route("/api/admin/category", get(categories))
        .route("/api/admin/subcategory", get(subcategories))
        .route("/api/admin/subcategory/positions", patch(subcategory_positions))
        .route("/api/admin/product", get(products))
        .route("/api/admin/product/positions", patch(product_positions))
        .route(
            "/api/admin/product/{id}",
            put(update_product).delete(delete_product),
        )
        .route("/api/admin/product/{id}/stock", put(set_stock))
        .route("/api/admin/product/{id}/status", put(set_status))
        .layer(middleware::from_fn_with_state(shared.clone(), gate))
        .with_state(shared)
}

/// Record the request, then apply injected failures and the bearer check.
async fn gate(State(shared): State<Shared>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let Ok(bytes) = to_bytes(body, usize::MAX).await else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let header_str = |headers: &HeaderMap, name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let path = parts.uri.path().to_string();
    let recorded = Recorded {
        method: parts.method.clone(),
        path: path.clone(),
        query: parts.uri.query().map(str::to_string),
        authorization: header_str(&parts.headers, header::AUTHORIZATION),
        content_type: header_str(&parts.headers, header::CONTENT_TYPE),
        body: String::from_utf8_lossy(&bytes).into_owned(),
    };

    let rejection = {
        let mut catalog = shared.lock();
        let expected = format!("Bearer {}", catalog.token);
        let rejection = if let Some((status, body)) =
            catalog.failures.get(&(parts.method.clone(), path.clone()))
        {
            Some((*status, body.clone()))
        } else if path != "/api/admin/auth/login"
            && recorded.authorization.as_deref() != Some(expected.as_str())
        {
            Some((
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "message": "Not authorized, token failed" }),
            ))
        } else {
            None
        };
        catalog.requests.push(recorded);
        rejection
    };

    if let Some((status, body)) = rejection {
        return (status, Json(body)).into_response();
    }
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(State(shared): State<Shared>, Json(credentials): Json<Credentials>) -> Response {
    if credentials.email == ADMIN_EMAIL && credentials.password == ADMIN_PASSWORD {
        let token = shared.lock().token.clone();
        Json(json!({ "success": true, "token": token })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Invalid email or password" })),
        )
            .into_response()
    }
}

async fn categories(State(shared): State<Shared>) -> Json<Value> {
    let catalog = shared.lock();
    catalog.list(&catalog.categories)
}

async fn subcategories(State(shared): State<Shared>) -> Json<Value> {
    let catalog = shared.lock();
    catalog.list(&catalog.subcategories)
}

async fn products(State(shared): State<Shared>) -> Json<Value> {
    let catalog = shared.lock();
    catalog.list(&catalog.products)
}

#[derive(Deserialize)]
struct Position {
    id: String,
    position: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubcategoryPositions {
    #[allow(dead_code)]
    category_id: String,
    positions: Vec<Position>,
}

async fn product_positions(
    State(shared): State<Shared>,
    Json(positions): Json<Vec<Position>>,
) -> Json<Value> {
    let mut catalog = shared.lock();
    for update in &positions {
        if let Some(product) = catalog.product_mut(&update.id) {
            product.insert("position".to_string(), json!(update.position));
        }
    }
    Json(json!({ "success": true, "updated": positions.len() }))
}

async fn subcategory_positions(
    State(shared): State<Shared>,
    Json(body): Json<SubcategoryPositions>,
) -> Json<Value> {
    let mut catalog = shared.lock();
    for update in &body.positions {
        if let Some(sub) = catalog
            .subcategories
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|s| s.get("_id").and_then(Value::as_str) == Some(update.id.as_str()))
        {
            sub.insert("position".to_string(), json!(update.position));
        }
    }
    Json(json!({ "success": true }))
}

fn set_product_field(shared: &Shared, id: &str, field: &str, value: Value) -> Response {
    match shared.lock().product_mut(id) {
        Some(product) => {
            product.insert(field.to_string(), value);
            Json(json!({ "success": true })).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Product not found" })),
        )
            .into_response(),
    }
}

async fn set_stock(
    State(shared): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    set_product_field(&shared, &id, "stock", body["stock"].clone())
}

async fn set_status(
    State(shared): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    set_product_field(&shared, &id, "status", body["status"].clone())
}

/// General multipart product update; only plain text fields are applied.
async fn update_product(
    State(shared): State<Shared>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if let Ok(text) = field.text().await {
            fields.push((name, text));
        }
    }

    let mut response = StatusCode::BAD_REQUEST.into_response();
    for (name, text) in fields {
        let value = match name.as_str() {
            "stock" => text.parse::<u32>().map_or(Value::Null, |n| json!(n)),
            "status" => json!(text == "true"),
            _ => json!(text),
        };
        response = set_product_field(&shared, &id, &name, value);
    }
    response
}

async fn delete_product(State(shared): State<Shared>, Path(id): Path<String>) -> Response {
    let mut catalog = shared.lock();
    let before = catalog.products.len();
    catalog
        .products
        .retain(|p| p.get("_id").and_then(Value::as_str) != Some(id.as_str()));
    if catalog.products.len() < before {
        Json(json!({ "success": true, "message": "Product deleted" })).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Product not found" })),
        )
            .into_response()
    }
}
