//! Catalog Store REST client.

use std::sync::Arc;

use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use u1r_core::positions::PositionUpdate;
use u1r_core::{
    Category, CategoryId, Email, ListEnvelope, Mode, Product, ProductId, Subcategory,
    SubcategoryId,
};
use url::Url;

use super::error::message_from_body;
use super::{CatalogError, CatalogStore, ProductField};
use crate::config::AdminConfig;
use crate::session::{AuthError, Session};

const LOGIN_PATH: &str = "api/admin/auth/login";
const CATEGORY_PATH: &str = "api/admin/category";
const SUBCATEGORY_PATH: &str = "api/admin/subcategory";
const SUBCATEGORY_POSITIONS_PATH: &str = "api/admin/subcategory/positions";
const PRODUCT_PATH: &str = "api/admin/product";
const PRODUCT_POSITIONS_PATH: &str = "api/admin/product/positions";

/// Catalog Store API client.
///
/// Every admin call carries `Authorization: Bearer <token>` from the
/// injected [`Session`]; a missing or expired token fails before any
/// request is sent. List responses are accepted both as `{"data": [...]}`
/// and as a bare array.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    http: reqwest::Client,
    /// Base URL, ending in `/`
    base: Url,
    session: Session,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base", &self.inner.base.as_str())
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubcategoryPositionsRequest<'a> {
    category_id: &'a CategoryId,
    positions: &'a [PositionUpdate<SubcategoryId>],
}

impl CatalogClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Http` if the HTTP client cannot be built.
    pub fn new(config: &AdminConfig, session: Session) -> Result<Self, CatalogError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_http(
            builder.build()?,
            config.api_base.clone(),
            session,
        ))
    }

    /// Create a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http(http: reqwest::Client, base: Url, session: Session) -> Self {
        Self {
            inner: Arc::new(CatalogClientInner {
                http,
                base,
                session,
            }),
        }
    }

    /// Same connection pool and base URL, different session.
    #[must_use]
    pub fn with_session(&self, session: Session) -> Self {
        Self::with_http(self.inner.http.clone(), self.inner.base.clone(), session)
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.inner.base
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Exchange admin credentials for a token.
    ///
    /// Does not need (or use) the client's session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::LoginFailed` (wrapped) when the credentials are
    /// rejected or no token comes back, or another `CatalogError` on
    /// transport failure.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<SecretString, CatalogError> {
        let response = self
            .inner
            .http
            .post(self.endpoint(LOGIN_PATH)?)
            .json(&LoginRequest {
                email: email.as_str(),
                password: password.expose_secret(),
            })
            .send()
            .await?;

        let response = match check(response).await {
            Ok(response) => response,
            Err(CatalogError::Unauthorized { message }) => {
                return Err(login_failed(message).into());
            }
            Err(CatalogError::Status { status, message }) if (400..500).contains(&status) => {
                return Err(login_failed(message).into());
            }
            Err(e) => return Err(e),
        };

        let body: LoginResponse = serde_json::from_str(&response.text().await?)?;
        let token = body
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::LoginFailed("no token in response".to_string()))?;

        debug!("Admin login succeeded");
        Ok(SecretString::from(token))
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        Ok(self.inner.base.join(path)?)
    }

    fn endpoint_for_mode(&self, path: &str, mode: Mode) -> Result<Url, CatalogError> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut().append_pair("mode", mode.as_str());
        Ok(url)
    }

    fn product_endpoint(&self, id: &ProductId, suffix: Option<&str>) -> Result<Url, CatalogError> {
        let mut url = self.endpoint(PRODUCT_PATH)?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(id.as_str())
            .extend(suffix);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, CatalogError> {
        let token = self.inner.session.bearer()?;
        Ok(request.bearer_auth(token.expose_secret()))
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
        mode: Mode,
    ) -> Result<Vec<T>, CatalogError> {
        let url = self.endpoint_for_mode(path, mode)?;
        let response = self.authorized(self.inner.http.get(url))?.send().await?;
        let body = check(response).await?.text().await?;
        let envelope: ListEnvelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.into_items())
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(), CatalogError> {
        let response = self.authorized(request)?.send().await?;
        check(response).await?;
        Ok(())
    }
}

/// Turn a non-success response into a `CatalogError`.
async fn check(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = message_from_body(&body);
    warn!(
        status = status.as_u16(),
        message = message.as_deref().unwrap_or(""),
        "Catalog Store request failed"
    );

    if status == StatusCode::UNAUTHORIZED {
        Err(CatalogError::Unauthorized { message })
    } else {
        Err(CatalogError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

fn login_failed(message: Option<String>) -> AuthError {
    AuthError::LoginFailed(message.unwrap_or_else(|| "Invalid credentials".to_string()))
}

impl CatalogStore for CatalogClient {
    #[instrument(skip(self), fields(mode = %mode))]
    async fn categories(&self, mode: Mode) -> Result<Vec<Category>, CatalogError> {
        let categories: Vec<Category> = self.fetch_list(CATEGORY_PATH, mode).await?;
        debug!(count = categories.len(), "Fetched categories");
        Ok(categories)
    }

    #[instrument(skip(self), fields(mode = %mode))]
    async fn subcategories(&self, mode: Mode) -> Result<Vec<Subcategory>, CatalogError> {
        let subcategories: Vec<Subcategory> = self.fetch_list(SUBCATEGORY_PATH, mode).await?;
        debug!(count = subcategories.len(), "Fetched subcategories");
        Ok(subcategories)
    }

    #[instrument(skip(self), fields(mode = %mode))]
    async fn products(&self, mode: Mode) -> Result<Vec<Product>, CatalogError> {
        let products: Vec<Product> = self.fetch_list(PRODUCT_PATH, mode).await?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    #[instrument(skip(self, updates), fields(count = updates.len()))]
    async fn update_product_positions(
        &self,
        updates: &[PositionUpdate<ProductId>],
    ) -> Result<(), CatalogError> {
        let url = self.endpoint(PRODUCT_POSITIONS_PATH)?;
        self.execute(self.inner.http.patch(url).json(updates)).await
    }

    #[instrument(skip(self, updates), fields(mode = %mode, category = %category, count = updates.len()))]
    async fn update_subcategory_positions(
        &self,
        mode: Mode,
        category: &CategoryId,
        updates: &[PositionUpdate<SubcategoryId>],
    ) -> Result<(), CatalogError> {
        let url = self.endpoint_for_mode(SUBCATEGORY_POSITIONS_PATH, mode)?;
        let body = SubcategoryPositionsRequest {
            category_id: category,
            positions: updates,
        };
        self.execute(self.inner.http.patch(url).json(&body)).await
    }

    #[instrument(skip(self), fields(product = %id))]
    async fn set_product_stock(&self, id: &ProductId, stock: u32) -> Result<(), CatalogError> {
        let url = self.product_endpoint(id, Some("stock"))?;
        let body = serde_json::json!({ "stock": stock });
        self.execute(self.inner.http.put(url).json(&body)).await
    }

    #[instrument(skip(self), fields(product = %id))]
    async fn set_product_status(&self, id: &ProductId, status: bool) -> Result<(), CatalogError> {
        let url = self.product_endpoint(id, Some("status"))?;
        let body = serde_json::json!({ "status": status });
        self.execute(self.inner.http.put(url).json(&body)).await
    }

    #[instrument(skip(self), fields(product = %id))]
    async fn update_product_field(
        &self,
        id: &ProductId,
        field: ProductField,
    ) -> Result<(), CatalogError> {
        let url = self.product_endpoint(id, None)?;
        let (name, value) = field.form_pair();
        let form = reqwest::multipart::Form::new().text(name, value);
        self.execute(self.inner.http.put(url).multipart(form)).await
    }

    #[instrument(skip(self), fields(product = %id))]
    async fn delete_product(&self, id: &ProductId) -> Result<(), CatalogError> {
        let url = self.product_endpoint(id, None)?;
        self.execute(self.inner.http.delete(url)).await
    }
}
