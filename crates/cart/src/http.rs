//! HTTP client for the storefront backend's cart endpoints.
//!
//! Speaks the backend's JSON: line items come back with the product document
//! embedded under `productId`, ids are Mongo-style `_id` strings and prices
//! are rupee numbers.

use std::time::Duration;

use async_trait::async_trait;
use common::CartItemId;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::item::CartLineItem;
use crate::money::Money;
use crate::service::{CartDataService, ServiceError, ServiceReply};

const LIST_PATH: &str = "view-card-product";
const UPDATE_PATH: &str = "update-cart-product";
const DELETE_PATH: &str = "delete-cart-product";

/// Request timeout for every cart call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

/// Cart service backed by the storefront REST API.
#[derive(Debug, Clone)]
pub struct HttpCartDataService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCartDataService {
    /// Creates a client for `base_url` (e.g. `http://localhost:8080/api`).
    ///
    /// `session_cookie` is sent verbatim as the `Cookie` header so the backend's
    /// auth middleware can identify the shopper.
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(
        base_url: impl Into<String>,
        session_cookie: Option<&str>,
    ) -> Result<Self, ServiceError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ServiceError::Transport(format!("invalid session cookie: {e}")))?;
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl CartDataService for HttpCartDataService {
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<ServiceReply<Vec<CartLineItem>>, ServiceError> {
        let response = self.client.get(self.url(LIST_PATH)).send().await?;
        let body: ListResponse = Self::decode(response).await?;

        Ok(ServiceReply {
            success: body.success,
            message: body.message,
            data: body.data.into_iter().map(CartLineItem::from).collect(),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn set_quantity(
        &self,
        item_id: &CartItemId,
        quantity: u32,
    ) -> Result<ServiceReply<()>, ServiceError> {
        let body = UpdateRequest {
            id: item_id.as_str(),
            quantity: Some(quantity),
        };
        let response = self
            .client
            .post(self.url(UPDATE_PATH))
            .json(&body)
            .send()
            .await?;
        let ack: AckResponse = Self::decode(response).await?;
        Ok(ack.into())
    }

    #[tracing::instrument(skip(self))]
    async fn remove(&self, item_id: &CartItemId) -> Result<ServiceReply<()>, ServiceError> {
        let body = UpdateRequest {
            id: item_id.as_str(),
            quantity: None,
        };
        let response = self
            .client
            .post(self.url(DELETE_PATH))
            .json(&body)
            .send()
            .await?;
        let ack: AckResponse = Self::decode(response).await?;
        Ok(ack.into())
    }
}

// -- Wire types --

#[derive(Serialize)]
struct UpdateRequest<'a> {
    #[serde(rename = "_id")]
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<u32>,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Vec<CartProductDto>,
}

#[derive(Deserialize)]
struct AckResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

impl From<AckResponse> for ServiceReply<()> {
    fn from(ack: AckResponse) -> Self {
        ServiceReply {
            success: ack.success,
            message: ack.message,
            data: (),
        }
    }
}

#[derive(Deserialize)]
struct CartProductDto {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "productId", default)]
    product: Option<ProductDto>,
    #[serde(default)]
    quantity: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDto {
    #[serde(rename = "_id", default)]
    id: String,
    #[serde(default)]
    product_name: String,
    #[serde(default)]
    product_image: Vec<String>,
    #[serde(default)]
    selling_price: Option<f64>,
    #[serde(default)]
    category: Option<String>,
}

impl From<CartProductDto> for CartLineItem {
    fn from(dto: CartProductDto) -> Self {
        let product = dto.product.unwrap_or(ProductDto {
            id: String::new(),
            product_name: String::new(),
            product_image: Vec::new(),
            selling_price: None,
            category: None,
        });

        CartLineItem {
            id: dto.id.into(),
            product_ref: product.id.into(),
            product_name: product.product_name,
            product_image: product.product_image.into_iter().next(),
            category: product.category,
            quantity: dto.quantity,
            unit_price: product.selling_price.and_then(Money::from_rupee_amount),
        }
    }
}
