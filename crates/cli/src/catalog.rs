//! Read-only client for the catalog API.
//!
//! # Endpoints
//!
//! - `GET {base}/products` - optionally filtered by `?label=`, `?categoryId=`
//!   or `?search=`
//! - `GET {base}/products/{id}`
//! - `GET {base}/categories`
//! - `GET {base}/categories/{id}`
//!
//! Responses are cached with `moka` for 5 minutes so repeated lookups of the
//! same product while filling a cart do not hit the API again.

use std::sync::Arc;
use std::time::Duration;

use glossy_core::{Category, CategoryId, Product, ProductId};
use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The product does not exist.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// The category does not exist.
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// The API answered with a non-success status.
    #[error("Catalog API returned status {0}")]
    Status(u16),

    /// The base URL cannot have path segments appended.
    #[error("Invalid catalog base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Product list filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductFilter {
    All,
    Label(String),
    Category(CategoryId),
    Search(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Product(ProductId),
    Products(ProductFilter),
    Category(CategoryId),
    Categories,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Arc<Vec<Product>>),
    Category(Box<Category>),
    Categories(Arc<Vec<Category>>),
}

/// Client for the catalog API.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidBaseUrl` for URLs such as `mailto:`
    /// that cannot carry a path.
    pub fn new(base_url: Url) -> Result<Self, CatalogError> {
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl(base_url.to_string()));
        }

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url,
                cache,
            }),
        })
    }

    /// Fetch a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` on 404, or an HTTP/decoding error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.product_url(id)?;
        let response = self.inner.client.get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id));
        }
        if !status.is_success() {
            tracing::error!(status = %status, "Catalog API returned non-success status");
            return Err(CatalogError::Status(status.as_u16()));
        }

        let product: Product = response.json().await?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// List products.
    ///
    /// # Errors
    ///
    /// Returns an HTTP/decoding error or `CatalogError::Status`.
    #[instrument(skip(self))]
    pub async fn products(&self, filter: ProductFilter) -> Result<Vec<Product>, CatalogError> {
        let key = CacheKey::Products(filter.clone());
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product list");
            return Ok(products.as_ref().clone());
        }

        let url = self.products_url(&filter)?;
        let response = self.inner.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, "Catalog API returned non-success status");
            return Err(CatalogError::Status(status.as_u16()));
        }

        let products: Vec<Product> = response.json().await?;
        self.inner
            .cache
            .insert(key, CacheValue::Products(Arc::new(products.clone())))
            .await;
        Ok(products)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an HTTP/decoding error or `CatalogError::Status`.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for category list");
            return Ok(categories.as_ref().clone());
        }

        let url = self.categories_url()?;
        let response = self.inner.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, "Catalog API returned non-success status");
            return Err(CatalogError::Status(status.as_u16()));
        }

        let categories: Vec<Category> = response.json().await?;
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::new(categories.clone())),
            )
            .await;
        Ok(categories)
    }

    /// Fetch a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CategoryNotFound` on 404, or an HTTP/decoding
    /// error.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn category(&self, id: CategoryId) -> Result<Category, CatalogError> {
        let key = CacheKey::Category(id);
        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let url = self.category_url(id)?;
        let response = self.inner.client.get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::CategoryNotFound(id));
        }
        if !status.is_success() {
            tracing::error!(status = %status, "Catalog API returned non-success status");
            return Err(CatalogError::Status(status.as_u16()));
        }

        let category: Category = response.json().await?;
        self.inner
            .cache
            .insert(key, CacheValue::Category(Box::new(category.clone())))
            .await;
        Ok(category)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn product_url(&self, id: ProductId) -> Result<Url, CatalogError> {
        self.endpoint(&["products", &id.to_string()])
    }

    fn categories_url(&self) -> Result<Url, CatalogError> {
        self.endpoint(&["categories"])
    }

    fn category_url(&self, id: CategoryId) -> Result<Url, CatalogError> {
        self.endpoint(&["categories", &id.to_string()])
    }

    fn products_url(&self, filter: &ProductFilter) -> Result<Url, CatalogError> {
        let mut url = self.endpoint(&["products"])?;
        match filter {
            ProductFilter::All => {}
            ProductFilter::Label(label) => {
                url.query_pairs_mut().append_pair("label", label);
            }
            ProductFilter::Category(id) => {
                url.query_pairs_mut()
                    .append_pair("categoryId", &id.to_string());
            }
            ProductFilter::Search(term) => {
                url.query_pairs_mut().append_pair("search", term);
            }
        }
        Ok(url)
    }
}
