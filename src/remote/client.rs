use crate::config::{BackendConfig, Config};
use crate::remote::{Filter, Order, RemoteCollection, RemoteError, Row};
use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// REST client for a PostgREST-style backend (the Supabase REST API)
#[derive(Clone)]
pub struct PostgrestClient {
  http: reqwest::Client,
  base: Url,
}

impl PostgrestClient {
  pub fn new(config: &BackendConfig) -> Result<Self> {
    let api_key = Config::get_api_key()?;
    Self::with_api_key(config, &api_key)
  }

  fn with_api_key(config: &BackendConfig, api_key: &str) -> Result<Self> {
    let mut headers = HeaderMap::new();
    let key =
      HeaderValue::from_str(api_key).map_err(|e| eyre!("API key is not a valid header: {}", e))?;
    let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
      .map_err(|e| eyre!("API key is not a valid header: {}", e))?;
    headers.insert("apikey", key);
    headers.insert(AUTHORIZATION, bearer);

    let http = reqwest::Client::builder()
      .default_headers(headers)
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    let base = rest_base(&config.url)?;

    Ok(Self { http, base })
  }

  /// URL of a collection's REST endpoint
  fn endpoint(&self, collection: &str) -> Result<Url, RemoteError> {
    self
      .base
      .join(collection)
      .map_err(|source| RemoteError::Endpoint {
        collection: collection.to_string(),
        source,
      })
  }

  /// Send a request and decode the JSON array body
  async fn rows(&self, request: RequestBuilder) -> Result<Vec<Row>, RemoteError> {
    let response = check(request.send().await?).await?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
  }
}

/// Normalize a project URL to its `/rest/v1/` root.
fn rest_base(url: &str) -> Result<Url> {
  let mut base = Url::parse(url).map_err(|e| eyre!("Invalid backend url {}: {}", url, e))?;
  if !base.path().ends_with('/') {
    let path = format!("{}/", base.path());
    base.set_path(&path);
  }
  if !base.path().ends_with("rest/v1/") {
    base = base
      .join("rest/v1/")
      .map_err(|e| eyre!("Invalid backend url {}: {}", url, e))?;
  }
  Ok(base)
}

/// Turn a non-success response into `RemoteError::Status`
async fn check(response: Response) -> Result<Response, RemoteError> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }
  let body = response.text().await.unwrap_or_default();
  Err(RemoteError::Status {
    status: status.as_u16(),
    body,
  })
}

fn order_param(order: Order) -> String {
  format!(
    "{}.{}",
    order.column,
    if order.ascending { "asc" } else { "desc" }
  )
}

fn id_param(id: &str) -> String {
  format!("eq.{}", id)
}

/// Quote a value that would otherwise break a logical filter list
fn quote_value(value: &str) -> String {
  if value.contains([',', '(', ')', ':', '"']) {
    format!("\"{}\"", value.replace('"', "\\\""))
  } else {
    value.to_string()
  }
}

impl Filter {
  /// Inline form used inside `or=(...)`
  fn condition(&self) -> String {
    match self {
      Filter::Eq { column, value } => format!("{}.eq.{}", column, quote_value(value)),
      Filter::Contains { column, needle } => {
        format!("{}.ilike.{}", column, quote_value(&format!("*{}*", needle)))
      }
      Filter::Any(filters) => format!("or({})", join_conditions(filters)),
    }
  }

  /// Query-string form: one `(key, value)` pair
  fn query_pair(&self) -> (String, String) {
    match self {
      Filter::Eq { column, value } => (column.clone(), format!("eq.{}", value)),
      Filter::Contains { column, needle } => (column.clone(), format!("ilike.*{}*", needle)),
      Filter::Any(filters) => ("or".to_string(), format!("({})", join_conditions(filters))),
    }
  }
}

fn join_conditions(filters: &[Filter]) -> String {
  filters
    .iter()
    .map(Filter::condition)
    .collect::<Vec<_>>()
    .join(",")
}

#[async_trait]
impl RemoteCollection for PostgrestClient {
  async fn list(&self, collection: &str, order: Option<Order>) -> Result<Vec<Row>, RemoteError> {
    let mut query = vec![("select".to_string(), "*".to_string())];
    if let Some(order) = order {
      query.push(("order".to_string(), order_param(order)));
    }

    debug!(collection, "listing collection");
    let request = self.http.get(self.endpoint(collection)?).query(&query);
    self.rows(request).await
  }

  async fn insert(&self, collection: &str, row: Row) -> Result<Row, RemoteError> {
    let request = self
      .http
      .post(self.endpoint(collection)?)
      .header("Prefer", "return=representation")
      .json(&[row]);

    self
      .rows(request)
      .await?
      .into_iter()
      .next()
      .ok_or_else(|| RemoteError::EmptyRepresentation {
        collection: collection.to_string(),
      })
  }

  async fn update(&self, collection: &str, id: &str, row: Row) -> Result<Row, RemoteError> {
    let request = self
      .http
      .patch(self.endpoint(collection)?)
      .query(&[("id", id_param(id))])
      .header("Prefer", "return=representation")
      .json(&row);

    self
      .rows(request)
      .await?
      .into_iter()
      .next()
      .ok_or_else(|| RemoteError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
      })
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
    let request = self
      .http
      .delete(self.endpoint(collection)?)
      .query(&[("id", id_param(id))]);

    check(request.send().await?).await?;
    Ok(())
  }

  async fn find_first(&self, collection: &str, filter: &Filter) -> Result<Option<Row>, RemoteError> {
    let query = [
      ("select".to_string(), "*".to_string()),
      filter.query_pair(),
      ("limit".to_string(), "1".to_string()),
    ];

    let request = self.http.get(self.endpoint(collection)?).query(&query);
    Ok(self.rows(request).await?.into_iter().next())
  }
}
