use thiserror::Error;

/// Transport and backend failures from a remote collection.
#[derive(Debug, Error)]
pub enum RemoteError {
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("backend returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("could not decode response: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("invalid endpoint for collection {collection}: {source}")]
  Endpoint {
    collection: String,
    #[source]
    source: url::ParseError,
  },

  #[error("no row with id {id} in {collection}")]
  NotFound { collection: String, id: String },

  #[error("backend returned no representation for {collection}")]
  EmptyRepresentation { collection: String },
}
