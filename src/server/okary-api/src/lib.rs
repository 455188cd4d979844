//! # Okary API
//!
//! HTTP layer for Okary.
//!
//! ## Endpoints
//!
//! - `POST /login` - exchange credentials for a bearer token
//! - `POST /graphql` - GraphQL over HTTP
//! - `GET /graphql` - GraphQL over WebSocket (`graphql-transport-ws`, `graphql-ws`)
//! - `POST /images/{kind}` - upload song or album artwork
//! - `GET /images/{kind}/{filename}` - download artwork
//! - `GET /health` - liveness

#![forbid(unsafe_code)]

pub mod error;
pub mod extract;
pub mod graphql;
pub mod images;
pub mod login;
pub mod policy;
pub mod router;
pub mod schema;
pub mod state;

pub use error::ApiError;
pub use extract::RequestPrincipal;
pub use login::LoginResponse;
pub use router::{router, DEFAULT_GRAPHQL_PATH};
pub use schema::{build_schema, OkarySchema};
pub use state::{AppState, Catalog};
