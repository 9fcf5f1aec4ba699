//! Document retrieval.
//!
//! [`HttpFetcher`] performs the GET; [`FetchBroker`] hosts it behind a
//! message channel and [`FetchClient`] is the handle the pipeline uses.

mod broker;
mod config;
mod http;
mod messages;
mod protocols;

pub use broker::{FetchBroker, FetchClient, DEFAULT_BROKER_CAPACITY};
pub use config::FetchConfig;
pub use http::HttpFetcher;
pub use messages::{
    host_of, user_facing_message, FetchContentRequest, FetchContentResponse, FETCH_CONTENT_ACTION,
};
pub use protocols::{ContentFetcher, FetchResult};
