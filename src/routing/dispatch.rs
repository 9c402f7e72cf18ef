use crate::assets::AssetStore;
use crate::config::Config;
use crate::error::{Result, ServerError};
use crate::handlers::{image, text};
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::movie::MovieClient;
use crate::routing::classifier::{ResourceDecision, classify};

/// Turns a request into exactly one response.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    assets: AssetStore,
    movies: MovieClient,
    not_found_page: String,
}

impl Dispatcher {
    pub fn new(assets: AssetStore, movies: MovieClient, not_found_page: impl Into<String>) -> Self {
        Self {
            assets,
            movies,
            not_found_page: not_found_page.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(
            AssetStore::new(cfg.static_files.root.clone()),
            MovieClient::new(&cfg.movie_api)?,
            cfg.static_files.not_found_page.clone(),
        ))
    }

    /// Produces the response for `request`.
    ///
    /// Lookup failures become `502 Bad Gateway`; every other failure is
    /// answered with the not-found page. Only a failure to read that page
    /// is returned as an error.
    pub async fn dispatch(&self, request: &Request) -> Result<Response> {
        if request.method != Method::GET {
            tracing::warn!(method = ?request.method, path = %request.path, "Unsupported method");
            return self.not_found().await;
        }

        let decision = classify(&request.path);
        tracing::debug!(path = %request.path, ?decision, "Request classified");

        match self.respond(&request.path, decision).await {
            Ok(response) => Ok(response),
            Err(e @ ServerError::LookupFailed { .. }) => {
                tracing::warn!(path = %request.path, error = %e, "Answering with bad gateway");
                Ok(Response::bad_gateway())
            }
            Err(e) => {
                tracing::warn!(path = %request.path, error = %e, "Answering with not-found page");
                self.not_found().await
            }
        }
    }

    async fn respond(&self, raw_path: &str, decision: ResourceDecision) -> Result<Response> {
        match decision {
            ResourceDecision::ApiProxy { title } => text::movie_fragment(&self.movies, &title).await,
            ResourceDecision::TextStatic { path, .. } if path == "/" => Ok(text::search_page()),
            ResourceDecision::TextStatic { path, extension } => {
                text::static_text(&self.assets, &path, extension).await
            }
            ResourceDecision::ImageStatic { path, extension } => {
                image::static_image(&self.assets, &path, extension).await
            }
            ResourceDecision::NotFound => Err(ServerError::ResourceNotFound(raw_path.to_string())),
        }
    }

    async fn not_found(&self) -> Result<Response> {
        text::not_found_page(&self.assets, &self.not_found_page).await
    }
}
