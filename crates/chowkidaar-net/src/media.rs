//! URLs for evidence images.
//!
//! Image bytes are served by the media collaborator, keyed by event id. The
//! client only builds the authenticated URL; fetching and decoding belong to
//! whoever renders it. The token travels as a query parameter because image
//! elements cannot set headers.

use std::sync::Arc;

use reqwest::Url;

use chowkidaar_shared::EventId;

use crate::auth::TokenProvider;
use crate::error::{ApiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Frame,
    Thumbnail,
}

impl ImageKind {
    fn path_segment(self) -> &'static str {
        match self {
            ImageKind::Frame => "frame",
            ImageKind::Thumbnail => "thumbnail",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaUrls {
    api_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl MediaUrls {
    pub fn new(api_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// `{api}/events/{id}/{frame|thumbnail}`, with `?token=` when a token is available.
    pub fn event_image(&self, event: EventId, kind: ImageKind) -> Result<Url> {
        let raw = format!("{}/events/{}/{}", self.api_url, event, kind.path_segment());
        let mut url = Url::parse(&raw).map_err(|e| ApiError::Url(format!("{raw}: {e}")))?;
        if let Some(token) = self.tokens.access_token() {
            url.query_pairs_mut().append_pair("token", &token);
        }
        Ok(url)
    }
}
