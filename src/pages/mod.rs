//! Page controllers. Each page owns its views and forms and is built from a
//! [`Portal`]; loads and submits take `&mut self`.

use std::future::Future;

use crate::Portal;
use crate::error::ApiResult;
use crate::invalidation::Mutation;
use crate::models::NamedRef;

pub mod account;
pub mod admin;
pub mod public;

/// Characters of post content shown on a blog card.
pub const EXCERPT_LEN: usize = 150;

/// Feedback banner shown above a page's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// First `max` characters of `text`, with an ellipsis when something was cut.
pub fn excerpt(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Posts whose author record is gone are shown as written by the admin team.
pub fn author_label(author: Option<&NamedRef>) -> &str {
    author.map(|a| a.name.as_str()).unwrap_or("Admin")
}

/// Token for a privileged call, or the message to show instead.
pub(crate) fn session_token(portal: &Portal) -> Result<String, String> {
    portal
        .require_token()
        .map_err(|e| e.user_message("Please log in first."))
}

/// perform
///
/// Issues one mutation. On success the mutation is recorded so every view it
/// makes stale is re-fetched; on failure the server's message (or `fallback`)
/// is returned for display.
pub(crate) async fn perform<R, Fut>(
    portal: &Portal,
    mutation: Mutation,
    fallback: &str,
    call: Fut,
) -> Result<R, String>
where
    Fut: Future<Output = ApiResult<R>>,
{
    match call.await {
        Ok(response) => {
            portal.invalidations.record(mutation);
            Ok(response)
        }
        Err(e) => {
            tracing::warn!(?mutation, "mutation failed: {}", e);
            Err(e.user_message(fallback))
        }
    }
}
