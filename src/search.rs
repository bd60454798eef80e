//! Web-search fallback for files the panel cannot render in place.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::QUERY_PLACEHOLDER;
use crate::mount::{el, ViewNode};
use crate::target::TargetFile;

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Class of the notice that tracks the search frame's load state.
pub const SEARCH_STATUS_CLASS: &str = "docpanel-search-status";
pub const SEARCH_LOADING_TEXT: &str = "Loading search results…";
pub const SEARCH_FAILED_TEXT: &str = "Failed to load, check your network connection";

/// Drop a trailing `.ext` where `ext` contains neither `/` nor `.`.
#[must_use]
pub fn strip_extension(term: &str) -> &str {
    match term.rfind('.') {
        Some(dot) => {
            let ext = term.get(dot + 1..).unwrap_or_default();
            if ext.is_empty() || ext.contains('/') {
                term
            } else {
                term.get(..dot).unwrap_or(term)
            }
        }
        None => term,
    }
}

/// Search term for a file: its full path when known (keeps directory
/// context), otherwise its name, minus the final extension.
#[must_use]
pub fn query_term(file: &TargetFile) -> &str {
    strip_extension(file.path().unwrap_or_else(|| file.name()))
}

/// Builds search URLs from a `{query}` template.
#[derive(Debug, Clone)]
pub struct SearchFallback {
    template: String,
}

impl SearchFallback {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Search URL for `file`, with the query term percent-encoded.
    #[must_use]
    pub fn build_query(&self, file: &TargetFile) -> String {
        let term = query_term(file);
        let encoded = utf8_percent_encode(term, URI_COMPONENT).to_string();
        tracing::debug!(term, "built search query");
        self.template.replace(QUERY_PLACEHOLDER, &encoded)
    }

    /// The embedded-frame view for `file`: a loading notice followed by the
    /// frame. Mounts clear the notice when the frame loads and swap in
    /// [`SEARCH_FAILED_TEXT`] when it errors.
    #[must_use]
    pub fn view(&self, file: &TargetFile) -> ViewNode {
        el("div")
            .class("docpanel-search")
            .child(
                el("div")
                    .class("docpanel-notice")
                    .class(SEARCH_STATUS_CLASS)
                    .text(SEARCH_LOADING_TEXT),
            )
            .child(
                el("iframe")
                    .class("docpanel-frame")
                    .attr("src", self.build_query(file))
                    .attr("width", "100%")
                    .attr("height", "100%")
                    .attr("frameborder", "0"),
            )
            .into()
    }
}
