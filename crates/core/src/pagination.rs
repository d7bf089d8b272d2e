//! Next-page cursor handling for Intercom list responses
//!
//! Intercom list endpoints return a `pages` object. Its `next` member is either
//! an absolute URL to request verbatim, or an object carrying a
//! `starting_after` cursor to send back on the same endpoint. This module turns
//! that into a [`Cursor`] and decides when a listing is finished; the request
//! loop itself lives in the shell.

use serde::{Deserialize, Serialize};

/// `pages` object attached to list responses
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Pages {
    #[serde(default)]
    pub next: Option<NextPage>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Raw `pages.next` value as sent by the API
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum NextPage {
    Url(String),
    Cursor {
        #[serde(default)]
        page: Option<u32>,
        #[serde(default)]
        starting_after: Option<String>,
    },
}

/// Where the next page of a listing comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cursor {
    /// Absolute URL, requested as-is
    Url(String),
    /// Same endpoint and filters, plus `starting_after=<value>`
    StartingAfter(String),
}

/// A list response that can be split into its items and pagination info
pub trait Paginated {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Option<Pages>);
}

/// Decide the cursor for the following request.
///
/// Returns `None` when the response carries no usable cursor, or when the cursor
/// is the same one that produced this response. Longer cycles are the request
/// loop's job to catch.
pub fn next_cursor(pages: Option<&Pages>, previous: Option<&Cursor>) -> Option<Cursor> {
    let cursor = match pages?.next.as_ref()? {
        NextPage::Url(url) => Cursor::Url(url.trim().to_string()),
        NextPage::Cursor { starting_after, .. } => {
            Cursor::StartingAfter(starting_after.as_deref()?.trim().to_string())
        }
    };

    let empty = match &cursor {
        Cursor::Url(value) | Cursor::StartingAfter(value) => value.is_empty(),
    };

    if empty || previous == Some(&cursor) {
        return None;
    }

    Some(cursor)
}
