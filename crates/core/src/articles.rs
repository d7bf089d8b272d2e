//! Help center article models and write payloads
//!
//! Zero I/O: the shell sends these payloads and deserializes responses into
//! these models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pagination::{Pages, Paginated};

/// Admin credited for writes when neither the caller nor the configuration
/// names one.
pub const DEFAULT_AUTHOR_ID: &str = "6409529";

// ============================================================================
// Domain Models (Input from API)
// ============================================================================

/// Publication state of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleState {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ArticleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleState::Draft => "draft",
            ArticleState::Published => "published",
            ArticleState::Archived => "archived",
        }
    }
}

impl std::fmt::Display for ArticleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArticleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(ArticleState::Draft),
            "published" => Ok(ArticleState::Published),
            "archived" => Ok(ArticleState::Archived),
            other => Err(format!(
                "Invalid article state: {other}. Valid states: draft, published, archived"
            )),
        }
    }
}

/// Article as returned by the Intercom API
///
/// Fields this crate does not model are kept in `extra`, so an article can be
/// written back out without losing anything the API sent.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Article {
    #[serde(deserialize_with = "crate::de::id")]
    pub id: String,
    #[serde(rename = "type", default = "article_type")]
    pub article_type: String,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "crate::de::optional_id")]
    pub author_id: Option<String>,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub state: ArticleState,
    #[serde(default, deserialize_with = "crate::de::optional_id")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn article_type() -> String {
    "article".to_string()
}

/// `GET /articles` response
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ArticleList {
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub data: Vec<Article>,
    #[serde(default)]
    pub pages: Option<Pages>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl Paginated for ArticleList {
    type Item = Article;

    fn into_parts(self) -> (Vec<Article>, Option<Pages>) {
        (self.data, self.pages)
    }
}

/// `GET /articles/search` response
///
/// Depending on the API version `data` is either the list of articles itself or
/// an object wrapping it together with search highlights.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ArticleSearchResponse {
    #[serde(default)]
    pub data: ArticleSearchData,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum ArticleSearchData {
    List(Vec<Article>),
    Wrapped {
        #[serde(default)]
        articles: Vec<Article>,
    },
}

impl Default for ArticleSearchData {
    fn default() -> Self {
        ArticleSearchData::List(Vec::new())
    }
}

impl ArticleSearchResponse {
    pub fn into_articles(self) -> Vec<Article> {
        match self.data {
            ArticleSearchData::List(articles) => articles,
            ArticleSearchData::Wrapped { articles } => articles,
        }
    }
}

// ============================================================================
// Write Payloads (Output to API)
// ============================================================================

/// Fields for a new article
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewArticle {
    pub title: String,
    pub body: String,
    pub state: ArticleState,
    pub collection_id: Option<String>,
    /// Overrides the client's acting author for this write
    pub author_id: Option<String>,
}

/// Partial update of an article.
///
/// `None` means "leave the remote value alone" and is never serialized.
/// `Some(String::new())` is sent as an explicit empty value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ArticlePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ArticleState>,
    #[serde(rename = "parent_id", skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    /// Overrides the client's acting author for this write
    #[serde(skip)]
    pub author_id: Option<String>,
}

impl ArticlePatch {
    pub fn with_state(state: ArticleState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    pub fn with_collection(collection_id: impl Into<String>) -> Self {
        Self {
            collection_id: Some(collection_id.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.state.is_none()
            && self.collection_id.is_none()
    }
}

/// `POST /articles` body
#[derive(Debug, Serialize, PartialEq)]
pub struct CreateArticleRequest<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub author_id: &'a str,
    pub state: ArticleState,
    #[serde(rename = "type")]
    pub article_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<&'a str>,
}

/// `PUT /articles/{id}` body: the acting author plus whatever the patch sets
#[derive(Debug, Serialize, PartialEq)]
pub struct UpdateArticleRequest<'a> {
    pub author_id: &'a str,
    #[serde(flatten)]
    pub patch: &'a ArticlePatch,
}

// ============================================================================
// Pure Transformation Functions
// ============================================================================

/// Pick the author credited for a write: the per-call override, else the
/// client's configured identity.
pub fn acting_author<'a>(explicit: Option<&'a str>, configured: &'a str) -> &'a str {
    explicit.filter(|id| !id.trim().is_empty()).unwrap_or(configured)
}

/// Build the create payload for `article`, credited to `default_author` unless
/// the article names its own author.
pub fn build_create_request<'a>(
    article: &'a NewArticle,
    default_author: &'a str,
) -> CreateArticleRequest<'a> {
    CreateArticleRequest {
        title: &article.title,
        body: &article.body,
        author_id: acting_author(article.author_id.as_deref(), default_author),
        state: article.state,
        article_type: "article",
        parent_id: article.collection_id.as_deref(),
    }
}

/// Build the update payload for `patch`, credited to `default_author` unless
/// the patch names its own author.
pub fn build_update_request<'a>(
    patch: &'a ArticlePatch,
    default_author: &'a str,
) -> UpdateArticleRequest<'a> {
    UpdateArticleRequest {
        author_id: acting_author(patch.author_id.as_deref(), default_author),
        patch,
    }
}

/// Keep only the articles in `state`
pub fn filter_by_state(articles: Vec<Article>, state: ArticleState) -> Vec<Article> {
    articles.into_iter().filter(|a| a.state == state).collect()
}

// ============================================================================
// Tests
// ============================================================================
