//! Help center articles: client operations and CLI commands

use std::path::{Path, PathBuf};

use super::{log_write_failure, read_or_default, ApiResult, IntercomClient, IntercomConfig};
use crate::prelude::{println, *};
use colored::Colorize;
use helpcenter_core::articles::{
    build_create_request, build_update_request, filter_by_state, Article, ArticleList,
    ArticlePatch, ArticleSearchResponse, ArticleState, NewArticle,
};
use helpcenter_core::conversations::format_timestamp;
use helpcenter_core::format::format_content;

impl IntercomClient {
    /// All help center articles, following pagination
    pub async fn try_list_articles(&self) -> ApiResult<Vec<Article>> {
        self.paginate::<ArticleList>("articles", &[]).await
    }

    pub async fn list_articles(&self) -> Vec<Article> {
        read_or_default("getting articles", self.try_list_articles().await)
    }

    /// Articles matching `query`, passed through verbatim
    pub async fn try_search_articles(&self, query: &str) -> ApiResult<Vec<Article>> {
        let response: ArticleSearchResponse = self
            .get("articles/search", &[("q", query.to_string())])
            .await?;
        Ok(response.into_articles())
    }

    pub async fn search_articles(&self, query: &str) -> Vec<Article> {
        read_or_default("searching articles", self.try_search_articles(query).await)
    }

    pub async fn get_article(&self, article_id: &str) -> ApiResult<Article> {
        log_write_failure(
            "getting article",
            self.get(&format!("articles/{article_id}"), &[]).await,
        )
    }

    pub async fn create_article(&self, article: &NewArticle) -> ApiResult<Article> {
        let payload = build_create_request(article, self.author_id());
        log_write_failure("creating article", self.post("articles", &payload).await)
    }

    /// Send only the fields set in `patch`, plus the acting author
    pub async fn update_article(&self, article_id: &str, patch: &ArticlePatch) -> ApiResult<Article> {
        let payload = build_update_request(patch, self.author_id());
        log_write_failure(
            "updating article",
            self.put(&format!("articles/{article_id}"), &payload).await,
        )
    }

    pub async fn move_article(&self, article_id: &str, collection_id: &str) -> ApiResult<Article> {
        self.update_article(article_id, &ArticlePatch::with_collection(collection_id))
            .await
    }

    pub async fn publish_article(&self, article_id: &str) -> ApiResult<Article> {
        self.update_article(article_id, &ArticlePatch::with_state(ArticleState::Published))
            .await
    }

    pub async fn archive_article(&self, article_id: &str) -> ApiResult<Article> {
        self.update_article(article_id, &ArticlePatch::with_state(ArticleState::Archived))
            .await
    }
}

/// Article commands
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List all help center articles
    #[clap(name = "list")]
    List(ListOptions),

    /// Show a single article
    #[clap(name = "get")]
    Get(ArticleOptions),

    /// Search articles by title and content
    #[clap(name = "search")]
    Search(SearchOptions),

    /// Create a new article
    #[clap(name = "create")]
    Create(CreateOptions),

    /// Update fields of an existing article
    #[clap(name = "update")]
    Update(UpdateOptions),

    /// Publish an article
    #[clap(name = "publish")]
    Publish(ArticleOptions),

    /// Archive an article
    #[clap(name = "archive")]
    Archive(ArticleOptions),

    /// Move an article to another collection
    #[clap(name = "move")]
    Move(MoveOptions),

    /// Save articles as JSON files
    #[clap(name = "export")]
    Export(ExportOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Only show articles in this state (draft, published, archived)
    #[arg(long)]
    pub state: Option<ArticleState>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ArticleOptions {
    /// Article ID
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct SearchOptions {
    /// Search phrase
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Where an article body comes from
#[derive(Debug, clap::Args, Clone)]
pub struct BodyOptions {
    /// Article body
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the article body from a file
    #[arg(long, value_name = "PATH")]
    pub body_file: Option<PathBuf>,

    /// Treat the body as markdown and convert it to Intercom HTML
    #[arg(long)]
    pub markdown: bool,

    /// Insert the title as a heading at the top of a markdown body
    #[arg(long, requires = "markdown")]
    pub add_title: bool,
}

impl BodyOptions {
    /// Load the body, converting markdown when asked to
    pub fn resolve(&self, title: Option<&str>) -> Result<Option<String>> {
        let raw = match (&self.body, &self.body_file) {
            (Some(body), _) => body.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read body from {}", path.display()))?,
            (None, None) => return Ok(None),
        };

        if !self.markdown {
            return Ok(Some(raw));
        }

        let title = if self.add_title { title } else { None };
        Ok(Some(format_content(&raw, title)))
    }
}

#[derive(Debug, clap::Args, Clone)]
pub struct CreateOptions {
    /// Article title
    #[arg(long)]
    pub title: String,

    #[clap(flatten)]
    pub body: BodyOptions,

    /// Initial state (defaults to draft, or published with AUTO_PUBLISH and REVIEW_MODE=false)
    #[arg(long)]
    pub state: Option<ArticleState>,

    /// Collection the article belongs to
    #[arg(long, value_name = "COLLECTION_ID")]
    pub collection: Option<String>,

    /// Admin credited as the author (defaults to INTERCOM_AUTHOR_ID)
    #[arg(long)]
    pub author: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct UpdateOptions {
    /// Article ID
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    #[clap(flatten)]
    pub body: BodyOptions,

    /// New state
    #[arg(long)]
    pub state: Option<ArticleState>,

    /// New collection
    #[arg(long, value_name = "COLLECTION_ID")]
    pub collection: Option<String>,

    /// Admin credited as the author of this change
    #[arg(long)]
    pub author: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct MoveOptions {
    /// Article ID
    pub id: String,

    /// Target collection ID
    pub collection_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ExportOptions {
    /// Directory the JSON files are written to
    #[arg(long, default_value = "latest_articles")]
    pub dir: PathBuf,

    /// Only export articles in this state
    #[arg(long, default_value = "published", conflicts_with = "all")]
    pub state: ArticleState,

    /// Export every article regardless of state
    #[arg(long)]
    pub all: bool,
}

/// Write each article to `<dir>/<id>.json`, creating `dir` if needed.
///
/// Fails before writing anything if an id is not usable as a file name.
pub fn export_articles(articles: &[Article], dir: &Path) -> Result<Vec<PathBuf>> {
    if let Some(article) = articles.iter().find(|a| !is_safe_file_stem(&a.id)) {
        return Err(eyre!(
            "Refusing to export article with id {:?}: not a valid file name",
            article.id
        ));
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(articles.len());
    for article in articles {
        let path = dir.join(format!("{}.json", article.id));
        let json = serde_json::to_string_pretty(article)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

/// Ids end up in file names, so only ASCII letters, digits, `-` and `_` pass
fn is_safe_file_stem(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn print_article(article: &Article, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(article)?);
        return Ok(());
    }

    std::println!("\n{} - {}\n", article.id.bold().cyan(), article.title.bright_white());

    let mut table = new_table();
    table.add_row(prettytable::row!["State".bold().cyan(), state_colored(article.state)]);
    table.add_row(prettytable::row![
        "Author".bold().cyan(),
        article.author_id.as_deref().unwrap_or("-")
    ]);
    table.add_row(prettytable::row![
        "Collection".bold().cyan(),
        article.parent_id.as_deref().unwrap_or("-")
    ]);
    table.add_row(prettytable::row![
        "Updated".bold().cyan(),
        format_timestamp(article.updated_at).bright_black().to_string()
    ]);
    if let Some(url) = &article.url {
        table.add_row(prettytable::row!["URL".bold().cyan(), url]);
    }
    table.printstd();

    Ok(())
}

fn print_articles(articles: &[Article], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(articles)?);
        return Ok(());
    }

    println!("Found {} article(s):\n", articles.len());
    if articles.is_empty() {
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["ID", "Title", "State", "Updated"]);
    for article in articles {
        table.add_row(prettytable::row![
            article.id,
            article.title,
            state_colored(article.state),
            format_timestamp(article.updated_at)
        ]);
    }
    table.printstd();

    Ok(())
}

fn state_colored(state: ArticleState) -> String {
    match state {
        ArticleState::Published => state.as_str().green().to_string(),
        ArticleState::Draft => state.as_str().yellow().to_string(),
        ArticleState::Archived => state.as_str().bright_black().to_string(),
    }
}

/// Run article commands
pub async fn run(cmd: Commands, config: &IntercomConfig, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Intercom API Base: {}", config.base_url);
    }

    let client = IntercomClient::new(config)?;

    match cmd {
        Commands::List(options) => {
            let articles = client.list_articles().await;
            let articles = match options.state {
                Some(state) => filter_by_state(articles, state),
                None => articles,
            };
            print_articles(&articles, options.json)
        }
        Commands::Get(options) => {
            let article = client.get_article(&options.id).await?;
            print_article(&article, options.json)
        }
        Commands::Search(options) => {
            let articles = client.search_articles(&options.query).await;
            print_articles(&articles, options.json)
        }
        Commands::Create(options) => {
            let body = options
                .body
                .resolve(Some(&options.title))?
                .ok_or_else(|| eyre!("An article body is required (--body or --body-file)"))?;

            let article = NewArticle {
                title: options.title,
                body,
                state: options
                    .state
                    .unwrap_or_else(|| config.default_article_state()),
                collection_id: options.collection,
                author_id: options.author,
            };

            let created = client.create_article(&article).await?;
            print_article(&created, options.json)
        }
        Commands::Update(options) => {
            let patch = ArticlePatch {
                body: options.body.resolve(options.title.as_deref())?,
                title: options.title,
                state: options.state,
                collection_id: options.collection,
                author_id: options.author,
            };

            if patch.is_empty() {
                return Err(eyre!(
                    "At least one field must be provided for update (--title, --body, --body-file, --state, or --collection)"
                ));
            }

            let updated = client.update_article(&options.id, &patch).await?;
            print_article(&updated, options.json)
        }
        Commands::Publish(options) => {
            let article = client.publish_article(&options.id).await?;
            print_article(&article, options.json)
        }
        Commands::Archive(options) => {
            let article = client.archive_article(&options.id).await?;
            print_article(&article, options.json)
        }
        Commands::Move(options) => {
            let article = client
                .move_article(&options.id, &options.collection_id)
                .await?;
            print_article(&article, options.json)
        }
        Commands::Export(options) => {
            println!("Fetching articles from Intercom...");
            let articles = client.list_articles().await;
            let articles = if options.all {
                articles
            } else {
                filter_by_state(articles, options.state)
            };

            export_articles(&articles, &options.dir)?;
            for article in &articles {
                println!("Saved article: {}", article.title);
            }
            println!(
                "\n{} article(s) saved to {}",
                articles.len(),
                options.dir.display()
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn article_response(id: &str, state: &str) -> serde_json::Value {
        json!({
            "id": id,
            "type": "article",
            "title": format!("Article {id}"),
            "body": "<p class=\"no-margin\">Body</p>",
            "author_id": 6409529,
            "state": state,
            "parent_id": null,
            "updated_at": 1719792000
        })
    }

    #[tokio::test]
    async fn test_update_with_body_only_sends_author_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/articles/42"))
            .and(body_json(json!({"author_id": "6409529", "body": "<p>new</p>"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(article_response("42", "draft")))
            .expect(1)
            .mount(&server)
            .await;

        let patch = ArticlePatch {
            body: Some("<p>new</p>".to_string()),
            ..ArticlePatch::default()
        };
        let article = client_for(&server).update_article("42", &patch).await.unwrap();

        assert_eq!(article.id, "42");
    }

    #[tokio::test]
    async fn test_publish_archive_and_move_are_updates() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/articles/7"))
            .and(body_json(json!({"author_id": "6409529", "state": "published"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(article_response("7", "published")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/articles/7"))
            .and(body_json(json!({"author_id": "6409529", "state": "archived"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(article_response("7", "archived")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/articles/7"))
            .and(body_json(json!({"author_id": "6409529", "parent_id": "300"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(article_response("7", "draft")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(
            client.publish_article("7").await.unwrap().state,
            ArticleState::Published
        );
        assert_eq!(
            client.archive_article("7").await.unwrap().state,
            ArticleState::Archived
        );
        client.move_article("7", "300").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_article_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/articles"))
            .and(body_json(json!({
                "title": "Resetting your password",
                "body": "<p>Steps</p>",
                "author_id": "6409529",
                "state": "draft",
                "type": "article",
                "parent_id": "15"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(article_response("99", "draft")))
            .expect(1)
            .mount(&server)
            .await;

        let article = NewArticle {
            title: "Resetting your password".to_string(),
            body: "<p>Steps</p>".to_string(),
            collection_id: Some("15".to_string()),
            ..NewArticle::default()
        };
        let created = client_for(&server).create_article(&article).await.unwrap();

        assert_eq!(created.id, "99");
    }

    #[tokio::test]
    async fn test_writes_propagate_rejections() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/articles/1"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid state"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/articles/1"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(matches!(
            client.publish_article("1").await,
            Err(Error::Status { .. })
        ));
        assert!(matches!(
            client.get_article("1").await,
            Err(Error::Status { .. })
        ));
    }

    #[tokio::test]
    async fn test_writes_propagate_transport_failures() {
        let client = unreachable_client();
        let article = NewArticle {
            title: "T".to_string(),
            body: "B".to_string(),
            ..NewArticle::default()
        };

        assert!(matches!(
            client.create_article(&article).await,
            Err(Error::Request { .. })
        ));
        assert!(matches!(
            client.update_article("1", &ArticlePatch::with_state(ArticleState::Draft)).await,
            Err(Error::Request { .. })
        ));
        assert!(matches!(
            client.move_article("1", "2").await,
            Err(Error::Request { .. })
        ));
        assert!(matches!(
            client.archive_article("1").await,
            Err(Error::Request { .. })
        ));
    }

    #[tokio::test]
    async fn test_reads_degrade_to_empty_on_transport_failure() {
        let client = unreachable_client();

        assert!(client.list_articles().await.is_empty());
        assert!(client.search_articles("billing").await.is_empty());
        assert!(matches!(
            client.try_list_articles().await,
            Err(Error::Request { .. })
        ));
    }

    #[tokio::test]
    async fn test_reads_degrade_to_empty_on_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.list_articles().await.is_empty());
        assert!(client.search_articles("billing").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_passes_query_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/articles/search"))
            .and(query_param("q", "reset password & 2FA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "list",
                "data": {"articles": [article_response("5", "published")]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let articles = client_for(&server).search_articles("reset password & 2FA").await;

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "5");
    }

    #[tokio::test]
    async fn test_list_articles_follows_next_url() {
        let server = MockServer::start().await;
        let next = format!("{}/articles?page=2", server.uri());
        Mock::given(method("GET"))
            .and(path("/articles"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [article_response("2", "draft")],
                "pages": {"page": 2, "total_pages": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [article_response("1", "published")],
                "pages": {"page": 1, "total_pages": 2, "next": next}
            })))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        let articles = client_for(&server).list_articles().await;
        let ids: Vec<_> = articles.iter().map(|a| a.id.as_str()).collect();

        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_list_articles_keeps_items_with_null_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "list",
                "data": [{"id": "1", "title": "ok"}, {"id": "2", "title": null}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let articles = client_for(&server).list_articles().await;

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "ok");
        assert_eq!(articles[1].title, "");
    }

    #[test]
    fn test_body_resolution_converts_markdown() {
        let options = BodyOptions {
            body: Some("Hello **there**".to_string()),
            body_file: None,
            markdown: true,
            add_title: true,
        };

        assert_eq!(
            options.resolve(Some("Welcome")).unwrap().unwrap(),
            "<h1>Welcome</h1><p class=\"no-margin\">Hello <strong>there</strong></p>\n"
        );
    }

    #[test]
    fn test_body_resolution_raw_and_missing() {
        let raw = BodyOptions {
            body: Some("<p>as is</p>".to_string()),
            body_file: None,
            markdown: false,
            add_title: false,
        };
        assert_eq!(raw.resolve(Some("T")).unwrap().as_deref(), Some("<p>as is</p>"));

        let missing = BodyOptions {
            body: None,
            body_file: None,
            markdown: true,
            add_title: false,
        };
        assert_eq!(missing.resolve(None).unwrap(), None);
    }

    #[test]
    fn test_body_resolution_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("body.md");
        std::fs::write(&file, "From a file").unwrap();

        let options = BodyOptions {
            body: None,
            body_file: Some(file),
            markdown: true,
            add_title: false,
        };

        assert_eq!(
            options.resolve(Some("ignored")).unwrap().unwrap(),
            "<p class=\"no-margin\">From a file</p>\n"
        );
    }

    #[test]
    fn test_export_writes_one_file_per_article() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("latest_articles");
        let articles: Vec<Article> = vec![
            serde_json::from_value(article_response("11", "published")).unwrap(),
            serde_json::from_value(article_response("12", "published")).unwrap(),
        ];

        let written = export_articles(&articles, &target).unwrap();

        assert_eq!(written, vec![target.join("11.json"), target.join("12.json")]);
        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(saved["id"], "11");
        assert_eq!(saved["title"], "Article 11");
        assert_eq!(saved["state"], "published");
    }

    #[test]
    fn test_export_rejects_ids_that_escape_the_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("latest_articles");

        for id in ["../evil", "a/b", "", ".."] {
            let mut article: Article =
                serde_json::from_value(article_response("1", "published")).unwrap();
            article.id = id.to_string();

            assert!(export_articles(&[article], &target).is_err(), "id {id:?}");
        }

        assert!(!target.exists());
        assert!(!dir.path().join("evil.json").exists());
    }

    #[test]
    fn test_safe_file_stem() {
        assert!(is_safe_file_stem("123"));
        assert!(is_safe_file_stem("abc-DEF_9"));
        assert!(!is_safe_file_stem("../evil"));
        assert!(!is_safe_file_stem("a.b"));
        assert!(!is_safe_file_stem(""));
    }
}
