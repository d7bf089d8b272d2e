//! Support conversations and tags: client operations and CLI commands

use super::{read_or_default, ApiResult, IntercomClient, IntercomConfig};
use crate::prelude::{println, *};
use colored::Colorize;
use helpcenter_core::conversations::{
    format_timestamp, Conversation, ConversationFilter, ConversationList, Tag, TagsResponse,
    DEFAULT_DAYS_BACK,
};

impl IntercomClient {
    /// Conversations created within the filter's window, following pagination
    pub async fn try_list_conversations(
        &self,
        filter: &ConversationFilter,
    ) -> ApiResult<Vec<Conversation>> {
        let query = filter.query(chrono::Utc::now());
        self.paginate::<ConversationList>("conversations", &query)
            .await
    }

    pub async fn list_conversations(&self, filter: &ConversationFilter) -> Vec<Conversation> {
        read_or_default(
            "fetching conversations",
            self.try_list_conversations(filter).await,
        )
    }

    /// Full conversation, including its parts
    pub async fn try_get_conversation(&self, conversation_id: &str) -> ApiResult<Conversation> {
        self.get(&format!("conversations/{conversation_id}"), &[])
            .await
    }

    pub async fn get_conversation(&self, conversation_id: &str) -> Option<Conversation> {
        read_or_default(
            "fetching conversation details",
            self.try_get_conversation(conversation_id).await.map(Some),
        )
    }

    /// Conversations matching `query`, passed through verbatim
    pub async fn try_search_conversations(&self, query: &str) -> ApiResult<Vec<Conversation>> {
        let response: ConversationList = self
            .get("conversations/search", &[("q", query.to_string())])
            .await?;
        Ok(response.conversations)
    }

    pub async fn search_conversations(&self, query: &str) -> Vec<Conversation> {
        read_or_default(
            "searching conversations",
            self.try_search_conversations(query).await,
        )
    }

    pub async fn try_list_tags(&self) -> ApiResult<Vec<Tag>> {
        let response: TagsResponse = self.get("tags", &[]).await?;
        Ok(response.data)
    }

    pub async fn list_tags(&self) -> Vec<Tag> {
        read_or_default("fetching tags", self.try_list_tags().await)
    }
}

/// Conversation commands
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List recent conversations
    #[clap(name = "list")]
    List(ListOptions),

    /// Show a conversation with all of its parts
    #[clap(name = "get")]
    Get(GetOptions),

    /// Search conversations by content
    #[clap(name = "search")]
    Search(SearchOptions),

    /// List the available conversation tags
    #[clap(name = "tags")]
    Tags(TagsOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Only conversations created in the last N days
    #[arg(short, long, default_value_t = DEFAULT_DAYS_BACK)]
    pub days: u32,

    /// Only conversations with this tag ID
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct GetOptions {
    /// Conversation ID
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

#[derive(Debug, clap::Args, Clone)]
pub struct TagsOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn print_conversations(conversations: &[Conversation], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(conversations)?);
        return Ok(());
    }

    println!("Found {} conversation(s):\n", conversations.len());
    if conversations.is_empty() {
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["ID", "Created", "State", "Title", "Tags"]);
    for conversation in conversations {
        table.add_row(prettytable::row![
            conversation.id,
            format_timestamp(conversation.created_at),
            conversation.state.as_deref().unwrap_or("-"),
            conversation.title.as_deref().unwrap_or(""),
            conversation.tag_names().join(", ")
        ]);
    }
    table.printstd();

    Ok(())
}

fn print_conversation(conversation: &Conversation) {
    std::println!("\n{}\n", conversation.id.bold().cyan());

    let mut table = new_table();
    table.add_row(prettytable::row![
        "Created".bold().cyan(),
        format_timestamp(conversation.created_at)
    ]);
    table.add_row(prettytable::row![
        "Updated".bold().cyan(),
        format_timestamp(conversation.updated_at)
    ]);
    if let Some(state) = &conversation.state {
        table.add_row(prettytable::row!["State".bold().cyan(), state.green().to_string()]);
    }
    if let Some(title) = &conversation.title {
        table.add_row(prettytable::row!["Title".bold().cyan(), title]);
    }
    let tags = conversation.tag_names();
    if !tags.is_empty() {
        table.add_row(prettytable::row![
            "Tags".bold().cyan(),
            tags.join(", ").bright_green().to_string()
        ]);
    }
    table.add_row(prettytable::row!["Parts".bold().cyan(), conversation.part_count()]);
    table.printstd();
}

fn print_tags(tags: &[Tag], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tags)?);
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["ID", "Name"]);
    for tag in tags {
        table.add_row(prettytable::row![tag.id, tag.name]);
    }
    table.printstd();

    Ok(())
}

/// Run conversation commands
pub async fn run(cmd: Commands, config: &IntercomConfig, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Intercom API Base: {}", config.base_url);
    }

    let client = IntercomClient::new(config)?;

    match cmd {
        Commands::List(options) => {
            let filter = ConversationFilter {
                days_back: options.days,
                tag_id: options.tag,
            };
            let conversations = client.list_conversations(&filter).await;
            print_conversations(&conversations, options.json)
        }
        Commands::Get(options) => {
            let conversation = client
                .get_conversation(&options.id)
                .await
                .ok_or_else(|| eyre!("Conversation {} could not be fetched", options.id))?;

            if options.json {
                println!("{}", serde_json::to_string_pretty(&conversation)?);
            } else {
                print_conversation(&conversation);
            }
            Ok(())
        }
        Commands::Search(options) => {
            let conversations = client.search_conversations(&options.query).await;
            print_conversations(&conversations, options.json)
        }
        Commands::Tags(options) => print_tags(&client.list_tags().await, options.json),
    }
}
