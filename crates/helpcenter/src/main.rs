use crate::prelude::*;
use clap::Parser;

mod error;
mod format;
mod intercom;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Manage Intercom help center articles and read support conversations"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Intercom access token
    #[clap(long, env = "INTERCOM_ACCESS_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Admin credited as the author of writes
    #[clap(long, env = "INTERCOM_AUTHOR_ID", global = true)]
    author_id: Option<String>,

    /// Intercom API base URL
    #[clap(long, env = "INTERCOM_BASE_URL", global = true, default_value = intercom::DEFAULT_BASE_URL)]
    base_url: String,

    /// Hold new articles as drafts for review
    #[clap(long, env = "REVIEW_MODE", global = true, default_value_t = true, action = clap::ArgAction::Set)]
    review_mode: bool,

    /// Publish new articles immediately (only when review mode is off)
    #[clap(long, env = "AUTO_PUBLISH", global = true, default_value_t = false, action = clap::ArgAction::Set)]
    auto_publish: bool,

    /// Whether to display additional information.
    #[clap(long, env = "HELPCENTER_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Help center article operations
    #[clap(subcommand)]
    Articles(crate::intercom::articles::Commands),

    /// Support conversation and tag operations
    #[clap(subcommand)]
    Conversations(crate::intercom::conversations::Commands),

    /// Convert markdown to Intercom-ready HTML
    Format(crate::format::FormatOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Articles(cmd) => {
            let config = intercom::IntercomConfig::from_global(&app.global)?;
            crate::intercom::articles::run(cmd, &config, app.global).await
        }
        SubCommands::Conversations(cmd) => {
            let config = intercom::IntercomConfig::from_global(&app.global)?;
            crate::intercom::conversations::run(cmd, &config, app.global).await
        }
        SubCommands::Format(options) => crate::format::run(options, app.global),
    }
}
