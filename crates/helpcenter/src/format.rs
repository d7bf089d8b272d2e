//! Convert markdown files into Intercom-ready HTML

use std::path::PathBuf;

use crate::prelude::{eprintln, println, *};
use helpcenter_core::format::{clean_html, format_content};

#[derive(Debug, clap::Args, Clone)]
pub struct FormatOptions {
    /// Markdown file to convert (an HTML file with --clean)
    pub file: PathBuf,

    /// Insert this title as the first heading
    #[arg(long, conflicts_with = "clean")]
    pub title: Option<String>,

    /// The file is already HTML: drop its title heading and leading whitespace
    #[arg(long)]
    pub clean: bool,
}

/// Render `input` according to `options`
pub fn render(input: &str, options: &FormatOptions) -> String {
    if options.clean {
        clean_html(input)
    } else {
        format_content(input, options.title.as_deref())
    }
}

pub fn run(options: FormatOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Formatting {}", options.file.display());
    }

    let input = std::fs::read_to_string(&options.file)
        .with_context(|| format!("Failed to read {}", options.file.display()))?;

    println!("{}", render(&input, &options));

    Ok(())
}
