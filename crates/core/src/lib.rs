//! Core library for helpcenter
//!
//! This crate implements the **Functional Core** of the helpcenter application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The helpcenter project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`helpcenter_core`** (this crate): Pure transformation functions with zero I/O
//! - **`helpcenter`**: HTTP calls to the Intercom API and the CLI (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Deterministic**: Time-dependent helpers take "now" as an argument
//! - **Testable**: Can be tested with simple fixture data, no mocking required
//!
//! # Module Organization
//!
//! - [`articles`]: Help center article models and write payloads
//! - [`conversations`]: Conversation and tag models, listing filters
//! - [`pagination`]: Next-page cursor extraction for list responses
//! - [`format`]: Markdown to Intercom-ready HTML, and HTML cleanup
//! - [`html`]: Small HTML builders used to assemble article bodies
//!
//! # Example Usage
//!
//! ```rust
//! use helpcenter_core::format::format_content;
//! use helpcenter_core::html::{bold, create_list};
//!
//! let list = create_list(["one", "two"], false);
//! assert!(list.starts_with("<ul>"));
//!
//! let html = format_content(&format!("Hello {}", bold("world")), Some("Greeting"));
//! assert!(html.starts_with("<h1>Greeting</h1>"));
//! assert!(html.contains(r#"<p class="no-margin">"#));
//! ```

pub mod articles;
pub mod conversations;
mod de;
pub mod format;
pub mod html;
pub mod pagination;
