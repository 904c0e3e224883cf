//! # CFBC Site
//!
//! The website of Calvary Fellowship Baptist Church in Painesville, Ohio.
//! Content (leadership, ministries, missionaries, sermons, events) lives in an
//! Airtable base the church staff edit by hand; this crate reads it, renders
//! HTML pages, and records contact form submissions back into the base.
//!
//! # Architecture
//!
//! ```text
//! Airtable ──► store ──► content::resolve ──► render / pages ──► cache ──► server
//!                 ▲             │
//!                 │             └── content::fallback (compiled-in sets)
//!         contact, seed
//! ```
//!
//! Data flows one way. Seed commands and the contact handler write rows; page
//! renderers only read them. Every read either succeeds completely or the
//! compiled fallback set for that kind of content is shown instead, so a page
//! is never empty because the base is down, empty, or half-edited.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | Airtable client with retry/backoff behind the [`store::RecordStore`] trait |
//! | [`content`] | Typed records decoded from rows, fallback sets, live-or-fallback resolution |
//! | [`pages`] | Maud page templates, pure functions of resolved content |
//! | [`render`] | Resolves content for a page and renders it; static export |
//! | [`cache`] | Rendered pages kept until their revalidation interval passes |
//! | [`server`] | Axum routes, contact endpoints, events feed |
//! | [`contact`] | Contact form validation and submission |
//! | [`carousel`] | State machine behind the home page events carousel |
//! | [`seed`] | Maintenance commands that create tables and write content |
//! | [`config`] | `site.toml` loading, validation, merging, and color CSS |
//! | [`types`] | Pages and navigation |
//! | [`naming`] | URL slugs for ministry pages |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fail Closed, Fall Back Whole
//!
//! A table's live rows are used only if every row decodes. One malformed row
//! switches the whole page to fallback content rather than showing a partial
//! list, because a partial leadership or missionary list reads as if people
//! were removed.
//!
//! ## Writes Are Not Retried
//!
//! List reads are retried with exponential backoff (1 s, then 2 s). Creates
//! and updates are attempted once: a timed-out create may still have landed,
//! and a duplicate contact submission is worse than asking the visitor to try
//! again.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): templates are
//! type-checked Rust and all interpolation is escaped. Store text that is
//! meant to be formatted goes through Markdown with raw HTML disabled.

pub mod cache;
pub mod carousel;
pub mod config;
pub mod contact;
pub mod content;
pub mod naming;
pub mod output;
pub mod pages;
pub mod render;
pub mod seed;
pub mod server;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
