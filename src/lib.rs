//! # DocsBuddy
//!
//! Backend for the DocsBuddy documentation assistant: term lookups for
//! selected text, short AI sentence analysis, and the DocsBuddy chat.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────┐   ┌──────────────┐
//! │  Glossary    │──▶│                      │   │   HTTP API   │
//! │  Dictionary  │──▶│ TermLookupAggregator │──▶│   (axum)     │
//! │  Wikipedia   │──▶│                      │   │              │
//! └──────────────┘   └──────────────────────┘   │              │
//! ┌──────────────┐   ┌──────────────────────┐   │              │
//! │ OpenAI chat  │──▶│ SentenceAnalyzer     │──▶│              │
//! │ completions  │──▶│ DocsBuddyChat        │──▶│              │
//! └──────────────┘   └──────────────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docsbuddy lookup API             # glossary hit, no network needed
//! docsbuddy analyze "The API returns JSON." --type simplify
//! docsbuddy status                 # is OPENAI_API_KEY configured?
//! docsbuddy serve                  # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Records returned to the UI |
//! | [`status`] | AI availability probe |
//! | [`traits`] | Source and completion extension traits |
//! | [`glossary`] | Local technical glossary, related terms, term extraction |
//! | [`dictionary`] | Public dictionary API adapter |
//! | [`wikipedia`] | Wikipedia summary adapter |
//! | [`completion`] | OpenAI chat-completions client |
//! | [`analyzer`] | Sentence analysis with templated fallback |
//! | [`chat`] | DocsBuddy chat |
//! | [`insights`] | Follow-up lookups on assistant replies |
//! | [`lookup`] | Term lookup aggregation |
//! | [`server`] | HTTP server |

pub mod analyzer;
pub mod chat;
pub mod completion;
pub mod config;
pub mod dictionary;
pub mod glossary;
pub mod insights;
pub mod lookup;
pub mod models;
pub mod server;
pub mod status;
pub mod traits;
pub mod wikipedia;
