//! # admitbot
//!
//! Backend for a college admissions chatbot.
//!
//! Visitors ask questions and get canned answers picked by keyword rules.
//! Interested visitors leave contact details as leads, which admissions
//! staff review, move through a small status pipeline, and summarize with
//! analytics. Everything is exposed as a JSON HTTP API and a CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  documents  │──▶│   resolver   │──▶│ chat history │
//! │  (*.txt)    │   │ rules + ctx  │   │ memory/sqlite│
//! └─────────────┘   └──────┬───────┘   └──────────────┘
//!                          │
//!        ┌─────────────────┤            ┌──────────────┐
//!        ▼                 ▼            │    leads     │──▶ notify (mail)
//!   ┌──────────┐     ┌──────────┐──────▶│ memory/sqlite│
//!   │   CLI    │     │   HTTP   │       └──────────────┘
//!   └──────────┘     └──────────┘
//! ```
//!
//! Pure domain logic (rules, analytics, triggers, sessions, store traits)
//! lives in the `admitbot-core` crate; this crate adds I/O.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and environment overrides |
//! | [`documents`] | Knowledge document loading |
//! | [`resolver`] | Question answering |
//! | [`server`] | HTTP JSON API |
//! | [`notify`] | Lead notification emails |
//! | [`db`] | SQLite connection and schema |
//! | [`sqlite_store`] | SQLite lead and history stores |
//! | [`session_file`] | JSON file persistence for CLI chat sessions |

pub mod config;
pub mod db;
pub mod documents;
pub mod notify;
pub mod resolver;
pub mod server;
pub mod session_file;
pub mod sqlite_store;
