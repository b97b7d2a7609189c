//! # admitbot CLI
//!
//! The `admitbot` binary runs the chatbot HTTP API and offers a few
//! commands for working with the knowledge documents offline.
//!
//! ## Usage
//!
//! ```bash
//! admitbot --config ./config/admitbot.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `admitbot serve` | Start the HTTP API |
//! | `admitbot ask "<question>"` | Answer one question locally |
//! | `admitbot docs` | List the loaded knowledge documents |
//! | `admitbot suggestions` | Print the suggested questions |
//! | `admitbot chat` | Interactive chat against a running server |
//!
//! ## Examples
//!
//! ```bash
//! # Start the API on the configured bind address (PORT overrides the port)
//! admitbot serve --config ./config/admitbot.toml
//!
//! # Check which rule and documents a question hits
//! admitbot ask "What is the hostel fee?" --json
//!
//! # Chat with a running server, keeping the transcript on disk
//! admitbot chat --server http://localhost:5000 --session ./chat.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use admitbot::config::{self, Config};
use admitbot::documents::load_documents;
use admitbot::resolver::Resolver;
use admitbot::server;
use admitbot::session_file::{self, JsonFileSink};
use admitbot_core::models::DEFAULT_LEAD_SOURCE;
use admitbot_core::session::ChatSession;

/// admitbot: college admissions chatbot backend.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means built-in defaults.
#[derive(Parser)]
#[command(
    name = "admitbot",
    about = "College admissions chatbot: canned answers, lead capture, and lead analytics",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/admitbot.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server.
    ///
    /// Binds to `[server].bind` (or `PORT`) and serves the chat, history,
    /// and lead endpoints.
    Serve,

    /// Answer a single question using the local documents directory.
    Ask {
        question: String,

        /// Print the full resolution (matched rule, context documents) as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the knowledge documents that would be loaded.
    Docs,

    /// Print the suggested questions shown to new visitors.
    Suggestions,

    /// Chat interactively with a running admitbot server.
    ///
    /// Type `/clear` to reset the conversation and `/quit` to leave.
    Chat {
        /// Base URL of the server.
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        server: String,

        /// Persist the conversation to this JSON file and resume it on restart.
        #[arg(long)]
        session: Option<PathBuf>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let load = || config::load_config(&cli.config);

    match cli.command {
        Commands::Serve => server::run_server(&load()?).await?,
        Commands::Ask { question, json } => ask(&load()?, &question, json)?,
        Commands::Docs => list_docs(&load()?)?,
        Commands::Suggestions => {
            for suggestion in server::SUGGESTIONS {
                println!("{}", suggestion);
            }
        }
        Commands::Chat { server, session } => {
            chat(&load()?, &server, session.as_deref()).await?
        }
    }

    Ok(())
}

fn ask(cfg: &Config, question: &str, json: bool) -> Result<()> {
    let resolution = Resolver::new(cfg.documents.clone()).resolve(question)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        println!("{}", resolution.answer);
    }
    Ok(())
}

fn list_docs(cfg: &Config) -> Result<()> {
    let documents = load_documents(&cfg.documents)?;
    println!("{:<40} {:>8}", "DOCUMENT", "BYTES");
    for doc in &documents {
        println!("{:<40} {:>8}", doc.source, doc.content.len());
    }
    println!();
    println!("{} document(s) in {}", documents.len(), cfg.documents.dir.display());
    Ok(())
}

// ============ chat REPL ============

/// Exchanges kept in the `context` sent with each question.
const CONTEXT_EXCHANGES: usize = 5;

async fn chat(cfg: &Config, base_url: &str, session_path: Option<&Path>) -> Result<()> {
    let base_url = base_url.trim_end_matches('/');
    let client = reqwest::Client::new();

    let mut session = match session_path {
        Some(path) => {
            let sink = Box::new(JsonFileSink::new(path));
            match session_file::load(path)? {
                Some(snapshot) => ChatSession::restore(snapshot, sink),
                None => ChatSession::new(sink),
            }
        }
        None => ChatSession::new(Box::new(admitbot_core::session::NoopSink)),
    };

    if session.messages().is_empty() {
        println!("Hi! Ask me anything about admissions, courses, fees or hostels.");
        println!("Try: {}", server::SUGGESTIONS[0]);
    } else {
        println!("Resuming session {} ({} messages).", session.id(), session.messages().len());
    }

    let started = Instant::now();
    let mut lead_prompted = false;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = prompt(&mut lines, "> ").await? {
        let text = line.trim();
        match text {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear()?;
                println!("Conversation cleared.");
                continue;
            }
            _ => {}
        }

        let context = session.conversation_context(CONTEXT_EXCHANGES);
        session.push_user(text)?;

        let answer = match ask_server(&client, base_url, text, &context).await {
            Ok(answer) => answer,
            Err(e) => {
                let error = format!("{:#}", e);
                tracing::warn!(%error, "chat request failed");
                "Sorry, I'm having trouble connecting. Please try again.".to_string()
            }
        };
        println!("{}", answer);
        session.push_bot(&answer)?;

        if cfg.triggers.should_prompt(
            text,
            session.messages().len(),
            started.elapsed(),
            lead_prompted,
        ) {
            lead_prompted = true;
            capture_lead(&client, base_url, &mut lines).await?;
        }
    }

    Ok(())
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<Option<String>> {
    print!("{}", label);
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

async fn ask_server(
    client: &reqwest::Client,
    base_url: &str,
    question: &str,
    context: &str,
) -> Result<String> {
    #[derive(serde::Deserialize)]
    struct ChatReply {
        answer: String,
    }

    let resp = client
        .post(format!("{}/api/chat", base_url))
        .json(&serde_json::json!({ "question": question, "context": context }))
        .send()
        .await?
        .error_for_status()?;
    let reply: ChatReply = resp.json().await.context("unexpected chat response")?;
    Ok(reply.answer)
}

/// Ask for contact details and submit them as a lead. A blank name skips the form.
async fn capture_lead(
    client: &reqwest::Client,
    base_url: &str,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<()> {
    println!();
    println!("Would you like our admissions team to contact you? Leave the name empty to skip.");

    let name = prompt(lines, "Name: ").await?.unwrap_or_default();
    if name.trim().is_empty() {
        return Ok(());
    }
    let email = prompt(lines, "Email: ").await?.unwrap_or_default();
    let phone = prompt(lines, "Phone (optional): ").await?.unwrap_or_default();
    let course = prompt(lines, "Course of interest (optional): ").await?.unwrap_or_default();

    let resp = client
        .post(format!("{}/api/leads", base_url))
        .json(&serde_json::json!({
            "name": name.trim(),
            "email": email.trim(),
            "phone": phone.trim(),
            "course": course.trim(),
            "source": DEFAULT_LEAD_SOURCE,
        }))
        .send()
        .await?;

    if resp.status().is_success() {
        println!("Thank you! Our admissions team will contact you within 24 hours.");
    } else {
        let body: serde_json::Value = resp.json().await.unwrap_or_default();
        let error = body["error"].as_str().unwrap_or("unknown error");
        println!("Could not submit your details: {}", error);
    }
    Ok(())
}
