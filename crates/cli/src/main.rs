// ABOUTME: CLI host for the shuyuan extraction engine.
// ABOUTME: Exposes each engine operation plus the random-chapter pipeline; prints text or JSON.

mod pipeline;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shuyuan::formats::{html_to_text, sanitize_html};
use shuyuan::{default_rules, Client, RuleSet, TocSection};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shuyuan")]
#[command(about = "Extract novel data from a book-source site via selector rules")]
struct Args {
    /// Site base URL (scheme + host)
    #[arg(long, default_value = "http://3g.shugelou.org")]
    site: String,

    /// Category (discovery) page URL; defaults to <site>/fenlei.html
    #[arg(long)]
    find_url: Option<String>,

    /// Book-source rules JSON file; embedded defaults when omitted
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Override the User-Agent header
    #[arg(long)]
    user_agent: Option<String>,

    /// Upper bound of the per-request courtesy delay in milliseconds
    /// (0 disables the delay)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Select the toc chapter list with the rule's chapterList selector
    /// instead of the marked-section heuristic
    #[arg(long)]
    plain_toc: bool,

    /// Output JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for books; the URL template's {{key}} is replaced by KEY
    Search { template: String, key: String },
    /// List the chapters of a book
    Toc { url: String },
    /// Extract book metadata fields
    Info { url: String },
    /// List categories from the discovery page
    Find { url: Option<String> },
    /// Fetch and assemble one chapter's content
    Content {
        url: String,
        /// Output format: text (default) or html (sanitized)
        #[arg(short = 'f', long = "format", default_value = "text")]
        format: String,
    },
    /// Pick a random category, book and first chapter, and print it
    Random,
}

fn build_client(args: &Args) -> Result<Client> {
    let rules = match &args.rules {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("cannot read rules file {:?}", path))?;
            RuleSet::from_json(&json).context("invalid rules JSON")?
        }
        None => default_rules(),
    };

    let mut builder = Client::builder().site_url(&args.site).rules(rules);
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua);
    }
    if let Some(ms) = args.delay_ms {
        builder = builder.request_delay(Duration::ZERO, Duration::from_millis(ms));
    }
    if args.plain_toc {
        builder = builder.toc_section(TocSection::RuleList);
    }
    Ok(builder.build())
}

fn print_json<T: serde::Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap());
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = match build_client(&args) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::from(1);
        }
    };
    let find_url = args.find_url.clone().unwrap_or_else(|| {
        format!("{}/fenlei.html", args.site.trim_end_matches('/'))
    });

    let empty = match &args.command {
        Command::Search { template, key } => {
            let books = client.search(template, key).await;
            if args.json {
                print_json(&books);
            } else {
                for book in &books {
                    println!("{}\t{}\t{}", book.name, book.author, book.book_url);
                }
            }
            books.is_empty()
        }
        Command::Toc { url } => {
            let chapters = client.toc(url).await;
            if args.json {
                print_json(&chapters);
            } else {
                for chapter in &chapters {
                    println!("{}\t{}", chapter.name, chapter.url);
                }
            }
            chapters.is_empty()
        }
        Command::Info { url } => {
            let info = client.book_info(url).await;
            if args.json {
                print_json(&info);
            } else {
                for (field, value) in &info {
                    println!("{}: {}", field, value);
                }
            }
            info.is_empty()
        }
        Command::Find { url } => {
            let categories = client.find(url.as_deref().unwrap_or(&find_url)).await;
            if args.json {
                print_json(&categories);
            } else {
                for category in &categories {
                    println!("{}\t{}", category.name, category.url);
                }
            }
            categories.is_empty()
        }
        Command::Content { url, format } => {
            let chapter = client.content(url).await;
            if args.json {
                print_json(&chapter);
            } else {
                if !chapter.title.is_empty() {
                    println!("{}\n", chapter.title);
                }
                match format.as_str() {
                    "html" => println!("{}", sanitize_html(&chapter.content)),
                    _ => println!("{}", html_to_text(&chapter.content)),
                }
            }
            chapter.is_empty()
        }
        Command::Random => {
            match pipeline::random_chapter(client, find_url).await {
                Some(result) => {
                    if args.json {
                        print_json(&result);
                    } else {
                        println!("《{}》 / {}\n", result.book_name, result.author);
                        if !result.title.is_empty() {
                            println!("{}\n", result.title);
                        }
                        for paragraph in &result.paragraphs {
                            println!("{}", paragraph);
                        }
                    }
                    false
                }
                None => {
                    error!("random-chapter pipeline produced no result");
                    true
                }
            }
        }
    };

    if empty {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
