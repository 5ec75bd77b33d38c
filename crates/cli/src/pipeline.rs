// ABOUTME: The random-chapter pipeline: category -> book -> first chapter -> assembled content.
// ABOUTME: Any failure inside the chain degrades to None at the boundary; the host never crashes.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use regex::Regex;
use shuyuan::formats::{html_to_text, split_paragraphs};
use shuyuan::{ChapterRef, Client};
use tracing::{error, info};

/// Chapter names announcing the real first chapter ("第一章"/"第1章").
static FIRST_CHAPTER: Lazy<Regex> = Lazy::new(|| Regex::new("第[一1]章").unwrap());

/// Everything needed to present one randomly chosen chapter.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RandomChapter {
    pub book_name: String,
    pub author: String,
    pub title: String,
    pub paragraphs: Vec<String>,
}

/// Run the whole random-chapter pipeline.
///
/// The pipeline runs on its own task so that even a panic inside it is
/// contained at this boundary and reported as "no result".
pub async fn random_chapter(client: Client, find_url: String) -> Option<RandomChapter> {
    match tokio::spawn(run(client, find_url)).await {
        Ok(result) => result,
        Err(join_err) => {
            error!(error = %join_err, "random-chapter pipeline aborted");
            None
        }
    }
}

async fn run(client: Client, find_url: String) -> Option<RandomChapter> {
    info!("fetching category list");
    let categories = client.find(&find_url).await;
    let category = categories.choose(&mut rand::thread_rng())?.clone();
    info!(category = %category.name, "picked category");

    // Category listing pages use the same record shape as search results.
    let books = client.search(&category.url, "").await;
    let book = books.choose(&mut rand::thread_rng())?.clone();
    info!(book = %book.name, "picked book");

    let chapters = client.toc(&book.book_url).await;
    let first = pick_first_chapter(&chapters)?;
    info!(chapter = %first.name, "picked chapter");

    let chapter = client.content(&first.url).await;
    if chapter.is_empty() {
        error!(url = %first.url, "chapter content came back empty");
        return None;
    }

    Some(RandomChapter {
        book_name: book.name,
        author: book.author.trim_matches('/').to_string(),
        title: chapter.title,
        paragraphs: split_paragraphs(&html_to_text(&chapter.content)),
    })
}

/// Prefer the chapter named like a first chapter; fall back to the first
/// entry of the list.
pub fn pick_first_chapter(chapters: &[ChapterRef]) -> Option<&ChapterRef> {
    chapters
        .iter()
        .find(|c| FIRST_CHAPTER.is_match(&c.name))
        .or_else(|| chapters.first())
}
