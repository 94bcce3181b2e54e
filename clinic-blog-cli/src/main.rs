use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clinic_blog_client::{
    BlogClient, BlogClientError, BlogClientResult, Category, KeyValueStore, LikedPosts,
    ListPostsResponse, ListQuery, Post, PostSummary, ReadHistory, SortKey, SortOrder,
};
use serde::Serialize;

const HISTORY_FILE: &str = ".blog_history.json";
const DEFAULT_HTTP_SERVER: &str = "http://127.0.0.1:8080";
const SERVER_ENV: &str = "BLOG_HTTP_URL";

#[derive(Debug, Parser)]
#[command(name = "clinic-blog-cli", version, about = "Command line client for clinic-blog-server")]
struct Cli {
    /// Server address. Falls back to BLOG_HTTP_URL, then http://127.0.0.1:8080.
    #[arg(long, global = true)]
    server: Option<String>,

    /// Print raw JSON instead of a summary.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Latest,
    Popular,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Latest => SortKey::Latest,
            SortArg::Popular => SortKey::Popular,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List one page of posts.
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        #[arg(long, value_enum)]
        order: Option<OrderArg>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show a post and add it to the read history.
    Get { slug: String },
    /// Posts related to a post.
    Related { slug: String },
    /// All categories.
    Categories,
    /// Print sitemap.xml.
    Sitemap,
    /// Recently read posts.
    History {
        /// Forget the history instead of printing it.
        #[arg(long)]
        clear: bool,
    },
    /// Like or unlike a post.
    Like { slug: String },
    /// Liked posts.
    Liked,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let server = resolve_server(cli.server, std::env::var(SERVER_ENV).ok());
    let client = BlogClient::new(&server).map_err(map_client_error)?;
    let mut store = FileStore::open(HISTORY_FILE)
        .with_context(|| format!("failed to read {HISTORY_FILE}"))?;

    match cli.command {
        Command::List {
            page,
            category,
            search,
            sort,
            order,
            limit,
        } => {
            let query = ListQuery {
                page,
                category,
                search,
                sort: sort.map(SortKey::from),
                order: order.map(SortOrder::from),
                limit,
            };
            let list = client.list_posts(&query).await.map_err(map_client_error)?;
            if cli.json {
                print_json(&list)?;
            } else {
                print_list(&list);
            }
        }
        Command::Get { slug } => {
            let post = client.get_post(&slug).await.map_err(map_client_error)?;
            ReadHistory::new(&mut store)
                .record(&post.summary.slug)
                .map_err(map_client_error)?;
            let liked = LikedPosts::new(&mut store)
                .is_liked(&post.summary.slug)
                .map_err(map_client_error)?;
            if cli.json {
                print_json(&post)?;
            } else {
                print_post(&post, liked);
            }
        }
        Command::Related { slug } => {
            let related = client.related_posts(&slug).await.map_err(map_client_error)?;
            if cli.json {
                print_json(&related)?;
            } else {
                println!("Related to {slug}: {}", related.len());
                for post in &related {
                    print_summary_line(post);
                }
            }
        }
        Command::Categories => {
            let categories = client.categories().await.map_err(map_client_error)?;
            if cli.json {
                print_json(&categories)?;
            } else {
                print_categories(&categories);
            }
        }
        Command::Sitemap => {
            let xml = client.sitemap().await.map_err(map_client_error)?;
            print!("{xml}");
        }
        Command::History { clear } => {
            let mut history = ReadHistory::new(&mut store);
            if clear {
                history.clear().map_err(map_client_error)?;
                println!("History cleared");
            } else {
                print_slugs("Recently read", &history.recent().map_err(map_client_error)?);
            }
        }
        Command::Like { slug } => {
            let liked = LikedPosts::new(&mut store)
                .toggle(&slug)
                .map_err(map_client_error)?;
            if liked {
                println!("Liked: {slug}");
            } else {
                println!("Unliked: {slug}");
            }
        }
        Command::Liked => {
            let liked = LikedPosts::new(&mut store).all().map_err(map_client_error)?;
            print_slugs("Liked posts", &liked);
        }
    }

    Ok(())
}

fn resolve_server(flag: Option<String>, env: Option<String>) -> String {
    let raw = flag
        .or(env.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_HTTP_SERVER.to_string());
    normalize_server(raw)
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

/// [`KeyValueStore`] persisted as one JSON object in a file.
struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// A missing or unreadable-as-JSON file starts empty.
    fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => parse_entries(&raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err),
        };
        Ok(Self { path, entries })
    }

    fn flush(&self) -> BlogClientResult<()> {
        let raw = serde_json::to_string_pretty(&self.entries)
            .map_err(|err| BlogClientError::Storage(err.to_string()))?;
        fs::write(&self.path, raw).map_err(|err| {
            BlogClientError::Storage(format!("{}: {err}", self.path.display()))
        })
    }
}

fn parse_entries(raw: &str) -> HashMap<String, String> {
    serde_json::from_str(raw).unwrap_or_default()
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> BlogClientResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> BlogClientResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> BlogClientResult<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

fn map_client_error(err: BlogClientError) -> anyhow::Error {
    let message = match err {
        BlogClientError::NotFound => "post not found".to_string(),
        BlogClientError::InvalidRequest(message) => format!("invalid request: {message}"),
        BlogClientError::Http(err) => format!("http error: {err}"),
        BlogClientError::Server {
            status,
            message,
            details: Some(details),
        } => format!("server error {status}: {message} ({details})"),
        BlogClientError::Server {
            status, message, ..
        } => format!("server error {status}: {message}"),
        BlogClientError::Storage(message) => format!("local history error: {message}"),
    };
    anyhow::anyhow!(message)
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let raw = serde_json::to_string_pretty(value).context("failed to encode response")?;
    println!("{raw}");
    Ok(())
}

fn print_list(list: &ListPostsResponse) {
    println!(
        "Page {}/{} ({} posts total{})",
        list.page,
        list.total_pages,
        list.total,
        if list.has_more { ", more available" } else { "" }
    );
    for post in &list.posts {
        print_summary_line(post);
    }
}

fn print_summary_line(post: &PostSummary) {
    println!(
        "- {} [{}] {} ({} min)",
        post.published_at.format("%Y-%m-%d"),
        post.slug,
        post.title,
        post.reading_minutes
    );
}

fn print_post(post: &Post, liked: bool) {
    let summary = &post.summary;
    println!("{}", summary.title);
    println!("slug: {}", summary.slug);
    println!("published: {}", summary.published_at);
    if let Some(updated) = summary.updated_at {
        println!("updated: {updated}");
    }
    if let Some(author) = &summary.author {
        println!("author: {}", author.name);
    }
    let categories: Vec<&str> = summary.categories.iter().map(|c| c.title.as_str()).collect();
    if !categories.is_empty() {
        println!("categories: {}", categories.join(", "));
    }
    if !summary.tags.is_empty() {
        println!("tags: {}", summary.tags.join(", "));
    }
    println!("reading time: {} min", summary.reading_minutes);
    println!("liked: {}", if liked { "yes" } else { "no" });
    if !summary.excerpt.is_empty() {
        println!();
        println!("{}", summary.excerpt);
    }
}

fn print_categories(categories: &[Category]) {
    println!("Categories: {}", categories.len());
    for category in categories {
        match &category.description {
            Some(description) => println!("- [{}] {}: {description}", category.slug, category.title),
            None => println!("- [{}] {}", category.slug, category.title),
        }
    }
}

fn print_slugs(title: &str, slugs: &[String]) {
    println!("{title}: {}", slugs.len());
    for slug in slugs {
        println!("- {slug}");
    }
}
