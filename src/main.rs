use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use captivate::{
    CaptivateClient, DEFAULT_API_BASE, EpisodeOptions, EpisodeType, NewEpisode, ReqwestClient,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static KEY: Emoji<'_, '_> = Emoji("🔑 ", "[~] ");
static UPLOAD: Emoji<'_, '_> = Emoji("📤 ", "[^] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");

/// Format Captivate expects for episode publish dates
const PUBLISH_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Manage podcasts hosted on Captivate.fm
#[derive(Parser, Debug)]
#[command(name = "captivate")]
#[command(about = "Manage podcasts hosted on Captivate.fm")]
#[command(version)]
struct Args {
    /// Captivate user id
    #[arg(long, env = "CAPTIVATE_USER_ID")]
    user_id: String,

    /// Captivate API key
    #[arg(long, env = "CAPTIVATE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// API endpoint
    #[arg(long, default_value = DEFAULT_API_BASE, hide = true)]
    api_base: String,

    /// Give up on a request after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Quiet mode - suppress progress output
    #[arg(short, long)]
    quiet: bool,

    /// Log more (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List your shows
    Shows,

    /// List the episodes of a show
    Episodes { show_id: String },

    /// Upload an audio file and print its media id
    Upload { show_id: String, file: PathBuf },

    /// Upload an audio file and create an episode from it
    Publish {
        show_id: String,
        file: PathBuf,
        #[command(flatten)]
        episode: EpisodeArgs,
    },

    /// Upload cover art for a show
    Artwork { show_id: String, file: PathBuf },
}

#[derive(clap::Args, Debug)]
struct EpisodeArgs {
    #[arg(long)]
    title: String,

    /// Episode number
    #[arg(long)]
    number: u32,

    /// full, trailer or bonus
    #[arg(long = "type", default_value = "full")]
    episode_type: EpisodeType,

    /// Publish date, defaults to now
    #[arg(long)]
    date: Option<String>,

    #[arg(long, default_value = "")]
    show_notes: String,

    #[arg(long, default_value = "")]
    summary: String,

    #[arg(long)]
    season: Option<u32>,

    #[arg(long)]
    subtitle: Option<String>,

    #[arg(long)]
    author: Option<String>,

    /// e.g. Draft or Published
    #[arg(long)]
    status: Option<String>,

    /// URL of episode-specific artwork
    #[arg(long)]
    episode_art: Option<String>,

    /// Public web page for the episode
    #[arg(long)]
    link: Option<String>,

    #[arg(long)]
    donation_link: Option<String>,

    #[arg(long)]
    donation_text: Option<String>,

    /// Mark the episode as explicit
    #[arg(long)]
    explicit: bool,

    /// Hide the episode from Apple Podcasts
    #[arg(long)]
    itunes_block: bool,
}

impl EpisodeArgs {
    fn into_episode(self, show_id: String, media_id: String) -> NewEpisode {
        let publish_date = self
            .date
            .unwrap_or_else(|| Local::now().format(PUBLISH_DATE_FORMAT).to_string());

        NewEpisode {
            show_id,
            title: self.title,
            media_id,
            publish_date,
            episode_number: self.number,
            episode_type: self.episode_type,
            show_notes: self.show_notes,
            summary: self.summary,
            options: EpisodeOptions {
                subtitle: self.subtitle,
                author: self.author,
                explicit: self.explicit.then_some(true),
                status: self.status,
                episode_season: self.season,
                donation_link: self.donation_link,
                donation_text: self.donation_text,
                episode_url: self.link,
                episode_art: self.episode_art,
                itunes_block: self.itunes_block.then_some(true),
            },
        }
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "captivate=error",
        1 => "captivate=info",
        _ => "captivate=debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run one API call behind a spinner
async fn with_spinner<T, F>(quiet: bool, message: String, call: F) -> captivate::Result<T>
where
    F: Future<Output = captivate::Result<T>>,
{
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {wide_msg}")
                .unwrap(),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    };
    bar.set_message(message);

    let result = call.await;
    bar.finish_and_clear();
    result
}

fn print_json(value: &Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render response")?;
    println!("{rendered}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if !args.quiet {
        eprintln!(
            "\n{}{} {}\n",
            MICROPHONE,
            "captivate".bold().magenta(),
            "- Captivate.fm client".dimmed()
        );
    }

    let http = match args.timeout {
        Some(secs) => ReqwestClient::with_timeout(Duration::from_secs(secs))
            .context("Failed to build HTTP client")?,
        None => ReqwestClient::new(),
    };

    let client = CaptivateClient::with_client(http, args.user_id, args.api_key)
        .with_api_base(&args.api_base)
        .context("Invalid API base URL")?;

    let quiet = args.quiet;

    with_spinner(
        quiet,
        format!("{KEY}Authenticating as {}", client.user_id().cyan()),
        client.authenticate_user(),
    )
    .await
    .context("Authentication failed")?;

    match args.command {
        Command::Shows => {
            let shows = with_spinner(quiet, "Fetching shows".to_string(), client.get_user_shows())
                .await
                .context("Failed to list shows")?;
            print_json(&Value::Array(shows))?;
        }

        Command::Episodes { show_id } => {
            let episodes = with_spinner(
                quiet,
                format!("Fetching episodes of {}", show_id.cyan()),
                client.list_episodes(&show_id),
            )
            .await
            .context("Failed to list episodes")?;
            print_json(&episodes)?;
        }

        Command::Upload { show_id, file } => {
            let media_id = with_spinner(
                quiet,
                format!("{UPLOAD}Uploading {}", file.display().to_string().cyan()),
                client.upload_episode(&file, &show_id),
            )
            .await
            .with_context(|| format!("Failed to upload {}", file.display()))?;
            println!("{media_id}");
        }

        Command::Publish {
            show_id,
            file,
            episode,
        } => {
            let media_id = with_spinner(
                quiet,
                format!("{UPLOAD}Uploading {}", file.display().to_string().cyan()),
                client.upload_episode(&file, &show_id),
            )
            .await
            .with_context(|| format!("Failed to upload {}", file.display()))?;

            if !quiet {
                eprintln!("{SUCCESS}Media uploaded: {}", media_id.green());
            }

            let new_episode = episode.into_episode(show_id, media_id);
            let created = with_spinner(
                quiet,
                format!("Creating episode {}", new_episode.title.bold()),
                client.create_episode(&new_episode),
            )
            .await
            .context("Failed to create episode")?;

            if !quiet {
                eprintln!("{PARTY}{}", "Episode created".bold().green());
            }
            print_json(&created)?;
        }

        Command::Artwork { show_id, file } => {
            let artwork = with_spinner(
                quiet,
                format!("{UPLOAD}Uploading {}", file.display().to_string().cyan()),
                client.create_show_artwork(&file, &show_id),
            )
            .await
            .with_context(|| format!("Failed to upload artwork {}", file.display()))?;
            print_json(&artwork)?;
        }
    }

    Ok(())
}
