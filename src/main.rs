use anyhow::{Context, Result};
use caption_generator::app::App;
use caption_generator::media::{self, MediaKind};
use caption_generator::models::{CaptionResult, Config};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "caption-generator")]
#[command(about = "Generate Instagram captions in three tones from images and audio")]
struct CliArgs {
    /// Image to analyse. Repeat for several images; order is preserved.
    #[arg(short, long = "image", value_name = "PATH", required = true)]
    images: Vec<PathBuf>,

    /// Optional audio clip used as extra context.
    #[arg(short, long, value_name = "PATH")]
    audio: Option<PathBuf>,

    /// Sample text whose writing style the captions should follow.
    #[arg(short, long, value_name = "TEXT", conflicts_with = "style_file")]
    style: Option<String>,

    /// Read the style sample from a file.
    #[arg(long, value_name = "PATH")]
    style_file: Option<PathBuf>,

    /// Print the captions as a JSON object.
    #[arg(long)]
    json: bool,
}

fn render_captions(captions: &CaptionResult) -> String {
    captions
        .iter()
        .map(|(tone, text)| format!("== {} ==\n{}\n", tone.label(), text))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn run(args: CliArgs, config: &Config) -> Result<()> {
    let style = match (&args.style, &args.style_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read style sample {}", path.display()))?,
        ),
        (None, None) => None,
    };

    let (images, audio) = tokio::join!(
        media::encode_files(&args.images, MediaKind::Image),
        async {
            match &args.audio {
                Some(path) => media::encode_file(path, MediaKind::Audio).await.map(Some),
                None => Ok(None),
            }
        }
    );
    let images = images.context("Failed to encode images")?;
    let audio = audio.context("Failed to encode audio")?;

    let app = App::new(config);
    let captions = app
        .generate_from_parts(images, audio, style.as_deref())
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&captions)?);
    } else {
        println!("{}", render_captions(&captions));
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caption_generator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting caption-generator");

    match run(args, &config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Caption generation failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
