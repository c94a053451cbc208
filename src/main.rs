use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use try_on_studio::processing::Compressor;
use try_on_studio::remote::dictation::permission_guidance;
use try_on_studio::remote::{ElevenLabsClient, FileAudioSource, GeminiClient, MicPermission, dictate};
use try_on_studio::{
    AddProductDraft, CATEGORIES, CatalogStore, Category, HasRecoverySuggestion, ImagePayload,
    PersistNotice, StudioConfig, TieredStore, TryOnSession,
};
use tryon_scale::presets::SizePreset;

/// Virtual fitting-room from the command line.
#[derive(Parser, Debug)]
#[command(name = "tryon")]
#[command(about = "👕 Browse the catalog, add products and try them on with AI image editing")]
struct Cli {
    /// Where user products are stored (overrides TRYON_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List products, optionally filtered
    List {
        #[arg(short, long, value_enum, default_value_t = Category::All)]
        category: Category,
        /// Case-insensitive substring of the product name
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Show the category filter bar
    Categories,
    /// Generate a product image from a prompt and save the product
    Add {
        #[arg(short, long)]
        prompt: String,
        /// Defaults to the start of the prompt
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long, value_enum, default_value_t = Category::Shirts)]
        category: Category,
        #[arg(long, default_value = "$0.00")]
        price: String,
    },
    /// Save a product from a local image file
    Import {
        #[arg(short, long)]
        image: PathBuf,
        #[arg(short, long)]
        name: String,
        #[arg(short, long, value_enum)]
        category: Category,
        #[arg(long)]
        price: String,
    },
    /// Dress the person in a photo in a catalog product
    TryOn {
        /// Product ID (see `tryon list`)
        #[arg(long)]
        product: u32,
        #[arg(long)]
        photo: PathBuf,
        /// Extra garment images for a composite edit
        #[arg(long)]
        reference: Vec<PathBuf>,
        /// Defaults to tryon_<product name>.png
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Downscale and re-encode an image as JPEG
    Compress {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        max_dim: Option<u32>,
        /// Overrides --max-dim
        #[arg(long, value_enum)]
        preset: Option<SizePreset>,
        #[arg(short, long)]
        quality: Option<f32>,
    },
    /// Transcribe a recorded clip
    Transcribe {
        #[arg(short, long)]
        audio: PathBuf,
    },
    /// Explain a microphone permission state (granted, denied, prompt)
    MicPermission { state: String },
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new(fallback)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = StudioConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    config.validate()?;
    debug!(data_dir = %config.data_dir.display(), "configuration loaded");

    match cli.command {
        Command::List { category, search } => list(&config, category, &search).await,
        Command::Categories => {
            for c in CATEGORIES {
                println!("{:<12} {}", c.id(), c.label());
            }
            Ok(())
        }
        Command::Add {
            prompt,
            name,
            category,
            price,
        } => add(&config, prompt, name, category, price).await,
        Command::Import {
            image,
            name,
            category,
            price,
        } => import(&config, image, name, category, price).await,
        Command::TryOn {
            product,
            photo,
            reference,
            out,
        } => try_on(&config, product, photo, reference, out).await,
        Command::Compress {
            input,
            output,
            max_dim,
            preset,
            quality,
        } => {
            let max_dim = preset
                .map(|p| p.max_long_side())
                .or(max_dim)
                .unwrap_or(config.max_dimension);
            compress_file(input, output, max_dim, quality.unwrap_or(config.quality)).await
        }
        Command::Transcribe { audio } => {
            let client = ElevenLabsClient::from_config(&config)?;
            let mut source = FileAudioSource::new(audio);
            let text = dictate(&mut source, &client).await.map_err(explain)?;
            println!("{}", text);
            Ok(())
        }
        Command::MicPermission { state } => {
            let Ok(permission) = state.parse::<MicPermission>();
            println!("{}", permission);
            if let Some(hint) = permission_guidance(permission) {
                println!("{}", hint);
            }
            Ok(())
        }
    }
}

async fn open_store(config: &StudioConfig) -> CatalogStore {
    let mut store = CatalogStore::builder()
        .with_storage(TieredStore::from_config(config))
        .build();
    let loaded = store.load().await;
    debug!(loaded, "user products loaded");
    store
}

async fn list(config: &StudioConfig, category: Category, search: &str) -> Result<()> {
    let mut store = open_store(config).await;
    store.set_category(category);
    store.set_search_term(search);
    let visible = store.state().visible_products();
    for p in &visible {
        let origin = if p.has_embedded_image() { " (yours)" } else { "" };
        println!("{:>4}  {:<40} {:<12} {}{}", p.id, p.name, p.category.label(), p.price, origin);
    }
    if visible.is_empty() {
        println!("No products found");
    }
    Ok(())
}

async fn add(
    config: &StudioConfig,
    prompt: String,
    name: Option<String>,
    category: Category,
    price: String,
) -> Result<()> {
    let client = GeminiClient::from_config(config)?;
    let mut draft = AddProductDraft::new();
    draft.prompt = prompt;
    draft.name = name.unwrap_or_default();
    draft.category = category;
    draft.price = price;

    println!("Generating product image …");
    draft
        .generate(&client, config.max_dimension, config.quality)
        .await
        .map_err(explain)?;
    save_draft(config, &draft).await
}

async fn import(
    config: &StudioConfig,
    image: PathBuf,
    name: String,
    category: Category,
    price: String,
) -> Result<()> {
    let raw = ImagePayload::from_file(&image).await?;
    let mut draft = AddProductDraft::new();
    draft.name = name;
    draft.category = category;
    draft.price = price;
    draft.set_preview(try_on_studio::compress(&raw, config.max_dimension, config.quality));
    save_draft(config, &draft).await
}

async fn save_draft(config: &StudioConfig, draft: &AddProductDraft) -> Result<()> {
    let new = draft.to_new_product()?;
    let mut store = open_store(config).await;
    let created = store.create_product(new).await?;
    println!("Added #{} {}", created.product.id, created.product.name);
    report(created.notice)
}

fn report(notice: PersistNotice) -> Result<()> {
    match notice {
        PersistNotice::Durable => Ok(()),
        PersistNotice::Degraded { tier } => {
            warn!(%tier, "{}", notice);
            Ok(())
        }
        PersistNotice::Lost => bail!("{}", notice),
    }
}

async fn try_on(
    config: &StudioConfig,
    product_id: u32,
    photo: PathBuf,
    references: Vec<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    let store = open_store(config).await;
    let product = store
        .state()
        .find(product_id)
        .cloned()
        .with_context(|| format!("no product with ID {}", product_id))?;

    let client = GeminiClient::from_config(config)?;
    let mut session = TryOnSession::new(product);
    session.set_photo(ImagePayload::from_file(&photo).await?);
    for path in &references {
        session.add_reference(ImagePayload::from_file(path).await?);
    }

    println!("Trying on {} …", session.product().name);
    session.generate(&client).await.map_err(explain)?;

    let out = out.unwrap_or_else(|| PathBuf::from(session.download_file_name()));
    let result = session
        .result()
        .context("the editor finished without an image")?;
    result.write_to_file(&out).await?;
    info!(path = %out.display(), "try-on saved");
    println!("Saved {}", out.display());
    Ok(())
}

async fn compress_file(input: PathBuf, output: PathBuf, max_dim: u32, quality: f32) -> Result<()> {
    let raw = ImagePayload::from_file(&input).await?;
    let mut compressor = Compressor::new(max_dim, quality);
    let payload = match compressor.try_compress(&raw) {
        Ok(done) => {
            println!(
                "{}x{} -> {}x{}, {} -> {} bytes",
                done.input.w,
                done.input.h,
                done.output.w,
                done.output.h,
                raw.decoded_len(),
                done.payload.decoded_len()
            );
            done.payload
        }
        Err(e) => {
            warn!(error = %e, "compression failed, writing the original");
            raw
        }
    };
    payload.write_to_file(&output).await?;
    Ok(())
}

/// Attach the recovery suggestion, if any, to an error for display.
fn explain(error: try_on_studio::StudioError) -> anyhow::Error {
    match error.recovery_suggestion() {
        Some(hint) => anyhow::anyhow!("{}\n{}", error, hint),
        None => anyhow::Error::new(error),
    }
}
