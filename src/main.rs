use clap::{Parser, Subcommand};
use image_harvest::config::{load_config, Config};
use image_harvest::visualization::{
    print_acquisition_summary, print_histogram, print_records, range_counts, save_histogram,
};
use image_harvest::*;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Keyword image acquisition, dataset manifests and aspect-ratio analysis")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Download images for a keyword and write a CSV annotation of the result
    Acquire {
        /// Directory to save images into
        #[arg(short, long)]
        output_dir: PathBuf,

        /// CSV annotation file to create
        #[arg(short, long)]
        annotation_file: PathBuf,

        /// Search keyword
        #[arg(short, long, default_value = "pig")]
        keyword: String,

        /// Maximum download time in seconds
        #[arg(short, long, default_value = "60")]
        duration: u64,

        /// Minimum number of images to collect
        #[arg(short, long, default_value = "50")]
        min_images: usize,

        /// Write the run summary as JSON
        #[arg(short, long)]
        summary: Option<PathBuf>,
    },

    /// Annotate a manifest with aspect ratios and plot their distribution
    Aspect {
        /// CSV annotation with an absolute_path column
        #[arg(short, long)]
        annotation_file: PathBuf,

        /// Where to save the annotated CSV
        #[arg(long, default_value = "aspect_ratio_annotation.csv")]
        output_csv: PathBuf,

        /// Where to save the histogram image
        #[arg(long, default_value = "aspect_ratio_histogram.png")]
        output_plot: PathBuf,

        /// Range to report a filtered count for
        #[arg(short, long, default_value = "1.0-1.5")]
        range: String,
    },

    /// Convert an image to pixel art
    Pixelate {
        /// Source image
        #[arg(short, long)]
        input: PathBuf,

        /// Destination image
        #[arg(short, long)]
        output: PathBuf,

        /// Block size in pixels (defaults to the configured value)
        #[arg(short, long)]
        pixel_size: Option<u32>,

        /// Also save the original and the result side by side
        #[arg(long)]
        comparison: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let _log_guard = logging::init_logging(&config.logging.clone().with_verbosity(cli.verbose))?;

    match cli.command {
        Commands::Acquire { output_dir, annotation_file, keyword, duration, min_images, summary } => {
            handle_acquire(&config, output_dir, annotation_file, keyword, duration, min_images, summary).await?;
        }
        Commands::Aspect { annotation_file, output_csv, output_plot, range } => {
            handle_aspect(&config, annotation_file, output_csv, output_plot, range)?;
        }
        Commands::Pixelate { input, output, pixel_size, comparison } => {
            handle_pixelate(&config, input, output, pixel_size, comparison)?;
        }
    }

    Ok(())
}

async fn handle_acquire(
    config: &Config,
    output_dir: PathBuf,
    annotation_file: PathBuf,
    keyword: String,
    duration: u64,
    min_images: usize,
    summary: Option<PathBuf>,
) -> anyhow::Result<()> {
    let request = AcquisitionRequest::new(keyword, output_dir.clone(), min_images, duration)?;
    let fetcher = Arc::new(CommandFetcher::from_config(&config.fetcher));
    let supervisor = AcquisitionSupervisor::with_config(fetcher, &config.acquisition);

    println!("Downloading images for keyword '{}'...", request.keyword());
    println!(
        "Limits: at least {} images or at most {} seconds.",
        request.min_item_count(),
        request.time_budget().as_secs()
    );

    let result = tokio::select! {
        result = supervisor.acquire(&request) => result?,
        _ = tokio::signal::ctrl_c() => anyhow::bail!("Interrupted before acquisition finished"),
    };
    print_acquisition_summary(&result);

    if let Some(summary_path) = summary {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&summary_path, json)?;
        println!("Run summary saved to: {}", summary_path.display());
    }

    let manifest = build_manifest(&output_dir)?;
    manifest.write(&annotation_file)?;
    println!("Annotation saved to: {}", annotation_file.display());

    println!("\nFirst paths from the annotation:");
    match ImagePaths::from_source(&annotation_file) {
        Ok(paths) => {
            let mut shown = 0;
            for (i, path) in paths.take(4).enumerate() {
                println!("{}: {}", i + 1, path.display());
                shown += 1;
            }
            if shown < 4 {
                println!("(no more paths)");
            }
        }
        Err(e) => println!("Could not read the annotation back: {}", e),
    }

    Ok(())
}

fn handle_aspect(
    config: &Config,
    annotation_file: PathBuf,
    output_csv: PathBuf,
    output_plot: PathBuf,
    range: String,
) -> anyhow::Result<()> {
    let processor = AspectRatioProcessor::new(config.aspect.bins()?);

    let records = processor.process_manifest(&annotation_file)?;
    write_records(&records, &output_csv)?;
    println!("Annotated CSV saved to: {}", output_csv.display());

    let sorted = processor.sort_by_range(&records);
    println!("\nSorted sample (first 5 rows):");
    print_records(&sorted, 5);

    let matching = filter_by_range(&records, &range);
    println!("\nImages in range {}: {}", range, matching.len());

    let counts = range_counts(&records, processor.bins());
    println!();
    print_histogram(&counts);
    save_histogram(&counts, &output_plot)?;
    println!("Histogram saved to: {}", output_plot.display());

    Ok(())
}

fn handle_pixelate(
    config: &Config,
    input: PathBuf,
    output: PathBuf,
    pixel_size: Option<u32>,
    comparison: Option<PathBuf>,
) -> anyhow::Result<()> {
    let pixel_size = pixel_size.unwrap_or(config.pixel_art.pixel_size);

    let original = load_image(&input)?;
    let (width, height) = image_size(&original);
    println!("Loaded {}x{} image from {}", width, height, input.display());

    let pixelated = ImageTransformer::pixelate(&original, pixel_size)?;
    save_image(&pixelated, &output)?;
    println!("Pixel art ({}px blocks) saved to: {}", pixel_size, output.display());

    if let Some(comparison_path) = comparison {
        let side_by_side = ImageTransformer::side_by_side(&original, &pixelated);
        save_image(&side_by_side, &comparison_path)?;
        println!("Comparison saved to: {}", comparison_path.display());
    }

    Ok(())
}
