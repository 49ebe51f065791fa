use clap::Parser;
use sitemap_forge::{RunSummary, Sitemap, utils};
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();
    let stylesheet = args.stylesheet.clone();

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let output_dir = config.output_dir();
    let stylesheet_name = config.stylesheet_file_name();

    let start_time = std::time::Instant::now();
    let summary = match Sitemap::from_config(config).generate().await {
        Ok(summary) => summary,
        Err(e) => {
            ::log::error!("Sitemap generation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(source) = stylesheet {
        match utils::copy_stylesheet(&source, &output_dir, &stylesheet_name) {
            Ok(destination) => {
                ::log::info!("Copied sitemap stylesheet to: {}", destination.display())
            }
            Err(e) => ::log::warn!("Failed to copy stylesheet {}: {}", source.display(), e),
        }
    }

    ::log::info!(
        "Finished in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );
    print_summary(&summary);
    ExitCode::SUCCESS
}

fn print_summary(summary: &RunSummary) {
    println!("Sitemap index: {}", summary.index_path.display());
    println!("  HTML files scanned: {}", summary.files_scanned);
    println!("  Pages written:      {}", summary.pages_written);
    println!("  Pages skipped:      {}", summary.pages_skipped);
    println!("  Sitemap parts:      {}", summary.parts.len());
    println!("  Unique images:      {}", summary.unique_images);
    println!("  Unique videos:      {}", summary.unique_videos);
    println!("  Old parts removed:  {}", summary.cleanup.removed.len());
    for failure in &summary.cleanup.failures {
        println!("  Cleanup failure: {}", failure);
    }
    println!();
    println!("Submit this URL to search engines: {}", summary.index_url);
}
