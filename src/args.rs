use clap::Parser;
use sitemap_forge::SitemapConfig;
use sitemap_forge::error::{Result, SitemapError};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sitemap-forge")]
#[command(about = "Memory-efficient sitemap generator for static HTML sites")]
#[command(version)]
pub struct Args {
    /// Base URL of the site
    #[arg(long, required_unless_present = "config")]
    pub site_base_url: Option<String>,

    /// Path to the site's HTML files
    #[arg(long, required_unless_present = "config")]
    pub site_root: Option<PathBuf>,

    /// Output sitemap index filename (a bare name lands in the site root)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Max URLs per sitemap part
    #[arg(long)]
    pub split: Option<usize>,

    /// Part file name prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// XSL stylesheet to copy next to the sitemap files
    #[arg(long)]
    pub stylesheet: Option<PathBuf>,

    /// Omit the xml-stylesheet instruction from generated files
    #[arg(long, default_value_t = false)]
    pub no_stylesheet: bool,

    /// Regex for relative page paths to include (repeatable)
    #[arg(long)]
    pub include: Vec<String>,

    /// Regex for relative page paths to exclude (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Build the run configuration, applying command-line overrides on top of the file
    pub fn into_config(self) -> Result<SitemapConfig> {
        let mut config = match &self.config {
            Some(path) => {
                ::log::info!("Loading configuration from file: {}", path.display());
                SitemapConfig::from_file(path)?
            }
            None => {
                let (Some(base_url), Some(root)) = (&self.site_base_url, &self.site_root) else {
                    return Err(SitemapError::InvalidConfig(
                        "--site-base-url and --site-root are required".to_string(),
                    ));
                };
                SitemapConfig::new(base_url, root)
            }
        };

        if let Some(base_url) = self.site_base_url {
            config.site_base_url = base_url;
        }
        if let Some(root) = self.site_root {
            config.site_root = root;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(split) = self.split {
            config.split_limit = split;
        }
        if let Some(prefix) = self.prefix {
            config.part_prefix = prefix;
        }
        if self.no_stylesheet {
            config.stylesheet_href = None;
        }
        config.include_patterns.extend(self.include);
        config.exclude_patterns.extend(self.exclude);

        Ok(config)
    }
}
