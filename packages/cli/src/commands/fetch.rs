use super::load_document;
use crate::config::{Config, Overrides};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use dossier_blocks::{fetch_block_asset, fetcher_for, AssetPayload};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Report file (XML or xml-js JSON)
    pub input: PathBuf,

    /// Id of the asset block to fetch
    #[arg(long)]
    pub id: String,

    /// Fetch `src` over HTTP instead of decoding inline data
    #[arg(long)]
    pub remote: bool,

    /// Write the payload to a file instead of summarising it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn fetch(args: FetchArgs, config: &Config) -> Result<()> {
    let options = config.render_options(&Overrides {
        remote: args.remote,
        ..Default::default()
    });
    let assets = options.assets;
    let doc = load_document(&args.input, options)?;

    let block = doc
        .root()
        .find_by_id(&args.id)
        .ok_or_else(|| anyhow!("No block with id '{}'", args.id))?;

    let fetcher = fetcher_for(assets)?;
    let payload = fetch_block_asset(block, fetcher.as_ref())?;

    println!(
        "{} {} #{} ({})",
        "✓".green(),
        block.kind_name().bold(),
        args.id,
        payload.describe()
    );

    if let Some(path) = &args.output {
        let bytes = match payload {
            AssetPayload::Text(text) => text.into_bytes(),
            AssetPayload::Json(value) => serde_json::to_vec_pretty(&value)?,
            AssetPayload::Bytes(bytes) => bytes,
        };
        fs::write(path, bytes)?;
        println!("   Wrote {}", path.display());
    }

    Ok(())
}
