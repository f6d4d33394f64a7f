use super::{load_document, print_outline};
use crate::config::{Config, Overrides};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dossier_blocks::{Block, CaptionType, FigureCounter, RenderOptions};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Report file (XML or xml-js JSON)
    pub input: PathBuf,

    /// Render as an embed
    #[arg(long)]
    pub embed: bool,

    /// Render text blocks as light prose
    #[arg(long)]
    pub light_prose: bool,

    /// Dump the typed tree as JSON instead of an outline
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderOutput<'a> {
    options: &'a RenderOptions,
    single_block_embed: bool,
    counters: &'a FigureCounter,
    root: &'a Block,
}

pub fn render(args: RenderArgs, config: &Config) -> Result<()> {
    let options = config.render_options(&Overrides {
        embed: args.embed,
        light_prose: args.light_prose,
        ..Default::default()
    });
    let doc = load_document(&args.input, options)?;

    if args.json {
        let output = RenderOutput {
            options: doc.options(),
            single_block_embed: doc.is_single_block_embed(),
            counters: doc.counter(),
            root: doc.root(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_header(&args.input);
    print_outline(doc.root());
    println!();

    let counter = doc.counter();
    println!(
        "   Blocks: {}   Figures: {}   Tables: {}   Plots: {}",
        doc.root().count(),
        counter.current(CaptionType::Figure),
        counter.current(CaptionType::Table),
        counter.current(CaptionType::Plot),
    );
    if doc.is_single_block_embed() {
        println!("   {} single-block embed", "✓".green());
    }

    Ok(())
}

fn print_header(input: &Path) {
    println!("📄 {} {}", "Report".green().bold(), input.display());
    println!();
}
