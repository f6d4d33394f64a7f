use super::{load_document, print_outline};
use crate::config::{Config, Overrides};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use dossier_editor::{FieldValue, Method, MutationResult, TemplateInvoker};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Report file (XML or xml-js JSON)
    pub input: PathBuf,

    /// Id of the block to modify
    #[arg(long, requires = "fragment", conflicts_with = "region")]
    pub target: Option<String>,

    /// prepend, append or swap
    #[arg(long, default_value = "append")]
    pub method: Method,

    /// Fragment document (`<View fragment="true">`) to splice in
    #[arg(long)]
    pub fragment: Option<PathBuf>,

    /// Id of an Interactive region to submit instead of a direct splice
    #[arg(long, requires = "response")]
    pub region: Option<String>,

    /// Field assignment for the region, `name=value` (repeatable). Values
    /// are read as JSON when they parse, else as text.
    #[arg(long = "set", value_parser = parse_assignment)]
    pub set: Vec<(String, FieldValue)>,

    /// Response template answering the submission; `${name}` placeholders
    /// are filled from the region's parameters
    #[arg(long)]
    pub response: Option<PathBuf>,

    /// Print the mutation result as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_assignment(s: &str) -> Result<(String, FieldValue), String> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid assignment '{}', expected name=value", s))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| FieldValue::from(raw));
    Ok((name.to_string(), value))
}

pub fn apply(args: ApplyArgs, config: &Config) -> Result<()> {
    let options = config.render_options(&Overrides::default());
    let mut doc = load_document(&args.input, options)?;

    let result = match (&args.target, &args.region) {
        (Some(target), _) => {
            let path = args
                .fragment
                .as_ref()
                .ok_or_else(|| anyhow!("--target needs --fragment"))?;
            let fragment = fs::read_to_string(path)?;
            doc.apply_response(target, args.method, &fragment)?
        }
        (None, Some(region_id)) => {
            let path = args
                .response
                .as_ref()
                .ok_or_else(|| anyhow!("--region needs --response"))?;
            let invoker = TemplateInvoker::new(fs::read_to_string(path)?);

            let region = doc
                .find_region(region_id)
                .ok_or_else(|| anyhow!("No Interactive region with id '{}'", region_id))?;
            for (name, value) in &args.set {
                doc.set_field(region, name, value.clone())?;
            }
            doc.submit(region, &invoker)?
        }
        (None, None) => return Err(anyhow!("Pass either --target with --fragment or --region with --response")),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_result(&result);
    print_outline(doc.root());
    Ok(())
}

fn print_result(result: &MutationResult) {
    println!(
        "{} {} #{} (+{} blocks{}) → version {}",
        "✓".green(),
        result.mutation.method.to_string().bold(),
        result.mutation.target,
        result.inserted,
        result
            .removed
            .as_deref()
            .map(|id| format!(", replaced #{}", id))
            .unwrap_or_default(),
        result.version
    );
    println!();
}
