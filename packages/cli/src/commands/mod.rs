pub mod apply;
pub mod fetch;
pub mod render;

pub use apply::{apply, ApplyArgs};
pub use fetch::{fetch, FetchArgs};
pub use render::{render, RenderArgs};

use anyhow::{anyhow, Result};
use colored::Colorize;
use dossier_blocks::{Block, RenderOptions};
use dossier_editor::{Document, EditorError};
use dossier_parser::format_error;
use std::fs;
use std::path::Path;

/// Read and build a report, printing parse errors as annotated source
pub fn load_document(path: &Path, options: RenderOptions) -> Result<Document> {
    let source = fs::read_to_string(path)
        .map_err(|e| anyhow!("Cannot read {}: {}", path.display(), e))?;

    match Document::from_source(&source, options) {
        Ok(doc) => Ok(doc),
        Err(EditorError::Parse(err)) => {
            eprint!("{}", format_error(&source, &path.to_string_lossy(), &err));
            Err(anyhow!("Failed to parse {}", path.display()))
        }
        Err(err) => Err(err.into()),
    }
}

/// One outline line per block, indented by depth
pub fn outline_lines(root: &Block) -> Vec<String> {
    let mut lines = Vec::new();
    root.walk(&mut |block, depth| {
        let mut line = format!("{}{}", "  ".repeat(depth), block.kind_name().bold());
        if let Some(id) = block.id() {
            line.push_str(&format!(" {}", format!("#{}", id).dimmed()));
        }
        if let Some(n) = block.meta.sequence_number {
            let caption = block.meta.caption.as_deref().unwrap_or_default();
            line.push_str(&format!(
                " {}",
                format!("[{} {}: {}]", block.meta.caption_type, n, caption).cyan()
            ));
        }
        lines.push(line);
    });
    lines
}

pub fn print_outline(root: &Block) {
    for line in outline_lines(root) {
        println!("{}", line);
    }
}
