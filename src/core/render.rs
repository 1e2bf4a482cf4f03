//! Renderer module
//!
//! Renders ResultSet to different output formats: jsonl, json, md, raw

use crate::core::model::{Kind, ResultItem, ResultSet};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    /// Create a new render config with pretty option
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Renderer for result sets
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Create a new renderer with render config
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a result set to a string
    pub fn render(&self, result_set: &ResultSet) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(result_set),
            OutputFormat::Json => self.render_json(result_set),
            OutputFormat::Markdown => self.render_markdown(result_set),
            OutputFormat::Raw => self.render_raw(result_set),
        }
    }

    /// Render and print to stdout, skipping empty output
    pub fn print(&self, result_set: &ResultSet) {
        let output = self.render(result_set);
        if !output.is_empty() {
            println!("{}", output);
        }
    }

    /// Render as JSON Lines (one JSON object per line)
    fn render_jsonl(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| {
                if self.config.pretty {
                    serde_json::to_string_pretty(item).ok()
                } else {
                    serde_json::to_string(item).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// Render as a single JSON array
    fn render_json(&self, result_set: &ResultSet) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        }
    }

    /// Render as Markdown
    fn render_markdown(&self, result_set: &ResultSet) -> String {
        let mut output = String::new();

        let mut matches = Vec::new();
        let mut operations = Vec::new();
        let mut errors = Vec::new();

        for item in &result_set.items {
            if !item.is_ok() {
                errors.push(item);
            }
            match item.kind {
                Kind::Match => matches.push(item),
                kind if kind.is_operation() => operations.push(item),
                _ => {}
            }
        }

        if !errors.is_empty() {
            output.push_str("## Errors\n\n");
            for item in errors {
                for error in &item.errors {
                    output.push_str(&format!("- **{}**: {}", error.code, error.message));
                    if let Some(path) = &item.path {
                        output.push_str(&format!(" (`{}`)", path));
                    }
                    output.push('\n');
                }
            }
            output.push('\n');
        }

        if !matches.is_empty() {
            output.push_str("## Matches\n\n");
            for item in matches {
                self.render_match_md(&mut output, item);
            }
            output.push('\n');
        }

        if !operations.is_empty() {
            output.push_str("## Operations\n\n");
            for item in operations.into_iter().filter(|item| item.is_ok()) {
                self.render_operation_md(&mut output, item);
            }
            output.push('\n');
        }

        output
    }

    fn render_match_md(&self, output: &mut String, item: &ResultItem) {
        let Some(path) = &item.path else {
            return;
        };
        output.push_str(&format!("- `{}`", path));
        if let Some(hit) = &item.meta.hit {
            output.push_str(&format!(" (row {}, column {}", hit.row, hit.column));
            if let Some(name) = &hit.column_name {
                output.push_str(&format!(" `{}`", name));
            }
            output.push(')');
        }
        if let Some(size) = item.meta.size {
            output.push_str(&format!(" {} bytes", size));
        }
        output.push('\n');
    }

    fn render_operation_md(&self, output: &mut String, item: &ResultItem) {
        let verb = match item.kind {
            Kind::Copy => "copied",
            Kind::Move => "moved",
            Kind::Delete => "deleted",
            Kind::Open => "opened",
            Kind::Folder => "created",
            _ => return,
        };
        let path = item.path.as_deref().unwrap_or_default();
        match &item.dest {
            Some(dest) => output.push_str(&format!("- {} `{}` -> `{}`\n", verb, path, dest)),
            None => output.push_str(&format!("- {} `{}`\n", verb, path)),
        }
    }

    /// Render paths only, one per line
    fn render_raw(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter(|item| item.is_ok())
            .filter_map(|item| item.dest.clone().or_else(|| item.path.clone()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
