//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use protoloc_events::FailureContext;
use protoloc_resolver::{ResolvedToolchain, ToolOutcome};
use protoloc_types::{ResolutionStrategy, ResolvedExecutable};
use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// What a command produced
pub enum CommandOutput {
    /// A single executable (`which`, `fetch`)
    Executable(ResolvedExecutable),
    /// Compiler and plugins from a descriptor file
    Toolchain(ResolvedToolchain),
    /// Host facts
    Platform {
        host: String,
        classifier: Result<&'static str, String>,
    },
}

/// One row of a toolchain report
#[derive(Serialize)]
struct ToolReport<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strategy: Option<ResolutionStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_hit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<FailureContext>,
}

#[derive(Serialize)]
struct ToolchainReport<'a> {
    tools: Vec<ToolReport<'a>>,
    succeeded: usize,
    failed: usize,
}

#[derive(Serialize)]
struct PlatformReport<'a> {
    host: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    classifier: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> From<&'a ToolOutcome> for ToolReport<'a> {
    fn from(tool: &'a ToolOutcome) -> Self {
        match &tool.outcome {
            Ok(resolved) => Self {
                name: &tool.name,
                path: Some(resolved.path().to_path_buf()),
                strategy: Some(resolved.source_strategy()),
                cache_hit: resolved.cache_hit(),
                error: None,
            },
            Err(e) => Self {
                name: &tool.name,
                path: None,
                strategy: None,
                cache_hit: None,
                error: Some(FailureContext::from_error(e)),
            },
        }
    }
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool) -> Self {
        Self {
            json_output,
            term: Term::stdout(),
        }
    }

    /// Render command output
    pub fn render_result(&self, output: &CommandOutput) -> io::Result<()> {
        if self.json_output {
            self.render_json(output)
        } else {
            self.render_plain(output)
        }
    }

    fn render_json(&self, output: &CommandOutput) -> io::Result<()> {
        let value = match output {
            CommandOutput::Executable(resolved) => serde_json::to_value(resolved),
            CommandOutput::Toolchain(toolchain) => serde_json::to_value(ToolchainReport {
                tools: toolchain.outcomes().map(ToolReport::from).collect(),
                succeeded: toolchain.succeeded(),
                failed: toolchain.failed(),
            }),
            CommandOutput::Platform { host, classifier } => serde_json::to_value(PlatformReport {
                host,
                classifier: classifier.as_ref().ok().copied(),
                error: classifier.as_ref().err().map(String::as_str),
            }),
        }
        .map_err(io::Error::other)?;

        let json = serde_json::to_string_pretty(&value).map_err(io::Error::other)?;
        self.term.write_line(&json)
    }

    fn render_plain(&self, output: &CommandOutput) -> io::Result<()> {
        match output {
            CommandOutput::Executable(resolved) => {
                self.term.write_line(&resolved.path().display().to_string())
            }
            CommandOutput::Toolchain(toolchain) => self.render_toolchain(toolchain),
            CommandOutput::Platform { host, classifier } => {
                self.term.write_line(&format!("host:       {host}"))?;
                match classifier {
                    Ok(classifier) => self.term.write_line(&format!("classifier: {classifier}")),
                    Err(reason) => {
                        let style = Style::new().red();
                        self.term
                            .write_line(&format!("classifier: {}", style.apply_to(reason)))
                    }
                }
            }
        }
    }

    fn render_toolchain(&self, toolchain: &ResolvedToolchain) -> io::Result<()> {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Name").add_attribute(Attribute::Bold),
                Cell::new("Strategy").add_attribute(Attribute::Bold),
                Cell::new("Result").add_attribute(Attribute::Bold),
            ]);

        for tool in toolchain.outcomes() {
            match &tool.outcome {
                Ok(resolved) => {
                    let strategy = match (resolved.source_strategy(), resolved.cache_hit()) {
                        (ResolutionStrategy::Coordinate, Some(true)) => "coordinate (cached)",
                        (ResolutionStrategy::Coordinate, _) => "coordinate",
                        (ResolutionStrategy::PathSearch, _) => "path search",
                        (ResolutionStrategy::Explicit, _) => "explicit",
                    };
                    table.add_row(vec![
                        Cell::new(&tool.name),
                        Cell::new(strategy),
                        Cell::new(resolved.path().display()).fg(Color::Green),
                    ]);
                }
                Err(e) => {
                    table.add_row(vec![
                        Cell::new(&tool.name),
                        Cell::new(e.kind()),
                        Cell::new(e).fg(Color::Red),
                    ]);
                }
            }
        }

        self.term.write_line(&table.to_string())
    }
}
