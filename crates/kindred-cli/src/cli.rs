//! Command-line interface for the kindred utility
//!
//! Reads a family document (`{ "people": [...], "relationships": [...] }`)
//! and prints its generation tiers, tree layout, validation issues or role
//! suggestions.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;

use kindred::core::logging::init_logging;
use kindred::organizer::{suggest_roles, validate, validate_roles, RoleSuggestion};
use kindred::{
    Diagnostics, DragOffsets, FamilyInput, KindredConfig, OrganizedFamily, Organizer,
    RoleAssignments, TreeLayout, TreeLayoutAlgorithm, ValidationError,
};

/// Kindred - organize family groups into generations and lay them out as trees
#[derive(Parser)]
#[command(name = "kindred")]
#[command(about = "Organize family relationship data into generation tiers and tree layouts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file with organizer thresholds and layout constants (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Organize people into generation tiers
    Organize {
        /// Input family document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Manual role assignments, a JSON object of person id to role
        #[arg(long)]
        roles: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Compute node positions and connections
    Layout {
        /// Input family document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Container width in pixels
        #[arg(short, long, default_value_t = 800.0)]
        width: f64,

        /// Pack a large child generation into several rows
        #[arg(long)]
        multi_row: bool,

        /// Drag offsets, a JSON object of person id to {"dx": .., "dy": ..}
        #[arg(long)]
        drag: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Report structural issues
    Validate {
        /// Input family document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Validate these role assignments instead of the automatic tiers
        #[arg(long)]
        roles: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Suggest roles from ages and genders
    Suggest {
        /// Input family document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Main CLI application
pub struct KindredApp {
    config: KindredConfig,
}

impl KindredApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_config(KindredConfig::default())
    }

    /// Create a new application instance with a config
    pub fn with_config(config: KindredConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KindredConfig {
        &self.config
    }

    fn organizer(&self) -> Organizer {
        Organizer::with_config(self.config.organizer.clone())
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level_str = std::env::var("KINDRED_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("KINDRED_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Kindred v{}", env!("CARGO_PKG_VERSION"));
        }

        if let Some(path) = &cli.config {
            self.config = KindredConfig::from_file(path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))?;
            debug!(path = %path.display(), "Loaded config");
        }

        match cli.command {
            Commands::Organize {
                input,
                output,
                roles,
                json,
            } => self.organize_command(input, output, roles, json, cli.verbose),
            Commands::Layout {
                input,
                output,
                width,
                multi_row,
                drag,
                json,
            } => self.layout_command(input, output, width, multi_row, drag, json, cli.verbose),
            Commands::Validate { input, roles, json } => {
                self.validate_command(input, roles, json, cli.verbose)
            }
            Commands::Suggest { input, json } => self.suggest_command(input, json, cli.verbose),
        }
    }

    /// Handle the organize command
    fn organize_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        roles: Option<PathBuf>,
        json: bool,
        verbose: bool,
    ) -> Result<()> {
        let family_input = self.load_family(input, verbose)?;
        let mut diagnostics = Diagnostics::new();

        let family = match roles {
            Some(path) => {
                let roles = self.load_roles(path)?;
                self.organizer().organize_with_roles(
                    &family_input.people,
                    &family_input.relationships,
                    &roles,
                    &mut diagnostics,
                )
            }
            None => self.organizer().organize_with_diagnostics(
                &family_input.people,
                &family_input.relationships,
                &mut diagnostics,
            ),
        };

        let rendered = if json {
            serde_json::to_string_pretty(&serde_json::json!({
                "family": family,
                "diagnostics": diagnostics.entries(),
            }))?
        } else {
            let mut text = render_family(&family);
            if verbose {
                for entry in diagnostics.entries() {
                    let _ = writeln!(text, "note [{}]: {}", entry.code, entry.message);
                }
            }
            text
        };
        self.write_output(output, &rendered)
    }

    /// Handle the layout command
    #[allow(clippy::too_many_arguments)]
    fn layout_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        width: f64,
        multi_row: bool,
        drag: Option<PathBuf>,
        json: bool,
        verbose: bool,
    ) -> Result<()> {
        let family_input = self.load_family(input, verbose)?;
        let offsets = match drag {
            Some(path) => DragOffsets::from_json(&read_file(&path)?)
                .with_context(|| format!("Invalid drag offsets in '{}'", path.display()))?,
            None => DragOffsets::new(),
        };

        let family = self
            .organizer()
            .organize(&family_input.people, &family_input.relationships);
        let tree = TreeLayoutAlgorithm::with_config(self.config.layout.clone()).layout(
            &family,
            width,
            multi_row,
            &offsets,
        );

        if verbose {
            eprintln!(
                "Laid out {} people with {} connections",
                tree.positions.len(),
                tree.connections.len()
            );
        }

        let rendered = if json {
            serde_json::to_string_pretty(&tree)?
        } else {
            render_layout(&family, &tree)
        };
        self.write_output(output, &rendered)
    }

    /// Handle the validate command
    fn validate_command(
        &self,
        input: Option<PathBuf>,
        roles: Option<PathBuf>,
        json: bool,
        verbose: bool,
    ) -> Result<()> {
        let family_input = self.load_family(input, verbose)?;

        let issues = match roles {
            Some(path) => {
                let roles = self.load_roles(path)?;
                validate_roles(&family_input.people, &family_input.relationships, &roles)
            }
            None => {
                let family = self
                    .organizer()
                    .organize(&family_input.people, &family_input.relationships);
                validate(&family)
            }
        };

        if json {
            println!("{}", serde_json::to_string_pretty(&issues)?);
        } else {
            print!("{}", render_issues(&issues));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("{} issue(s) found", issues.len()))
        }
    }

    /// Handle the suggest command
    fn suggest_command(&self, input: Option<PathBuf>, json: bool, verbose: bool) -> Result<()> {
        let family_input = self.load_family(input, verbose)?;
        let suggestions = suggest_roles(&family_input.people, &self.config.organizer);

        if json {
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        } else {
            print!("{}", render_suggestions(&family_input, &suggestions));
        }
        Ok(())
    }

    fn load_family(&self, input: Option<PathBuf>, verbose: bool) -> Result<FamilyInput> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }
        Ok(FamilyInput::from_json(&content)?)
    }

    fn load_roles(&self, path: PathBuf) -> Result<RoleAssignments> {
        RoleAssignments::from_json(&read_file(&path)?)
            .with_context(|| format!("Invalid role assignments in '{}'", path.display()))
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => read_file(&path),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        let stdout_content = if content.is_empty() || content.ends_with('\n') {
            content.to_string()
        } else {
            format!("{}\n", content)
        };

        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                print!("{}", stdout_content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for KindredApp {
    fn default() -> Self {
        Self::new()
    }
}

fn read_file(path: &PathBuf) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e))
}

fn describe(person: &kindred::Person) -> String {
    let mut details = vec![format!("id {}", person.id)];
    if let Some(age) = person.age {
        details.push(format!("age {}", age));
    }
    if let Some(gender) = person.gender {
        details.push(gender.to_string());
    }
    format!("{} ({})", person.name, details.join(", "))
}

/// Generation tiers as indented text
pub fn render_family(family: &OrganizedFamily) -> String {
    if family.is_empty() {
        return "No family members\n".to_string();
    }

    let mut out = String::new();
    for (generation, members) in family.tiers() {
        let _ = writeln!(out, "{}:", capitalize(&generation.to_string()));
        for person in members {
            let _ = writeln!(out, "  {}", describe(person));
        }
    }
    let _ = writeln!(out, "Source: {}", family.source());
    out
}

/// Node positions and connections as a table
pub fn render_layout(family: &OrganizedFamily, tree: &TreeLayout) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Container: {} x {}",
        tree.container_width, tree.container_height
    );

    for node in &tree.positions {
        let name = family
            .person(node.person_id)
            .map(|p| p.name.as_str())
            .unwrap_or("?");
        let position = node.position();
        let _ = write!(
            out,
            "  {:<12} {:>4}  {:<20} ({}, {})",
            node.generation.to_string(),
            node.person_id,
            name,
            position.x,
            position.y
        );
        if node.offset.is_some() {
            out.push_str(" dragged");
        }
        out.push('\n');
    }

    if !tree.connections.is_empty() {
        out.push_str("Connections:\n");
        for connection in &tree.connections {
            let _ = writeln!(
                out,
                "  {:<24} {} -> {}",
                connection.kind.to_string(),
                connection.from,
                connection.to
            );
        }
    }
    out
}

/// Validation issues, one per line
pub fn render_issues(issues: &[ValidationError]) -> String {
    if issues.is_empty() {
        return "✓ No issues found\n".to_string();
    }
    issues
        .iter()
        .map(|issue| format!("✗ {}\n", issue))
        .collect()
}

/// Role suggestions, one per person
pub fn render_suggestions(input: &FamilyInput, suggestions: &[RoleSuggestion]) -> String {
    let mut out = String::new();
    for suggestion in suggestions {
        let name = input
            .people
            .iter()
            .find(|p| p.id == suggestion.person_id)
            .map(|p| p.name.as_str())
            .unwrap_or("?");
        let _ = writeln!(
            out,
            "{:<20} {:<12} {}",
            name,
            suggestion.role.to_string(),
            suggestion.reason
        );
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use kindred::{Gender, Person, RelationshipEdge};
    use std::fs;
    use tempfile::tempdir;

    const FAMILY: &str = r#"{
        "people": [
            {"id": 1, "name": "Ada", "age": 44, "gender": "female"},
            {"id": 2, "name": "Ben", "age": 46, "gender": "male"},
            {"id": 3, "name": "Cal", "age": 12}
        ],
        "relationships": [
            {"person_a": 1, "person_b": 3, "relationship_type": "parent"},
            {"person_a": 2, "person_b": 3, "relationship_type": "parent"}
        ]
    }"#;

    #[test]
    fn test_cli_parsing_layout_command() {
        let args = vec![
            "kindred",
            "layout",
            "--input",
            "family.json",
            "--width",
            "1024",
            "--multi-row",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Layout {
                input,
                width,
                multi_row,
                drag,
                json,
                ..
            } => {
                assert_eq!(input.unwrap().to_string_lossy(), "family.json");
                assert_eq!(width, 1024.0);
                assert!(multi_row);
                assert!(drag.is_none());
                assert!(!json);
            }
            _ => panic!("Expected Layout command"),
        }
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_cli_parsing_organize_command() {
        let args = vec!["kindred", "organize", "-i", "-", "--json", "--roles", "roles.json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Organize {
                input, roles, json, ..
            } => {
                assert_eq!(input.unwrap().to_string_lossy(), "-");
                assert_eq!(roles.unwrap().to_string_lossy(), "roles.json");
                assert!(json);
            }
            _ => panic!("Expected Organize command"),
        }
    }

    #[test]
    fn test_cli_parsing_global_config() {
        let args = vec!["kindred", "suggest", "--config", "kindred.json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config.unwrap().to_string_lossy(), "kindred.json");
        assert!(matches!(cli.command, Commands::Suggest { json: false, .. }));
    }

    #[test]
    fn test_cli_rejects_unknown_log_level() {
        let args = vec!["kindred", "--log-level", "loud", "suggest"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_read_input_from_file() {
        let app = KindredApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("family.json");
        fs::write(&file_path, FAMILY).unwrap();

        let content = app.read_input(Some(file_path)).unwrap();
        assert_eq!(content, FAMILY);
    }

    #[test]
    fn test_read_input_missing_file() {
        let app = KindredApp::new();
        let err = app
            .read_input(Some(PathBuf::from("/nonexistent/family.json")))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn test_write_output_to_file() {
        let app = KindredApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("out.txt");

        app.write_output(Some(file_path.clone()), "Parent:\n").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "Parent:\n");
    }

    #[test]
    fn test_render_family_text() {
        let input = FamilyInput::from_json(FAMILY).unwrap();
        let family = Organizer::new().organize(&input.people, &input.relationships);
        let text = render_family(&family);

        assert!(text.contains("Parent:\n  Ada (id 1, age 44, female)\n"));
        assert!(text.contains("Child:\n  Cal (id 3, age 12)\n"));
        assert!(text.ends_with("Source: relationships\n"));
    }

    #[test]
    fn test_render_layout_marks_dragged_nodes() {
        let people = vec![
            Person::new(1, "Ada").with_age(44).with_gender(Gender::Female),
            Person::new(3, "Cal").with_age(12),
        ];
        let family = Organizer::new().organize(&people, &[RelationshipEdge::parent(1, 3)]);
        let mut offsets = DragOffsets::new();
        offsets.nudge(3, 10.0, 0.0);
        let tree = TreeLayoutAlgorithm::new().layout(&family, 800.0, false, &offsets);

        let text = render_layout(&family, &tree);
        assert!(text.starts_with("Container: 800 x 320\n"));
        assert!(text.contains(" dragged\n"));
        assert!(text.contains("parent-child"));
    }

    #[test]
    fn test_render_issues() {
        assert_eq!(render_issues(&[]), "✓ No issues found\n");
    }

    #[test]
    fn test_config_file_overrides_thresholds() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("kindred.json");
        fs::write(&config_path, r#"{"organizer": {"suggestion_parent_min_age": 18}}"#).unwrap();
        let input_path = dir.path().join("family.json");
        fs::write(&input_path, FAMILY).unwrap();

        let cli = Cli::try_parse_from(vec![
            "kindred",
            "--config",
            config_path.to_str().unwrap(),
            "suggest",
            "-i",
            input_path.to_str().unwrap(),
        ])
        .unwrap();
        let mut app = KindredApp::new();
        app.run(cli).unwrap();
        assert_eq!(app.config().organizer.suggestion_parent_min_age, 18);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("grandparent"), "Grandparent");
        assert_eq!(capitalize(""), "");
    }
}
