use std::path::{Path, PathBuf};

use {anyhow::Result, clap::Subcommand};

use {
    herald_commands::CommandNode,
    herald_config::{
        HeraldConfig,
        validate::{self, Severity},
    },
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the command tree file and report errors/warnings.
    Check {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// Print the command tree (built-ins plus configured commands).
    Tree,
    /// Print the path of the config file in use.
    Path,
}

pub fn handle_config(action: ConfigAction, explicit: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Check { verbose } => check(explicit, verbose),
        ConfigAction::Tree => {
            let config = crate::load_config(explicit)?;
            let tree = crate::build_tree(&config)?;
            print!("{}", render_tree(&tree));
            Ok(())
        },
        ConfigAction::Path => {
            match config_path(explicit) {
                Some(path) => println!("{}", path.display()),
                None => eprintln!("No config file found."),
            }
            Ok(())
        },
    }
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(herald_config::find_config_file)
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(explicit: Option<&Path>, verbose: bool) -> Result<()> {
    let config = match config_path(explicit) {
        Some(path) => {
            eprintln!("Checking {}\n", path.display());
            herald_config::load_config(&path)?
        },
        None => {
            eprintln!("No config file found; checking defaults.\n");
            HeraldConfig::default()
        },
    };
    let result = validate::validate(&config);

    let mut shown = 0;
    for d in &result.diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }

        let color = match d.severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
            Severity::Info => CYAN,
        };

        if d.path.is_empty() {
            eprintln!("  {BOLD}{color}{}{RESET} {}", d.severity, d.message);
        } else {
            eprintln!("  {BOLD}{color}{}{RESET} {}: {}", d.severity, d.path, d.message);
        }
        shown += 1;
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if shown > 0 {
        eprintln!();
    }

    // Validation passed; registration can still reject what it cannot see
    // statically (clashes with built-in commands).
    if !result.has_errors()
        && let Err(e) = crate::build_tree(&config)
    {
        eprintln!("  {BOLD}{RED}error{RESET} {e}\n");
        std::process::exit(1);
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// One line per command, indented by depth.
pub fn render_tree(root: &CommandNode) -> String {
    let mut out = String::new();
    for child in root.children() {
        render_node(child, 0, &mut out);
    }
    out
}

fn render_node(node: &CommandNode, depth: usize, out: &mut String) {
    use std::fmt::Write;

    let _ = write!(out, "{}{}", "  ".repeat(depth), node.label());
    if !node.aliases().is_empty() {
        let _ = write!(out, " ({})", node.aliases().join(", "));
    }

    let mut flags = vec![node.generator().kind().to_string()];
    if node.is_case_insensitive() {
        flags.push("case-insensitive".into());
    }
    if node.is_guild_only() {
        flags.push("group-only".into());
    }
    if node.deletes_invoking_message() {
        flags.push("deletes-message".into());
    }
    let req = node.requirements();
    if !req.is_unrestricted() {
        let mut rules = Vec::new();
        rules.extend(req.allowed_actor_ids.iter().map(|id| format!("actor:{id}")));
        rules.extend(
            req.capabilities
                .iter()
                .map(|(name, value)| format!("{name}={value}")),
        );
        rules.extend(req.allowed_group_ids.iter().map(|id| format!("role:{id}")));
        rules.extend(
            req.allowed_group_names
                .iter()
                .map(|name| format!("role:{name:?}")),
        );
        flags.push(format!("requires {}", rules.join(" | ")));
    }
    let _ = writeln!(out, " [{}]", flags.join(", "));

    for child in node.children() {
        render_node(child, depth + 1, out);
    }
}
