//! Console command definitions for IKFX

use std::path::PathBuf;

/// Commands that can be typed at the console
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set a parameter in plain units
    Set(String, f32),
    /// Print a parameter
    Get(String),
    /// Print every parameter
    List,
    /// Write a preset file
    Save(PathBuf),
    /// Read a preset file
    Load(PathBuf),
    /// Restore defaults
    Reset,
    /// Show the engine's level meters
    Status,
    Help,
    Quit,
}

/// Console usage text
pub const HELP: &str = "\
Commands:
  set <id> <value>   Set a parameter
  get <id>           Show a parameter
  list               Show all parameters
  save <path>        Save a preset
  load <path>        Load a preset
  reset              Restore defaults
  status             Show levels
  help               Show this help
  quit               Exit";

/// Parse one console line
pub fn parse_command(line: &str) -> Option<Command> {
    let input = line.trim();

    // Simple commands first
    match input {
        "q" | "quit" | "exit" => return Some(Command::Quit),
        "list" | "ls" => return Some(Command::List),
        "reset" => return Some(Command::Reset),
        "status" => return Some(Command::Status),
        "help" | "?" => return Some(Command::Help),
        _ => {}
    }

    if let Some(rest) = input.strip_prefix("set ") {
        let mut parts = rest.split_whitespace();
        let id = parts.next()?;
        let value = parts.next()?.parse::<f32>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        return Some(Command::Set(id.to_string(), value));
    }

    if let Some(rest) = input.strip_prefix("get ") {
        let id = rest.trim();
        if !id.is_empty() && !id.contains(char::is_whitespace) {
            return Some(Command::Get(id.to_string()));
        }
    }

    if let Some(path) = input.strip_prefix("save ") {
        return parse_path(path).map(Command::Save);
    }

    if let Some(path) = input.strip_prefix("load ") {
        return parse_path(path).map(Command::Load);
    }

    None
}

/// Extract a path argument, quoted or unquoted
fn parse_path(arg: &str) -> Option<PathBuf> {
    let path = arg.trim();
    let path = if path.len() >= 2
        && ((path.starts_with('\'') && path.ends_with('\''))
            || (path.starts_with('"') && path.ends_with('"')))
    {
        // Remove surrounding quotes
        &path[1..path.len() - 1]
    } else {
        path
    };

    if path.is_empty() {
        None
    } else {
        Some(path.into())
    }
}
