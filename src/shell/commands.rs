//! Command table: turns parsed commands into filesystem calls and output
//! lines.

use tracing::{debug, error};

use crate::error::VfsError;
use crate::types::{FileType, Node};
use crate::vfs::FileSystem;

use super::opener::{UrlOpener, normalize_url};
use super::parser::{ParseError, ParsedCommand, parse_command};

/// What a command produced. `next_fs` is set when the command changed the
/// filesystem (or the current directory).
#[derive(Debug, Default)]
pub struct CommandOutput {
    pub lines: Vec<String>,
    pub error: Option<String>,
    pub next_fs: Option<FileSystem>,
    pub clear: bool,
}

impl CommandOutput {
    fn lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    fn next(fs: FileSystem) -> Self {
        Self {
            next_fs: Some(fs),
            ..Self::default()
        }
    }
}

pub struct CommandContext<'a> {
    pub fs: &'a FileSystem,
    pub opener: &'a dyn UrlOpener,
}

pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    run: fn(&ParsedCommand, &CommandContext<'_>) -> CommandOutput,
}

static COMMANDS: &[CommandDefinition] = &[
    CommandDefinition {
        name: "help",
        description: "Show available commands or help for one command",
        usage: "help [command]",
        run: help,
    },
    CommandDefinition {
        name: "pwd",
        description: "Print the current directory",
        usage: "pwd",
        run: pwd,
    },
    CommandDefinition {
        name: "ls",
        description: "List directory contents",
        usage: "ls [path]",
        run: ls,
    },
    CommandDefinition {
        name: "cd",
        description: "Change directory",
        usage: "cd [path]",
        run: cd,
    },
    CommandDefinition {
        name: "mkdir",
        description: "Create a directory",
        usage: "mkdir [-p] <path>",
        run: mkdir,
    },
    CommandDefinition {
        name: "touch",
        description: "Create a bookmark file with URL",
        usage: "touch <path> <url>",
        run: touch,
    },
    CommandDefinition {
        name: "rm",
        description: "Remove a file (use -r for directories)",
        usage: "rm [-r] <path>",
        run: rm,
    },
    CommandDefinition {
        name: "mv",
        description: "Move or rename a file or directory",
        usage: "mv <source> <destination>",
        run: mv,
    },
    CommandDefinition {
        name: "cat",
        description: "Show bookmark URL",
        usage: "cat <path>",
        run: cat,
    },
    CommandDefinition {
        name: "open",
        description: "Open bookmark URL in a new tab",
        usage: "open <path>",
        run: open,
    },
    CommandDefinition {
        name: "clear",
        description: "Clear terminal output",
        usage: "clear",
        run: clear,
    },
];

pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|cmd| cmd.name)
}

pub fn command_definition(name: &str) -> Option<&'static CommandDefinition> {
    COMMANDS.iter().find(|cmd| cmd.name == name)
}

/// Run an already parsed command.
pub fn execute(parsed: &ParsedCommand, ctx: &CommandContext<'_>) -> CommandOutput {
    let Some(command) = command_definition(&parsed.name) else {
        return CommandOutput::error(format!(
            "Unknown command: {}. Type 'help' for commands.",
            parsed.name
        ));
    };
    debug!(command = command.name, args = ?parsed.args, flags = ?parsed.flags, "running command");
    (command.run)(parsed, ctx)
}

/// Parse and run one input line. Blank lines produce no output.
pub fn run_line(input: &str, ctx: &CommandContext<'_>) -> CommandOutput {
    match parse_command(input) {
        Ok(parsed) => execute(&parsed, ctx),
        Err(ParseError::Empty) => CommandOutput::default(),
        Err(e) => CommandOutput::error(e.to_string()),
    }
}

/// Short reason for a failed filesystem call, in the usual shell wording.
fn reason(e: &VfsError) -> &'static str {
    match e {
        VfsError::NotFound(_) => "No such file or directory",
        VfsError::NotADirectory(_) => "Not a directory",
        VfsError::IsADirectory(_) => "Is a directory",
        VfsError::AlreadyExists(_) => "File exists",
        VfsError::DirectoryNotEmpty(_) => "Directory not empty",
        VfsError::Cycle(_) => "Cannot move a directory into itself",
        VfsError::PermissionDenied(_) => "Operation not permitted",
        VfsError::InvalidPath(_) | VfsError::InvalidArgument(_) => "Invalid argument",
        VfsError::Invalid(_) | VfsError::BackendIo(_) | VfsError::SystemIo(_) => {
            error!(error = %e, "unexpected error from filesystem operation");
            "Input/output error"
        }
    }
}

fn help(cmd: &ParsedCommand, _: &CommandContext<'_>) -> CommandOutput {
    let Some(target) = cmd.arg(0) else {
        let mut lines = vec!["Commands:".to_string()];
        lines.extend(
            COMMANDS
                .iter()
                .map(|c| format!("  {:<8} {}", c.name, c.description)),
        );
        return CommandOutput::lines(lines);
    };

    match command_definition(target) {
        Some(c) => CommandOutput::lines(vec![
            format!("{}: {}", c.name, c.description),
            format!("Usage: {}", c.usage),
        ]),
        None => CommandOutput::error(format!("help: no help topics match '{target}'")),
    }
}

fn pwd(_: &ParsedCommand, ctx: &CommandContext<'_>) -> CommandOutput {
    CommandOutput::lines(vec![ctx.fs.current_path()])
}

fn ls(cmd: &ParsedCommand, ctx: &CommandContext<'_>) -> CommandOutput {
    let target = cmd.arg(0).unwrap_or(".");
    let entries = match ctx.fs.list_directory(target) {
        Ok(entries) => entries,
        Err(VfsError::NotADirectory(_)) => {
            return CommandOutput::error(format!("ls: '{target}' is not a directory"));
        }
        Err(e) => {
            return CommandOutput::error(format!("ls: cannot access '{target}': {}", reason(&e)));
        }
    };

    let mut items: Vec<String> = entries
        .into_iter()
        .map(|node| match node.file_type() {
            FileType::Directory => format!("{}/", node.name()),
            FileType::File => node.name().to_string(),
        })
        .collect();
    items.sort();

    if items.is_empty() {
        items.push("(empty)".to_string());
    }
    CommandOutput::lines(items)
}

fn cd(cmd: &ParsedCommand, ctx: &CommandContext<'_>) -> CommandOutput {
    let target = cmd.arg(0).unwrap_or("/");
    match ctx.fs.change_directory(target) {
        Ok(fs) => CommandOutput::next(fs),
        Err(e) => CommandOutput::error(format!("cd: {target}: {}", reason(&e))),
    }
}

fn mkdir(cmd: &ParsedCommand, ctx: &CommandContext<'_>) -> CommandOutput {
    let Some(path) = cmd.arg(0) else {
        return CommandOutput::error("mkdir: missing operand");
    };
    let recursive = cmd.has_flag(&["-p", "--parents"]);

    match ctx.fs.create_directory(path, recursive) {
        Ok(fs) => CommandOutput::next(fs),
        Err(e) => CommandOutput::error(format!(
            "mkdir: cannot create directory '{path}': {}",
            reason(&e)
        )),
    }
}

fn touch(cmd: &ParsedCommand, ctx: &CommandContext<'_>) -> CommandOutput {
    let Some(path) = cmd.arg(0) else {
        return CommandOutput::error("touch: missing file operand");
    };
    let Some(url) = cmd.arg(1) else {
        return CommandOutput::error("touch: missing URL operand");
    };

    match ctx.fs.create_file(path, url) {
        Ok(fs) => CommandOutput::next(fs),
        Err(e) => CommandOutput::error(format!(
            "touch: cannot create file '{path}': {}",
            reason(&e)
        )),
    }
}

fn rm(cmd: &ParsedCommand, ctx: &CommandContext<'_>) -> CommandOutput {
    let Some(path) = cmd.arg(0) else {
        return CommandOutput::error("rm: missing operand");
    };
    let recursive = cmd.has_flag(&["-r", "-R", "--recursive"]);

    let Some(id) = ctx.fs.resolve(path) else {
        return CommandOutput::error(format!(
            "rm: cannot remove '{path}': No such file or directory"
        ));
    };

    let result = if ctx.fs.node(id).is_some_and(Node::is_dir) {
        if !recursive {
            return CommandOutput::error(format!("rm: cannot remove '{path}': Is a directory"));
        }
        ctx.fs.delete_directory(path, true)
    } else {
        ctx.fs.delete_file(path)
    };

    match result {
        Ok(fs) => CommandOutput::next(fs),
        Err(e) => CommandOutput::error(format!("rm: cannot remove '{path}': {}", reason(&e))),
    }
}

fn mv(cmd: &ParsedCommand, ctx: &CommandContext<'_>) -> CommandOutput {
    let (Some(source), Some(destination)) = (cmd.arg(0), cmd.arg(1)) else {
        return CommandOutput::error("mv: missing operand");
    };

    match ctx.fs.move_node(source, destination) {
        Ok(fs) => CommandOutput::next(fs),
        Err(e) => CommandOutput::error(format!(
            "mv: cannot move '{source}' to '{destination}': {}",
            reason(&e)
        )),
    }
}

fn cat(cmd: &ParsedCommand, ctx: &CommandContext<'_>) -> CommandOutput {
    let Some(path) = cmd.arg(0) else {
        return CommandOutput::error("cat: missing file operand");
    };

    match ctx.fs.read_file(path) {
        Ok(url) => CommandOutput::lines(vec![url.to_string()]),
        Err(e) => CommandOutput::error(format!("cat: {path}: {}", reason(&e))),
    }
}

fn open(cmd: &ParsedCommand, ctx: &CommandContext<'_>) -> CommandOutput {
    let Some(path) = cmd.arg(0) else {
        return CommandOutput::error("open: missing file operand");
    };

    let url = match ctx.fs.read_file(path) {
        Ok(url) => normalize_url(url),
        Err(e) => return CommandOutput::error(format!("open: {path}: {}", reason(&e))),
    };

    if ctx.opener.open(&url) {
        CommandOutput::lines(vec![format!("Opened {url}")])
    } else {
        CommandOutput::error(format!("open: failed to open {url}"))
    }
}

fn clear(_: &ParsedCommand, _: &CommandContext<'_>) -> CommandOutput {
    CommandOutput {
        clear: true,
        ..CommandOutput::default()
    }
}
