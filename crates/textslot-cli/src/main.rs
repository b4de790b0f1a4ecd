use anyhow::{Context, Result, anyhow, bail};
use std::io::Read;
use std::{env, fs, path::PathBuf, process};
use textslot_config::Config;
use textslot_engine::editing::QueryState;
use textslot_engine::{Editor, EditorOptions, SlotId};

/// One line of an edit script
#[derive(Debug, Clone, PartialEq)]
enum Command {
    /// `select <slot-path> <offset> [<slot-path> <offset>]`
    Select {
        start: (Vec<usize>, usize),
        end: Option<(Vec<usize>, usize)>,
    },
    /// `insert <text>`; `\n` and `\\` escapes are honoured
    Insert(String),
    Enter,
    Backspace,
    Delete,
    /// `format <formatter> <json value>`
    Format(String, serde_json::Value),
    Unformat(String),
    Undo,
    Redo,
    Query(String),
}

fn parse_path(raw: &str) -> Result<Vec<usize>> {
    raw.split('.')
        .map(|part| {
            part.parse::<usize>()
                .with_context(|| format!("invalid slot path segment '{part}' in '{raw}'"))
        })
        .collect()
}

fn parse_location(path: &str, offset: &str) -> Result<(Vec<usize>, usize)> {
    let offset = offset
        .parse()
        .with_context(|| format!("invalid offset '{offset}'"))?;
    Ok((parse_path(path)?, offset))
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match (c, chars.clone().next()) {
            ('\\', Some('n')) => {
                out.push('\n');
                chars.next();
            }
            ('\\', Some('\\')) => {
                out.push('\\');
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Parse one script line; blank lines and `#` comments yield `None`
fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim_start();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let args: Vec<&str> = rest.split_whitespace().collect();
    let command = match word {
        "select" => match args.as_slice() {
            [path, offset] => Command::Select {
                start: parse_location(path, offset)?,
                end: None,
            },
            [path, offset, end_path, end_offset] => Command::Select {
                start: parse_location(path, offset)?,
                end: Some(parse_location(end_path, end_offset)?),
            },
            _ => bail!("usage: select <slot-path> <offset> [<slot-path> <offset>]"),
        },
        "insert" => Command::Insert(unescape(rest)),
        "enter" => Command::Enter,
        "backspace" => Command::Backspace,
        "delete" => Command::Delete,
        "format" => {
            let (name, value) = rest
                .trim()
                .split_once(' ')
                .ok_or_else(|| anyhow!("usage: format <formatter> <json value>"))?;
            let value = serde_json::from_str(value.trim())
                .with_context(|| format!("invalid format value '{value}'"))?;
            Command::Format(name.to_string(), value)
        }
        "unformat" => Command::Unformat(rest.trim().to_string()),
        "undo" => Command::Undo,
        "redo" => Command::Redo,
        "query" => Command::Query(rest.trim().to_string()),
        other => bail!("unknown command '{other}'"),
    };
    Ok(Some(command))
}

fn resolve(editor: &Editor, path: &[usize]) -> Result<SlotId> {
    editor
        .document()
        .resolve_slot(path)
        .ok_or_else(|| anyhow!("no slot at path {path:?}"))
}

fn run_command(editor: &mut Editor, command: Command) -> Result<()> {
    match command {
        Command::Select { start, end } => {
            let slot = resolve(editor, &start.0)?;
            editor.set_location(slot, start.1);
            if let Some((path, offset)) = end {
                let end_slot = resolve(editor, &path)?;
                editor.set_end(end_slot, offset);
            }
        }
        Command::Insert(text) => {
            let done = editor.keyboard().insert(text.as_str());
            log::info!("insert {text:?}: {done}");
        }
        Command::Enter => {
            let done = editor.keyboard().enter();
            log::info!("enter: {done}");
        }
        Command::Backspace => {
            let done = editor.keyboard().delete(true);
            log::info!("backspace: {done}");
        }
        Command::Delete => {
            let done = editor.keyboard().delete(false);
            log::info!("delete: {done}");
        }
        Command::Format(name, value) => {
            let formatter = editor
                .formatter(&name)
                .ok_or_else(|| anyhow!("unknown formatter '{name}'"))?;
            let done = editor.commander().apply_format(&formatter, value);
            log::info!("format {name}: {done}");
        }
        Command::Unformat(name) => {
            let formatter = editor
                .formatter(&name)
                .ok_or_else(|| anyhow!("unknown formatter '{name}'"))?;
            let done = editor.commander().unapply_format(&formatter);
            log::info!("unformat {name}: {done}");
        }
        Command::Undo => {
            let done = editor.undo();
            log::info!("undo: {done}");
        }
        Command::Redo => {
            let done = editor.redo();
            log::info!("redo: {done}");
        }
        Command::Query(name) => {
            let formatter = editor
                .formatter(&name)
                .ok_or_else(|| anyhow!("unknown formatter '{name}'"))?;
            match editor.query().query_format(&formatter) {
                QueryState::Enabled(value) => eprintln!("{name}: enabled ({value})"),
                QueryState::Disabled => eprintln!("{name}: disabled"),
                QueryState::Normal => eprintln!("{name}: normal"),
            }
        }
    }
    Ok(())
}

/// Replay `script` against the document JSON and return the resulting JSON
fn run(document: &str, script: &str, history_limit: usize) -> Result<String> {
    let mut editor = Editor::with_bundled(EditorOptions { history_limit });
    editor.load_json(document)?;
    for (number, line) in script.lines().enumerate() {
        let Some(command) =
            parse_command(line).with_context(|| format!("script line {}", number + 1))?
        else {
            continue;
        };
        run_command(&mut editor, command).with_context(|| format!("script line {}", number + 1))?;
    }
    Ok(editor.to_json()?)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let (document_path, script_path) = match args.len() {
        1 | 2 if args.len() == 2 || config.document_path.is_some() => {
            let document = match args.get(1) {
                Some(path) => PathBuf::from(path),
                None => config.document_path.clone().unwrap_or_default(),
            };
            (document, None)
        }
        3 => (PathBuf::from(&args[1]), Some(PathBuf::from(&args[2]))),
        _ => {
            eprintln!("Usage: {} <document.json> [script]", args[0]);
            eprintln!(
                "Or set document_path in a config file at {}",
                config_path.display()
            );
            process::exit(1);
        }
    };
    log::info!("Editing {}", document_path.display());

    let document = fs::read_to_string(&document_path)
        .with_context(|| format!("reading {}", document_path.display()))?;
    let script = match script_path {
        Some(path) => {
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?
        }
        None => {
            let mut script = String::new();
            std::io::stdin().read_to_string(&mut script)?;
            script
        }
    };

    println!("{}", run(&document, &script, config.history_limit)?);
    Ok(())
}
