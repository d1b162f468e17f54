// src/main.rs
//
// codepro: HTML reflow and caret markers from the command line
//
// - prettify: htmlfy-style layout, one tag or text run per line.
// - minify:   single-line form, attribute values kept verbatim.
// - mark:     print the input with the caret marker at an offset.
// - locate:   find and remove the marker, print where it was.
// - tree:     dump the syntax tree the marker placement works on.
//
// Formatting commands overwrite INPUT when OUTPUT is omitted. `-` reads stdin
// or writes stdout. Settings come from --config (TOML, or JSON for `.json`
// files); command line flags override them.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use codepro::offset::{byte_to_utf16, utf16_to_byte};
use codepro::{minify, prettify, MarkerStrategy, Result, Settings, SyntaxTree, UserConfig};
use log::{debug, error, info};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Settings file (TOML, or JSON with a .json extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pretty-print HTML
    Prettify {
        #[command(flatten)]
        files: Files,
        #[command(flatten)]
        reflow: ReflowFlags,
    },
    /// Collapse HTML onto one line
    Minify {
        #[command(flatten)]
        files: Files,
    },
    /// Print INPUT with the caret marker inserted at OFFSET
    Mark {
        /// Caret offset (bytes, or UTF-16 units with --utf16)
        #[arg(long)]
        offset: usize,
        /// Marker placement (default: from settings)
        #[arg(long, value_enum)]
        strategy: Option<Strategy>,
        /// OFFSET counts UTF-16 code units
        #[arg(long, action = ArgAction::SetTrue)]
        utf16: bool,
        /// Print the marker character itself instead of its escape
        #[arg(long, action = ArgAction::SetTrue)]
        raw: bool,
        /// Input file
        input: PathBuf,
    },
    /// Find the caret marker in INPUT, print its offset and the text without it
    Locate {
        /// Report the offset in UTF-16 code units
        #[arg(long, action = ArgAction::SetTrue)]
        utf16: bool,
        /// Input file
        input: PathBuf,
    },
    /// Dump the syntax tree of INPUT
    Tree {
        /// Only show the path from the node at OFFSET to the root
        #[arg(long)]
        offset: Option<usize>,
        /// Input file
        input: PathBuf,
    },
}

#[derive(Args)]
struct Files {
    /// Input file (`-` for stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Output file (default: overwrite input)
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ReflowFlags {
    /// Spaces per indentation level (1 to 16)
    #[arg(long, allow_negative_numbers = true)]
    indent: Option<i64>,

    /// Wrap attributes of open tags longer than this
    #[arg(long, allow_negative_numbers = true)]
    tag_wrap: Option<i64>,

    /// Word-wrap text content at this column
    #[arg(long, allow_negative_numbers = true)]
    content_wrap: Option<i64>,

    /// Drop comments and the slash of self-closing tags
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Element to reproduce verbatim (repeatable, replaces the default list)
    #[arg(long = "ignore", value_name = "TAG")]
    ignore: Vec<String>,

    /// Reproduce no element verbatim
    #[arg(long = "no-ignore", action = ArgAction::SetTrue, conflicts_with = "ignore")]
    no_ignore: bool,

    /// Element whose content is trimmed (repeatable)
    #[arg(long = "trim", value_name = "TAG")]
    trim: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    Cursor,
    Element,
}

impl From<Strategy> for MarkerStrategy {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::Cursor => MarkerStrategy::AtCursor,
            Strategy::Element => MarkerStrategy::AtElement,
        }
    }
}

impl ReflowFlags {
    fn into_user_config(self) -> UserConfig {
        let ignore = if self.no_ignore {
            Some(Vec::new())
        } else {
            (!self.ignore.is_empty()).then_some(self.ignore)
        };
        UserConfig {
            ignore,
            ignore_with: None,
            strict: self.strict.then_some(true),
            tab_size: self.indent,
            tag_wrap: self.tag_wrap,
            content_wrap: self.content_wrap,
            trim: (!self.trim.is_empty()).then_some(self.trim),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    match cli.command {
        Command::Prettify { files, reflow } => {
            settings.reflow.merge(reflow.into_user_config());
            let config = settings.reflow_config()?;
            format_file(&files, |src| prettify(src, &config))
        }
        Command::Minify { files } => format_file(&files, minify),
        Command::Mark {
            offset,
            strategy,
            utf16,
            raw,
            input,
        } => {
            let src = read_input(&input)?;
            let cursor = if utf16 {
                utf16_to_byte(&src, offset)
            } else {
                offset
            };
            let strategy = strategy.map_or(settings.caret.strategy, MarkerStrategy::from);
            let sync = settings.caret_sync();
            let tree = SyntaxTree::parse(&src);
            let marked = sync.value_with_marker(&tree, &src, cursor, strategy);

            let out = if raw {
                marked
            } else {
                marked.replace(sync.marker().as_char(), &sync.marker().to_string())
            };
            write_output(Path::new("-"), &out)
        }
        Command::Locate { utf16, input } => {
            let src = read_input(&input)?;
            let sync = settings.caret_sync();
            let caret = sync.scroll_to_caret_position(&src);
            let offset = match caret.offset {
                Some(o) if utf16 => byte_to_utf16(&src, o).to_string(),
                Some(o) => o.to_string(),
                None => "none".to_string(),
            };
            write_output(Path::new("-"), &format!("{offset}\n{}", caret.text))
        }
        Command::Tree { offset, input } => {
            let src = read_input(&input)?;
            let tree = SyntaxTree::parse(&src);
            let dump = match offset {
                Some(pos) => tree.dump_path_to_root(&src, pos),
                None => tree.dump(&src),
            };
            write_output(Path::new("-"), &dump)
        }
    }
}

/* =============================== File plumbing =============================== */

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> Result<String> {
    let mut src = String::new();
    if is_stdio(path) {
        io::stdin().read_to_string(&mut src)?;
    } else {
        src = fs::read_to_string(path)?;
    }
    debug!("read {} bytes from {}", src.len(), path.display());
    Ok(src)
}

fn write_output(path: &Path, out: &str) -> Result<()> {
    if is_stdio(path) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(out.as_bytes())?;
        stdout.flush()?;
    } else {
        fs::write(path, out)?;
        info!("wrote {} bytes to {}", out.len(), path.display());
    }
    Ok(())
}

fn format_file(files: &Files, transform: impl Fn(&str) -> String) -> Result<()> {
    let src = read_input(&files.input)?;
    let out = transform(&src);
    let out_path = files.output.as_ref().unwrap_or(&files.input);
    write_output(out_path, &out)
}
