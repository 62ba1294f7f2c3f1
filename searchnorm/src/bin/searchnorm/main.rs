mod commands;
mod context;
mod examples;
mod output;
mod report;
mod theme;

use std::fmt::Write;
use std::io::{self, Write as _};
use std::path::PathBuf;

use anyhow::Result;
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Color as ClapColor, RgbColor, Style},
    },
    error::ErrorKind,
};
use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};

use commands::{
    merge::{MergeArgs, handle_merge},
    search::{SearchArgs, handle_search},
    sort::{SortArgs, handle_sort},
    text::{TextArgs, handle_text},
};
use context::ProjectContext;
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ICONS, THEME};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("SEARCHNORM_LOCALE", "Locale used for multi-language sort fields"),
    ("RUST_LOG", "Log filter, e.g. searchnorm=debug"),
];

#[derive(Parser)]
#[command(name = "searchnorm")]
#[command(version)]
#[command(
    about = "Normalize flat search parameters into document-store filters",
    long_about = r#"Query shaping CLI for searchnorm that provides:

• Typed filters from URL query strings (numbers, booleans, ids, patterns)
• Range lists expanded into $or branches
• Free-text search over one or more fields
• Locale-aware sort specs and field-scoped document merges

Commands:
  search    Normalize a query string into a filter
  sort      Normalize a sort string
  text      Build a free-text search filter
  merge     Merge two documents restricted to a set of fields
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to searchnorm.toml (default: searched from the current directory upwards)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn parse_with_styles() -> Self {
        let command = build_cli_command();
        let matches = match command.styles(help_styles()).try_get_matches() {
            Ok(matches) => matches,
            Err(err) => handle_parse_error(err),
        };
        match Cli::from_arg_matches(&matches) {
            Ok(cli) => cli,
            Err(err) => handle_parse_error(err),
        }
    }
}

fn handle_parse_error(err: clap::error::Error) -> ! {
    let (code, to_stdout) = match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => (0, true),
        _ => (err.exit_code(), false),
    };
    let _ = print_blank_line(to_stdout);
    if let Err(print_err) = err.print()
        && print_err.kind() != io::ErrorKind::BrokenPipe
    {
        eprintln!("Failed to display {}: {print_err}", if to_stdout { "help" } else { "error" });
    }
    let _ = print_blank_line(to_stdout);
    std::process::exit(code);
}

fn build_cli_command() -> Command {
    let use_color = detect_color_support();
    let appendix = render_top_level_appendix(use_color);
    let mut command = Cli::command().after_long_help(appendix);
    command = command.color(if use_color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    });
    attach_command_examples(&mut command, use_color);
    command
}

fn attach_command_examples(command: &mut Command, use_color: bool) {
    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            let help_text = render_examples(example.groups, use_color);
            *subcommand = subcommand.clone().after_long_help(help_text);
        }
    }
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let theme = &THEME;
    let mut buffer = String::new();

    let heading = stylize("Examples:", theme.highlight, true, use_color);
    let _ = writeln!(buffer, "{heading}");

    for (index, group) in groups.iter().enumerate() {
        let title = stylize(group.title, theme.primary, true, use_color);
        let _ = writeln!(buffer, "  {title}");

        for command in group.commands {
            let arrow = stylize(ICONS.arrow, theme.secondary, false, use_color);
            let command_text = stylize(command, theme.secondary, false, use_color);
            let _ = writeln!(buffer, "    {arrow} {command_text}");
        }

        if index + 1 < groups.len() {
            buffer.push('\n');
        }
    }

    if !buffer.ends_with('\n') {
        buffer.push('\n');
    }

    buffer
}

fn render_top_level_appendix(use_color: bool) -> String {
    let theme = &THEME;
    let mut buffer = String::new();

    let env_heading = stylize("Environment Variables:", theme.highlight, true, use_color);
    let _ = writeln!(buffer, "{env_heading}");
    for (key, description) in ENVIRONMENT_VARIABLES {
        let key_text = stylize(key, theme.key, true, use_color);
        let value_text = stylize(description, theme.value, false, use_color);
        let _ = writeln!(buffer, "  {key_text}  {value_text}");
    }

    buffer.push('\n');

    let tip_heading = stylize("Tip:", theme.highlight, true, use_color);
    let tip_text = stylize(
        "Use 'searchnorm <command> --help' to view examples for each command.",
        theme.secondary,
        false,
        use_color,
    );
    let _ = writeln!(buffer, "{tip_heading} {tip_text}");

    buffer
}

fn print_blank_line(to_stdout: bool) -> io::Result<()> {
    if to_stdout {
        let mut stdout = io::stdout();
        stdout.write_all(b"\n")?;
        stdout.flush()
    } else {
        let mut stderr = io::stderr();
        stderr.write_all(b"\n")?;
        stderr.flush()
    }
}

fn stylize(text: &str, color: ThemeColor, bold: bool, use_color: bool) -> String {
    if use_color {
        let styled = text.color(color);
        if bold {
            styled.bold().to_string()
        } else {
            styled.to_string()
        }
    } else {
        text.to_string()
    }
}

fn detect_color_support() -> bool {
    ShouldColorize::from_env().should_colorize()
}

fn help_styles() -> Styles {
    let theme = &THEME;
    Styles::styled()
        .usage(style_from_color(theme.primary).bold())
        .header(style_from_color(theme.highlight).bold())
        .literal(style_from_color(theme.secondary))
        .placeholder(style_from_color(theme.muted))
        .valid(style_from_color(theme.info))
        .invalid(style_from_color(theme.warning))
        .error(style_from_color(theme.error).bold())
}

fn style_from_color(color: ThemeColor) -> Style {
    Style::new().fg_color(Some(color_to_clap_color(color)))
}

fn color_to_clap_color(color: ThemeColor) -> ClapColor {
    match color {
        ThemeColor::Black => ClapColor::Ansi(AnsiColor::Black),
        ThemeColor::Red => ClapColor::Ansi(AnsiColor::Red),
        ThemeColor::Green => ClapColor::Ansi(AnsiColor::Green),
        ThemeColor::Yellow => ClapColor::Ansi(AnsiColor::Yellow),
        ThemeColor::Blue => ClapColor::Ansi(AnsiColor::Blue),
        ThemeColor::Magenta => ClapColor::Ansi(AnsiColor::Magenta),
        ThemeColor::Cyan => ClapColor::Ansi(AnsiColor::Cyan),
        ThemeColor::White => ClapColor::Ansi(AnsiColor::White),
        ThemeColor::BrightBlack => ClapColor::Ansi(AnsiColor::BrightBlack),
        ThemeColor::BrightRed => ClapColor::Ansi(AnsiColor::BrightRed),
        ThemeColor::BrightGreen => ClapColor::Ansi(AnsiColor::BrightGreen),
        ThemeColor::BrightYellow => ClapColor::Ansi(AnsiColor::BrightYellow),
        ThemeColor::BrightBlue => ClapColor::Ansi(AnsiColor::BrightBlue),
        ThemeColor::BrightMagenta => ClapColor::Ansi(AnsiColor::BrightMagenta),
        ThemeColor::BrightCyan => ClapColor::Ansi(AnsiColor::BrightCyan),
        ThemeColor::BrightWhite => ClapColor::Ansi(AnsiColor::BrightWhite),
        ThemeColor::TrueColor { r, g, b } => ClapColor::Rgb(RgbColor(r, g, b)),
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a URL query string into a filter
    Search(SearchArgs),

    /// Normalize a sort string into ordered sort keys
    Sort(SortArgs),

    /// Build a free-text search filter
    Text(TextArgs),

    /// Merge two JSON documents, keeping only the given fields
    Merge(MergeArgs),
}

fn main() {
    env_logger::init();

    let cli = Cli::parse_with_styles();

    if let Err(err) = execute(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<()> {
    let global_options = GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    if global_options.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(global_options);
    let ctx = ProjectContext::load(cli.config.as_deref())?;
    if let Some(path) = &ctx.config_path {
        output.verbose(&format!("Using configuration from {}", path.display()));
    }

    match cli.command {
        Commands::Search(args) => handle_search(args, &ctx, &output)?,
        Commands::Sort(args) => handle_sort(args, &ctx, &output)?,
        Commands::Text(args) => handle_text(args, &ctx, &output)?,
        Commands::Merge(args) => handle_merge(args, &output)?,
    }

    Ok(())
}
