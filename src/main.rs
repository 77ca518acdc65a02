use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use ferrox::interpreter::context::StdioContext;
use ferrox::{DiagnosticStyle, Session};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::{fs::read_to_string, process::ExitCode};
use tracing::Level;
use tracing_subscriber::EnvFilter;

const EXIT_COMPILE_ERROR: u8 = 65;
const EXIT_IO_ERROR: u8 = 74;

#[derive(Debug, Parser)]
#[clap(name = "ferrox", version, about)]
pub struct CLArgs {
    /// Script to run. Starts an interactive prompt when omitted.
    pub path: Option<PathBuf>,
    #[clap(subcommand)]
    pub routine: Option<FerroxCommand>,
    /// Raise the log level (warn, info, debug, trace).
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[clap(long = "errors", value_enum, default_value = "basic", global = true)]
    pub errors: ErrorFormat,
}

#[derive(Debug, Subcommand)]
pub enum FerroxCommand {
    /// Print every token of a file.
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    /// Parse a file holding a single expression and print its tree.
    Parse {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "sexpr")]
        format: ExpressionFormat,
    },
    /// Run a script.
    Run { path: PathBuf },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
    Pretty,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ExpressionFormat {
    Debug,
    #[clap(name = "sexpr")]
    SExpr,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ErrorFormat {
    Basic,
    Pretty,
    Debug,
}

impl From<ErrorFormat> for DiagnosticStyle {
    fn from(value: ErrorFormat) -> Self {
        match value {
            ErrorFormat::Basic => DiagnosticStyle::Basic,
            ErrorFormat::Pretty => DiagnosticStyle::Pretty,
            ErrorFormat::Debug => DiagnosticStyle::Debug,
        }
    }
}

fn main() -> ExitCode {
    match ferrox_main() {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}

fn ferrox_main() -> Result<ExitCode> {
    color_eyre::install()?;
    let args = CLArgs::parse();
    install_tracing(args.verbose);

    let style = DiagnosticStyle::from(args.errors);
    let code = match (args.routine, args.path) {
        (Some(FerroxCommand::Tokenize { path, format }), _) => {
            with_source(&path, |src| tokenize(&path, src, &format))
        }
        (Some(FerroxCommand::Parse { path, format }), _) => {
            with_source(&path, |src| parse(src, &format))
        }
        (Some(FerroxCommand::Run { path }), _) | (None, Some(path)) => {
            with_source(&path, |src| run_file(&path, src, style))
        }
        (None, None) => run_prompt(style)?,
    };
    Ok(ExitCode::from(code))
}

fn install_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Reads `path` and hands its text to `action`, or reports why it could not be read.
fn with_source(path: &Path, action: impl FnOnce(&str) -> u8) -> u8 {
    tracing::info!(?path, "reading source");
    match read_to_string(path) {
        Ok(src) => action(&src),
        Err(error) => {
            eprintln!("Could not read {}: {error}", path.display());
            EXIT_IO_ERROR
        }
    }
}

fn tokenize(path: &Path, src: &str, format: &TokenFormat) -> u8 {
    use ferrox::lexer::formatter::{BasicFormatter, DebugFormatter, PrettyFormatter, TokenFormatter};
    use ferrox::lexer::Lexer;

    let name = path.to_string_lossy();
    let formatter: Box<dyn TokenFormatter + '_> = match format {
        TokenFormat::Debug => Box::new(DebugFormatter),
        TokenFormat::Basic => Box::new(BasicFormatter),
        TokenFormat::Pretty => Box::new(PrettyFormatter::new(&name, src)),
    };
    let mut succeeded = true;
    for token_or_error in Lexer::new(src) {
        match token_or_error {
            Ok(token) => println!("{}", formatter.format(&token)),
            Err(error) => {
                eprintln!("{}", formatter.format_error(&error));
                succeeded = false;
            }
        }
    }
    if succeeded {
        0
    } else {
        EXIT_COMPILE_ERROR
    }
}

fn parse(src: &str, format: &ExpressionFormat) -> u8 {
    use ferrox::lexer::formatter::{BasicFormatter, TokenFormatter};
    use ferrox::lexer::scan;
    use ferrox::parser::formatter::{
        BasicParserFormatter, DebugExpressionFormatter, DebugParserFormatter, ExpressionFormatter,
        ParserFormatter, SExpressionFormatter,
    };
    use ferrox::parser::Parser;

    let (formatter, error_formatter): (Box<dyn ExpressionFormatter>, Box<dyn ParserFormatter>) =
        match format {
            ExpressionFormat::Debug => {
                (Box::new(DebugExpressionFormatter), Box::new(DebugParserFormatter))
            }
            ExpressionFormat::SExpr => {
                (Box::new(SExpressionFormatter), Box::new(BasicParserFormatter))
            }
        };

    let scanned = scan(src);
    for error in scanned.errors.iter() {
        eprintln!("{}", BasicFormatter.format_error(error));
    }
    match Parser::new(scanned.tokens).parse_expression() {
        Ok(expression) if !scanned.errors.is_empty() => {
            println!("{}", formatter.format(&expression));
            EXIT_COMPILE_ERROR
        }
        Ok(expression) => {
            println!("{}", formatter.format(&expression));
            0
        }
        Err(errors) => {
            for error in errors.iter() {
                eprintln!("{}", error_formatter.format_error(error));
            }
            EXIT_COMPILE_ERROR
        }
    }
}

fn run_file(path: &Path, src: &str, style: DiagnosticStyle) -> u8 {
    let session = Session::new(style);
    let name = path.to_string_lossy();
    let report = session.run(&name, src, &mut StdioContext);
    for diagnostic in report.diagnostics.iter() {
        eprintln!("{diagnostic}");
    }
    report.exit_code()
}

/// Reads and runs one line at a time until `exit` or end of input.
fn run_prompt(style: DiagnosticStyle) -> Result<u8> {
    let session = Session::new(style);
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim() == "exit" {
            break;
        }
        let report = session.run("<stdin>", &line, &mut StdioContext);
        for diagnostic in report.diagnostics.iter() {
            eprintln!("{diagnostic}");
        }
    }
    Ok(0)
}
