use clap::{Args, Parser, Subcommand, ValueEnum};
use lcml_codegen::CompileOptions;
use lcml_parser::{EmptyInput, OnError, ParseError, Remainder};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lcml")]
#[command(about = "LCML compiler: JSON-like literals with {{ expressions }} to JavaScript")]
#[command(version)]
struct Cli {
    /// Log debug diagnostics to stderr (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile an LCML file to a JavaScript expression
    Build {
        /// Input file, or `-` for stdin
        path: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Report every error in an LCML file without generating output
    Check {
        /// Input file, or `-` for stdin
        path: String,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Print the parse result as JSON
    Ast {
        /// Input file, or `-` for stdin
        path: String,

        #[command(flatten)]
        options: OptionArgs,
    },
}

#[derive(Args, Default)]
struct OptionArgs {
    /// JSON file with compile options; flags below override it
    #[arg(long = "options", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Single-line output
    #[arg(long)]
    compact: bool,

    /// Indent unit for arrays and objects
    #[arg(long)]
    indent: Option<String>,

    /// Function wrapped around expressions inside strings
    #[arg(long = "to-string", value_name = "NAME")]
    to_string_method: Option<String>,

    /// Error policy
    #[arg(long, value_enum)]
    on_error: Option<Policy>,

    /// Read bare literals followed by text as strings
    #[arg(long)]
    loose: bool,

    /// Accept text after the root value
    #[arg(long)]
    ignore_remainder: bool,

    /// Parse empty input as "" instead of undefined
    #[arg(long)]
    empty_as_string: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    Throw,
    Return,
    Recover,
    AsString,
}

impl From<Policy> for OnError {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Throw => OnError::Throw,
            Policy::Return => OnError::Return,
            Policy::Recover => OnError::Recover,
            Policy::AsString => OnError::AsString,
        }
    }
}

impl OptionArgs {
    fn resolve(&self) -> Result<CompileOptions, String> {
        let mut options = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
                serde_json::from_str(&text)
                    .map_err(|e| format!("Invalid options in {}: {e}", path.display()))?
            }
            None => CompileOptions::default(),
        };
        self.apply(&mut options);
        Ok(options)
    }

    fn apply(&self, options: &mut CompileOptions) {
        if self.compact {
            options.to_js.compact = true;
        }
        if let Some(indent) = &self.indent {
            options.to_js.indent = Some(indent.clone());
        }
        if let Some(name) = &self.to_string_method {
            options.to_js.global_to_string_method = name.clone();
        }
        if let Some(policy) = self.on_error {
            options.parse.on_error = policy.into();
        }
        if self.loose {
            options.parse.loose = true;
        }
        if self.ignore_remainder {
            options.parse.treat_unparsed_remainder = Remainder::Ignore;
        }
        if self.empty_as_string {
            options.parse.treat_empty_input = EmptyInput::AsEmptyString;
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build {
            path,
            output,
            options,
        } => cmd_build(&path, output.as_deref(), &resolve_or_exit(&options)),
        Command::Check { path, options } => cmd_check(&path, &resolve_or_exit(&options)),
        Command::Ast { path, options } => cmd_ast(&path, &resolve_or_exit(&options)),
    }
}

/// Install a stderr subscriber when `RUST_LOG` is set or `--verbose` is given.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_or_exit(options: &OptionArgs) -> CompileOptions {
    match options.resolve() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {message}");
            std::process::exit(1);
        }
    }
}

fn read_source(path: &str) -> String {
    if path == "-" {
        let mut source = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut source) {
            eprintln!("Error reading stdin: {e}");
            std::process::exit(1);
        }
        return source;
    }

    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

/// `path:line:column: message`
fn diagnostic(path: &str, error: &ParseError) -> String {
    let (line, column) = error.line_column();
    format!("{path}:{line}:{column}: {}", error.message)
}

fn cmd_build(path: &str, output: Option<&Path>, options: &CompileOptions) {
    let source = read_source(path);

    let result = match lcml_codegen::compile(&source, options) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Parse error: {}", diagnostic(path, &e));
            std::process::exit(1);
        }
    };
    for error in &result.parsed.errors {
        eprintln!("Warning: {}", diagnostic(path, error));
    }

    match output {
        Some(out) => {
            if let Err(e) = std::fs::write(out, format!("{}\n", result.body)) {
                eprintln!("Error writing {}: {e}", out.display());
                std::process::exit(1);
            }
            eprintln!("Built: {}", out.display());
        }
        None => println!("{}", result.body),
    }
}

fn cmd_check(path: &str, options: &CompileOptions) {
    let source = read_source(path);
    let parse_options = options.parse.clone().with_on_error(OnError::Recover);

    let result = match lcml_parser::parse(&source, &parse_options) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{}", diagnostic(path, &e));
            std::process::exit(1);
        }
    };

    if !result.errors.is_empty() {
        for error in &result.errors {
            eprintln!("{}", diagnostic(path, error));
        }
        std::process::exit(1);
    }

    eprintln!("OK: {path}");
}

fn cmd_ast(path: &str, options: &CompileOptions) {
    let source = read_source(path);

    let result = match lcml_parser::parse(&source, &options.parse) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Parse error: {}", diagnostic(path, &e));
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing AST: {e}");
            std::process::exit(1);
        }
    }
}
