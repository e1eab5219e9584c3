//! `safemark`: sanitize markup or encode text from the command line.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use encoder::{Context, Encoding, encode, url_encode_with, url_form_encode_with};
use log::{debug, error};
use sanitizer::{Policy, Sanitizer, SanitizerConfig};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "safemark", version, about = "Sanitize untrusted markup and encode text for output contexts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sanitize a document (or stdin) to stdout.
    Sanitize {
        /// Treat the input as a fragment: strip html, head and body.
        #[arg(long)]
        fragment: bool,
        /// TOML policy laid over the built-in one.
        #[arg(long, value_name = "FILE")]
        policy: Option<PathBuf>,
        /// Write refused tags as escaped text instead of removing them.
        #[arg(long)]
        keep_refused_as_text: bool,
        /// Leave the element stack as written.
        #[arg(long)]
        no_normalize: bool,
        input: Option<PathBuf>,
    },
    /// Encode text for an output context.
    Encode {
        /// html, html-attribute, xml, xml-attribute, css, url, url-form,
        /// url-path, javascript, vbscript, ldap-filter or ldap-dn.
        context: Context,
        /// Character encoding for the url contexts.
        #[arg(long, value_name = "LABEL")]
        encoding: Option<String>,
        /// Text to encode; stdin when absent.
        text: Option<String>,
    },
}

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Policy(sanitizer::PolicyError),
    Sanitize(sanitizer::SanitizeError),
    UnknownEncoding(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(err) => write!(f, "{err}"),
            CliError::Policy(err) => write!(f, "policy: {err}"),
            CliError::Sanitize(err) => write!(f, "{err}"),
            CliError::UnknownEncoding(label) => write!(f, "unknown character encoding `{label}`"),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<sanitizer::PolicyError> for CliError {
    fn from(err: sanitizer::PolicyError) -> Self {
        CliError::Policy(err)
    }
}

impl From<sanitizer::SanitizeError> for CliError {
    fn from(err: sanitizer::SanitizeError) -> Self {
        CliError::Sanitize(err)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: "safemark", "{err}");
            eprintln!("safemark: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Sanitize {
            fragment,
            policy,
            keep_refused_as_text,
            no_normalize,
            input,
        } => {
            let policy = match policy {
                Some(path) => {
                    debug!(target: "safemark", "loading policy {}", path.display());
                    Policy::from_toml_str(&fs::read_to_string(path)?)?
                }
                None => Policy::default(),
            };
            let mut config = if fragment {
                SanitizerConfig::fragment()
            } else {
                SanitizerConfig::default()
            };
            config.filter_disallowed_tags = !keep_refused_as_text;
            config.normalize_markup = !no_normalize;
            let mut sanitizer = Sanitizer::new(policy, config)?;
            let stdout = io::stdout().lock();
            let writer = BufWriter::new(stdout);
            match input {
                Some(path) => sanitizer.sanitize_reader(BufReader::new(File::open(path)?), writer)?,
                None => sanitizer.sanitize_reader(io::stdin().lock(), writer)?,
            }
            Ok(())
        }
        Command::Encode {
            context,
            encoding,
            text,
        } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut text = String::new();
                    io::stdin().lock().read_to_string(&mut text)?;
                    text
                }
            };
            let encoded = match (context, encoding) {
                (Context::Url | Context::UrlForm, Some(label)) => {
                    let encoding = Encoding::for_label(label.as_bytes())
                        .ok_or_else(|| CliError::UnknownEncoding(label.clone()))?;
                    if context == Context::Url {
                        url_encode_with(&text, encoding)
                    } else {
                        url_form_encode_with(&text, encoding)
                    }
                }
                (_, _) => encode(context, &text),
            };
            let mut stdout = io::stdout().lock();
            stdout.write_all(encoded.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
