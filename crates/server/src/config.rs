use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use services::{GeneratorConfig, SupplyConfig, SupplyKind};
use swipe_core::EngineConfig;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_CORPUS_PATH: &str = "data/words.json";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArgsError {
    #[error("{flag} requires a value")]
    MissingValue { flag: &'static str },
    #[error("unknown argument: {0}")]
    UnknownArg(String),
    #[error("invalid {flag} value: {raw}")]
    InvalidValue { flag: &'static str, raw: String },
    #[error("live supply needs DRILL_AI_API_KEY")]
    MissingCredential,
    #[error("help requested")]
    HelpRequested,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

/// Where pools come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SupplyMode {
    /// Generated on demand by the chat-completions source.
    Live,
    /// Shuffled from a JSON word list.
    #[default]
    Corpus,
    /// Built-in grammar-check headlines.
    Builtin,
}

impl fmt::Display for SupplyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SupplyMode::Live => "live",
            SupplyMode::Corpus => "corpus",
            SupplyMode::Builtin => "builtin",
        })
    }
}

impl FromStr for SupplyMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(SupplyMode::Live),
            "corpus" | "static" => Ok(SupplyMode::Corpus),
            "builtin" => Ok(SupplyMode::Builtin),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub supply: SupplyMode,
    pub corpus_path: PathBuf,
    pub engine: EngineConfig,
    pub supply_config: SupplyConfig,
    pub generator: Option<GeneratorConfig>,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  swipe-drill [--bind <addr>] [--supply live|corpus|builtin] [--corpus <path>]");
    eprintln!("              [--rounds <n>] [--items words|sentences] [--require-level]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --bind {DEFAULT_BIND}");
    eprintln!("  --supply corpus");
    eprintln!("  --corpus {DEFAULT_CORPUS_PATH}");
    eprintln!("  --rounds 10");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DRILL_BIND, DRILL_SUPPLY, DRILL_CORPUS_PATH, DRILL_TOTAL_ROUNDS,");
    eprintln!("  DRILL_REQUIRE_LEVEL, DRILL_ITEM_KIND,");
    eprintln!("  DRILL_AI_API_KEY, DRILL_AI_BASE_URL, DRILL_AI_MODEL, DRILL_AI_TIMEOUT_SECS");
    eprintln!("  RUST_LOG (tracing filter)");
}

impl ServerConfig {
    /// Reads the process environment, then applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for unknown flags, unparsable values, or live
    /// supply without a credential.
    pub fn from_env(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        Self::parse(|key| std::env::var(key).ok(), args)
    }

    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn parse(
        lookup: impl Fn(&str) -> Option<String>,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut bind = lookup("DRILL_BIND").unwrap_or_else(|| DEFAULT_BIND.into());
        let mut supply = lookup("DRILL_SUPPLY");
        let mut corpus_path =
            PathBuf::from(lookup("DRILL_CORPUS_PATH").unwrap_or_else(|| DEFAULT_CORPUS_PATH.into()));
        let mut rounds = lookup("DRILL_TOTAL_ROUNDS");
        let mut items = lookup("DRILL_ITEM_KIND");
        let mut require_level = lookup("DRILL_REQUIRE_LEVEL")
            .map(|raw| parse_flag("DRILL_REQUIRE_LEVEL", raw))
            .transpose()?
            .unwrap_or(false);

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bind" => bind = require_value(&mut args, "--bind")?,
                "--supply" => supply = Some(require_value(&mut args, "--supply")?),
                "--corpus" => corpus_path = PathBuf::from(require_value(&mut args, "--corpus")?),
                "--rounds" => rounds = Some(require_value(&mut args, "--rounds")?),
                "--items" => items = Some(require_value(&mut args, "--items")?),
                "--require-level" => require_level = true,
                "--help" | "-h" => return Err(ArgsError::HelpRequested),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let bind = bind
            .parse::<SocketAddr>()
            .map_err(|_| ArgsError::InvalidValue {
                flag: "--bind",
                raw: bind.clone(),
            })?;
        let supply = match supply {
            Some(raw) => raw.parse::<SupplyMode>().map_err(|()| ArgsError::InvalidValue {
                flag: "--supply",
                raw,
            })?,
            None => SupplyMode::default(),
        };
        let total_rounds = match rounds {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ArgsError::InvalidValue {
                    flag: "--rounds",
                    raw,
                })?,
            None => EngineConfig::default().total_rounds,
        };
        let item_kind = match items {
            Some(raw) => raw
                .parse::<SupplyKind>()
                .map_err(|_| ArgsError::InvalidValue {
                    flag: "--items",
                    raw,
                })?,
            None => SupplyKind::default(),
        };

        let generator = GeneratorConfig::from_lookup(&lookup);
        if supply == SupplyMode::Live && generator.is_none() {
            return Err(ArgsError::MissingCredential);
        }

        Ok(Self {
            bind,
            supply,
            corpus_path,
            engine: EngineConfig {
                total_rounds,
                require_level,
            },
            supply_config: SupplyConfig {
                item_kind,
                ..SupplyConfig::default()
            },
            generator,
        })
    }
}

fn parse_flag(flag: &'static str, raw: String) -> Result<bool, ArgsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ArgsError::InvalidValue { flag, raw }),
    }
}
