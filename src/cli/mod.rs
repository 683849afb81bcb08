//! CLI module for wikiresearch
//!
//! Provides command-line interface parsing for the wikiresearch binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod export;
pub mod output;

use crate::types::ResearchOptions;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// wikiresearch - answer questions from Wikipedia with an LLM
///
/// Searches Wikipedia for the question, reads the best matching articles and
/// asks a language model for an answer that cites them.
#[derive(Parser, Debug)]
#[command(
    name = "wikiresearch",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "Answer research questions from Wikipedia with cited sources",
    after_help = "EXAMPLES:\n    \
                  wikiresearch \"Who was Marie Curie?\"\n    \
                  wikiresearch ask -l de -n 5 \"Geschichte Berlins\"\n    \
                  wikiresearch ask --json \"What is photosynthesis?\"\n    \
                  wikiresearch ask --export ./reports \"History of the Internet\"\n    \
                  wikiresearch --no-color config --validate\n\n\
                  A question whose first word is `ask` or `config` is read as that\n\
                  subcommand. Use `wikiresearch ask -- <QUERY>` for such questions."
)]
pub struct Cli {
    /// Path to the configuration file (defaults to ./wikiresearch.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Research a question without naming the `ask` subcommand
    #[command(flatten)]
    pub ask: AskArgs,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a question and print a cited answer
    Ask(AskArgs),

    /// Show the effective configuration
    Config {
        /// Only check that the configuration is valid
        #[arg(long)]
        validate: bool,
    },
}

/// Arguments for a research run
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct AskArgs {
    /// The question to research
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,

    /// Wikipedia language edition (e.g. en, de, fr)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Number of articles to consult (1-5)
    #[arg(short = 'n', long)]
    pub max_results: Option<usize>,

    /// Characters of each article passed to the model (1000-5000)
    #[arg(long)]
    pub max_content_length: Option<usize>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the result as markdown to this file or directory
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

impl AskArgs {
    /// The query words joined back into one question
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }

    /// Layer the command-line overrides on top of configured defaults
    pub fn apply(&self, mut options: ResearchOptions) -> ResearchOptions {
        if let Some(language) = &self.language {
            options.language = language.clone();
        }
        if let Some(max_results) = self.max_results {
            options.max_results = max_results;
        }
        if let Some(max_content_length) = self.max_content_length {
            options.max_content_length = max_content_length;
        }
        options
    }
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Research arguments, whether given to `ask` or directly
    ///
    /// Returns `None` for other subcommands and when no query was given.
    pub fn ask_args(&self) -> Option<&AskArgs> {
        match &self.command {
            Some(Commands::Ask(args)) => Some(args),
            Some(_) => None,
            None if self.ask.query.is_empty() => None,
            None => Some(&self.ask),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_query_is_ask() {
        let cli = Cli::try_parse_from(["wikiresearch", "Who", "was", "Marie", "Curie?"]).unwrap();
        assert!(cli.command.is_none());
        let args = cli.ask_args().unwrap();
        assert_eq!(args.query_text(), "Who was Marie Curie?");
    }

    #[test]
    fn test_ask_subcommand_flags() {
        let cli = Cli::try_parse_from([
            "wikiresearch",
            "ask",
            "-l",
            "de",
            "-n",
            "5",
            "--max-content-length",
            "2000",
            "--json",
            "Berlin",
        ])
        .unwrap();
        let args = cli.ask_args().unwrap();
        assert!(args.json);
        let options = args.apply(ResearchOptions::default());
        assert_eq!(options.language, "de");
        assert_eq!(options.max_results, 5);
        assert_eq!(options.max_content_length, 2000);
    }

    #[test]
    fn test_config_subcommand() {
        let cli =
            Cli::try_parse_from(["wikiresearch", "--no-color", "config", "--validate"]).unwrap();
        assert!(cli.no_color);
        assert!(matches!(cli.command, Some(Commands::Config { validate: true })));
        assert!(cli.ask_args().is_none());
    }

    #[test]
    fn test_global_flags_before_subcommand() {
        let cli = Cli::try_parse_from([
            "wikiresearch",
            "--verbose",
            "--config",
            "my.toml",
            "config",
            "--validate",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
        assert!(matches!(cli.command, Some(Commands::Config { validate: true })));

        let cli = Cli::try_parse_from(["wikiresearch", "--no-color", "ask", "--json", "Berlin"])
            .unwrap();
        assert!(cli.no_color);
        assert!(matches!(cli.command, Some(Commands::Ask(_))));
        assert_eq!(cli.ask_args().unwrap().query_text(), "Berlin");
    }

    #[test]
    fn test_global_flag_before_bare_query() {
        let cli = Cli::try_parse_from(["wikiresearch", "--no-color", "-l", "fr", "Paris", "history"])
            .unwrap();
        assert!(cli.no_color);
        assert!(cli.command.is_none());
        let args = cli.ask_args().unwrap();
        assert_eq!(args.query_text(), "Paris history");
        assert_eq!(args.language.as_deref(), Some("fr"));
    }

    #[test]
    fn test_ask_separator_allows_leading_subcommand_word() {
        let cli =
            Cli::try_parse_from(["wikiresearch", "ask", "--", "config", "files", "in", "linux"])
                .unwrap();
        assert_eq!(cli.ask_args().unwrap().query_text(), "config files in linux");
    }

    #[test]
    fn test_global_config_path() {
        let cli = Cli::try_parse_from(["wikiresearch", "ask", "--config", "my.toml", "q"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
    }

    #[test]
    fn test_no_query_yields_no_ask() {
        let cli = Cli::try_parse_from(["wikiresearch"]).unwrap();
        assert!(cli.ask_args().is_none());
    }

    #[test]
    fn test_apply_keeps_unset_defaults() {
        let options = AskArgs::default().apply(ResearchOptions::default());
        assert_eq!(options, ResearchOptions::default());
    }
}
