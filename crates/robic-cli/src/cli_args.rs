use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "robic")]
#[command(about = "Robic expression and message evaluator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Mode,
}

#[derive(Debug, Subcommand)]
pub enum Mode {
    /// Evaluate an expression and print its value.
    Eval(EvalArgs),
    /// Translate a message, splicing variables and expressions.
    Message(MessageArgs),
}

#[derive(Debug, Args)]
pub struct EvalArgs {
    /// Expression text, without the enclosing parentheses.
    pub expression: String,
    #[command(flatten)]
    pub world: WorldArgs,
}

#[derive(Debug, Args)]
pub struct MessageArgs {
    /// Message text.
    pub message: String,
    #[command(flatten)]
    pub world: WorldArgs,
}

#[derive(Debug, Args, Default)]
pub struct WorldArgs {
    /// JSON file with counters/strings/input/version.
    #[arg(long = "vars")]
    pub vars: Option<String>,
    /// Counter binding, name=value. Repeatable; overrides the file.
    #[arg(long = "counter")]
    pub counters: Vec<String>,
    /// String binding, name=value. Repeatable; overrides the file.
    #[arg(long = "string")]
    pub strings: Vec<String>,
    /// Current input line.
    #[arg(long = "input")]
    pub input: Option<String>,
    /// Language format version, major.minor (e.g. 2.92).
    #[arg(long = "format-version")]
    pub format_version: Option<String>,
}
