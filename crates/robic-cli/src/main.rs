use clap::Parser;
use thiserror::Error;

use robic_cli::bindings::{build_world, BindingError};
use robic_cli::cli_args::{Cli, EvalArgs, MessageArgs, Mode};
use robic_core::{ContextId, ExprError};
use robic_runtime::{translate_message, Evaluator};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error("expression failed: {0}")]
    Expr(#[from] ExprError),
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("robic: {error}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Mode::Eval(args) => run_eval(args),
        Mode::Message(args) => run_message(args),
    }
}

fn run_eval(args: EvalArgs) -> Result<(), CliError> {
    let mut world = build_world(&args.world)?;
    // The evaluator expects its opening parenthesis already consumed.
    let text = format!("{})", args.expression);
    let done = Evaluator::new().evaluate(&text, &mut world, ContextId::default())?;
    println!("{}", done.value);
    Ok(())
}

fn run_message(args: MessageArgs) -> Result<(), CliError> {
    let mut world = build_world(&args.world)?;
    let out = translate_message(&args.message, &mut world, ContextId::default());
    println!("{}", String::from_utf8_lossy(&out));
    Ok(())
}
