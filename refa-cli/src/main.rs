use clap::{Parser, ValueEnum};
use refa::dfa::Dfa;
use refa::minimize::minimize;
use refa::nfa::Nfa;
use refa::parser;
use refa_draw::{dfa_to_dot, nfa_to_dot};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Nfa,
    Dfa,
    Mdfa,
}

/// Compiles a regular expression into an NFA, DFA, or minimized DFA and
/// prints it as a `dot` graph on stdout.
#[derive(Debug, Parser)]
#[command(name = "refa", version, about = "regex -> NFA/DFA/MDFA -> dot")]
struct Args {
    /// Which stage of the pipeline to render. `mdfa` means minimized DFA.
    mode: Mode,
    /// The pattern to compile.
    regex: String,
    /// Label DFA nodes with their originating NFA state ids instead of
    /// their own id. Ignored in `nfa` mode.
    #[arg(long)]
    details: bool,
    /// Omit dead states, and any edge touching one, from DFA/MDFA output.
    #[arg(long = "hide-dead")]
    hide_dead: bool,
}

#[derive(Debug, Error)]
enum Error {
    #[error("{0}")]
    Parse(#[from] parser::ParseError),
}

fn main() -> ExitCode {
    let args = Args::parse();
    match render(&args) {
        Ok(dot) => {
            println!("{dot}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn render(args: &Args) -> Result<String, Error> {
    let tree = parser::parse(&args.regex)?;
    let nfa = Nfa::compile(&tree);

    let dot = match args.mode {
        Mode::Nfa => nfa_to_dot(&nfa).format(),
        Mode::Dfa => {
            let dfa = Dfa::determinize(&nfa);
            dfa_to_dot(&dfa, args.details, !args.hide_dead).format()
        }
        Mode::Mdfa => {
            let dfa = Dfa::determinize(&nfa);
            let mini = minimize(&dfa);
            dfa_to_dot(&mini, args.details, !args.hide_dead).format()
        }
    };
    Ok(dot)
}
