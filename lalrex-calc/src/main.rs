//! Command-line interface (CLI) for lalrex-calc
//!
//! This binary wraps the [`CalcParser`] and evaluates calculator input read
//! from a file or from standard input. Each line result is printed on its
//! own row; diagnostics are printed with a source excerpt.

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use lalrex::{LexerOptions, ParserOptions};
use lalrex_calc::{CalcContext, CalcOptions, CalcParser};
use std::io::Read;
use std::path::PathBuf;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input file with calculator statements (standard input if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Longest match wins instead of the first matching rule
    #[arg(long)]
    flex: bool,

    /// Try every matching rule in turn
    #[arg(long)]
    backtrack: bool,

    /// Track character offsets in locations
    #[arg(long)]
    ranges: bool,

    /// Tokens to shift after a syntax error before reporting the next one
    #[arg(long, default_value_t = 3)]
    discard_count: usize,

    /// Print parser and lexer statistics
    #[arg(long)]
    stats: bool,
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    let mut text = String::new();
    match path {
        Some(path) => {
            text = std::fs::read_to_string(path)
                .with_context(|| format!("can't open {:?}", path))?;
        }
        None => {
            std::io::stdin()
                .read_to_string(&mut text)
                .context("can't read standard input")?;
        }
    }
    Ok(text)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let options = CalcOptions {
        lexer: LexerOptions {
            flex: args.flex,
            backtrack_lexer: args.backtrack,
            ranges: args.ranges,
            ..Default::default()
        },
        parser: ParserOptions {
            error_recovery_token_discard_count: args.discard_count,
        },
    };
    let text = read_input(args.input.as_ref())?;

    let mut parser = CalcParser::new(options).context("can't create parser")?;
    let mut context = CalcContext::new();
    let result = parser.parse(&text, &mut context);

    for d in &context.diagnostics {
        eprintln!("{}\n{}\n", d.message, parser.excerpt(&d.loc));
    }
    if args.stats {
        eprintln!("{:?}", parser.stats());
        eprintln!("{:?}", parser.lexer_stats());
    }

    let lines = result.context("parsing error")?;
    for line in lines {
        match line {
            Some(n) => println!("{n}"),
            None => println!("error"),
        }
    }
    Ok(())
}
