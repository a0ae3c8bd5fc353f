//! Command-line inspector for compiled grammar tables.
//!
//! `gtdump info` summarizes a table, `gtdump symbols` and `gtdump rules`
//! list its vocabulary and productions, and `gtdump parse` runs an input
//! file through the engine and prints the reduction tree.

use clap::{Parser as ClapParser, Subcommand};
use goldrt::{EngineError, GrammarTable, Parser, SymbolType};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Prints table dimensions and the parse seeds
    Info {
        /// Compiled grammar table
        #[arg(short, long)]
        table: PathBuf,
    },
    /// Lists the symbol table
    Symbols {
        /// Compiled grammar table
        #[arg(short, long)]
        table: PathBuf,
    },
    /// Lists the productions
    Rules {
        /// Compiled grammar table
        #[arg(short, long)]
        table: PathBuf,
    },
    /// Parses an input file and prints the reduction tree
    Parse {
        /// Compiled grammar table
        #[arg(short, long)]
        table: PathBuf,

        /// Input file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn kind_label(kind: SymbolType) -> &'static str {
    match kind {
        SymbolType::Nonterminal => "nonterminal",
        SymbolType::Terminal => "terminal",
        SymbolType::Whitespace => "whitespace",
        SymbolType::EndOfInput => "end-of-input",
        SymbolType::CommentStart => "comment-start",
        SymbolType::CommentEnd => "comment-end",
        SymbolType::CommentLine => "comment-line",
        SymbolType::Error => "error",
    }
}

fn run(command: Commands) -> Result<(), EngineError> {
    match command {
        Commands::Info { table } => {
            let table = GrammarTable::from_path(table)?;
            println!("symbols:      {}", table.symbol_count());
            println!("rules:        {}", table.rule_count());
            println!("DFA states:   {}", table.dfa_state_count());
            println!("LALR states:  {}", table.lalr_state_count());
            println!(
                "start symbol: {} ({})",
                table.start_symbol(),
                table.symbol_name(table.start_symbol())
            );
            println!("initial DFA:  {}", table.init_dfa());
            println!("initial LALR: {}", table.init_lalr());
            println!("case:         {}", if table.case_sensitive() { "sensitive" } else { "insensitive" });
        }
        Commands::Symbols { table } => {
            let table = GrammarTable::from_path(table)?;
            for sym in table.symbols() {
                println!("{:4} {:13} {}", sym.index, kind_label(sym.kind), sym.name);
            }
        }
        Commands::Rules { table } => {
            let table = GrammarTable::from_path(table)?;
            for i in 0..table.rule_count() as u16 {
                println!("{i:4} {}", table.format_rule(i));
            }
        }
        Commands::Parse { table, input } => {
            let table = Arc::new(GrammarTable::from_path(table)?);
            let mut parser = Parser::new(table);
            parser.open(input)?;
            parser.parse()?;
            print!("{}", parser.dump_tree());
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args.command) {
        eprintln!("gtdump: {e}");
        std::process::exit(1);
    }
}
