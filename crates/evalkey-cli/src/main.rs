use clap::{Parser, Subcommand};
use evalkey_core::backend::BuiltinBackend;
use evalkey_core::defaults;
use evalkey_notation::normalize;
use evalkey_pipeline::{Pipeline, Value};
use std::io::Read;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "evalkey")]
#[command(about = "evalkey text evaluator tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite informal notation into the canonical form
    Normalize {
        /// Expression; read from stdin when omitted
        expr: Option<String>,
    },
    /// Run the default transformer chain against the input
    Eval {
        /// Expression; read from stdin when omitted
        expr: Option<String>,
        /// Emit the failure report as JSON on total failure
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Normalize { expr } => {
            let input = read_input(expr)?;
            println!("{}", normalize(&input));
        }
        Commands::Eval { expr, json } => {
            let input = read_input(expr)?;
            let pipeline = Pipeline::new();
            defaults::install(&pipeline, Arc::new(BuiltinBackend::new()));
            match pipeline.evaluate(Value::Text(input)) {
                Ok(value) => println!("{value}"),
                Err(report) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    } else {
                        eprintln!("{report}");
                    }
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}

fn read_input(expr: Option<String>) -> anyhow::Result<String> {
    match expr {
        Some(expr) => Ok(expr),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer.trim_end_matches('\n').to_string())
        }
    }
}
