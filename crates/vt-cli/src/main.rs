//! Command-line inspector for composition trees.
//!
//! Reads an upstream tree JSON document (either wire generation), and
//! prints the flattened generation prompt, or the resolved canonical
//! tree with `--canonical`. Handy for eyeballing what the external
//! generator will actually receive.

use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "vibetree", version, about = "Flatten a composition tree into a generation prompt")]
struct Args {
    /// Path to the tree JSON document, or `-` for stdin.
    path: PathBuf,

    /// Print the resolved canonical tree as JSON instead of the prompt.
    #[arg(long)]
    canonical: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let input = match read_input(&args.path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", args.path.display());
            return ExitCode::FAILURE;
        }
    };

    let tree = match vt_core::parse_tree(&input) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::debug!(
        "parsed {} section(s), generic mode: {}",
        tree.sections.len(),
        tree.uses_generic_mode()
    );

    if args.canonical {
        match serde_json::to_string_pretty(&tree) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: cannot serialize tree: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", vt_core::flatten(&tree));
    }

    ExitCode::SUCCESS
}

fn read_input(path: &PathBuf) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}
