use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use folio::app::{self, RunOptions};

const HELP: &str = "Folio - a developer portfolio in your terminal.

  --version, -V        Show version and exit
  --help,    -h        Show this help message
  --resume             Print the plain-text resume and exit
  --data <path>        Read portfolio data from a YAML file
  --config <path>      Use this config file instead of the default
  --no-intro           Skip the opening animation";

enum Action {
    Run(RunOptions),
    Resume(RunOptions),
    Done,
}

fn main() {
    let action = match parse_args(std::env::args().skip(1)) {
        Ok(action) => action,
        Err(err) => {
            eprintln!("error: {err:?}\n\n{HELP}");
            std::process::exit(2);
        }
    };

    let result = match action {
        Action::Done => Ok(()),
        Action::Resume(opts) => print_resume(&opts),
        Action::Run(opts) => folio::run(opts),
    };

    if let Err(err) = result {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Action> {
    let mut opts = RunOptions::default();
    let mut resume = false;
    let mut saw_flag = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("Folio {}", folio::VERSION);
                saw_flag = true;
            }
            "--help" | "-h" => {
                println!("{HELP}");
                saw_flag = true;
            }
            "--resume" => resume = true,
            "--no-intro" => opts.no_intro = true,
            "--data" => {
                let value = args.next().context("--data needs a path")?;
                opts.data_file = Some(PathBuf::from(value));
            }
            "--config" => {
                let value = args.next().context("--config needs a path")?;
                opts.config_file = Some(PathBuf::from(value));
            }
            other => bail!("unknown argument `{other}`"),
        }
    }

    Ok(if saw_flag {
        Action::Done
    } else if resume {
        Action::Resume(opts)
    } else {
        Action::Run(opts)
    })
}

fn print_resume(opts: &RunOptions) -> Result<()> {
    let cfg = app::load_config(opts)?;
    let portfolio = app::load_portfolio(&cfg, opts.data_file.as_deref())?;
    print!("{}", folio::resume::full_text(&portfolio));
    Ok(())
}
