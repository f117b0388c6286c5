use std::process::ExitCode;

use clap::{error::ErrorKind, Parser};

use cli::Cli;
use error::ConvertError;

mod cli;
mod converter;
mod elf;
mod error;
mod sbf;
mod segments;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => return report(ConvertError::Usage(e.render().to_string())),
    };

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    match converter::convert_file(&cli.input, &cli.output, &cli.options()) {
        Ok(summary) => {
            println!("SBF written to {}", cli.output.display());
            println!("{summary}");
            if !summary.has_text {
                println!("Warning: no executable segment found; TEXT is empty");
            }
            ExitCode::SUCCESS
        }
        Err(e) => report(e),
    }
}

fn report(err: ConvertError) -> ExitCode {
    match &err {
        // clap already rendered "error: ..." plus usage
        ConvertError::Usage(msg) => eprint!("{msg}"),
        _ => eprintln!("error: {err}"),
    }
    err.exit_code()
}
