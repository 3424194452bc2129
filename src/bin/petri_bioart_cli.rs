use std::env;
use std::io::{self, IsTerminal as _};
use std::process;

use petri_bioart::{
    BackgroundStyle, Protocol, RenderOptions, SimError, render_petri_svg, run_protocol,
    save_petri_svg, write_volume_summary,
};
use tracing_subscriber::EnvFilter;

fn usage() {
    eprintln!(
        "Usage:\n  \
  petri_bioart_cli [--background black|agar|paper] [--save PATH] [--title TITLE]\n                   \
[--summary-only] [--verbose] PROTOCOL.json\n\n  \
  Without --save, the SVG is written to stdout (when it is not a terminal)."
    );
}

struct CliArgs {
    protocol_path: String,
    background: String,
    save: Option<String>,
    title: Option<String>,
    summary_only: bool,
    verbose: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut background = "black".to_string();
    let mut save = None;
    let mut title = None;
    let mut summary_only = false;
    let mut verbose = false;
    let mut protocol_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--background" => {
                i += 1;
                background = args
                    .get(i)
                    .ok_or("--background requires a value")?
                    .clone();
            }
            "--save" => {
                i += 1;
                save = Some(args.get(i).ok_or("--save requires a path")?.clone());
            }
            "--title" => {
                i += 1;
                title = Some(args.get(i).ok_or("--title requires a value")?.clone());
            }
            "--summary-only" => summary_only = true,
            "--verbose" => verbose = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown flag '{flag}'")),
            path => {
                if protocol_path.replace(path.to_string()).is_some() {
                    return Err("More than one protocol file given".to_string());
                }
            }
        }
        i += 1;
    }

    Ok(CliArgs {
        protocol_path: protocol_path.ok_or("Missing protocol file")?,
        background,
        save,
        title,
        summary_only,
        verbose,
    })
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            usage();
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{e}");
        // A missing protocol file exits differently from every other failure.
        let code = if matches!(e, SimError::ProtocolNotFound(_)) {
            2
        } else {
            1
        };
        process::exit(code);
    }
}

fn run(cli: &CliArgs) -> Result<(), SimError> {
    let protocol = Protocol::from_path(&cli.protocol_path)?;
    let record = run_protocol(&protocol)?;

    write_volume_summary(&mut io::stdout().lock(), &record)?;

    if !cli.summary_only {
        let options = RenderOptions {
            background: BackgroundStyle::from_name(&cli.background),
            title: cli
                .title
                .clone()
                .or_else(|| protocol.metadata.protocol_name.clone()),
        };
        if let Some(path) = &cli.save {
            save_petri_svg(path, &record, &options)?;
            println!("Image saved to: {path}");
        } else if !io::stdout().is_terminal() {
            println!("{}", render_petri_svg(&record, &options));
        }
    }
    Ok(())
}
