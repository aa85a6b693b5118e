use std::io::{self, BufRead, BufReader, Read};
use std::panic;
use std::path::PathBuf;
use tracing::{error, info, warn};

use image_history::config::HistoryConfig;
use image_history::script::{ScriptParser, MAX_CANVAS_SIZE};
use image_history::session::Session;

struct Args {
    script: Option<PathBuf>,
    config: Option<PathBuf>,
    size: (u32, u32),
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        script: None,
        config: None,
        size: (256, 256),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => {
                if i + 1 < args.len() {
                    parsed.config = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    eprintln!("Error: --config requires an argument");
                    std::process::exit(1);
                }
            }
            "-s" | "--size" => {
                if i + 1 < args.len() {
                    parsed.size = parse_size(&args[i + 1]);
                    i += 2;
                } else {
                    eprintln!("Error: --size requires an argument");
                    std::process::exit(1);
                }
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
            _ => {
                parsed.script = Some(PathBuf::from(&args[i]));
                i += 1;
            }
        }
    }

    parsed
}

/// Parse a canvas size such as `640x480`
fn parse_size(s: &str) -> (u32, u32) {
    let parsed = s
        .split_once('x')
        .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)));
    match parsed {
        Some((w, h))
            if (1..=MAX_CANVAS_SIZE).contains(&w) && (1..=MAX_CANVAS_SIZE).contains(&h) =>
        {
            (w, h)
        }
        _ => {
            eprintln!("Invalid size: '{}'. Use WIDTHxHEIGHT, e.g. 640x480.", s);
            std::process::exit(1);
        }
    }
}

/// Handle panics gracefully
fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        if let Some(location) = info.location() {
            error!(
                file = location.file(),
                line = location.line(),
                "panic occurred"
            );
        } else {
            error!("panic occurred");
        }

        if let Some(s) = info.payload().downcast_ref::<&str>() {
            error!(message = %s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            error!(message = %s);
        }

        default_hook(info);
    }));
}

fn print_help() {
    eprintln!("image-history - replay an editing session against an undo history");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    image-history [OPTIONS] [SCRIPT]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -c, --config <FILE>   History limits as TOML (levels_of_undo, max_levels, undo_size, undo_preview_size)");
    eprintln!("    -s, --size <WxH>      Canvas size (default 256x256)");
    eprintln!("    -h, --help            Print this help message");
    eprintln!();
    eprintln!("The script is read from stdin if no file is given. One command per line:");
    eprintln!("    layer NAME [WxH]             opacity LAYER VALUE      visible LAYER on|off");
    eprintln!("    mode LAYER MODE              rename LAYER NEW NAME    resize WxH [X Y]");
    eprintln!("    paint LAYER X Y W H VALUE    group KIND [NAME]        end");
    eprintln!("    undo  redo  strong-undo  strong-redo  freeze  thaw  clear  save  show");
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    install_panic_hook();

    let args = parse_args();

    let config = match &args.config {
        Some(path) => HistoryConfig::from_file(path).unwrap_or_else(|e| {
            error!(error = %e, "Failed to load config");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }),
        None => HistoryConfig::default(),
    };

    let reader: Box<dyn Read> = match &args.script {
        Some(path) => Box::new(std::fs::File::open(path).map_err(|e| {
            error!(error = %e, path = %path.display(), "Failed to open script");
            e
        })?),
        None => Box::new(io::stdin()),
    };

    let parser = ScriptParser::new().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let mut session = Session::new(args.size.0, args.size.1, config);
    info!(width = args.size.0, height = args.size.1, "session started");

    for (i, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let command = match parser.parse_line(i + 1, &line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                error!(error = %e, "Bad script line");
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };

        match session.run(&command) {
            Ok(Some(report)) => print!("{}", report),
            Ok(None) => {}
            Err(e) => warn!(line = i + 1, error = %e, "command refused"),
        }
    }

    print!("{}", session.report());
    Ok(())
}
