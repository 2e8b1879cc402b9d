// Re-export core crate modules so crate::sync, crate::midi, etc. resolve throughout the binary
pub use tonedit_core::config;
pub use tonedit_core::midi;
pub use tonedit_core::sync;

mod commands;
mod setup;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use config::Config;
use setup::PortOverrides;

const USAGE: &str = "\
usage: tonedit [options] <command>

commands:
  ports                     list MIDI ports
  sync [--json]             read the current tone from the synth
  download <slot> <file>    save a user tone to a file
  upload <slot> <file>      write a file to a user tone
  import <file.json>        apply a JSON tone document and send it

options:
  -v, --verbose             debug logging
  --config <path>           configuration file
  --in <port>               MIDI input port
  --out <port>              MIDI output port";

fn init_logging(level: log::LevelFilter) {
    use simplelog::WriteLogger;

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tonedit")
        .join("tonedit.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(file) => file,
        Err(_) => match File::create(std::env::temp_dir().join("tonedit.log")) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("warning: logging disabled: {}", e);
                return;
            }
        },
    };

    if let Err(e) = WriteLogger::init(level, simplelog::Config::default(), log_file) {
        eprintln!("warning: logging disabled: {}", e);
        return;
    }

    log::info!("tonedit starting (log level: {:?})", level);
}

/// Value following `flag`, removing both from `args`.
fn take_option(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let index = args.iter().position(|a| a == flag)?;
    args.remove(index);
    (index < args.len()).then(|| args.remove(index))
}

fn take_flag(args: &mut Vec<String>, flags: &[&str]) -> bool {
    let before = args.len();
    args.retain(|a| !flags.contains(&a.as_str()));
    args.len() != before
}

fn slot_arg(args: &[String]) -> Result<(u16, &Path), String> {
    match args {
        [slot, file] => {
            let slot = slot
                .parse()
                .map_err(|_| format!("invalid slot number \"{}\"", slot))?;
            Ok((slot, Path::new(file)))
        }
        _ => Err("expected <slot> <file>".to_string()),
    }
}

fn run(mut args: Vec<String>) -> commands::CommandResult {
    let verbose = take_flag(&mut args, &["--verbose", "-v"]);
    let config = match take_option(&mut args, "--config") {
        Some(path) => Config::load_from(Path::new(&path)),
        None => Config::load(),
    };
    init_logging(if verbose {
        log::LevelFilter::Debug
    } else {
        config.log_level()
    });

    let ports = PortOverrides {
        input: take_option(&mut args, "--in"),
        output: take_option(&mut args, "--out"),
    };
    let json = take_flag(&mut args, &["--json"]);

    let Some(command) = args.first().cloned() else {
        return Err(USAGE.into());
    };
    let rest = &args[1..];

    if command == "ports" {
        return commands::list_ports();
    }

    let session = setup::open_session(&config, &ports)?;
    let result = match command.as_str() {
        "sync" => commands::sync(&session, json),
        "download" => {
            let (slot, path) = slot_arg(rest)?;
            commands::download(&session, slot, path)
        }
        "upload" => {
            let (slot, path) = slot_arg(rest)?;
            commands::upload(&session, slot, path)
        }
        "import" => match rest {
            [file] => commands::import(&session, Path::new(file)),
            _ => Err("expected <file.json>".into()),
        },
        other => Err(format!("unknown command \"{}\"\n\n{}", other, USAGE).into()),
    };
    session.close();
    result
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("tonedit: {}", e);
            ExitCode::FAILURE
        }
    }
}
