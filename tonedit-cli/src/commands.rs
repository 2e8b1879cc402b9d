use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use tonedit_types::dsp::DSP_OFF_NAME;
use tonedit_types::Tone;

use crate::midi;
use crate::setup::Session;
use crate::sync::{display_name, ToneEvent};

pub type CommandResult = Result<(), Box<dyn Error>>;

pub fn list_ports() -> CommandResult {
    println!("Inputs:");
    for port in midi::list_input_ports()? {
        println!("  {:>2}  {}", port.index, port.name);
    }
    println!("Outputs:");
    for port in midi::list_output_ports()? {
        println!("  {:>2}  {}", port.index, port.name);
    }
    Ok(())
}

pub fn sync(session: &Session, json: bool) -> CommandResult {
    session.sync.synchronize();

    let deadline = Instant::now() + session.sync.options().sync_timeout + Duration::from_secs(1);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match session.events.recv_timeout(remaining) {
            Ok(ToneEvent::FullSyncComplete) => break,
            Ok(ToneEvent::SyncIncomplete { pending }) => {
                eprintln!("warning: {} request(s) unanswered, showing partial tone", pending);
                break;
            }
            Ok(event) => report(&event),
            Err(_) => return Err("synth did not respond".into()),
        }
    }

    let tone = session.sync.tone();
    if json {
        println!("{}", serde_json::to_string_pretty(&tone)?);
    } else {
        print_tone(&tone);
    }
    Ok(())
}

pub fn download(session: &Session, slot: u16, path: &Path) -> CommandResult {
    let data = session.sync.download_user_tone(slot)?;
    fs::write(path, &data)?;
    println!("Saved user tone {} ({} bytes) to {}", slot, data.len(), path.display());
    Ok(())
}

pub fn upload(session: &Session, slot: u16, path: &Path) -> CommandResult {
    let data = fs::read(path)?;
    session.sync.upload_user_tone(slot, &data)?;
    println!("Sent {} ({} bytes) to user tone {}", path.display(), data.len(), slot);
    Ok(())
}

pub fn import(session: &Session, path: &Path) -> CommandResult {
    let json = fs::read_to_string(path)?;
    let changes = session.sync.import_json(&json)?;
    for event in session.events.try_iter() {
        report(&event);
    }
    for skipped in &changes.skipped {
        eprintln!("warning: nothing matches {}", skipped);
    }
    println!(
        "Imported {} parameter(s) and {} DSP block(s)",
        changes.parameters.len(),
        changes.blocks.len()
    );
    Ok(())
}

fn report(event: &ToneEvent) {
    match event {
        ToneEvent::Status { text, .. } => eprintln!("{}", text),
        ToneEvent::Error(text) => eprintln!("error: {}", text),
        ToneEvent::Log(line) => eprintln!("{}", line),
        _ => log::debug!("{:?}", event),
    }
}

fn print_tone(tone: &Tone) {
    println!("{} ({})", display_name(tone), tone.model.name());
    println!();
    for param in tone.parameters() {
        println!("  {:<32} {}", param.name, param.display_value());
    }
    println!();
    for (index, block) in tone.blocks.iter().enumerate() {
        match block {
            Some(module) => {
                println!("  DSP {}: {}", index + 1, module.name);
                for param in &module.parameters {
                    println!("      {:<28} {}", param.name, param.display_value());
                }
            }
            None => println!("  DSP {}: {}", index + 1, DSP_OFF_NAME),
        }
    }
}
