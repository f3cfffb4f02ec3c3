//! Interactive player loop
//!
//! Everything runs on one task: stdin commands, the controller's output
//! commands and the simulated element's clock are multiplexed with
//! `tokio::select!`, so the session never needs to be shared.

use crate::commands::{Command, HELP};
use crate::host::{HostEvent, SimulatedAudio};
use aria_core::{PlaybackSource, Track};
use aria_playback::{
    AudioOutput, OutputCommand, PlaybackController, PlaybackEvent, PlayerSession,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Clock resolution of the simulated element
pub const TICK: Duration = Duration::from_millis(250);

pub struct PlayerOptions {
    pub source: Option<PlaybackSource>,
    pub shuffle: bool,
    pub speed: f64,
}

/// Run the player until `quit` or end of input
pub async fn run<O: AudioOutput>(
    mut session: PlayerSession<O>,
    mut commands: mpsc::UnboundedReceiver<OutputCommand>,
    options: PlayerOptions,
) -> anyhow::Result<()> {
    let restored = session.restore().await;
    if let Some(source) = options.source {
        if source != session.controller().active_source() {
            session.set_playback_source(source).await;
        }
    }
    if options.shuffle && !session.controller().shuffle() {
        session.toggle_shuffle();
    }

    info!(
        restored,
        source = %session.controller().active_source(),
        tracks = session.controller().active_tracks().len(),
        "Player ready"
    );
    println!("{HELP}");
    report(&mut session);

    let mut audio = SimulatedAudio::new(options.speed);
    let mut ticker = tokio::time::interval(TICK);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(command) = commands.recv() => {
                audio.apply(command, session.controller().duration());
            }
            _ = ticker.tick() => {
                for event in audio.tick(TICK) {
                    dispatch(&mut session, event);
                }
                report(&mut session);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        execute(&mut session, command).await;
                        report(&mut session);
                    }
                    Err(e) => println!("{e}"),
                }
            }
        }
    }

    // Same as a page being hidden: store the exact position
    session.on_page_hide();
    info!("Playback state saved");

    Ok(())
}

/// Forward what the element reported to the session
pub fn dispatch<O: AudioOutput>(session: &mut PlayerSession<O>, event: HostEvent) {
    match event {
        HostEvent::SourceReady { ticket, duration } => {
            session.on_source_ready(ticket, Some(duration));
        }
        HostEvent::PlaySettled { ticket } => session.settle_play(ticket, Ok(())),
        HostEvent::PlayRejected { ticket, reason } => session.settle_play(ticket, Err(reason)),
        HostEvent::TimeUpdate { ticket, position } => session.on_time_update(ticket, position),
        HostEvent::Ended { ticket } => session.on_track_ended(ticket),
    }
}

pub async fn execute<O: AudioOutput>(session: &mut PlayerSession<O>, command: Command) {
    match command {
        Command::Play => session.play(),
        Command::Pause => session.pause(),
        Command::Toggle => session.toggle_play_pause(),
        Command::Stop => session.stop(),
        Command::Next => session.play_next(),
        Command::Previous => session.play_previous(),
        Command::Seek(secs) => session.seek_secs(secs),
        Command::Volume(percent) => session.set_volume(percent / 100.0),
        Command::Mute => session.toggle_mute(),
        Command::Shuffle => session.toggle_shuffle(),
        Command::Repeat => session.toggle_repeat(),
        Command::Source(source) => session.set_playback_source(source).await,
        Command::Like => match session.toggle_like().await {
            Some(true) => println!("Liked"),
            Some(false) => println!("Unliked"),
            None => println!("Nothing to like"),
        },
        Command::Load(index) => {
            if index < session.controller().active_tracks().len() {
                session.load_track(index, true);
            } else {
                println!("No track {index} in the {} list", session.controller().active_source());
            }
        }
        Command::List => print_tracks(session.controller().active_tracks(), Some(session.controller().current_index())),
        Command::Status => println!("{}", status_line(session.controller())),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

/// Print the events worth a line of their own
fn report<O: AudioOutput>(session: &mut PlayerSession<O>) {
    for event in session.drain_events() {
        match event {
            PlaybackEvent::TrackChanged { .. } => {
                if let Some(track) = session.controller().current_track() {
                    println!("> {}", track_label(track));
                }
            }
            PlaybackEvent::QueueEnded => println!("End of list"),
            PlaybackEvent::PlaybackFailed { reason, track_id } => {
                warn!(reason = reason.as_str(), ?track_id, "Playback failed");
                println!("Playback failed: {}", reason.as_str());
            }
            PlaybackEvent::ShuffleChanged { enabled } => {
                println!("Shuffle {}", if enabled { "on" } else { "off" });
            }
            PlaybackEvent::RepeatChanged { mode } => println!("Repeat {mode:?}"),
            PlaybackEvent::SourceChanged { source } => println!("Playing from {source}"),
            _ => {}
        }
    }
}

pub fn print_tracks(tracks: &[Track], current: Option<usize>) {
    if tracks.is_empty() {
        println!("No tracks");
        return;
    }
    for (index, track) in tracks.iter().enumerate() {
        let marker = if Some(index) == current { '*' } else { ' ' };
        println!(
            "{marker}{index:>4}  {:<50} {:>6}",
            track_label(track),
            clock(track.duration())
        );
    }
}

pub fn status_line<O: AudioOutput>(controller: &PlaybackController<O>) -> String {
    let track = controller
        .current_track()
        .map(track_label)
        .unwrap_or_else(|| "nothing loaded".to_string());

    format!(
        "[{:?}] {} {}/{} | vol {:.0}%{} | shuffle {} | repeat {:?} | source {}",
        controller.state(),
        track,
        clock(controller.position()),
        clock(controller.duration()),
        controller.volume() * 100.0,
        if controller.is_muted() { " (muted)" } else { "" },
        if controller.shuffle() { "on" } else { "off" },
        controller.repeat(),
        controller.active_source(),
    )
}

fn track_label(track: &Track) -> String {
    if track.artist.is_empty() {
        track.title.clone()
    } else {
        format!("{} - {}", track.artist, track.title)
    }
}

/// Format as m:ss
pub fn clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
