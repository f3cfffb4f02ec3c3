//! Interactive commands read from stdin

use aria_core::PlaybackSource;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Toggle,
    Stop,
    Next,
    Previous,
    /// Seek to an absolute position in seconds
    Seek(f64),
    /// Volume in percent
    Volume(f32),
    Mute,
    Shuffle,
    Repeat,
    Source(PlaybackSource),
    Like,
    /// Load a track of the active list (0-based) and play it
    Load(usize),
    List,
    Status,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseCommandError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("Invalid argument for '{command}': {value}")]
    InvalidArgument { command: &'static str, value: String },
}

pub const HELP: &str = "\
Commands:
  play | pause | toggle | stop     transport
  next | prev                      skip
  seek <secs>                      jump to a position
  volume <0-100> | mute            output level
  shuffle | repeat                 playback order
  source <all|liked>               switch the active list
  load <n>                         play track n of the active list
  like                             like or unlike the current track
  list | status | help | quit";

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();

        let command = match name.as_str() {
            "play" | "p" => Self::Play,
            "pause" => Self::Pause,
            "toggle" | "t" => Self::Toggle,
            "stop" => Self::Stop,
            "next" | "n" => Self::Next,
            "prev" | "previous" => Self::Previous,
            "seek" => Self::Seek(parse_arg("seek", "a position in seconds", arg)?),
            "volume" | "vol" => {
                let percent: f32 = parse_arg("volume", "a level from 0 to 100", arg)?;
                Self::Volume(percent)
            }
            "mute" => Self::Mute,
            "shuffle" => Self::Shuffle,
            "repeat" => Self::Repeat,
            "source" => Self::Source(parse_arg("source", "'all' or 'liked'", arg)?),
            "like" => Self::Like,
            "load" => Self::Load(parse_arg("load", "a track number", arg)?),
            "list" | "ls" => Self::List,
            "status" | "s" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

fn parse_arg<T: FromStr>(
    command: &'static str,
    expected: &'static str,
    arg: Option<&str>,
) -> Result<T, ParseCommandError> {
    let value = arg.ok_or(ParseCommandError::MissingArgument { command, expected })?;
    value
        .parse()
        .map_err(|_| ParseCommandError::InvalidArgument {
            command,
            value: value.to_string(),
        })
}
