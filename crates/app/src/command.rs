//! Controller commands parsed from a tokenized line.

use std::{path::PathBuf, str::FromStr};

use ledbank_core::{ChannelId, ChannelKey, Error, Result};

/// A set of channels addressed by `lock` and `unlock`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Ids(Vec<ChannelId>),
}

/// The controller command surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Randomize and send in live mode, send the next recorded frame in replay mode.
    Step,
    /// Open the serial port with the given name.
    SetPort(String),
    /// Show all channels.
    List,
    /// Set the intensity of a single channel.
    Set { key: ChannelKey, value: u8 },
    /// Set the intensity of every unlocked channel.
    SetAll(u8),
    /// Set the ceiling of a single channel.
    SetMax { key: ChannelKey, value: u8 },
    /// Set the ceiling of every channel.
    SetMaxAll(u8),
    Lock(Selection),
    Unlock(Selection),
    /// Randomize intensities without sending them.
    Random,
    /// Send the current intensities.
    Send,
    /// Randomize and send the given number of times.
    Repeat(u32),
    /// Save ceilings to the given or the default file.
    Save(Option<PathBuf>),
    /// Load ceilings from the given or the default file.
    Load(Option<PathBuf>),
    RecordStart(PathBuf),
    RecordStop,
    ReplayStart(PathBuf),
    ReplayStop,
}

impl Command {
    /// Parses already tokenized arguments, the first one is the command name.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let args = args.iter().map(AsRef::as_ref).collect::<Vec<&str>>();

        let Some((&name, rest)) = args.split_first() else {
            return Ok(Self::Step);
        };

        let command = match (name, rest) {
            ("next", []) => Self::Step,
            ("setcom", [port]) => Self::SetPort((*port).to_owned()),
            ("setcom", _) => return Err(usage("setcom <port>")),
            ("ls", []) => Self::List,
            ("set", [key, value]) => Self::Set {
                key: parse_key(key)?,
                value: parse_byte(value)?,
            },
            ("set", _) => return Err(usage("set l<id> <value> | set <peak> <value>")),
            ("seta", [value]) => Self::SetAll(parse_byte(value)?),
            ("seta", _) => return Err(usage("seta <value>")),
            ("setm", [key, value]) => Self::SetMax {
                key: parse_key(key)?,
                value: parse_byte(value)?,
            },
            ("setm", _) => return Err(usage("setm l<id> <value> | setm <peak> <value>")),
            ("setma", [value]) => Self::SetMaxAll(parse_byte(value)?),
            ("setma", _) => return Err(usage("setma <value>")),
            ("lock", ids) if !ids.is_empty() => Self::Lock(parse_selection(ids)?),
            ("lock", _) => return Err(usage("lock l<id>... | lock all")),
            ("unlock", ids) if !ids.is_empty() => Self::Unlock(parse_selection(ids)?),
            ("unlock", _) => return Err(usage("unlock l<id>... | unlock all")),
            ("random", []) => Self::Random,
            ("send", []) => Self::Send,
            ("do", [count]) => Self::Repeat(
                count
                    .parse()
                    .map_err(|_| Error::invalid_argument(format!("`{count}` is not a count")))?,
            ),
            ("do", _) => return Err(usage("do <count>")),
            ("save", []) => Self::Save(None),
            ("save", [path]) => Self::Save(Some(PathBuf::from(path))),
            ("load", []) => Self::Load(None),
            ("load", [path]) => Self::Load(Some(PathBuf::from(path))),
            ("rec", ["start", path]) => Self::RecordStart(PathBuf::from(path)),
            ("rec", ["stop"]) => Self::RecordStop,
            ("rec", _) => return Err(usage("rec start <file> | rec stop")),
            ("replay", ["start", path]) => Self::ReplayStart(PathBuf::from(path)),
            ("replay", ["stop"]) => Self::ReplayStop,
            ("replay", _) => return Err(usage("replay start <file> | replay stop")),
            (other, _) => return Err(Error::UnknownCommand(other.to_owned())),
        };
        Ok(command)
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        Self::from_args(&line.split_whitespace().collect::<Vec<_>>())
    }
}

fn usage(text: &str) -> Error {
    Error::invalid_argument(format!("usage: {text}"))
}

/// Parses `l<id>` as a channel identifier and anything else as a peak wavelength.
fn parse_key(token: &str) -> Result<ChannelKey> {
    match token.strip_prefix('l') {
        Some(id) if !id.is_empty() => id
            .parse()
            .map(ChannelKey::Id)
            .map_err(|_| Error::invalid_argument(format!("`{token}` is not a channel id"))),
        _ => token
            .parse()
            .map(ChannelKey::Peak)
            .map_err(|_| Error::invalid_argument(format!("`{token}` is not a peak wavelength"))),
    }
}

fn parse_byte(token: &str) -> Result<u8> {
    token
        .parse()
        .map_err(|_| Error::invalid_argument(format!("`{token}` is not a value in 0..=255")))
}

fn parse_selection(tokens: &[&str]) -> Result<Selection> {
    if tokens == ["all"] {
        return Ok(Selection::All);
    }

    tokens
        .iter()
        .map(|token| match parse_key(token)? {
            ChannelKey::Id(id) => Ok(id),
            ChannelKey::Peak(_) => Err(Error::invalid_argument(format!(
                "`{token}` is not a channel id"
            ))),
        })
        .collect::<Result<Vec<_>>>()
        .map(Selection::Ids)
}
