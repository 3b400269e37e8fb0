//! Interactive shell helpers.

use std::io::{BufRead, Write};

use ledbank_app::{Command, LedbankResult};

pub const PROMPT: &str = "> ";

pub const HELP: &str = "\
Commands:
  <Enter> | next               generate random intensities and send them,
                               in replay mode send the next recorded frame
  setcom <port>                open the serial port
  ls                           list channels
  set l<id>|<peak> <value>     set channel intensity
  seta <value>                 set intensity of all channels
  setm l<id>|<peak> <value>    set channel max intensity
  setma <value>                set max intensity of all channels
  lock l<id>... | all          lock channels
  unlock l<id>... | all        unlock channels
  random                       generate random intensities
  send                         send current intensities
  do <n>                       generate and send n times
  save [file]                  save max intensities
  load [file]                  load max intensities
  rec start <file> | stop      record sent packets
  replay start <file> | stop   replay recorded packets
  help                         show this message
  cls                          clear the screen
  exit | quit                  leave the shell";

/// A single line entered in the shell.
#[derive(Debug, PartialEq)]
pub enum Input {
    Help,
    Clear,
    Exit,
    Command(Command),
}

impl Input {
    pub fn parse(line: &str) -> LedbankResult<Self> {
        Ok(match line.trim() {
            "help" => Self::Help,
            "cls" => Self::Clear,
            "exit" | "quit" => Self::Exit,
            other => Self::Command(other.parse()?),
        })
    }
}

/// Prints the prompt and reads the next line.
///
/// Returns `None` at the end of input.
pub fn read_line(
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> std::io::Result<Option<String>> {
    output.write_all(PROMPT.as_bytes())?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Clears the terminal and moves the cursor home.
pub fn clear_screen(output: &mut impl Write) -> std::io::Result<()> {
    output.write_all(b"\x1B[2J\x1B[1;1H")?;
    output.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shell_input() {
        assert_eq!(Input::parse("help\n").unwrap(), Input::Help);
        assert_eq!(Input::parse("cls").unwrap(), Input::Clear);
        assert_eq!(Input::parse(" quit ").unwrap(), Input::Exit);
        assert_eq!(Input::parse("exit").unwrap(), Input::Exit);
        assert_eq!(Input::parse("\n").unwrap(), Input::Command(Command::Step));
        assert_eq!(Input::parse("send").unwrap(), Input::Command(Command::Send));
        assert!(Input::parse("frobnicate").is_err());
    }

    #[test]
    fn test_read_line() {
        let mut input = "ls\nsend".as_bytes();
        let mut output = Vec::new();

        let line = read_line(&mut input, &mut output).unwrap();
        assert_eq!(line.as_deref(), Some("ls\n"));
        let line = read_line(&mut input, &mut output).unwrap();
        assert_eq!(line.as_deref(), Some("send"));
        assert_eq!(read_line(&mut input, &mut output).unwrap(), None);
        assert_eq!(output, b"> > > ");
    }
}
