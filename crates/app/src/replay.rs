//! Reads recorded packets back frame by frame.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use ledbank_core::{
    proto::{parse_log_line, FrameError},
    Error, Packet, Result,
};

/// Replays a log written by the [`SessionRecorder`](crate::SessionRecorder).
#[derive(Debug, Default)]
pub struct ReplayPlayer {
    session: Option<Replaying>,
}

#[derive(Debug)]
struct Replaying {
    path: PathBuf,
    reader: BufReader<File>,
    /// Number of consumed lines.
    line: usize,
    exhausted: bool,
}

impl ReplayPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the log file, closing the previously opened one.
    pub fn start(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.stop();

        let path = path.as_ref();
        let file = File::open(path).map_err(Error::io(path))?;
        log::info!("Started replay from {}", path.display());
        self.session = Some(Replaying {
            path: path.to_owned(),
            reader: BufReader::new(file),
            line: 0,
            exhausted: false,
        });
        Ok(())
    }

    /// Stops the replay and returns the path of the closed file.
    ///
    /// Returns `None` if the replay has not been started.
    pub fn stop(&mut self) -> Option<PathBuf> {
        let session = self.session.take()?;
        log::info!(
            "Stopped replay from {} after {} lines",
            session.path.display(),
            session.line
        );
        Some(session.path)
    }

    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` once the end of the file is reached, the session stays active
    /// until it is explicitly stopped. A malformed line is consumed and reported as
    /// [`Error::InvalidFrame`], the next call continues with the following line.
    pub fn next_frame(&mut self) -> Result<Option<Packet>> {
        let session = self.session.as_mut().ok_or(Error::ReplayInactive)?;
        if session.exhausted {
            return Ok(None);
        }

        let mut line = Vec::new();
        let bytes_read = session
            .reader
            .read_until(b'\n', &mut line)
            .map_err(Error::io(&session.path))?;
        if bytes_read == 0 {
            log::debug!("Reached the end of {}", session.path.display());
            session.exhausted = true;
            return Ok(None);
        }

        session.line += 1;
        std::str::from_utf8(&line)
            .map_err(|_| FrameError::NotUtf8)
            .and_then(parse_log_line)
            .map(Some)
            .map_err(|reason| Error::InvalidFrame {
                line: session.line,
                reason,
            })
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Returns true if the end of the log has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.exhausted)
    }

    pub fn path(&self) -> Option<&Path> {
        self.session.as_ref().map(|session| session.path.as_path())
    }

    /// Returns the number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.session.as_ref().map_or(0, |session| session.line)
    }
}
