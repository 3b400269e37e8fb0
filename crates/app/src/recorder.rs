//! Appends transmitted packets to a text log.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use ledbank_core::{proto::format_for_log, Error, Packet, Result};

/// Records every successfully sent packet while active.
#[derive(Debug, Default)]
pub struct SessionRecorder {
    session: Option<Recording>,
}

#[derive(Debug)]
struct Recording {
    path: PathBuf,
    file: File,
    frames: usize,
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new recording, truncating the file.
    ///
    /// A recording which is already active is closed first.
    pub fn start(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.stop();

        let path = path.as_ref();
        let file = File::create(path).map_err(Error::io(path))?;
        log::info!("Started recording to {}", path.display());
        self.session = Some(Recording {
            path: path.to_owned(),
            file,
            frames: 0,
        });
        Ok(())
    }

    /// Stops the recording and returns the path of the closed file.
    ///
    /// Returns `None` if the recording has not been started.
    pub fn stop(&mut self) -> Option<PathBuf> {
        let mut session = self.session.take()?;
        if let Err(err) = session.file.flush() {
            log::warn!("Unable to flush {}: {err}", session.path.display());
        }
        log::info!(
            "Stopped recording to {}, {} frames written",
            session.path.display(),
            session.frames
        );
        Some(session.path)
    }

    /// Appends the packet to the log if the recording is active.
    pub fn record_if_active(&mut self, packet: &Packet) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        let line = format_for_log(packet);
        session
            .file
            .write_all(line.as_bytes())
            .and_then(|()| session.file.flush())
            .map_err(Error::io(&session.path))?;
        session.frames += 1;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.session.as_ref().map(|session| session.path.as_path())
    }

    /// Returns the number of frames written in the current recording.
    pub fn frames_written(&self) -> usize {
        self.session.as_ref().map_or(0, |session| session.frames)
    }
}
