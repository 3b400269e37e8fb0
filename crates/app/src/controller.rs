//! LED bank controller business-logic implementation

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use ledbank_core::{
    ChannelBank, ChannelKey, Error, Intensities, Packet, Result, Severity, Transport,
};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    command::{Command, Selection},
    pacer::{CancelToken, Pacer, ThreadPacer},
    recorder::SessionRecorder,
    replay::ReplayPlayer,
    Report, Settings,
};

/// Controller operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Intensities come from the bank.
    #[default]
    Live,
    /// Intensities come from a recorded log.
    Replay,
}

/// Where the transmitted intensities come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    /// Randomize the bank first.
    Random,
    /// Current bank values.
    Current,
    /// Next frame of the replay log.
    Replay,
}

/// Result of a bulk send.
#[derive(Debug)]
pub struct BulkSend {
    pub requested: u32,
    pub completed: u32,
    /// The error which terminated the loop early.
    pub error: Option<Error>,
    pub cancelled: bool,
    /// The log write failure which stopped the recording, the loop keeps sending.
    pub record_error: Option<Error>,
}

impl From<BulkSend> for Report {
    fn from(bulk: BulkSend) -> Self {
        let mut progress = format!("{}/{} completed", bulk.completed, bulk.requested);
        if let Some(err) = &bulk.record_error {
            let _ = write!(progress, ", recording stopped: {err}");
        }
        match (bulk.error, bulk.cancelled) {
            (Some(err), _) => Report::error(format!("{progress}, stopped: {err}")),
            (None, true) => Report::warning(format!("{progress}, cancelled")),
            (None, false) if bulk.record_error.is_some() => Report::warning(progress),
            (None, false) => Report::info(progress),
        }
    }
}

/// Owns the channel bank, the device link and the record and replay sessions.
///
/// One controller processes one command at a time, all state is mutated through it.
pub struct Controller<T, P = ThreadPacer>
where
    T: Transport,
    P: Pacer,
{
    bank: ChannelBank,
    transport: T,
    recorder: SessionRecorder,
    player: ReplayPlayer,
    pacer: P,
    rng: StdRng,
    settings: Settings,
    mode: Mode,
    port: Option<String>,
    cancel: CancelToken,
}

impl<T: Transport> Controller<T> {
    /// Creates a new controller which sleeps the current thread between bulk sends.
    pub fn new(transport: T, settings: Settings) -> Self {
        Self::with_pacer(transport, ThreadPacer, settings)
    }
}

impl<T, P> Controller<T, P>
where
    T: Transport,
    P: Pacer,
{
    /// Creates a new controller with the given pacer.
    pub fn with_pacer(transport: T, pacer: P, settings: Settings) -> Self {
        Self {
            bank: ChannelBank::new(),
            transport,
            recorder: SessionRecorder::new(),
            player: ReplayPlayer::new(),
            pacer,
            rng: StdRng::from_os_rng(),
            settings,
            mode: Mode::Live,
            port: None,
            cancel: CancelToken::default(),
        }
    }

    /// Replaces the random generator, mostly for the reproducible patterns.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Uses the given cancellation flag instead of a private one.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn bank(&self) -> &ChannelBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut ChannelBank {
        &mut self.bank
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    pub fn player(&self) -> &ReplayPlayer {
        &self.player
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the name of the last successfully opened port.
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Returns a handle which interrupts a running bulk send at the next iteration.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Executes a command and reports its outcome.
    ///
    /// Errors never escape, each one is turned into a report with the matching severity.
    pub fn execute(&mut self, command: Command) -> Report {
        log::trace!("Executing {command:?} in {:?} mode", self.mode);
        self.dispatch(command).unwrap_or_else(|err| {
            match err.severity() {
                Severity::Error => log::error!("{err}"),
                _ => log::warn!("{err}"),
            }
            Report::from(err)
        })
    }

    fn dispatch(&mut self, command: Command) -> Result<Report> {
        if self.mode == Mode::Replay {
            return match command {
                Command::Step => self.advance(),
                Command::ReplayStop => Ok(self.stop_replay()),
                _ => Err(Error::ModeRestricted),
            };
        }

        match command {
            Command::Step => {
                let record_error = self.transmit(Source::Random)?;
                Ok(sent_report("Random intensity generated and sent", record_error))
            }
            Command::SetPort(port) => self.set_port(port),
            Command::List => Ok(Report::info(self.list())),
            Command::Set { key, value } => self.set_intensity(key, value),
            Command::SetAll(value) => Ok(self.set_all_intensity(value)),
            Command::SetMax { key, value } => self.set_max_intensity(key, value),
            Command::SetMaxAll(value) => Ok(self.set_all_max_intensity(value)),
            Command::Lock(selection) => self.set_locked(&selection, true),
            Command::Unlock(selection) => self.set_locked(&selection, false),
            Command::Random => {
                self.bank.randomize_all(&mut self.rng);
                Ok(Report::info("Random intensity generated"))
            }
            Command::Send => {
                let record_error = self.transmit(Source::Current)?;
                Ok(sent_report("Data sent to serial port", record_error))
            }
            Command::Repeat(count) => Ok(self.bulk_send(count).into()),
            Command::Save(path) => self.save(path),
            Command::Load(path) => self.load(path),
            Command::RecordStart(path) => self.start_recording(&path),
            Command::RecordStop => Ok(self.stop_recording()),
            Command::ReplayStart(path) => self.start_replay(&path),
            Command::ReplayStop => Ok(self.stop_replay()),
        }
    }

    /// Obtains intensities, frames them, sends to the device and records on success.
    ///
    /// A failed log write does not fail the transmission: the recording is stopped and
    /// the write error is returned alongside the confirmed send.
    fn transmit(&mut self, source: Source) -> Result<Option<Error>> {
        let intensities: Intensities = match source {
            Source::Random => {
                self.bank.randomize_all(&mut self.rng);
                self.bank.intensity_data()
            }
            Source::Current => self.bank.intensity_data(),
            Source::Replay => self
                .player
                .next_frame()?
                .ok_or(Error::ReplayExhausted)?
                .intensities(),
        };
        let packet = Packet::encode(&intensities);

        if !self.transport.is_open() {
            return Err(Error::TransportNotOpen);
        }
        log::debug!("Send packet: {packet}");
        self.transport.send_data(packet.as_bytes())?;
        // Only confirmed packets get into the log.
        if let Err(err) = self.recorder.record_if_active(&packet) {
            log::error!("Recording stopped: {err}");
            self.recorder.stop();
            return Ok(Some(err));
        }
        Ok(None)
    }

    /// Randomizes and sends `count` times, pausing for the configured interval after each
    /// packet.
    ///
    /// Stops at the first transport failure or when the cancel token is raised.
    pub fn bulk_send(&mut self, count: u32) -> BulkSend {
        self.cancel.reset();

        let mut bulk = BulkSend {
            requested: count,
            completed: 0,
            error: None,
            cancelled: false,
            record_error: None,
        };
        for _ in 0..count {
            if self.cancel.is_cancelled() {
                log::info!("Bulk send cancelled after {} packets", bulk.completed);
                bulk.cancelled = true;
                break;
            }

            match self.transmit(Source::Random) {
                // The recording is stopped after the first failed write.
                Ok(Some(err)) => bulk.record_error = Some(err),
                Ok(None) => {}
                Err(err) => {
                    bulk.error = Some(err);
                    break;
                }
            }
            bulk.completed += 1;
            log::info!("[{}/{}] Data sent", bulk.completed, count);
            self.pacer.pause(self.settings.interval);
        }
        bulk
    }

    fn advance(&mut self) -> Result<Report> {
        let record_error = self.transmit(Source::Replay)?;
        let message = format!("Frame {} sent", self.player.line());
        Ok(sent_report(&message, record_error))
    }

    fn set_port(&mut self, port: String) -> Result<Report> {
        self.transport.open(&port)?;
        let report = Report::info(format!("Serial port set to {port}"));
        self.port = Some(port);
        Ok(report)
    }

    /// Renders the channel table.
    pub fn list(&self) -> String {
        let mut table = String::from("ID\tPeak\tMaxRad\tIntensity\tMaxIntensity\tLocked\n");
        for channel in self.bank.iter() {
            // Writing into a string cannot fail.
            let _ = writeln!(
                table,
                "{}\t{}\t{}\t{}\t\t{}\t\t{}",
                channel.id(),
                channel.peak_wavelength(),
                channel.max_radiation(),
                channel.intensity(),
                channel.max_intensity(),
                if channel.is_locked() { "yes" } else { "no" },
            );
        }
        table
    }

    fn set_intensity(&mut self, key: ChannelKey, value: u8) -> Result<Report> {
        self.bank.lookup_mut(key)?.set_intensity(value)?;
        Ok(Report::info(format!("Channel {key} intensity set to {value}")))
    }

    fn set_all_intensity(&mut self, value: u8) -> Report {
        let mut skipped = 0;
        for channel in self.bank.iter_mut() {
            if channel.set_intensity(value).is_err() {
                skipped += 1;
            }
        }

        if skipped > 0 {
            Report::warning(format!(
                "All channels intensity set to {value}, {skipped} locked channels skipped"
            ))
        } else {
            Report::info(format!("All channels intensity set to {value}"))
        }
    }

    fn set_max_intensity(&mut self, key: ChannelKey, value: u8) -> Result<Report> {
        self.bank.lookup_mut(key)?.set_max_intensity(value);
        Ok(Report::info(format!("Channel {key} max intensity set to {value}")))
    }

    fn set_all_max_intensity(&mut self, value: u8) -> Report {
        for channel in self.bank.iter_mut() {
            channel.set_max_intensity(value);
        }
        Report::info(format!("All channels max intensity set to {value}"))
    }

    fn set_locked(&mut self, selection: &Selection, locked: bool) -> Result<Report> {
        let apply = |channel: &mut ledbank_core::Channel| {
            if locked {
                channel.lock();
            } else {
                channel.unlock();
            }
        };
        let verb = if locked { "Locked" } else { "Unlocked" };

        let ids = match selection {
            Selection::All => {
                self.bank.iter_mut().for_each(apply);
                return Ok(Report::info(format!("{verb} all channels")));
            }
            Selection::Ids(ids) => ids,
        };

        let mut changed = 0;
        let mut unknown = Vec::new();
        for &id in ids {
            match self.bank.get_mut(id) {
                Ok(channel) => {
                    apply(channel);
                    changed += 1;
                }
                Err(Error::NotFound(_)) => unknown.push(format!("l{id}")),
                Err(err) => return Err(err),
            }
        }

        if unknown.is_empty() {
            Ok(Report::info(format!("{verb} {changed} channels")))
        } else {
            Ok(Report::warning(format!(
                "{verb} {changed} channels, unknown ids skipped: {}",
                unknown.join(" ")
            )))
        }
    }

    fn save(&mut self, path: Option<PathBuf>) -> Result<Report> {
        let path = path.unwrap_or_else(|| self.settings.config_path.clone());
        self.bank.save_max_intensities(&path)?;
        Ok(Report::info(format!("Max intensities saved to {}", path.display())))
    }

    fn load(&mut self, path: Option<PathBuf>) -> Result<Report> {
        let path = path.unwrap_or_else(|| self.settings.config_path.clone());
        let report = self.bank.load_max_intensities(&path)?;

        let mut message = format!(
            "Max intensities loaded from {}, {} channels updated",
            path.display(),
            report.applied
        );
        if !report.unknown.is_empty() {
            let ids = report
                .unknown
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            let _ = write!(message, ", unknown ids skipped: {}", ids.join(" "));
        }
        if let Some(token) = &report.malformed {
            let _ = write!(message, ", stopped at malformed token `{token}`");
        }

        if report.unknown.is_empty() && report.malformed.is_none() {
            Ok(Report::info(message))
        } else {
            Ok(Report::warning(message))
        }
    }

    fn start_recording(&mut self, path: &Path) -> Result<Report> {
        self.recorder.start(path)?;
        Ok(Report::info(format!("Recording to {}", path.display())))
    }

    fn stop_recording(&mut self) -> Report {
        let frames = self.recorder.frames_written();
        match self.recorder.stop() {
            Some(path) => Report::info(format!(
                "Recording stopped, {frames} frames saved to {}",
                path.display()
            )),
            None => Report::info("Recording is not started"),
        }
    }

    fn start_replay(&mut self, path: &Path) -> Result<Report> {
        self.player.start(path)?;
        self.mode = Mode::Replay;
        Ok(Report::info(format!(
            "Replaying {}, press Enter to send the next frame, `replay stop` to leave",
            path.display()
        )))
    }

    fn stop_replay(&mut self) -> Report {
        self.mode = Mode::Live;
        match self.player.stop() {
            Some(path) => Report::info(format!("Replay of {} stopped", path.display())),
            None => Report::info("Replay is not started"),
        }
    }

    /// Closes the record and replay files and the device link.
    pub fn shutdown(&mut self) {
        self.recorder.stop();
        self.player.stop();
        self.mode = Mode::Live;
        self.transport.close();
    }
}

fn sent_report(message: &str, record_error: Option<Error>) -> Report {
    match record_error {
        Some(err) => Report::warning(format!("{message}, recording stopped: {err}")),
        None => Report::info(message),
    }
}

impl<T, P> Drop for Controller<T, P>
where
    T: Transport,
    P: Pacer,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}
