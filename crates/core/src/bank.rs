//! The fixed bank of 30 channels.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use rand::Rng;

use crate::{
    channel::{Channel, ChannelId},
    errors::ChannelKey,
    proto::Intensities,
    Error, Result,
};

/// Number of channels in the bank.
pub const CHANNELS_COUNT: usize = 30;

/// Seed values for each channel: `(id, peak wavelength, max radiation)`.
const CHANNEL_TABLE: [(u16, f32, f32); CHANNELS_COUNT] = [
    (1, 405.0, 35_000.0),
    (2, 430.0, 50_000.0),
    (3, 450.0, 55_000.0),
    (4, 490.0, 27_500.0),
    (5, 505.0, 55_000.0),
    (6, 525.0, 37_500.0),
    (7, 545.0, 13_000.0),
    (8, 570.0, 8_500.0),
    (9, 590.0, 13_000.0),
    (10, 610.0, 65_000.0),
    (11, 625.0, 65_000.0),
    (12, 645.0, 65_000.0),
    (13, 660.0, 65_000.0),
    (14, 680.0, 50_000.0),
    (15, 750.0, 32_500.0),
    (16, 770.0, 30_000.0),
    (17, 800.0, 21_000.0),
    (18, 870.0, 0.0),
    (19, 970.0, 0.0),
    (20, 1050.0, 0.0),
    (21, 1200.0, 0.0),
    (22, 1300.0, 0.0),
    (23, 1450.0, 0.0),
    (24, 1550.0, 0.0),
    (25, 1600.0, 0.0),
    (26, 0.0, 0.0),
    // Red, green and blue
    (27, 1.0, 0.0),
    (28, 2.0, 0.0),
    (29, 3.0, 0.0),
    // White
    (30, -1.0, -1.0),
];

/// Summary of a ceiling file load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of ceilings applied to known channels.
    pub applied: usize,
    /// Identifiers which do not belong to the bank.
    pub unknown: Vec<i64>,
    /// The first token that stopped the parsing, if any.
    pub malformed: Option<String>,
}

/// Owns all channels and keeps them in the table order.
#[derive(Debug, Clone)]
pub struct ChannelBank {
    channels: Vec<Channel>,
}

impl Default for ChannelBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelBank {
    /// Creates a bank from the built-in channel table.
    pub fn new() -> Self {
        let channels = CHANNEL_TABLE
            .iter()
            .map(|&(id, peak, max_radiation)| Channel::new(ChannelId(id), peak, max_radiation))
            .collect();
        Self { channels }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> + '_ {
        self.channels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Channel> + '_ {
        self.channels.iter_mut()
    }

    pub fn get(&self, id: ChannelId) -> Result<&Channel> {
        self.channels
            .iter()
            .find(|channel| channel.id() == id)
            .ok_or(Error::NotFound(ChannelKey::Id(id)))
    }

    pub fn get_mut(&mut self, id: ChannelId) -> Result<&mut Channel> {
        self.channels
            .iter_mut()
            .find(|channel| channel.id() == id)
            .ok_or(Error::NotFound(ChannelKey::Id(id)))
    }

    /// Finds a channel by its peak wavelength.
    ///
    /// The comparison is exact, the caller must pass the same literal as in the channel
    /// table.
    pub fn by_peak(&self, peak: f32) -> Result<&Channel> {
        self.channels
            .iter()
            .find(|channel| channel.peak_wavelength() == peak)
            .ok_or(Error::NotFound(ChannelKey::Peak(peak)))
    }

    pub fn by_peak_mut(&mut self, peak: f32) -> Result<&mut Channel> {
        self.channels
            .iter_mut()
            .find(|channel| channel.peak_wavelength() == peak)
            .ok_or(Error::NotFound(ChannelKey::Peak(peak)))
    }

    /// Resolves a channel by any kind of key.
    pub fn lookup_mut(&mut self, key: ChannelKey) -> Result<&mut Channel> {
        match key {
            ChannelKey::Id(id) => self.get_mut(id),
            ChannelKey::Peak(peak) => self.by_peak_mut(peak),
        }
    }

    /// Randomizes every visible channel within its ceiling.
    ///
    /// Infrared channels keep their values, locked ones are randomized as well.
    pub fn randomize_all<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for channel in self.channels.iter_mut().filter(|c| !c.is_infrared()) {
            channel.randomize(rng);
        }
    }

    /// Returns a snapshot of all intensities in the table order.
    pub fn intensity_data(&self) -> Intensities {
        let mut data = [0_u8; CHANNELS_COUNT];
        for (byte, channel) in data.iter_mut().zip(&self.channels) {
            *byte = channel.intensity();
        }
        data
    }

    /// Writes one `<id> <max intensity>` line per channel, overwriting the file.
    pub fn save_max_intensities(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(Error::io(path))?;

        let mut writer = BufWriter::new(file);
        for channel in &self.channels {
            writeln!(writer, "{} {}", channel.id(), channel.max_intensity())
                .map_err(Error::io(path))?;
        }
        writer.flush().map_err(Error::io(path))?;

        log::info!("Saved {} ceilings to {}", self.channels.len(), path.display());
        Ok(())
    }

    /// Reads ceilings previously written by [`Self::save_max_intensities`].
    pub fn load_max_intensities(&mut self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(Error::io(path))?;

        let report = self.apply_max_intensities(&text);
        log::info!(
            "Loaded {} ceilings from {}",
            report.applied,
            path.display()
        );
        Ok(report)
    }

    /// Applies whitespace separated `(id, value)` pairs.
    ///
    /// Parsing stops at the first token which is not an integer. Values outside of the
    /// byte range are clamped.
    pub fn apply_max_intensities(&mut self, text: &str) -> LoadReport {
        let mut report = LoadReport::default();

        let mut tokens = text.split_whitespace();
        while let Some(id_token) = tokens.next() {
            let Ok(id) = id_token.parse::<i64>() else {
                report.malformed = Some(id_token.to_owned());
                break;
            };
            // A dangling identifier without the value is ignored.
            let Some(value_token) = tokens.next() else {
                break;
            };
            let Ok(value) = value_token.parse::<i64>() else {
                report.malformed = Some(value_token.to_owned());
                break;
            };

            let value = value.clamp(0, i64::from(u8::MAX)) as u8;
            let channel = u16::try_from(id)
                .ok()
                .and_then(|id| self.get_mut(ChannelId(id)).ok());
            match channel {
                Some(channel) => {
                    channel.set_max_intensity(value);
                    report.applied += 1;
                }
                None => {
                    log::warn!("Channel id {id} not found, skipping");
                    report.unknown.push(id);
                }
            }
        }

        if let Some(token) = &report.malformed {
            log::warn!("Stopped reading ceilings at malformed token `{token}`");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn test_bank_table() {
        let bank = ChannelBank::new();
        assert_eq!(bank.len(), CHANNELS_COUNT);

        let ids = bank.iter().map(|c| c.id().0).collect::<Vec<_>>();
        assert_eq!(ids, (1..=30).collect::<Vec<_>>());

        let infrared = bank.iter().filter(|c| c.is_infrared()).collect::<Vec<_>>();
        assert_eq!(infrared.len(), 1);
        assert_eq!(infrared[0].id(), ChannelId(26));
    }

    #[test]
    fn test_lookup_by_peak() {
        let mut bank = ChannelBank::new();
        assert_eq!(bank.by_peak(505.0).unwrap().id(), ChannelId(5));
        assert_eq!(bank.by_peak(-1.0).unwrap().id(), ChannelId(30));
        assert_eq!(bank.by_peak(2.0).unwrap().id(), ChannelId(28));
        assert!(matches!(
            bank.by_peak(505.5),
            Err(Error::NotFound(ChannelKey::Peak(_)))
        ));

        bank.by_peak_mut(660.0).unwrap().set_intensity(12).unwrap();
        assert_eq!(bank.get(ChannelId(13)).unwrap().intensity(), 12);
    }

    #[test]
    fn test_randomize_all_skips_infrared() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut bank = ChannelBank::new();
        bank.get_mut(ChannelId(3)).unwrap().set_max_intensity(9);
        // Even a raised ceiling does not enable the infrared channel.
        bank.get_mut(ChannelId(26)).unwrap().set_max_intensity(255);

        for _ in 0..200 {
            bank.randomize_all(&mut rng);
            for channel in bank.iter() {
                assert!(channel.intensity() <= channel.max_intensity());
            }
            assert_eq!(bank.get(ChannelId(26)).unwrap().intensity(), 0);
        }
    }

    #[test]
    fn test_intensity_data_order() {
        let mut bank = ChannelBank::new();
        bank.get_mut(ChannelId(1)).unwrap().set_intensity(1).unwrap();
        bank.get_mut(ChannelId(30)).unwrap().set_intensity(30).unwrap();

        let data = bank.intensity_data();
        assert_eq!(data[0], 1);
        assert_eq!(data[29], 30);
        assert!(data[1..29].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_apply_max_intensities() {
        let mut bank = ChannelBank::new();
        let report = bank.apply_max_intensities("1 10\n2 300\n99 5\n3 -4\n");

        assert_eq!(report.applied, 3);
        assert_eq!(report.unknown, vec![99]);
        assert_eq!(report.malformed, None);
        assert_eq!(bank.get(ChannelId(1)).unwrap().max_intensity(), 10);
        assert_eq!(bank.get(ChannelId(2)).unwrap().max_intensity(), 255);
        assert_eq!(bank.get(ChannelId(3)).unwrap().max_intensity(), 0);
    }

    #[test]
    fn test_apply_max_intensities_stops_at_garbage() {
        let mut bank = ChannelBank::new();
        let report = bank.apply_max_intensities("1 10 2 x 3 30");

        assert_eq!(report.applied, 1);
        assert_eq!(report.malformed.as_deref(), Some("x"));
        assert_eq!(bank.get(ChannelId(1)).unwrap().max_intensity(), 10);
        assert_eq!(bank.get(ChannelId(2)).unwrap().max_intensity(), 255);
        assert_eq!(bank.get(ChannelId(3)).unwrap().max_intensity(), 255);
    }
}
