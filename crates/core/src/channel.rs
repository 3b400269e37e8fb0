//! A single addressable LED channel.

use core::{fmt::Display, str::FromStr};

use rand::Rng;

use crate::{Error, Result};

/// Stable channel identifier.
#[derive(PartialEq, Eq, Clone, Copy, Debug, PartialOrd, Ord, Hash, Default)]
pub struct ChannelId(pub u16);

impl FromStr for ChannelId {
    type Err = <u16 as FromStr>::Err;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        u16::from_str(s).map(Self)
    }
}

impl From<u16> for ChannelId {
    fn from(inner: u16) -> Self {
        Self(inner)
    }
}

impl Display for ChannelId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}

/// One LED control slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    id: ChannelId,
    peak_wavelength: f32,
    max_radiation: f32,
    intensity: u8,
    max_intensity: u8,
    locked: bool,
}

impl Channel {
    /// Peak value which marks an infrared (non-visible) channel.
    pub const INFRARED_PEAK: f32 = 0.0;

    /// Creates a new unlocked channel.
    ///
    /// Infrared channels start with both intensity and ceiling set to zero, the other ones
    /// get the full `255` ceiling.
    pub fn new(id: ChannelId, peak_wavelength: f32, max_radiation: f32) -> Self {
        let max_intensity = if peak_wavelength == Self::INFRARED_PEAK {
            0
        } else {
            u8::MAX
        };

        Self {
            id,
            peak_wavelength,
            max_radiation,
            intensity: 0,
            max_intensity,
            locked: false,
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn peak_wavelength(&self) -> f32 {
        self.peak_wavelength
    }

    pub fn max_radiation(&self) -> f32 {
        self.max_radiation
    }

    pub fn intensity(&self) -> u8 {
        self.intensity
    }

    pub fn max_intensity(&self) -> u8 {
        self.max_intensity
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns true if this channel emits outside of the visible spectrum.
    pub fn is_infrared(&self) -> bool {
        self.peak_wavelength == Self::INFRARED_PEAK
    }

    /// Returns true for the aggregate white channel.
    pub fn is_white(&self) -> bool {
        self.peak_wavelength < 0.0
    }

    /// Sets the output level.
    ///
    /// The value is not clamped against the ceiling, only the lock is checked.
    pub fn set_intensity(&mut self, value: u8) -> Result<()> {
        if self.locked {
            return Err(Error::Locked(self.id));
        }

        self.intensity = value;
        Ok(())
    }

    /// Sets the ceiling used by the randomizer. Ceiling changes ignore the lock.
    pub fn set_max_intensity(&mut self, value: u8) {
        self.max_intensity = value;
    }

    /// Draws a uniform intensity in `[0, max_intensity]`.
    ///
    /// Ignores the lock.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.intensity = rng.random_range(0..=self.max_intensity);
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }
}
