//! LED bank core
//!
//! Channel data model, the wire packet codec and the device link contract shared by the
//! controller and the transport implementations.

pub use crate::{
    bank::{ChannelBank, LoadReport, CHANNELS_COUNT},
    channel::{Channel, ChannelId},
    errors::{ChannelKey, Error, Result, Severity},
    proto::{Intensities, Packet, PACKET_LEN, PACKET_MAGIC},
    transport::Transport,
};

pub mod bank;
pub mod channel;
pub mod errors;
pub mod proto;
pub mod transport;
