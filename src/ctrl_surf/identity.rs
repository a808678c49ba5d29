//! Universal device inquiry and the Launchkey MK3 reply.
//!
//! Reply layout:
//!
//! ```text
//! [0]      F0
//! [1]      7E        universal non-realtime
//! [2]      device id (any)
//! [3..=4]  06 02     general information, identity reply
//! [5..=7]  00 20 29  Novation
//! [8]      size code
//! [9]      01 = application, 00 = bootloader
//! [10..=11] 00 00
//! [12..=15] version digits
//! [16]     F7
//! ```

use std::fmt;

use super::Error;
use crate::{bytes::Displayable, midi};

pub const REQUEST: [u8; 6] = [0xf0, 0x7e, 0x7f, 0x06, 0x01, 0xf7];

pub const NOVATION_ID: [u8; 3] = [0x00, 0x20, 0x29];

pub const REPLY_MIN_LEN: usize = 17;

mod offset {
    pub const MANUFACTURER: std::ops::Range<usize> = 5..8;
    pub const SIZE_CODE: usize = 8;
    pub const MODE: usize = 9;
    pub const RESERVED: std::ops::Range<usize> = 10..12;
    pub const VERSION: std::ops::Range<usize> = 12..16;
    pub const END: usize = 16;
}

pub fn request() -> midi::Msg {
    REQUEST.into()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    Size25,
    Size37,
    Size49,
    Size61,
    Size88,
    Unknown,
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Unknown
    }
}

impl Variant {
    pub fn from_size_code(code: u8) -> Self {
        use Variant::*;
        match code {
            0x34 => Size25,
            0x35 => Size37,
            0x36 => Size49,
            0x37 => Size61,
            0x40 => Size88,
            _ => Unknown,
        }
    }

    /// Whether the model features the fader bank.
    pub fn has_faders(self) -> bool {
        use Variant::*;
        matches!(self, Size49 | Size61 | Size88)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Variant::*;
        let name = match self {
            Size25 => "Launchkey MK3 25",
            Size37 => "Launchkey MK3 37",
            Size49 => "Launchkey MK3 49",
            Size61 => "Launchkey MK3 61",
            Size88 => "Launchkey MK3 88",
            Unknown => "Unknown Launchkey MK3",
        };

        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FirmwareMode {
    App,
    Boot,
}

impl FirmwareMode {
    pub fn from_indicator(indicator: u8) -> Self {
        if indicator == 0x01 {
            FirmwareMode::App
        } else {
            FirmwareMode::Boot
        }
    }
}

impl fmt::Display for FirmwareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirmwareMode::App => f.write_str("APP"),
            FirmwareMode::Boot => f.write_str("BOOT"),
        }
    }
}

/// Firmware version as transmitted: one digit per byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Version([u8; 4]);

impl Version {
    pub fn digits(&self) -> [u8; 4] {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for digit in self.digits() {
            write!(f, "{}", char::from(digit.wrapping_add(b'0')))?;
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub variant: Variant,
    pub firmware_mode: FirmwareMode,
    pub version: Version,
}

impl DeviceInfo {
    pub fn has_faders(&self) -> bool {
        self.variant.has_faders()
    }
}

/// Parses an identification reply, `buf` holding the whole sysex with its tags.
pub fn parse_reply(buf: &[u8]) -> Result<DeviceInfo, Error> {
    let is_identity_reply = buf.len() >= 5
        && buf[0] == midi::sysex::TAG
        && buf[1] == 0x7e
        && buf[3] == 0x06
        && buf[4] == 0x02;
    if !is_identity_reply {
        return Err(Error::NotIdentityReply(Displayable::from(buf).to_owned()));
    }

    if buf.len() < REPLY_MIN_LEN {
        return Err(Error::IdentityReplyTooShort {
            found: buf.len(),
            expected: REPLY_MIN_LEN,
        });
    }

    let manufacturer = &buf[offset::MANUFACTURER];
    if manufacturer != NOVATION_ID {
        return Err(Error::ManufacturerMismatch {
            expected: Displayable::from(NOVATION_ID.as_slice()).to_owned(),
            found: Displayable::from(manufacturer).to_owned(),
        });
    }

    let reserved = &buf[offset::RESERVED];
    if reserved != [0x00, 0x00] {
        return Err(Error::ReservedBytes(Displayable::from(reserved).to_owned()));
    }

    if buf[offset::END] != midi::sysex::END_TAG {
        return Err(Error::InvalidFinalTag(buf[offset::END]));
    }

    let mut version = [0u8; 4];
    version.copy_from_slice(&buf[offset::VERSION]);

    Ok(DeviceInfo {
        variant: Variant::from_size_code(buf[offset::SIZE_CODE]),
        firmware_mode: FirmwareMode::from_indicator(buf[offset::MODE]),
        version: Version(version),
    })
}
