mod error;
pub use error::Error;

mod io;

pub mod msg;
pub use msg::Msg;

pub mod port;
pub use port::InOutManager;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tag(u8);

impl Tag {
    pub const fn from(byte: u8) -> Self {
        Self(byte & 0xf0)
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> u8 {
        tag.0
    }
}

impl PartialEq<u8> for Tag {
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Channel(u8);

impl Channel {
    pub const fn from(byte: u8) -> Self {
        Self(byte & 0x0f)
    }

    /// Builds the `Channel` from its 1-based number as printed in device manuals.
    pub const fn number(num: u8) -> Self {
        Self((num.saturating_sub(1)) & 0x0f)
    }
}

impl From<Channel> for u8 {
    fn from(chan: Channel) -> u8 {
        chan.0
    }
}

impl std::ops::BitOr<Channel> for Tag {
    type Output = u8;

    fn bitor(self, chan: Channel) -> Self::Output {
        self.0 | chan.0
    }
}

pub mod note {
    use super::Tag;

    pub const OFF: Tag = Tag::from(0x80);
    pub const ON: Tag = Tag::from(0x90);
}

pub mod cc {
    use super::Tag;

    pub const TAG: Tag = Tag::from(0xb0);
}

pub mod sysex {
    pub const TAG: u8 = 0xf0;
    pub const END_TAG: u8 = 0xf7;
}

/// A 7 bits data byte as carried by note and CC messages.
pub mod u7 {
    pub const MAX: u8 = 0x7f;

    /// Threshold above which a data byte is considered `on`.
    pub const ON_THRSD: u8 = 64;

    #[inline]
    pub fn to_normalized(val: u8) -> f64 {
        (val & MAX) as f64 / MAX as f64
    }

    #[inline]
    pub fn is_on(val: u8) -> bool {
        val > ON_THRSD
    }
}
