use super::{sysex, Channel, Error, Tag};
use crate::bytes;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Msg(Box<[u8]>);

impl Msg {
    pub fn inner(&self) -> &[u8] {
        self.0.as_ref()
    }

    pub fn display(&self) -> bytes::Displayable {
        bytes::Displayable::from(self.0.as_ref())
    }

    pub fn new_note_on(chan: Channel, note: u8, velocity: u8) -> Self {
        [super::note::ON | chan, note, velocity].into()
    }

    pub fn new_note_off(chan: Channel, note: u8, velocity: u8) -> Self {
        [super::note::OFF | chan, note, velocity].into()
    }

    pub fn new_cc(chan: Channel, ctrl: u8, value: u8) -> Self {
        [super::cc::TAG | chan, ctrl, value].into()
    }

    pub fn is_sysex(&self) -> bool {
        self.0.first() == Some(&sysex::TAG)
    }

    /// Returns the status `Tag` and `Channel` for channel messages.
    pub fn tag_chan(&self) -> Option<(Tag, Channel)> {
        match self.0.first() {
            Some(&tag_chan) if (0x80..0xf0).contains(&tag_chan) => {
                Some((Tag::from(tag_chan), Channel::from(tag_chan)))
            }
            _ => None,
        }
    }

    /// Returns the sysex payload, without the init and final tags.
    pub fn parse_sysex(&self) -> Result<&[u8], Error> {
        match (self.0.first(), self.0.last()) {
            (Some(&sysex::TAG), Some(&sysex::END_TAG)) if self.0.len() >= 2 => {
                Ok(&self.0[1..self.0.len() - 1])
            }
            (Some(&sysex::TAG), _) => Err(Error::InvalidSysExFinalTag(self.display().to_owned())),
            _ => Err(Error::InvalidSysExInitTag(self.display().to_owned())),
        }
    }
}

impl<const S: usize> From<[u8; S]> for Msg {
    fn from(buf: [u8; S]) -> Self {
        Self(buf.into())
    }
}

impl From<&[u8]> for Msg {
    fn from(buf: &[u8]) -> Self {
        Self(buf.into())
    }
}

impl From<Vec<u8>> for Msg {
    fn from(buf: Vec<u8>) -> Self {
        Self(buf.into())
    }
}

impl std::ops::Deref for Msg {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sysex_framing() {
        let msg = Msg::from([0xf0, 0x7e, 0x7f, 0x06, 0x01, 0xf7]);
        assert!(msg.is_sysex());
        assert_eq!(msg.parse_sysex().unwrap(), &[0x7e, 0x7f, 0x06, 0x01]);
        assert!(msg.tag_chan().is_none());
    }

    #[test]
    fn truncated_sysex() {
        let msg = Msg::from([0xf0, 0x7e, 0x7f]);
        assert!(matches!(
            msg.parse_sysex(),
            Err(Error::InvalidSysExFinalTag(_))
        ));

        let msg = Msg::from([0xb0, 0x15, 0x40]);
        assert!(matches!(
            msg.parse_sysex(),
            Err(Error::InvalidSysExInitTag(_))
        ));
    }

    #[test]
    fn channel_msg() {
        let msg = Msg::new_cc(Channel::number(16), 0x09, 0x03);
        assert_eq!(msg.inner(), &[0xbf, 0x09, 0x03]);
        assert_eq!(
            msg.tag_chan(),
            Some((super::super::cc::TAG, Channel::number(16)))
        );

        assert_eq!(
            Msg::new_note_off(Channel::number(16), 0x0c, 0x00).inner(),
            &[0x8f, 0x0c, 0x00]
        );
    }
}
