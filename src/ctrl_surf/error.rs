use crate::bytes;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Not an identification reply: {}", .0)]
    NotIdentityReply(bytes::Displayable<'static>),

    #[error("Identification reply too short: {found} bytes, expected at least {expected}")]
    IdentityReplyTooShort { found: usize, expected: usize },

    #[error("Manufacturer id mismatch expected {expected}, found {found}")]
    ManufacturerMismatch {
        expected: bytes::Displayable<'static>,
        found: bytes::Displayable<'static>,
    },

    #[error("Unexpected reserved bytes in identification reply: {}", .0)]
    ReservedBytes(bytes::Displayable<'static>),

    #[error("Invalid identification reply final tag {:02X}", .0)]
    InvalidFinalTag(u8),
}
