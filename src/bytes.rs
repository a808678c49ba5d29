use std::{borrow::Cow, fmt};

/// Displays a byte buffer as space-separated hex, e.g. `F0 7E 7F 06 01 F7`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Displayable<'a>(Cow<'a, [u8]>);

impl<'a> From<&'a [u8]> for Displayable<'a> {
    fn from(msg: &'a [u8]) -> Self {
        Self(Cow::Borrowed(msg))
    }
}

impl<'a> Displayable<'a> {
    pub fn to_owned(&self) -> Displayable<'static> {
        Displayable(Cow::Owned(self.0.to_vec()))
    }
}

impl<'a> fmt::Display for Displayable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter();

        match iter.next() {
            Some(first) => write!(f, "{first:02X}")?,
            None => return f.write_str("<empty>"),
        };

        for val in iter {
            write!(f, " {val:02X}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Displayable;

    #[test]
    fn hex_display() {
        let buf: [u8; 6] = [0xf0, 0x7e, 0x7f, 0x06, 0x01, 0xf7];
        assert_eq!(
            Displayable::from(buf.as_slice()).to_string(),
            "F0 7E 7F 06 01 F7"
        );

        let empty: [u8; 0] = [];
        assert_eq!(Displayable::from(empty.as_slice()).to_string(), "<empty>");
    }
}
