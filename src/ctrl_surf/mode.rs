use std::fmt;

/// The set of parameters a bank of pots or faders is bound to.
///
/// Discriminants are the codes the device sends on mode selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BankMode {
    Volume = 1,
    DeviceParams = 2,
    Pan = 3,
    SendA = 4,
    SendB = 5,
    Custom0 = 6,
    Custom1 = 7,
    Custom2 = 8,
    Custom3 = 9,
}

impl BankMode {
    /// Decodes a mode selection value. `0` is reported for Custom0.
    pub fn from_code(code: u8) -> Option<Self> {
        use BankMode::*;
        let mode = match code {
            0 | 6 => Custom0,
            1 => Volume,
            2 => DeviceParams,
            3 => Pan,
            4 => SendA,
            5 => SendB,
            7 => Custom1,
            8 => Custom2,
            9 => Custom3,
            _ => return None,
        };

        Some(mode)
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for BankMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BankMode::*;
        let name = match self {
            Volume => "Volume",
            DeviceParams => "Device",
            Pan => "Pan",
            SendA => "Send A",
            SendB => "Send B",
            Custom0 => "Custom 1",
            Custom1 => "Custom 2",
            Custom2 => "Custom 3",
            Custom3 => "Custom 4",
        };

        f.write_str(name)
    }
}

/// The function currently assigned to the pads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadMode {
    Drum,
    Session,
    ScaleChords,
    UserChords,
    Custom0,
    Custom1,
    Custom2,
    Custom3,
    DeviceSelect,
    Navigation,
}

impl Default for PadMode {
    fn default() -> Self {
        PadMode::Session
    }
}

impl PadMode {
    pub fn from_code(code: u8) -> Option<Self> {
        use PadMode::*;
        let mode = match code {
            0x00 | 0x05 => Custom0,
            0x01 => Drum,
            0x02 => Session,
            0x03 => ScaleChords,
            0x04 => UserChords,
            0x06 => Custom1,
            0x07 => Custom2,
            0x08 => Custom3,
            0x09 => DeviceSelect,
            0x0a => Navigation,
            _ => return None,
        };

        Some(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_mode_codes() {
        for code in 1..=9 {
            assert_eq!(BankMode::from_code(code).unwrap().code(), code);
        }

        assert_eq!(BankMode::from_code(0), Some(BankMode::Custom0));
        assert_eq!(BankMode::from_code(10), None);
        assert_eq!(BankMode::from_code(0x7f), None);
    }

    #[test]
    fn pad_mode_codes() {
        assert_eq!(PadMode::from_code(0), Some(PadMode::Custom0));
        assert_eq!(PadMode::from_code(2), Some(PadMode::Session));
        assert_eq!(PadMode::from_code(0x0a), Some(PadMode::Navigation));
        assert_eq!(PadMode::from_code(0x0b), None);
    }
}
