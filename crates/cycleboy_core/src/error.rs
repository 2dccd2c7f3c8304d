use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmulationError>;

/// Faults that stop emulation.
///
/// Accesses to unmapped addresses are deliberately absent: the bus logs
/// them and substitutes 0xFF instead of failing.
#[derive(Debug, Error)]
pub enum EmulationError {
    #[error("unimplemented instruction 0x{opcode:02X} at PC=0x{pc:04X}")]
    UnimplementedInstruction { opcode: u8, pc: u16 },

    #[error("invalid cartridge: {0}")]
    Cartridge(#[from] CartridgeError),

    /// A component received an address inside its bound range that it does
    /// not decode, meaning the interconnect was wired incorrectly.
    #[error("{component} does not decode address 0x{address:04X}")]
    UnhandledRegister {
        component: &'static str,
        address: u16,
    },

    #[error("boot ROM must be exactly 256 bytes, got {len}")]
    InvalidBootRom { len: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("ROM image of {len} bytes is too small to hold a header")]
    TooSmall { len: usize },

    #[error("unsupported cartridge type 0x{0:02X}")]
    UnsupportedMapper(u8),

    #[error("unknown ROM size code 0x{0:02X}")]
    UnknownRomSize(u8),

    #[error("unknown RAM size code 0x{0:02X}")]
    UnknownRamSize(u8),

    #[error("ROM size code 0x{code:02X} declares {expected} bytes but image has {actual}")]
    RomSizeMismatch {
        code: u8,
        expected: usize,
        actual: usize,
    },
}
