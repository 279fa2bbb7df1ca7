#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    InvalidState,
    OutOfRange,
    AllocationFailure,
    InvalidConfig,
    UnknownChannelOrder(u8),
    Undecodable,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidState => write!(f, "Operation not valid in current driver state"),
            Error::OutOfRange => write!(f, "LED index out of range"),
            Error::AllocationFailure => write!(f, "Frame buffer allocation failed"),
            Error::InvalidConfig => write!(f, "Invalid strip configuration"),
            Error::UnknownChannelOrder(raw) => write!(f, "Unknown channel order {raw}"),
            Error::Undecodable => write!(f, "Samples are not a valid LED encoding"),
        }
    }
}

impl core::error::Error for Error {}

impl From<alloc::collections::TryReserveError> for Error {
    fn from(_: alloc::collections::TryReserveError) -> Self {
        Self::AllocationFailure
    }
}

pub type Result<T> = core::result::Result<T, Error>;
