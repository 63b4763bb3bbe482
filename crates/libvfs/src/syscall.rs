use core::fmt;

// error codes returned by file system syscalls, negated errno values

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(isize)]
pub enum SyscallError {
    EntryNotFound = -2,
    Exists = -17,
    NotADirectory = -20,
    InvalidArgument = -22,
    NoSpace = -28,
    Range = -34,
    NameTooLong = -36,
    NotSupported = -95,
}

impl SyscallError {
    /// The positive errno value
    pub fn errno(self) -> usize {
        (self as isize).unsigned_abs()
    }
}

impl fmt::Display for SyscallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SyscallError::EntryNotFound => "no such file or directory",
            SyscallError::Exists => "file exists",
            SyscallError::NotADirectory => "not a directory",
            SyscallError::InvalidArgument => "invalid argument",
            SyscallError::NoSpace => "no space left on device",
            SyscallError::Range => "result too large",
            SyscallError::NameTooLong => "file name too long",
            SyscallError::NotSupported => "operation not supported",
        };

        write!(f, "{} (errno {})", msg, self.errno())
    }
}
