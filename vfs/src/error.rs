use libvfs::syscall::SyscallError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("file name too long")]
    NameTooLong,
    #[error("not a directory")]
    NotADirectory,
    #[error("no such file or directory")]
    NoSuchEntry,
    #[error("result does not fit into the given size")]
    Range,
    /// Failure reported by a file system driver, passed through unchanged
    #[error("driver error: {0}")]
    Driver(SyscallError),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

impl From<Error> for SyscallError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidArgument => SyscallError::InvalidArgument,
            Error::NameTooLong => SyscallError::NameTooLong,
            Error::NotADirectory => SyscallError::NotADirectory,
            Error::NoSuchEntry => SyscallError::EntryNotFound,
            Error::Range => SyscallError::Range,
            Error::Driver(code) => code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_errors_keep_their_code() {
        assert_eq!(SyscallError::from(Error::Driver(SyscallError::NoSpace)), SyscallError::NoSpace);
        assert_eq!(SyscallError::from(Error::NoSuchEntry).errno(), 2);
        assert_eq!(SyscallError::from(Error::NameTooLong).errno(), 36);
    }

    #[test]
    fn driver_errors_display_the_driver_message() {
        assert_eq!(Error::Driver(SyscallError::Exists).to_string(), "driver error: file exists (errno 17)");
        assert_eq!(Error::NoSuchEntry.to_string(), "no such file or directory");
    }
}
