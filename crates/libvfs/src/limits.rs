//! Fixed limits checked by pathname resolution before any file system driver is consulted.

/// Maximum length of a whole path, in bytes.
pub const MAXPATHLEN: usize = 1024;

/// Maximum length of a single path component, in bytes.
pub const NAME_LEN: usize = 28;
