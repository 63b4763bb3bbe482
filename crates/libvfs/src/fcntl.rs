bitflags::bitflags! {
    /// Flags passed to `open`
    ///
    /// The access mode occupies the two low bits and is not a set of independent flags,
    /// `O_RDONLY` is the empty set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const O_RDONLY = 0x000;
        const O_WRONLY = 0x001;
        const O_RDWR = 0x002;
        /// Create the file if it does not exist
        const O_CREAT = 0x100;
        /// Truncate the file to zero length
        const O_TRUNC = 0x200;
        /// Every write appends to the end of the file
        const O_APPEND = 0x400;
    }
}

impl OpenFlags {
    pub fn creates(self) -> bool {
        self.contains(OpenFlags::O_CREAT)
    }
}
