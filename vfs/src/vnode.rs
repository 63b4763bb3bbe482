use alloc::{
    boxed::Box,
    string::String,
    sync::{Arc, Weak},
};
use core::{fmt, ops::Deref};

use libvfs::syscall::SyscallError;
use log::trace;

use crate::{Error, Result};

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum VType {
    Non,
    Regular,
    Directory,
    BlockDevice,
    CharacterDevice,
    SymbolicLink,
    Socket,
    Fifo,
    Bad,
}

bitflags::bitflags! {
    /// Operations a vnode's driver actually provides
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        const LOOKUP = 1 << 0;
        const CREATE = 1 << 1;
        const READDIR = 1 << 2;
        const MKDIR = 1 << 3;
    }
}

/// One entry returned by [`VNodeOperations::readdir`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub vno: u64,
    pub name: String,
}

// Like in BSD every vnode carries a file system specific handler. The handler is the operations vector and at the same
// time owns the private data of the file system, which is why v_data and v_op are a single member here.
pub struct VNode {
    /// Number identifying the vnode inside its file system
    vno: u64,
    v_type: VType,
    v_data_op: Box<dyn VNodeOperations>,
}

impl VNode {
    /// Instantiates a vnode and hands out the first owned reference to it.
    pub fn new(vno: u64, v_type: VType, data_op: Box<dyn VNodeOperations>) -> VNodeRef {
        VNodeRef(Arc::new(VNode {
            vno,
            v_type,
            v_data_op: data_op,
        }))
    }

    pub fn vno(&self) -> u64 {
        self.vno
    }

    pub fn v_type(&self) -> VType {
        self.v_type
    }

    pub fn is_dir(&self) -> bool {
        self.v_type == VType::Directory
    }

    pub fn capabilities(&self) -> Capabilities {
        self.v_data_op.capabilities()
    }

    pub fn can(&self, caps: Capabilities) -> bool {
        self.capabilities().contains(caps)
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VNode")
            .field("vno", &self.vno)
            .field("v_type", &self.v_type)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

/// An owned reference to a [`VNode`].
///
/// Cloning acquires a new reference and dropping releases it, so every acquire is paired with exactly one release.
/// Handing a reference to a caller is a move.
pub struct VNodeRef(Arc<VNode>);

impl VNodeRef {
    /// Number of owned references currently held on this vnode
    pub fn refcount(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Returns `true` if both references point to the same vnode
    pub fn ptr_eq(this: &VNodeRef, other: &VNodeRef) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakVNode {
        WeakVNode(Arc::downgrade(&self.0))
    }

    /// Asks the driver for the entry `name` in this directory.
    pub fn lookup(&self, name: &str) -> Result<VNodeRef> {
        self.v_data_op.lookup(self, name)
    }

    /// Asks the driver to create a regular file `name` in this directory.
    pub fn create(&self, name: &str) -> Result<VNodeRef> {
        self.v_data_op.create(self, name)
    }

    /// Asks the driver to create a directory `name` in this directory.
    ///
    /// Drivers that do not announce [`Capabilities::MKDIR`] are not called.
    pub fn mkdir(&self, name: &str) -> Result<VNodeRef> {
        if !self.can(Capabilities::MKDIR) {
            return Err(Error::Driver(SyscallError::NotSupported));
        }

        self.v_data_op.mkdir(self, name)
    }

    /// Reads the directory entry at `offset`.
    pub fn readdir(&self, offset: usize) -> Result<Option<DirEntry>> {
        self.v_data_op.readdir(self, offset)
    }
}

impl Clone for VNodeRef {
    fn clone(&self) -> Self {
        let new = VNodeRef(Arc::clone(&self.0));
        trace!("vref: vno {} refcount {}", new.vno, new.refcount());
        new
    }
}

impl Drop for VNodeRef {
    fn drop(&mut self) {
        trace!("vput: vno {} refcount {}", self.vno, self.refcount() - 1);
    }
}

impl Deref for VNodeRef {
    type Target = VNode;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for VNodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// A reference to a [`VNode`] that does not keep it alive
#[derive(Clone, Default)]
pub struct WeakVNode(Weak<VNode>);

impl WeakVNode {
    pub fn new() -> Self {
        WeakVNode(Weak::new())
    }

    /// Acquires an owned reference if the vnode still exists.
    pub fn upgrade(&self) -> Option<VNodeRef> {
        self.0.upgrade().map(VNodeRef)
    }
}

/// This trait maps logical operations to real functions. It is file system specific as the actions taken by each
/// operation depend heavily on the file system where the file resides.
///
/// Only the operations announced by [`capabilities`](VNodeOperations::capabilities) may be called, the defaults
/// exist for drivers that do not provide them.
pub trait VNodeOperations: Send + Sync {
    fn capabilities(&self) -> Capabilities;

    /// Performs a lookup of a single path component in `dir`.
    ///
    /// On success the returned reference is owned by the caller, the driver must not hold on to it.
    fn lookup(&self, dir: &VNodeRef, name: &str) -> Result<VNodeRef> {
        let _ = (dir, name);
        Err(Error::NotADirectory)
    }

    /// Creates a new regular file in `dir`.
    fn create(&self, dir: &VNodeRef, name: &str) -> Result<VNodeRef> {
        let _ = (dir, name);
        Err(Error::Driver(SyscallError::NotSupported))
    }

    /// Creates a new directory in `dir`.
    fn mkdir(&self, dir: &VNodeRef, name: &str) -> Result<VNodeRef> {
        let _ = (dir, name);
        Err(Error::Driver(SyscallError::NotSupported))
    }

    /// Reads directory entries from a directory.
    ///
    /// Returns the entry at position `offset` or `None` once `offset` is past the last entry.
    fn readdir(&self, dir: &VNodeRef, offset: usize) -> Result<Option<DirEntry>> {
        let _ = (dir, offset);
        Err(Error::NotADirectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf;

    impl VNodeOperations for Leaf {
        fn capabilities(&self) -> Capabilities {
            Capabilities::empty()
        }
    }

    /// Implements mkdir without announcing it
    struct Unannounced;

    impl VNodeOperations for Unannounced {
        fn capabilities(&self) -> Capabilities {
            Capabilities::LOOKUP
        }

        fn mkdir(&self, _dir: &VNodeRef, _name: &str) -> Result<VNodeRef> {
            unreachable!("mkdir called without the MKDIR capability")
        }
    }

    #[test]
    fn clone_and_drop_are_paired() {
        let node = VNode::new(7, VType::Regular, Box::new(Leaf));
        assert_eq!(node.refcount(), 1);

        let second = node.clone();
        assert_eq!(node.refcount(), 2);
        assert!(VNodeRef::ptr_eq(&node, &second));

        drop(second);
        assert_eq!(node.refcount(), 1);
    }

    #[test]
    fn weak_references_are_not_counted() {
        let node = VNode::new(1, VType::Directory, Box::new(Leaf));
        let weak = node.downgrade();
        assert_eq!(node.refcount(), 1);

        let upgraded = weak.upgrade().expect("vnode is still alive");
        assert_eq!(node.refcount(), 2);
        drop(upgraded);

        drop(node);
        assert!(weak.upgrade().is_none());
        assert!(WeakVNode::new().upgrade().is_none());
    }

    #[test]
    fn defaults_reject_missing_operations() {
        let node = VNode::new(3, VType::Regular, Box::new(Leaf));

        assert!(!node.can(Capabilities::LOOKUP));
        assert_eq!(node.lookup("x").unwrap_err(), Error::NotADirectory);
        assert_eq!(node.create("x").unwrap_err(), Error::Driver(SyscallError::NotSupported));
        assert_eq!(node.mkdir("x").unwrap_err(), Error::Driver(SyscallError::NotSupported));
        assert_eq!(node.readdir(0).unwrap_err(), Error::NotADirectory);
        assert_eq!(node.refcount(), 1);
    }

    #[test]
    fn mkdir_needs_the_capability() {
        let node = VNode::new(4, VType::Directory, Box::new(Unannounced));

        assert_eq!(node.mkdir("x").unwrap_err(), Error::Driver(SyscallError::NotSupported));
        assert_eq!(node.refcount(), 1);
    }
}
