//! Vnode pathname resolution.
//!
//! The design of the vnode layer is heavily influenced by BSD: file system drivers hand out [`VNode`]s through
//! [`VNodeOperations`], and [`namei`] walks paths across them while keeping every reference it takes balanced.

#![cfg_attr(not(test), no_std)]
extern crate alloc;

mod error;
pub mod namei;
pub mod path;
pub mod tmpfs;
pub mod vnode;

pub use error::{Error, Result};
pub use libvfs::{
    fcntl::OpenFlags,
    limits::{MAXPATHLEN, NAME_LEN},
    syscall::SyscallError,
};
pub use namei::{dir_namev, lookup, lookup_dirpath, lookup_name, open_namev, NameiContext};
pub use vnode::{Capabilities, DirEntry, VNode, VNodeOperations, VNodeRef, VType, WeakVNode};
