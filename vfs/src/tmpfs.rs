use alloc::{
    boxed::Box,
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};
use core::sync::atomic::{AtomicU64, Ordering};

use libvfs::{limits::NAME_LEN, syscall::SyscallError};
use log::debug;
use spin::Mutex;

use crate::{
    path::SEPARATOR,
    vnode::{Capabilities, DirEntry, VNode, VNodeOperations, VNodeRef, VType, WeakVNode},
    Error, Result,
};

/// In-memory file system, everything it holds lives as long as the `Tmpfs` itself
pub struct Tmpfs {
    root_node: VNodeRef,
}

impl Tmpfs {
    pub fn new() -> Self {
        let vnos = Arc::new(AtomicU64::new(1));
        let root_node = VNode::new(0, VType::Directory, Box::new(TmpfsNode::new(VType::Directory, None, vnos)));

        Self { root_node }
    }

    /// Gets the file system root vnode.
    pub fn vfs_root(&self) -> VNodeRef {
        self.root_node.clone()
    }

    pub fn vfs_name(&self) -> &'static str {
        "tmpfs"
    }
}

impl Default for Tmpfs {
    fn default() -> Self {
        Self::new()
    }
}

enum TmpfsNodeData {
    Directory(Vec<(String, VNodeRef)>),
    File,
}

struct TmpfsNode {
    /// `None` for the root directory, whose parent is itself
    parent: Option<WeakVNode>,
    /// vnode number allocator shared by every node of the file system
    vnos: Arc<AtomicU64>,
    data: Mutex<TmpfsNodeData>,
}

impl TmpfsNode {
    fn new(v_type: VType, parent: Option<WeakVNode>, vnos: Arc<AtomicU64>) -> Self {
        let data = if v_type == VType::Directory {
            TmpfsNodeData::Directory(Vec::new())
        } else {
            TmpfsNodeData::File
        };

        Self {
            parent,
            vnos,
            data: Mutex::new(data),
        }
    }

    fn parent_of(&self, dir: &VNodeRef) -> Result<VNodeRef> {
        match &self.parent {
            Some(parent) => parent.upgrade().ok_or(Error::NoSuchEntry),
            None => Ok(dir.clone()),
        }
    }

    fn make_node(&self, dir: &VNodeRef, name: &str, v_type: VType) -> Result<VNodeRef> {
        if name.contains(SEPARATOR) {
            return Err(Error::InvalidArgument);
        }

        if name.len() > NAME_LEN {
            return Err(Error::NameTooLong);
        }

        let mut data = self.data.lock();

        let TmpfsNodeData::Directory(children) = &mut *data else {
            return Err(Error::NotADirectory);
        };

        if matches!(name, "" | "." | "..") || children.iter().any(|(n, _)| n == name) {
            return Err(Error::Driver(SyscallError::Exists));
        }

        let vno = self.vnos.fetch_add(1, Ordering::Relaxed);
        let node_data = TmpfsNode::new(v_type, Some(dir.downgrade()), self.vnos.clone());
        let new_node = VNode::new(vno, v_type, Box::new(node_data));

        debug!("tmpfs: created {:?} {} as vno {} in vno {}", v_type, name, vno, dir.vno());

        children.push((name.to_string(), new_node.clone()));

        Ok(new_node)
    }
}

impl VNodeOperations for TmpfsNode {
    fn capabilities(&self) -> Capabilities {
        match *self.data.lock() {
            TmpfsNodeData::Directory(_) => {
                Capabilities::LOOKUP | Capabilities::CREATE | Capabilities::MKDIR | Capabilities::READDIR
            }
            TmpfsNodeData::File => Capabilities::empty(),
        }
    }

    fn lookup(&self, dir: &VNodeRef, name: &str) -> Result<VNodeRef> {
        debug!("tmpfs: lookup {} in vno {}", name, dir.vno());

        match name {
            "." => return Ok(dir.clone()),
            ".." => return self.parent_of(dir),
            _ => {}
        }

        if let TmpfsNodeData::Directory(children) = &*self.data.lock() {
            children
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, node)| node.clone())
                .ok_or(Error::NoSuchEntry)
        } else {
            Err(Error::NotADirectory)
        }
    }

    fn create(&self, dir: &VNodeRef, name: &str) -> Result<VNodeRef> {
        self.make_node(dir, name, VType::Regular)
    }

    fn mkdir(&self, dir: &VNodeRef, name: &str) -> Result<VNodeRef> {
        self.make_node(dir, name, VType::Directory)
    }

    fn readdir(&self, dir: &VNodeRef, offset: usize) -> Result<Option<DirEntry>> {
        let data = self.data.lock();

        let TmpfsNodeData::Directory(children) = &*data else {
            return Err(Error::NotADirectory);
        };

        let entry = match offset {
            0 => Some(DirEntry {
                vno: dir.vno(),
                name: ".".to_string(),
            }),
            1 => Some(DirEntry {
                vno: self.parent_of(dir)?.vno(),
                name: "..".to_string(),
            }),
            n => children.get(n - 2).map(|(name, node)| DirEntry {
                vno: node.vno(),
                name: name.clone(),
            }),
        };

        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_its_own_parent() {
        let fs = Tmpfs::new();
        let root = fs.vfs_root();

        let dotdot = root.lookup("..").unwrap();
        assert!(VNodeRef::ptr_eq(&root, &dotdot));
        assert_eq!(root.vno(), 0);
        assert_eq!(fs.vfs_name(), "tmpfs");
    }

    #[test]
    fn created_nodes_are_cached_and_returned_owned() {
        let fs = Tmpfs::new();
        let root = fs.vfs_root();

        let dir = root.mkdir("etc").unwrap();
        // one held by the directory, one by us
        assert_eq!(dir.refcount(), 2);
        assert!(dir.is_dir());

        let file = dir.create("passwd").unwrap();
        assert_eq!(file.v_type(), VType::Regular);
        assert!(file.capabilities().is_empty());

        let again = dir.lookup("passwd").unwrap();
        assert!(VNodeRef::ptr_eq(&file, &again));
        assert_eq!(file.refcount(), 3);

        let parent = dir.lookup("..").unwrap();
        assert!(VNodeRef::ptr_eq(&parent, &root));
    }

    #[test]
    fn duplicate_and_bad_names_are_rejected() {
        let fs = Tmpfs::new();
        let root = fs.vfs_root();
        root.create("a").unwrap();

        assert_eq!(root.create("a").unwrap_err(), Error::Driver(SyscallError::Exists));
        assert_eq!(root.mkdir("..").unwrap_err(), Error::Driver(SyscallError::Exists));
        assert_eq!(root.mkdir("x/y").unwrap_err(), Error::InvalidArgument);
        assert_eq!(root.mkdir(&"n".repeat(NAME_LEN + 1)).unwrap_err(), Error::NameTooLong);
        assert_eq!(root.lookup("b").unwrap_err(), Error::NoSuchEntry);
    }

    #[test]
    fn readdir_lists_dot_entries_first() {
        let fs = Tmpfs::new();
        let root = fs.vfs_root();
        let bin = root.mkdir("bin").unwrap();
        let ls = bin.create("ls").unwrap();

        let names: Vec<DirEntry> = (0..).map_while(|off| bin.readdir(off).unwrap()).collect();
        assert_eq!(
            names,
            [
                DirEntry { vno: bin.vno(), name: ".".into() },
                DirEntry { vno: root.vno(), name: "..".into() },
                DirEntry { vno: ls.vno(), name: "ls".into() },
            ]
        );
        assert_eq!(ls.readdir(0).unwrap_err(), Error::NotADirectory);
    }
}
