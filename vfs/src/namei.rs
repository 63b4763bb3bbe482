//! Pathname resolution.
//!
//! Turns path text into vnodes one component at a time. Every vnode touched on the way is held through a
//! [`VNodeRef`], so whatever a function acquired and does not hand to its caller is released when it returns,
//! no matter which branch it returns from.

use alloc::{string::String, vec::Vec};

use libvfs::{
    fcntl::OpenFlags,
    limits::{MAXPATHLEN, NAME_LEN},
};
use log::{debug, error};

use crate::{
    path::{Component, Components},
    vnode::{Capabilities, VNodeRef},
    Error, Result,
};

/// The vnodes a path is resolved against.
///
/// Absolute paths start at `root`, relative paths without an explicit base at `cwd`. Both references are owned by
/// the context.
#[derive(Debug, Clone)]
pub struct NameiContext {
    root: VNodeRef,
    cwd: VNodeRef,
}

impl NameiContext {
    /// Creates a context whose working directory is the root.
    pub fn new(root: VNodeRef) -> Self {
        Self {
            cwd: root.clone(),
            root,
        }
    }

    pub fn with_cwd(root: VNodeRef, cwd: VNodeRef) -> Self {
        Self { root, cwd }
    }

    pub fn root(&self) -> &VNodeRef {
        &self.root
    }

    pub fn cwd(&self) -> &VNodeRef {
        &self.cwd
    }

    /// Changes the working directory to `path`, releasing the previous one.
    pub fn chdir(&mut self, path: &str) -> Result<()> {
        let node = open_namev(self, path, OpenFlags::O_RDONLY, None)?;

        if !node.is_dir() {
            debug!("[namei] chdir: {} is not a directory", path);
            return Err(Error::NotADirectory);
        }

        self.cwd = node;

        Ok(())
    }
}

/// Looks up `name` in the directory `dir`.
///
/// `"."` and the empty name resolve to `dir` itself without asking the driver, everything else, `".."` included,
/// is left to the driver's lookup. The returned reference is owned by the caller.
pub fn lookup(dir: &VNodeRef, name: &str) -> Result<VNodeRef> {
    if !dir.is_dir() || !dir.can(Capabilities::LOOKUP) {
        error!("[namei] lookup: vno {} has no lookup", dir.vno());
        return Err(Error::NotADirectory);
    }

    if name.is_empty() || name == "." {
        debug!("[namei] lookup: {:?} is vno {} itself", name, dir.vno());
        return Ok(dir.clone());
    }

    if name.len() > NAME_LEN {
        error!("[namei] lookup: name {} is too long", name);
        return Err(Error::NameTooLong);
    }

    dir.lookup(name)
        .inspect_err(|err| debug!("[namei] lookup: {} in vno {} failed: {}", name, dir.vno(), err))
}

/// Resolves every component of `path` but the last one.
///
/// Returns the directory containing the last component together with the last component itself, which borrows
/// from `path`. For `"/s5fs/bin/ls"` this is the vnode of `/s5fs/bin` and `"ls"`. The last component is empty if
/// `path` ends with a separator.
///
/// Absolute paths start at the context's root and ignore `base`. Relative paths start at `base`, or at the
/// context's working directory if no base is given.
pub fn dir_namev<'p>(
    ctx: &NameiContext,
    path: &'p str,
    base: Option<&VNodeRef>,
) -> Result<(VNodeRef, Component<'p>)> {
    debug!("[namei] dir_namev: resolving {}", path);

    if path.len() > MAXPATHLEN {
        error!("[namei] dir_namev: path is {} bytes long", path.len());
        return Err(Error::NameTooLong);
    }

    if path.is_empty() {
        error!("[namei] dir_namev: empty path");
        return Err(Error::InvalidArgument);
    }

    let mut components = Components::new(path);

    let mut dir = if components.strip_root() {
        ctx.root().clone()
    } else {
        base.unwrap_or(ctx.cwd()).clone()
    };

    loop {
        if !dir.is_dir() {
            error!("[namei] dir_namev: vno {} in {} is not a directory", dir.vno(), path);
            return Err(Error::NotADirectory);
        }

        let Some(component) = components.next() else {
            break;
        };

        if component.len() > NAME_LEN {
            error!("[namei] dir_namev: component at offset {} is too long", component.offset());
            return Err(Error::NameTooLong);
        }

        dir = lookup(&dir, component.name())?;
    }

    let basename = components.basename();
    debug!("[namei] dir_namev: basename {:?} in vno {}", basename.name(), dir.vno());

    Ok((dir, basename))
}

/// Resolves `path` to the vnode it names.
///
/// If the last component does not exist and `flags` contain [`OpenFlags::O_CREAT`], it is created as a regular
/// file in its parent directory.
///
/// # Panics
/// Panics if a file has to be created in a directory whose driver does not provide create.
pub fn open_namev(ctx: &NameiContext, path: &str, flags: OpenFlags, base: Option<&VNodeRef>) -> Result<VNodeRef> {
    let (parent, name) = dir_namev(ctx, path, base)?;

    if !parent.is_dir() {
        return Err(Error::NotADirectory);
    }

    match lookup(&parent, name.name()) {
        Err(Error::NoSuchEntry) if flags.creates() => {
            assert!(
                parent.can(Capabilities::CREATE),
                "vno {} is a directory without create",
                parent.vno()
            );

            debug!("[namei] open_namev: creating {} in vno {}", name.name(), parent.vno());
            parent.create(name.name())
        }
        result => result,
    }
}

/// Finds the name under which `entry` is linked in `dir`.
///
/// Entries are compared by vnode number, the `"."` and `".."` entries are never returned.
pub fn lookup_name(dir: &VNodeRef, entry: &VNodeRef) -> Result<String> {
    if !dir.is_dir() || !dir.can(Capabilities::READDIR) {
        return Err(Error::NotADirectory);
    }

    let mut offset = 0;

    while let Some(dirent) = dir.readdir(offset)? {
        offset += 1;

        if dirent.name == "." || dirent.name == ".." {
            continue;
        }

        if dirent.vno == entry.vno() {
            return Ok(dirent.name);
        }
    }

    Err(Error::NoSuchEntry)
}

/// Builds the absolute path of the directory `dir` by walking `".."` up to the context's root.
///
/// Fails with [`Error::Range`] if the path is longer than `size` bytes and with [`Error::NoSuchEntry`] if `dir` is
/// not below the context's root.
pub fn lookup_dirpath(ctx: &NameiContext, dir: &VNodeRef, size: usize) -> Result<String> {
    let mut names = Vec::new();
    let mut len = 0;
    let mut current = dir.clone();

    while !VNodeRef::ptr_eq(&current, ctx.root()) {
        let parent = lookup(&current, "..")?;

        // top of the file system without passing the context's root
        if VNodeRef::ptr_eq(&parent, &current) {
            debug!("[namei] lookup_dirpath: vno {} is not below the root", dir.vno());
            return Err(Error::NoSuchEntry);
        }

        let name = lookup_name(&parent, &current)?;

        len += name.len() + 1;
        if len > size {
            return Err(Error::Range);
        }

        names.push(name);
        current = parent;
    }

    if names.is_empty() {
        return if size == 0 { Err(Error::Range) } else { Ok(String::from("/")) };
    }

    let mut path = String::with_capacity(len);
    for name in names.iter().rev() {
        path.push('/');
        path.push_str(name);
    }

    Ok(path)
}
