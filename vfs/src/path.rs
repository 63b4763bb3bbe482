//! Splitting of path text into components without copying it.

use core::iter::FusedIterator;

pub const SEPARATOR: char = '/';

/// One `/`-delimited piece of a path, borrowed from the path text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component<'a> {
    offset: usize,
    name: &'a str,
}

impl<'a> Component<'a> {
    /// Byte offset of the component inside the path it was taken from
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// Iterator over the components of a path which are followed by a separator.
///
/// The text after the last separator is not yielded, once the iterator is exhausted it is available through
/// [`Components::basename`]. Repeated separators yield empty components.
#[derive(Debug, Clone)]
pub struct Components<'a> {
    path: &'a str,
    pos: usize,
}

impl<'a> Components<'a> {
    pub fn new(path: &'a str) -> Self {
        Self { path, pos: 0 }
    }

    /// Consumes a leading separator, returns `true` if there was one.
    pub fn strip_root(&mut self) -> bool {
        if self.pos == 0 && self.path.starts_with(SEPARATOR) {
            self.pos = SEPARATOR.len_utf8();
            true
        } else {
            false
        }
    }

    /// The unconsumed rest of the path.
    ///
    /// After the last separator has been passed this is the final component, possibly empty.
    pub fn basename(&self) -> Component<'a> {
        Component {
            offset: self.pos,
            name: &self.path[self.pos..],
        }
    }
}

impl<'a> Iterator for Components<'a> {
    type Item = Component<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.path[self.pos..];
        let len = rest.find(SEPARATOR)?;

        let component = Component {
            offset: self.pos,
            name: &rest[..len],
        };
        self.pos += len + SEPARATOR.len_utf8();

        Some(component)
    }
}

impl FusedIterator for Components<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(components: &mut Components<'a>) -> Vec<&'a str> {
        components.map(|c| c.name()).collect()
    }

    #[test]
    fn absolute_path() {
        let mut components = Components::new("/s5fs/bin/ls");
        assert!(components.strip_root());
        assert_eq!(names(&mut components), ["s5fs", "bin"]);

        let basename = components.basename();
        assert_eq!(basename.name(), "ls");
        assert_eq!(basename.offset(), 10);
        assert_eq!(basename.len(), 2);
    }

    #[test]
    fn relative_path_keeps_first_component() {
        let mut components = Components::new("a/b");
        assert!(!components.strip_root());
        assert_eq!(names(&mut components), ["a"]);
        assert_eq!(components.basename().name(), "b");
    }

    #[test]
    fn repeated_and_trailing_separators() {
        let mut components = Components::new("a//b/");
        let offsets: Vec<usize> = components.clone().map(|c| c.offset()).collect();
        assert_eq!(offsets, [0, 2, 3]);
        assert_eq!(names(&mut components), ["a", "", "b"]);
        assert!(components.basename().is_empty());
        assert_eq!(components.basename().offset(), 5);
    }

    #[test]
    fn root_only() {
        let mut components = Components::new("/");
        assert!(components.strip_root());
        assert!(!components.strip_root());
        assert_eq!(components.next(), None);
        assert_eq!(components.next(), None);
        assert_eq!(components.basename().name(), "");
    }
}
