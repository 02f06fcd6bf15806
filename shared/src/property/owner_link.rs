use crate::{
    change::{ChangePath, PathEntry, PropertyChange},
    property::ChangeError,
};

/// The owner at the top of a property tree, which turns a finished change
/// description into outgoing updates
pub trait TopLevelOwner {
    fn on_owned_property_changed(&mut self, change: &PropertyChange) -> Result<(), ChangeError>;
}

/// The upward link from an owner to its parent.
///
/// Walking the links to the top records where the change happened: every
/// nested level prepends its slot index and its parent's slot count to
/// `path`, so the path reads top to bottom when the walk returns.
pub trait OwnerLink {
    fn top_level_owner(&mut self, path: &mut ChangePath) -> Result<&mut dyn TopLevelOwner, ChangeError>;
}

/// Link held by a container that lives in slot `index` of a parent with
/// `sibling_count` slots
pub struct NestedLink<'a> {
    parent: &'a mut dyn OwnerLink,
    index: usize,
    sibling_count: usize,
}

impl<'a> NestedLink<'a> {
    pub fn new(parent: &'a mut dyn OwnerLink, index: usize, sibling_count: usize) -> Self {
        Self {
            parent,
            index,
            sibling_count,
        }
    }
}

impl OwnerLink for NestedLink<'_> {
    fn top_level_owner(&mut self, path: &mut ChangePath) -> Result<&mut dyn TopLevelOwner, ChangeError> {
        path.prepend(PathEntry::new(self.index, self.sibling_count));
        self.parent.top_level_owner(path)
    }
}
