/// One level of a change path: the slot taken at this level, and how many
/// slots the owner at this level had when the change was described
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PathEntry {
    index: usize,
    sibling_count: usize,
}

impl PathEntry {
    pub fn new(index: usize, sibling_count: usize) -> Self {
        Self {
            index,
            sibling_count,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn sibling_count(&self) -> usize {
        self.sibling_count
    }
}

/// Route from the top-level owner down to the owner a change happened in,
/// top first. Empty for a change made directly on the top-level owner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangePath {
    entries: Vec<PathEntry>,
}

impl ChangePath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a level above every level recorded so far
    pub fn prepend(&mut self, entry: PathEntry) {
        self.entries.insert(0, entry);
    }

    /// Adds a level below every level recorded so far
    pub fn push(&mut self, entry: PathEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&PathEntry> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathEntry> {
        self.entries.iter()
    }
}

impl FromIterator<PathEntry> for ChangePath {
    fn from_iter<T: IntoIterator<Item = PathEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
