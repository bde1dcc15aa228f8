use std::collections::HashMap;

use ytrack_types::YtrackError;

/// Index of a column in a [`ColumnRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(usize);

impl ColumnId {
    /// Position of the column in schema order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Append-only, order-stable table of column names.
///
/// Rows reference cells by [`ColumnId`]; ids are never reused or reordered,
/// so a row written before a column existed simply has no cell for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnRegistry {
    names: Vec<String>,
    index: HashMap<String, ColumnId>,
}

impl ColumnRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `names` in order; duplicates collapse.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut reg = Self::new();
        for n in names {
            reg.intern(n);
        }
        reg
    }

    /// Id of `name`, registering it at the end if unseen.
    pub fn intern(&mut self, name: impl Into<String>) -> ColumnId {
        let name = name.into();
        if let Some(&id) = self.index.get(&name) {
            return id;
        }
        let id = ColumnId(self.names.len());
        self.index.insert(name.clone(), id);
        self.names.push(name);
        id
    }

    /// Register a column that must not exist yet.
    ///
    /// # Errors
    /// Returns `ColumnNameCollision` if `name` is already registered.
    pub fn try_register(&mut self, name: impl Into<String>) -> Result<ColumnId, YtrackError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(YtrackError::ColumnNameCollision { column: name });
        }
        Ok(self.intern(name))
    }

    /// Id of an existing column.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ColumnId> {
        self.index.get(name).copied()
    }

    /// Name of a column.
    ///
    /// # Panics
    /// Panics if `id` was issued by a different registry with more columns.
    #[must_use]
    pub fn name(&self, id: ColumnId) -> &str {
        &self.names[id.0]
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no columns are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column names in schema order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// `(id, name)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (ColumnId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (ColumnId(i), n.as_str()))
    }

    /// Union `other` into `self`, keeping existing order and appending unseen
    /// names at the end.
    ///
    /// Returns the translation table from `other`'s ids to `self`'s ids
    /// (indexed by `other`'s id) and the names that were newly added.
    pub fn absorb(&mut self, other: &Self) -> (Vec<ColumnId>, Vec<String>) {
        let mut added = Vec::new();
        let remap = other
            .names
            .iter()
            .map(|n| {
                if !self.contains(n) {
                    added.push(n.clone());
                }
                self.intern(n.as_str())
            })
            .collect();
        (remap, added)
    }
}
