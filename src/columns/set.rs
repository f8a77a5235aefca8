use super::descriptor::{ColumnDescriptor, ColumnFlags};

/// Ordered, case-insensitively keyed list of output columns.
///
/// Order is JSON key order. Each table gets its own deep copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns in output order.
    pub fn iter(&self) -> std::slice::Iter<'_, ColumnDescriptor> {
        self.columns.iter()
    }

    /// Mutable columns in output order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ColumnDescriptor> {
        self.columns.iter_mut()
    }

    /// Column at `index`.
    pub fn get(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    /// Mutable column at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut ColumnDescriptor> {
        self.columns.get_mut(index)
    }

    /// Index of the column named `name`, ignoring ASCII case.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.matches(name))
    }

    /// Column named `name`, ignoring ASCII case.
    pub fn find(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.matches(name))
    }

    /// Index of the column named `name`, appending a placeholder when missing.
    pub fn find_or_append(&mut self, name: &str) -> usize {
        match self.position(name) {
            Some(index) => index,
            None => {
                self.columns.push(ColumnDescriptor::new(name));
                self.columns.len() - 1
            }
        }
    }

    /// Adds `flags` to the column named `name`, appending it when missing.
    pub fn annotate(&mut self, name: &str, flags: ColumnFlags) -> usize {
        let index = self.find_or_append(name);
        self.columns[index].flags.insert(flags);
        index
    }

    /// Index of the source column flagged as the batching column.
    pub fn batch_index(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.is_from_source() && c.is_batch())
    }
}

impl std::ops::Index<usize> for ColumnSet {
    type Output = ColumnDescriptor;

    fn index(&self, index: usize) -> &ColumnDescriptor {
        &self.columns[index]
    }
}

impl std::ops::IndexMut<usize> for ColumnSet {
    fn index_mut(&mut self, index: usize) -> &mut ColumnDescriptor {
        &mut self.columns[index]
    }
}

impl<'a> IntoIterator for &'a ColumnSet {
    type Item = &'a ColumnDescriptor;
    type IntoIter = std::slice::Iter<'a, ColumnDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
