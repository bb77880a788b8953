/// One list of integers to be sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Sequence(Vec<i64>);

impl Sequence {
    pub fn new(values: Vec<i64>) -> Self {
        Sequence(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [i64] {
        &mut self.0
    }

    /// Sorts ascending in place. Equal values are not kept in submission order.
    pub fn sort(&mut self) {
        self.0.sort_unstable();
    }

    pub fn is_sorted(&self) -> bool {
        self.0.is_sorted()
    }

    pub fn into_inner(self) -> Vec<i64> {
        self.0
    }
}

impl From<Vec<i64>> for Sequence {
    fn from(values: Vec<i64>) -> Self {
        Sequence(values)
    }
}

/// Every sequence submitted in one request, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Batch(Vec<Sequence>);

impl Batch {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sequence> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Sequence> {
        self.0.iter_mut()
    }

    /// Total number of integers across all sequences.
    pub fn total_values(&self) -> usize {
        self.0.iter().map(Sequence::len).sum()
    }

    pub fn into_inner(self) -> Vec<Sequence> {
        self.0
    }
}

impl From<Vec<Vec<i64>>> for Batch {
    fn from(sequences: Vec<Vec<i64>>) -> Self {
        sequences.into_iter().map(Sequence::from).collect()
    }
}

impl FromIterator<Sequence> for Batch {
    fn from_iter<T: IntoIterator<Item = Sequence>>(iter: T) -> Self {
        Batch(iter.into_iter().collect())
    }
}

impl IntoIterator for Batch {
    type Item = Sequence;
    type IntoIter = std::vec::IntoIter<Sequence>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Sequence;
    type IntoIter = std::slice::Iter<'a, Sequence>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
