//! Ordered, repeat-free sets of sample ids.

use std::collections::HashSet;

use crate::{CoreResult, SampleId};

/// The sample ids chosen by the user in one interaction.
///
/// Keeps the order in which ids were supplied; repeats are dropped on
/// construction. An empty selection means "nothing selected".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Vec<SampleId>", into = "Vec<SampleId>"))]
pub struct Selection {
    ids: Vec<SampleId>,
}

impl Selection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from raw row indices, e.g. as emitted by a brushing tool.
    pub fn from_indices<I>(indices: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let ids = indices
            .into_iter()
            .map(SampleId::try_from)
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Self::from(ids))
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: SampleId) -> bool {
        self.ids.contains(&id)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = SampleId> + '_ {
        self.ids.iter().copied()
    }

    /// Ids of this selection not accepted by `known`, in selection order.
    pub fn unseen(&self, known: impl Fn(SampleId) -> bool) -> Vec<SampleId> {
        self.ids.iter().copied().filter(|id| !known(*id)).collect()
    }
}

impl From<Vec<SampleId>> for Selection {
    fn from(ids: Vec<SampleId>) -> Self {
        let mut seen = HashSet::with_capacity(ids.len());
        let ids = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        Self { ids }
    }
}

impl From<Selection> for Vec<SampleId> {
    fn from(selection: Selection) -> Self {
        selection.ids
    }
}

impl FromIterator<SampleId> for Selection {
    fn from_iter<I: IntoIterator<Item = SampleId>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
