//! Partition records by `file_label`, work per group, reassemble.
//!
//! KPIs, downsampling and smoothing all have the same shape: split the run
//! into per-file groups, compute something per group, then put the results
//! back together in timestep order. [`LabelGroups`] is that shape.

use std::collections::BTreeMap;

use crate::domain::record::TelemetryRecord;

/// Rows of one file, by index into the run's record slice.
#[derive(Debug, Clone)]
pub struct LabelGroup<'a> {
    label: &'a str,
    records: &'a [TelemetryRecord],
    indices: Vec<usize>,
}

impl<'a> LabelGroup<'a> {
    pub fn label(&self) -> &'a str {
        self.label
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Rows in their original relative order, with their run-wide index.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &'a TelemetryRecord)> + '_ {
        let records = self.records;
        self.indices.iter().map(move |&i| (i, &records[i]))
    }

    /// Rows sorted by timestep, ties by original index.
    pub fn rows_by_timestep(&self) -> Vec<(usize, &'a TelemetryRecord)> {
        let mut rows: Vec<_> = self.rows().collect();
        rows.sort_by_key(|(i, r)| (r.timestep, *i));
        rows
    }
}

/// A run split into per-label groups, reported in label order.
#[derive(Debug, Clone)]
pub struct LabelGroups<'a> {
    records: &'a [TelemetryRecord],
    groups: Vec<LabelGroup<'a>>,
}

impl<'a> LabelGroups<'a> {
    pub fn partition(records: &'a [TelemetryRecord]) -> Self {
        let mut by_label: BTreeMap<&'a str, Vec<usize>> = BTreeMap::new();
        for (i, record) in records.iter().enumerate() {
            by_label.entry(&record.file_label).or_default().push(i);
        }

        let groups = by_label
            .into_iter()
            .map(|(label, indices)| LabelGroup {
                label,
                records,
                indices,
            })
            .collect();

        Self { records, groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelGroup<'a>> {
        self.groups.iter()
    }

    /// One value per group, in label order.
    pub fn map<T>(&self, f: impl FnMut(&LabelGroup<'a>) -> T) -> Vec<T> {
        self.groups.iter().map(f).collect()
    }

    /// Apply `f` per group and merge the outputs into one sequence.
    ///
    /// `f` tags each output with the run-wide index of the row it came from.
    /// The merged output is ordered by that row's timestep, ties by index.
    pub fn reassemble<T>(&self, mut f: impl FnMut(&LabelGroup<'a>) -> Vec<(usize, T)>) -> Vec<T> {
        let mut tagged: Vec<(usize, T)> = self.groups.iter().flat_map(|g| f(g)).collect();
        let records = self.records;
        tagged.sort_by_key(|(i, _)| (records[*i].timestep, *i));
        tagged.into_iter().map(|(_, value)| value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(ts: u64, label: &str) -> TelemetryRecord {
        TelemetryRecord::new(ts, None, 0.0, label)
    }

    #[test]
    fn groups_are_label_ordered_and_keep_row_order() {
        let records = vec![rec(5, "b"), rec(1, "a"), rec(3, "b"), rec(2, "a")];
        let groups = LabelGroups::partition(&records);

        assert_eq!(groups.map(|g| g.label()), ["a", "b"]);
        let b: Vec<u64> = groups
            .iter()
            .nth(1)
            .map(|g| g.rows().map(|(_, r)| r.timestep).collect())
            .unwrap_or_default();
        assert_eq!(b, [5, 3]);
    }

    #[test]
    fn rows_by_timestep_breaks_ties_by_index() {
        let records = vec![rec(2, "a"), rec(1, "a"), rec(2, "a")];
        let groups = LabelGroups::partition(&records);
        let order: Vec<usize> = groups.map(|g| g.rows_by_timestep())[0]
            .iter()
            .map(|(i, _)| *i)
            .collect();
        assert_eq!(order, [1, 0, 2]);
    }

    #[test]
    fn reassemble_interleaves_groups_by_timestep() {
        let records = vec![rec(10, "a"), rec(30, "a"), rec(20, "b"), rec(10, "b")];
        let groups = LabelGroups::partition(&records);
        let merged = groups.reassemble(|g| g.rows().map(|(i, r)| (i, (r.timestep, g.label()))).collect());

        assert_eq!(merged, [(10, "a"), (10, "b"), (20, "b"), (30, "a")]);
    }

    #[test]
    fn empty_input_has_no_groups() {
        let groups = LabelGroups::partition(&[]);
        assert!(groups.is_empty());
        assert!(groups.reassemble(|_| Vec::<(usize, ())>::new()).is_empty());
    }
}
