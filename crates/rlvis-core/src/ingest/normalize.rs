//! Schema normalization: vendor column names → canonical records.
//!
//! Aliasing is data, not branching. [`CONFIDENCE_ALIASES`] lists the known
//! confidence-signal columns in priority order; a new engine is one more
//! entry.

use crate::domain::error::ValidationError;
use crate::domain::record::{
    TelemetryRecord, CONFIDENCE_METRIC, CUMULATIVE_REWARD, REQUIRED_COLUMNS, TIMESTEP,
};
use crate::ingest::table::RawTable;

/// A `source → canonical` column rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnAlias {
    pub source: &'static str,
    pub canonical: &'static str,
}

/// Known confidence-signal columns, highest priority first.
pub const CONFIDENCE_ALIASES: &[ColumnAlias] = &[
    // actor-critic value head (PPO, A2C)
    ColumnAlias {
        source: "value_estimate",
        canonical: CONFIDENCE_METRIC,
    },
    // Q-learning engines (DQN)
    ColumnAlias {
        source: "max_q_value",
        canonical: CONFIDENCE_METRIC,
    },
];

/// Maps raw tables onto [`TelemetryRecord`]s.
#[derive(Debug, Clone)]
pub struct SchemaNormalizer {
    aliases: Vec<ColumnAlias>,
}

impl Default for SchemaNormalizer {
    fn default() -> Self {
        Self {
            aliases: CONFIDENCE_ALIASES.to_vec(),
        }
    }
}

impl SchemaNormalizer {
    pub fn new(aliases: Vec<ColumnAlias>) -> Self {
        Self { aliases }
    }

    /// Append a lower-priority alias.
    pub fn with_alias(mut self, alias: ColumnAlias) -> Self {
        self.aliases.push(alias);
        self
    }

    pub fn aliases(&self) -> &[ColumnAlias] {
        &self.aliases
    }

    /// Apply the alias table to `table`'s header in place.
    ///
    /// For each canonical column that is not already present, the first alias
    /// whose source column exists is renamed onto it. A table that already
    /// carries the canonical name is left untouched. Returns the aliases that
    /// were applied.
    pub fn apply_aliases(&self, table: &mut RawTable) -> Vec<ColumnAlias> {
        let mut applied = Vec::new();
        for alias in &self.aliases {
            if table.has_column(alias.canonical) {
                continue;
            }
            if table.rename_column(alias.source, alias.canonical) {
                applied.push(*alias);
            }
        }
        applied
    }

    /// Normalize one file's table into records labelled `file_label`.
    ///
    /// Fails without partial output if a required column is missing after
    /// aliasing or a required cell cannot be parsed. Columns outside the
    /// canonical schema are dropped.
    pub fn normalize(
        &self,
        mut table: RawTable,
        file_label: &str,
    ) -> Result<Vec<TelemetryRecord>, ValidationError> {
        self.apply_aliases(&mut table);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !table.has_column(col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingColumns {
                file: file_label.to_string(),
                missing,
            });
        }

        // Presence checked above
        let position = |name: &str| table.column_index(name).unwrap_or_default();
        let ts_idx = position(TIMESTEP);
        let reward_idx = position(CUMULATIVE_REWARD);
        let conf_idx = position(CONFIDENCE_METRIC);

        let mut records = Vec::with_capacity(table.row_count());
        for (i, row) in table.rows().iter().enumerate() {
            let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");
            let malformed = |column: &str, value: &str| ValidationError::MalformedCell {
                file: file_label.to_string(),
                row: i + 1,
                column: column.to_string(),
                value: value.to_string(),
            };

            let timestep =
                parse_timestep(cell(ts_idx)).ok_or_else(|| malformed(TIMESTEP, cell(ts_idx)))?;
            let cumulative_reward = parse_reward(cell(reward_idx))
                .map_err(|_| malformed(CUMULATIVE_REWARD, cell(reward_idx)))?;
            let confidence_metric = parse_finite(cell(conf_idx))
                .ok_or_else(|| malformed(CONFIDENCE_METRIC, cell(conf_idx)))?;

            records.push(TelemetryRecord {
                timestep,
                cumulative_reward,
                confidence_metric,
                file_label: file_label.to_string(),
            });
        }

        Ok(records)
    }
}

/// Normalize with the default alias table.
pub fn normalize(table: RawTable, file_label: &str) -> Result<Vec<TelemetryRecord>, ValidationError> {
    SchemaNormalizer::default().normalize(table, file_label)
}

/// Non-negative integer; integral float text such as `100.0` is accepted.
fn parse_timestep(raw: &str) -> Option<u64> {
    if let Ok(ts) = raw.parse::<u64>() {
        return Some(ts);
    }
    let float = parse_finite(raw)?;
    (float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64).then_some(float as u64)
}

/// Empty and NaN-like markers mean "no reward on this row".
fn parse_reward(raw: &str) -> Result<Option<f64>, ()> {
    if is_missing_marker(raw) {
        return Ok(None);
    }
    parse_finite(raw).map(Some).ok_or(())
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_missing_marker(raw: &str) -> bool {
    raw.is_empty()
        || ["nan", "null", "none"]
            .iter()
            .any(|m| raw.eq_ignore_ascii_case(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn value_estimate_aliases_to_confidence_metric() {
        let raw = table(
            &["timestep", "value_estimate", "cumulative_reward"],
            &[&["1", "0.5", ""], &["2", "0.75", "21.0"]],
        );
        let records = normalize(raw, "ppo.csv").unwrap();

        assert_eq!(
            records,
            vec![
                TelemetryRecord::new(1, None, 0.5, "ppo.csv"),
                TelemetryRecord::new(2, Some(21.0), 0.75, "ppo.csv"),
            ]
        );
    }

    #[test]
    fn max_q_value_aliases_to_confidence_metric() {
        let raw = table(
            &["timestep", "cumulative_reward", "max_q_value"],
            &[&["10", "nan", "3.5"]],
        );
        let records = normalize(raw, "dqn.csv").unwrap();
        assert_eq!(records, vec![TelemetryRecord::new(10, None, 3.5, "dqn.csv")]);
    }

    #[test]
    fn first_alias_wins_when_both_present() {
        let mut raw = table(&["timestep", "max_q_value", "value_estimate"], &[]);
        let applied = SchemaNormalizer::default().apply_aliases(&mut raw);

        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].source, "value_estimate");
        assert_eq!(
            raw.columns(),
            ["timestep", "max_q_value", "confidence_metric"]
        );
    }

    #[test]
    fn canonical_input_is_left_unchanged() {
        let original = table(
            &["timestep", "cumulative_reward", "confidence_metric"],
            &[&["1", "", "0.1"], &["2", "5", "0.2"]],
        );
        let mut aliased = original.clone();
        let applied = SchemaNormalizer::default().apply_aliases(&mut aliased);

        assert!(applied.is_empty());
        assert_eq!(aliased, original);

        // A canonical table and its vendor-named twin normalize identically
        let vendor = table(
            &["timestep", "cumulative_reward", "value_estimate"],
            &[&["1", "", "0.1"], &["2", "5", "0.2"]],
        );
        assert_eq!(
            normalize(original, "f.csv").unwrap(),
            normalize(vendor, "f.csv").unwrap()
        );
    }

    #[test]
    fn canonical_column_blocks_alias_rename() {
        let mut raw = table(&["confidence_metric", "value_estimate"], &[]);
        SchemaNormalizer::default().apply_aliases(&mut raw);
        assert_eq!(raw.columns(), ["confidence_metric", "value_estimate"]);
    }

    #[test]
    fn missing_confidence_column_fails_with_file_name() {
        let raw = table(&["timestep", "cumulative_reward", "loss"], &[&["1", "", "0.3"]]);
        let err = normalize(raw, "mystery.csv").unwrap_err();

        assert_eq!(
            err,
            ValidationError::MissingColumns {
                file: "mystery.csv".to_string(),
                missing: vec!["confidence_metric".to_string()],
            }
        );
    }

    #[test]
    fn missing_reward_column_fails() {
        let raw = table(&["timestep", "value_estimate"], &[&["1", "0.3"]]);
        let err = normalize(raw, "noreward.csv").unwrap_err();
        assert!(
            matches!(err, ValidationError::MissingColumns { ref missing, .. } if missing == &["cumulative_reward"])
        );
    }

    #[test]
    fn extra_columns_are_dropped() {
        let raw = table(
            &["episode", "timestep", "cumulative_reward", "value_estimate"],
            &[&["3", "9", "1.5", "0.2"]],
        );
        let records = normalize(raw, "x.csv").unwrap();
        assert_eq!(records, vec![TelemetryRecord::new(9, Some(1.5), 0.2, "x.csv")]);
    }

    #[test]
    fn unparsable_cells_are_reported_with_position() {
        let raw = table(
            &["timestep", "cumulative_reward", "confidence_metric"],
            &[&["1", "", "0.1"], &["two", "", "0.2"]],
        );
        let err = normalize(raw, "bad.csv").unwrap_err();
        assert_eq!(
            err,
            ValidationError::MalformedCell {
                file: "bad.csv".to_string(),
                row: 2,
                column: "timestep".to_string(),
                value: "two".to_string(),
            }
        );
    }

    #[test]
    fn missing_confidence_cell_is_malformed() {
        let raw = table(
            &["timestep", "cumulative_reward", "confidence_metric"],
            &[&["1", "4", ""]],
        );
        assert!(matches!(
            normalize(raw, "gap.csv").unwrap_err(),
            ValidationError::MalformedCell { ref column, .. } if column == "confidence_metric"
        ));
    }

    #[test]
    fn timestep_parsing() {
        assert_eq!(parse_timestep("42"), Some(42));
        assert_eq!(parse_timestep("100.0"), Some(100));
        assert_eq!(parse_timestep("1.5"), None);
        assert_eq!(parse_timestep("-1"), None);
        assert_eq!(parse_timestep(""), None);
    }

    #[test]
    fn reward_missing_markers() {
        assert_eq!(parse_reward(""), Ok(None));
        assert_eq!(parse_reward("NaN"), Ok(None));
        assert_eq!(parse_reward("None"), Ok(None));
        assert_eq!(parse_reward("0"), Ok(Some(0.0)));
        assert_eq!(parse_reward("-3.25"), Ok(Some(-3.25)));
        assert!(parse_reward("inf").is_err());
        assert!(parse_reward("abc").is_err());
    }

    #[test]
    fn custom_alias_extends_table() {
        let normalizer = SchemaNormalizer::default().with_alias(ColumnAlias {
            source: "policy_entropy",
            canonical: CONFIDENCE_METRIC,
        });
        let raw = table(
            &["timestep", "cumulative_reward", "policy_entropy"],
            &[&["5", "", "0.9"]],
        );
        let records = normalizer.normalize(raw, "sac.csv").unwrap();
        assert_eq!(records[0].confidence_metric, 0.9);
        assert_eq!(normalizer.aliases().len(), 3);
    }
}
