//! Which variables to extract, and what to call them in the output

use crate::errors::{Result, SubsetError};
use crate::path::{leaf_name, VariablePath};
use serde::Deserialize;
use std::collections::BTreeMap;

/// One selected variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    /// Name requested for the output; only its last `/` component is used as
    /// the variable name in the written file.
    pub output_name: String,
    pub source: VariablePath,
}

impl SelectionEntry {
    /// Variable name written to the output file.
    pub fn output_leaf(&self) -> &str {
        leaf_name(&self.output_name)
    }
}

/// Ordered set of variables to pull out of a source file.
///
/// Deserializes from either a JSON array of paths or a JSON object mapping
/// output names to source paths.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSelection")]
pub struct VariableSelection {
    entries: Vec<SelectionEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelection {
    Paths(Vec<String>),
    Renamed(BTreeMap<String, String>),
}

impl TryFrom<RawSelection> for VariableSelection {
    type Error = SubsetError;

    fn try_from(raw: RawSelection) -> Result<Self> {
        match raw {
            RawSelection::Paths(paths) => Self::from_paths(paths),
            RawSelection::Renamed(mapping) => Self::from_mapping(mapping),
        }
    }
}

impl VariableSelection {
    /// Select paths verbatim; each path is also its output name.
    pub fn from_paths<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = paths
            .into_iter()
            .map(|path| {
                let source = VariablePath::parse(path.as_ref())?;
                Ok(SelectionEntry {
                    output_name: source.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_entries(entries)
    }

    /// Select from `(output_name, source_path)` pairs.
    pub fn from_mapping<I, K, V>(mapping: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let entries = mapping
            .into_iter()
            .map(|(name, path)| {
                Ok(SelectionEntry {
                    output_name: name.into(),
                    source: VariablePath::parse(path.as_ref())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_entries(entries)
    }

    fn from_entries(entries: Vec<SelectionEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(SubsetError::configuration("Variable selection is empty"));
        }
        if let Some(entry) = entries.iter().find(|e| e.output_leaf().is_empty()) {
            return Err(SubsetError::configuration(format!(
                "Empty output name for variable '{}'",
                entry.source
            )));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectionEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a VariableSelection {
    type Item = &'a SelectionEntry;
    type IntoIter = std::slice::Iter<'a, SelectionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_their_own_output_names() {
        let selection =
            VariableSelection::from_paths(["PRODUCT/latitude", "/PRODUCT/longitude"]).unwrap();
        let names: Vec<&str> = selection.iter().map(|e| e.output_name.as_str()).collect();
        assert_eq!(names, ["PRODUCT/latitude", "PRODUCT/longitude"]);
        assert_eq!(selection.entries()[0].output_leaf(), "latitude");
    }

    #[test]
    fn mapping_renames() {
        let selection = VariableSelection::from_mapping([
            ("no2", "PRODUCT/nitrogendioxide_tropospheric_column"),
            ("lat", "PRODUCT/latitude"),
        ])
        .unwrap();
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.entries()[0].output_leaf(), "no2");
        assert_eq!(selection.entries()[0].source.name(), "nitrogendioxide_tropospheric_column");
    }

    #[test]
    fn empty_selection_is_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            VariableSelection::from_paths(empty),
            Err(SubsetError::Configuration(_))
        ));
        assert!(VariableSelection::from_mapping([("", "PRODUCT/latitude")]).is_err());
    }

    #[test]
    fn deserializes_list_and_object_forms() {
        let list: VariableSelection =
            serde_json::from_str(r#"["PRODUCT/latitude", "PRODUCT/longitude"]"#).unwrap();
        assert_eq!(list.len(), 2);

        let object: VariableSelection =
            serde_json::from_str(r#"{"lon": "PRODUCT/longitude", "lat": "PRODUCT/latitude"}"#)
                .unwrap();
        // object keys come back in name order
        assert_eq!(object.entries()[0].output_name, "lat");

        assert!(serde_json::from_str::<VariableSelection>("[]").is_err());
    }
}
