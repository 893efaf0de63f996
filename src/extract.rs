//! Extraction of selected variables into memory
//!
//! [`extract`] takes a source file through `SourceOpened -> Validated -> Read`:
//! it opens the file, checks that every selected path exists, and only then
//! reads data. A missing path fails the whole request before any data is read.
//! The resulting [`ExtractionResult`] owns all data plus a [`GroupTree`] of the
//! source groups involved, and is consumed by exactly one write.

use crate::data_source::{open_source, DataSource, SourceFormat, VariableContents};
use crate::errors::{Result, SubsetError};
use crate::metadata::DimensionInfo;
use crate::output::OutputSpec;
use crate::path::{leaf_name, GroupPath, VariablePath};
use crate::selection::{SelectionEntry, VariableSelection};
use crate::values::{ArrayData, AttrValue, Attribute};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One variable read from the source, under its output name
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedVariable {
    /// Name assigned by the selection
    pub name: String,
    pub source: VariablePath,
    pub data: ArrayData,
    pub dimensions: Vec<DimensionInfo>,
    pub attributes: Vec<Attribute>,
}

impl ExtractedVariable {
    fn new(entry: &SelectionEntry, contents: VariableContents) -> Self {
        Self {
            name: entry.output_name.clone(),
            source: entry.source.clone(),
            data: contents.data,
            dimensions: contents.dimensions,
            attributes: contents.attributes,
        }
    }

    /// Variable name used in the written file.
    pub fn output_leaf(&self) -> &str {
        leaf_name(&self.name)
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|(attr_name, _)| attr_name == name)
            .map(|(_, value)| value)
    }
}

/// Attributes of the source groups touched by an extraction, keyed by group path.
///
/// Only groups on the path to an extracted variable are present; the root is
/// always present and carries the global attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTree {
    nodes: BTreeMap<GroupPath, Vec<Attribute>>,
}

impl GroupTree {
    pub fn new(root_attributes: Vec<Attribute>) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(GroupPath::root(), root_attributes);
        Self { nodes }
    }

    pub fn contains(&self, path: &GroupPath) -> bool {
        self.nodes.contains_key(path)
    }

    /// Attributes of a group, empty when the group is not in the tree.
    pub fn attributes(&self, path: &GroupPath) -> &[Attribute] {
        self.nodes.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    fn insert(&mut self, path: GroupPath, attributes: Vec<Attribute>) {
        self.nodes.entry(path).or_insert(attributes);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupPath, &[Attribute])> {
        self.nodes.iter().map(|(path, attributes)| (path, attributes.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// All data extracted by one call to [`extract`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    source_path: PathBuf,
    format: SourceFormat,
    groups: GroupTree,
    variables: Vec<ExtractedVariable>,
}

impl ExtractionResult {
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn groups(&self) -> &GroupTree {
        &self.groups
    }

    /// Global attributes of the source file.
    pub fn global_attributes(&self) -> &[Attribute] {
        self.groups.attributes(&GroupPath::root())
    }

    /// Variables in selection order.
    pub fn variables(&self) -> &[ExtractedVariable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&ExtractedVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn into_variables(self) -> Vec<ExtractedVariable> {
        self.variables
    }

    /// Serializes the result; see [`crate::netcdf_io::write`].
    pub fn write(self, spec: &OutputSpec) -> Result<PathBuf> {
        crate::netcdf_io::write(self, spec)
    }
}

/// Reads the selected variables of `source_path` into memory.
///
/// # Errors
///
/// - `FileAccess` / `Format` if the source cannot be opened
/// - `VariableNotFound` naming the first selected path that does not exist;
///   in that case no variable data has been read
pub fn extract(
    source_path: impl AsRef<Path>,
    selection: &VariableSelection,
) -> Result<ExtractionResult> {
    let source = open_source(source_path.as_ref())?;
    extract_from(source.as_ref(), selection)
}

/// Same as [`extract`] on an already opened source.
pub fn extract_from(
    source: &dyn DataSource,
    selection: &VariableSelection,
) -> Result<ExtractionResult> {
    if let Some(missing) = selection.iter().find(|entry| !source.contains(&entry.source)) {
        return Err(SubsetError::variable_not_found(missing.source.to_string()));
    }
    debug!(
        path = %source.path().display(),
        count = selection.len(),
        "selection resolved"
    );

    let mut groups = GroupTree::new(source.group_attributes(&GroupPath::root())?);
    let mut variables = Vec::with_capacity(selection.len());

    for entry in selection {
        for group in entry.source.group().lineage().into_iter().skip(1) {
            if !groups.contains(&group) {
                let attributes = source.group_attributes(&group)?;
                groups.insert(group, attributes);
            }
        }
        let contents = source.read_variable(&entry.source)?;
        variables.push(ExtractedVariable::new(entry, contents));
    }

    info!(
        path = %source.path().display(),
        variables = variables.len(),
        groups = groups.len(),
        "extracted variables"
    );

    Ok(ExtractionResult {
        source_path: source.path().to_path_buf(),
        format: source.format(),
        groups,
        variables,
    })
}

/// Extracts and writes in one call, returning the output path.
///
/// The output options are validated before the source is opened.
pub fn extract_and_write(
    source_path: impl AsRef<Path>,
    selection: &VariableSelection,
    spec: &OutputSpec,
) -> Result<PathBuf> {
    spec.validate()?;
    extract(source_path, selection)?.write(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_tree_keeps_first_attributes_per_group() {
        let mut tree = GroupTree::new(vec![("title".to_string(), AttrValue::from("t"))]);
        let support = GroupPath::parse("PRODUCT/SUPPORT_DATA").unwrap();
        tree.insert(GroupPath::parse("PRODUCT").unwrap(), Vec::new());
        tree.insert(support.clone(), vec![("k".to_string(), AttrValue::Int(1))]);
        tree.insert(support.clone(), Vec::new());

        assert_eq!(tree.attributes(&support).len(), 1);
        assert_eq!(tree.attributes(&GroupPath::root()).len(), 1);
        assert!(tree.attributes(&GroupPath::parse("missing").unwrap()).is_empty());
        assert_eq!(tree.len(), 3);
    }
}
