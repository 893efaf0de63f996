//! Writing extraction results to new NetCDF-4 files
//!
//! Writing happens in two steps. The layout is planned in memory first, which
//! is where name collisions are detected. Only then is the file created. If
//! anything fails after creation, the partial file is removed.

use crate::errors::{IoFailure, Result, SubsetError};
use crate::extract::{ExtractedVariable, ExtractionResult};
use crate::output::{Compression, Layout, OutputSpec};
use crate::path::GroupPath;
use crate::values::{ArrayData, AttrValue, Attribute};
use chrono::Utc;
use ndarray::Dimension;
use netcdf::{AttributeValue, GroupMut, VariableMut};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const FILL_VALUE: &str = "_FillValue";

/// Serializes an [`ExtractionResult`] according to an [`OutputSpec`]
pub struct NetCDFWriter<'a> {
    spec: &'a OutputSpec,
}

impl<'a> NetCDFWriter<'a> {
    pub fn new(spec: &'a OutputSpec) -> Self {
        Self { spec }
    }

    /// Writes `result` and returns the path of the new file.
    ///
    /// # Errors
    ///
    /// - `Configuration` for invalid compression or output name
    /// - `NameCollision` when two variables (or a variable and a group, or two
    ///   differently sized dimensions) would share a name in one output group
    /// - `Write` when the directory or file cannot be created or written
    pub fn write(&self, result: ExtractionResult) -> Result<PathBuf> {
        self.spec.validate()?;
        let plan = PlannedGroup::plan(&result, self.spec.layout)?;
        let output_path = self.spec.output_path(result.source_path());

        fs::create_dir_all(&self.spec.output_dir)
            .map_err(|e| SubsetError::write(&self.spec.output_dir, e))?;

        // an existing output is only replaced once the new file is complete
        let staging = staging_path(&output_path);
        if let Err(source) = self.write_file(&staging, &plan) {
            remove_partial(&staging);
            return Err(SubsetError::write(&output_path, source));
        }
        if let Err(e) = fs::rename(&staging, &output_path) {
            remove_partial(&staging);
            return Err(SubsetError::write(&output_path, e));
        }

        info!(
            output = %output_path.display(),
            variables = result.variables().len(),
            layout = ?self.spec.layout,
            compression = ?self.spec.compression.map(|c| c.scheme),
            "wrote subset"
        );
        Ok(output_path)
    }

    fn write_file(&self, path: &Path, plan: &PlannedGroup<'_>) -> std::result::Result<(), IoFailure> {
        let mut file = netcdf::create(path)?;
        {
            let mut root = file
                .root_mut()
                .ok_or("created file has no root group")?;
            write_group(&mut root, plan, self.spec.compression.as_ref())?;
        }
        // HDF5 flushes on close; dropping the handle would hide those errors
        file.close()?;
        Ok(())
    }
}

/// Writes `result` as described by `spec`; see [`NetCDFWriter::write`].
pub fn write(result: ExtractionResult, spec: &OutputSpec) -> Result<PathBuf> {
    NetCDFWriter::new(spec).write(result)
}

struct PlannedVariable<'r> {
    name: &'r str,
    variable: &'r ExtractedVariable,
}

/// In-memory image of one output group
struct PlannedGroup<'r> {
    attributes: Vec<Attribute>,
    dimensions: Vec<(String, usize)>,
    variables: Vec<PlannedVariable<'r>>,
    children: BTreeMap<String, PlannedGroup<'r>>,
}

impl<'r> PlannedGroup<'r> {
    fn new(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            dimensions: Vec::new(),
            variables: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    fn plan(result: &'r ExtractionResult, layout: Layout) -> Result<Self> {
        let mut root = Self::new(with_history(result.global_attributes(), result.source_path()));

        for variable in result.variables() {
            let target = match layout {
                Layout::Hierarchical => variable.source.group().clone(),
                Layout::Flat => GroupPath::root(),
            };
            root.descend(&target, result)
                .add_variable(variable, &target)?;
        }

        root.check_group_names(&GroupPath::root())?;
        Ok(root)
    }

    fn descend(&mut self, target: &GroupPath, result: &'r ExtractionResult) -> &mut Self {
        let mut node = self;
        let mut path = GroupPath::root();
        for component in target.components() {
            path = path.join(component);
            node = node
                .children
                .entry(component.clone())
                .or_insert_with(|| Self::new(result.groups().attributes(&path).to_vec()));
        }
        node
    }

    fn add_variable(&mut self, variable: &'r ExtractedVariable, group: &GroupPath) -> Result<()> {
        let name = variable.output_leaf();
        if self.variables.iter().any(|planned| planned.name == name) {
            return Err(SubsetError::name_collision(name, group.to_string()));
        }

        for dim in &variable.dimensions {
            match self.dimensions.iter().find(|(existing, _)| *existing == dim.name) {
                Some((_, length)) if *length != dim.length => {
                    return Err(SubsetError::name_collision(&dim.name, group.to_string()));
                }
                Some(_) => {}
                None => self.dimensions.push((dim.name.clone(), dim.length)),
            }
        }

        self.variables.push(PlannedVariable { name, variable });
        Ok(())
    }

    fn check_group_names(&self, path: &GroupPath) -> Result<()> {
        for (name, child) in &self.children {
            if self.variables.iter().any(|planned| planned.name == name.as_str()) {
                return Err(SubsetError::name_collision(name, path.to_string()));
            }
            child.check_group_names(&path.join(name))?;
        }
        Ok(())
    }
}

fn with_history(global: &[Attribute], source: &Path) -> Vec<Attribute> {
    let source_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string());
    let line = format!(
        "{}: variable subset of {} created by ncsubset",
        Utc::now().to_rfc3339(),
        source_name
    );

    let mut attributes = global.to_vec();
    match attributes.iter_mut().find(|(name, _)| name == "history") {
        Some((_, AttrValue::Str(previous))) => *previous = format!("{}\n{}", line, previous),
        Some((_, other)) => *other = AttrValue::Str(line),
        None => attributes.push(("history".to_string(), AttrValue::Str(line))),
    }
    attributes
}

fn write_group(
    group: &mut GroupMut<'_>,
    planned: &PlannedGroup<'_>,
    compression: Option<&Compression>,
) -> std::result::Result<(), IoFailure> {
    for (name, value) in &planned.attributes {
        group.add_attribute(name, AttributeValue::from(value.clone()))?;
    }
    for (name, length) in &planned.dimensions {
        group.add_dimension(name, *length)?;
    }
    for variable in &planned.variables {
        write_variable(group, variable, compression)?;
    }
    for (name, child) in &planned.children {
        let mut child_group = group.add_group(name)?;
        write_group(&mut child_group, child, compression)?;
    }
    Ok(())
}

fn write_variable(
    group: &mut GroupMut<'_>,
    planned: &PlannedVariable<'_>,
    compression: Option<&Compression>,
) -> std::result::Result<(), IoFailure> {
    let variable = planned.variable;
    let dims: Vec<&str> = variable.dimensions.iter().map(|d| d.name.as_str()).collect();
    debug!(
        name = planned.name,
        source = %variable.source,
        dtype = variable.data.dtype(),
        "writing variable"
    );

    macro_rules! put_numeric {
        ($ty:ty, $array:expr) => {{
            let mut var = group.add_variable::<$ty>(planned.name, &dims)?;
            prepare_variable(&mut var, variable, compression)?;
            let data = $array.as_standard_layout();
            let values = data.as_slice().ok_or("array data is not contiguous")?;
            var.put_values(values, ..)?;
        }};
    }

    match &variable.data {
        ArrayData::I8(a) => put_numeric!(i8, a),
        ArrayData::U8(a) => put_numeric!(u8, a),
        ArrayData::I16(a) => put_numeric!(i16, a),
        ArrayData::U16(a) => put_numeric!(u16, a),
        ArrayData::I32(a) => put_numeric!(i32, a),
        ArrayData::U32(a) => put_numeric!(u32, a),
        ArrayData::I64(a) => put_numeric!(i64, a),
        ArrayData::U64(a) => put_numeric!(u64, a),
        ArrayData::F32(a) => put_numeric!(f32, a),
        ArrayData::F64(a) => put_numeric!(f64, a),
        ArrayData::Str(a) => {
            let mut var = group.add_string_variable(planned.name, &dims)?;
            prepare_variable(&mut var, variable, None)?;
            for (index, value) in a.indexed_iter() {
                var.put_string(value, index.slice())?;
            }
        }
    }
    Ok(())
}

/// Compression and attributes must be set before any data is written;
/// `_FillValue` goes first.
fn prepare_variable(
    var: &mut VariableMut<'_>,
    variable: &ExtractedVariable,
    compression: Option<&Compression>,
) -> std::result::Result<(), IoFailure> {
    if let Some(compression) = compression {
        if !variable.dimensions.is_empty() {
            var.set_compression(i32::from(compression.level), compression.shuffle)?;
        }
    }

    let (fill, rest): (Vec<&Attribute>, Vec<&Attribute>) = variable
        .attributes
        .iter()
        .partition(|(name, _)| name == FILL_VALUE);

    for (name, value) in fill.into_iter().chain(rest) {
        if name == FILL_VALUE && variable.data.is_string() {
            warn!(variable = %variable.source, "skipping _FillValue on string variable");
            continue;
        }
        var.put_attribute(name, AttributeValue::from(value.clone()))?;
    }
    Ok(())
}

/// Hidden sibling of `output` that the file is written to before being renamed.
fn staging_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!(".{}.partial", name))
}

fn remove_partial(path: &Path) {
    if path.exists() {
        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "removed partial output"),
            Err(e) => warn!(path = %path.display(), error = %e, "could not remove partial output"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::DimensionInfo;
    use crate::path::VariablePath;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn string_variables_skip_fill_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strings.nc");
        let variable = ExtractedVariable {
            name: "mode".to_string(),
            source: VariablePath::parse("PRODUCT/mode").unwrap(),
            data: ArrayData::Str(ArrayD::from_elem(IxDyn(&[1]), "offline".to_string())),
            dimensions: vec![DimensionInfo {
                name: "mode".to_string(),
                length: 1,
                is_unlimited: false,
            }],
            attributes: vec![
                (FILL_VALUE.to_string(), AttrValue::from("")),
                ("long_name".to_string(), AttrValue::from("processor mode")),
            ],
        };

        {
            let mut file = netcdf::create(&path).unwrap();
            file.add_dimension("mode", 1).unwrap();
            let mut var = file.add_string_variable("mode", &["mode"]).unwrap();
            prepare_variable(&mut var, &variable, None).unwrap();
            var.put_string("offline", [0usize]).unwrap();
            file.close().unwrap();
        }

        let file = netcdf::open(&path).unwrap();
        let var = file.variable("mode").unwrap();
        assert!(var.attribute(FILL_VALUE).is_none());
        assert!(var.attribute("long_name").is_some());
    }

    #[test]
    fn staging_file_sits_next_to_output() {
        let staging = staging_path(Path::new("/data/out/orbit_SUB.nc"));
        assert_eq!(staging, Path::new("/data/out/.orbit_SUB.nc.partial"));
    }
}
