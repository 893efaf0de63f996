//! Reading variables, dimensions and attributes out of NetCDF files

use crate::data_source::{DataSource, SourceFormat, VariableContents};
use crate::errors::{Result, SubsetError};
use crate::metadata::{DimensionInfo, VariableMetadata};
use crate::path::{GroupPath, VariablePath};
use crate::values::{ArrayData, AttrValue, Attribute};
use ndarray::{ArrayD, Dimension, IxDyn};
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::{File, Group, Variable};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A NetCDF (classic or NetCDF-4) file opened read-only
pub struct NetCDFSource {
    path: PathBuf,
    format: SourceFormat,
    file: File,
}

impl fmt::Debug for NetCDFSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetCDFSource")
            .field("path", &self.path)
            .field("format", &self.format)
            .finish()
    }
}

impl NetCDFSource {
    /// Opens `path`, which has already been sniffed as `format`.
    pub fn open(path: &Path, format: SourceFormat) -> Result<Self> {
        let file = netcdf::open(path).map_err(|e| SubsetError::format(path, e.to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
            format,
            file,
        })
    }

    fn lookup(&self, variable: &VariablePath) -> Result<Variable<'_>> {
        // classic files answer every group lookup with the root group
        let reachable = variable.has_valid_names()
            && (self.format.supports_groups() || variable.group().is_root());
        if !reachable {
            return Err(SubsetError::variable_not_found(variable.to_string()));
        }
        self.file
            .variable(&variable.to_string())
            .ok_or_else(|| SubsetError::variable_not_found(variable.to_string()))
    }

    fn read_attributes<'a>(
        &self,
        attributes: impl Iterator<Item = netcdf::Attribute<'a>>,
    ) -> Result<Vec<Attribute>> {
        attributes
            .map(|attr| {
                let value = attr
                    .value()
                    .map_err(|e| SubsetError::file_access(&self.path, e))?;
                Ok((attr.name().to_string(), AttrValue::from(value)))
            })
            .collect()
    }

    fn read_array(&self, variable: &VariablePath, var: &Variable<'_>, shape: &[usize]) -> Result<ArrayData> {
        macro_rules! numeric {
            ($variant:ident, $ty:ty) => {{
                let values: Vec<$ty> = var
                    .get_values(..)
                    .map_err(|e| SubsetError::file_access(&self.path, e))?;
                ArrayData::$variant(self.shaped(shape, values)?)
            }};
        }

        let data = match var.vartype() {
            NcVariableType::Int(IntType::I8) => numeric!(I8, i8),
            NcVariableType::Int(IntType::U8) => numeric!(U8, u8),
            NcVariableType::Int(IntType::I16) => numeric!(I16, i16),
            NcVariableType::Int(IntType::U16) => numeric!(U16, u16),
            NcVariableType::Int(IntType::I32) => numeric!(I32, i32),
            NcVariableType::Int(IntType::U32) => numeric!(U32, u32),
            NcVariableType::Int(IntType::I64) => numeric!(I64, i64),
            NcVariableType::Int(IntType::U64) => numeric!(U64, u64),
            NcVariableType::Float(FloatType::F32) => numeric!(F32, f32),
            NcVariableType::Float(FloatType::F64) => numeric!(F64, f64),
            NcVariableType::String => {
                let mut values = Vec::with_capacity(shape.iter().product());
                for index in ndarray::indices(IxDyn(shape)) {
                    let value = var
                        .get_string(index.slice())
                        .map_err(|e| SubsetError::file_access(&self.path, e))?;
                    values.push(value);
                }
                ArrayData::Str(self.shaped(shape, values)?)
            }
            other => {
                return Err(SubsetError::format(
                    &self.path,
                    format!("variable '{}' has unsupported type {:?}", variable, other),
                ))
            }
        };
        Ok(data)
    }

    fn shaped<T>(&self, shape: &[usize], values: Vec<T>) -> Result<ArrayD<T>> {
        ArrayD::from_shape_vec(IxDyn(shape), values)
            .map_err(|e| SubsetError::format(&self.path, format!("invalid shape/data size: {}", e)))
    }
}

impl DataSource for NetCDFSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> SourceFormat {
        self.format
    }

    fn list_variables(&self) -> Result<Vec<VariablePath>> {
        let root = GroupPath::root();
        let mut paths = sorted_names(self.file.variables().map(|v| v.name()))
            .into_iter()
            .map(|name| VariablePath::new(root.clone(), name))
            .collect::<Vec<_>>();

        if self.format.supports_groups() {
            let mut groups: Vec<Group<'_>> = self
                .file
                .groups()
                .map_err(|e| SubsetError::format(&self.path, e.to_string()))?
                .collect();
            groups.sort_by_key(|g| g.name());
            for group in &groups {
                collect_group(group, &root.join(&group.name()), &mut paths);
            }
        }

        Ok(paths)
    }

    fn contains(&self, variable: &VariablePath) -> bool {
        self.lookup(variable).is_ok()
    }

    fn describe_variable(&self, variable: &VariablePath) -> Result<VariableMetadata> {
        let var = self.lookup(variable)?;
        let dimensions = dimensions_of(&var);
        let (data_type, element_size) = element_type(&var.vartype());
        let total_elements: usize = dimensions.iter().map(|d| d.length).product();

        Ok(VariableMetadata {
            path: variable.clone(),
            data_type,
            attribute_names: var.attributes().map(|a| a.name().to_string()).collect(),
            total_elements,
            estimated_size_bytes: total_elements * element_size,
            dimensions,
        })
    }

    fn read_variable(&self, variable: &VariablePath) -> Result<VariableContents> {
        let var = self.lookup(variable)?;
        let dimensions = dimensions_of(&var);
        let shape: Vec<usize> = dimensions.iter().map(|d| d.length).collect();
        let attributes = self.read_attributes(var.attributes())?;
        let data = self.read_array(variable, &var, &shape)?;

        debug!(
            variable = %variable,
            dtype = data.dtype(),
            ?shape,
            attributes = attributes.len(),
            "read variable"
        );

        Ok(VariableContents {
            data,
            dimensions,
            attributes,
        })
    }

    fn group_attributes(&self, group: &GroupPath) -> Result<Vec<Attribute>> {
        if group.is_root() {
            return self.read_attributes(self.file.attributes());
        }
        if !self.format.supports_groups() {
            return Err(SubsetError::format(
                &self.path,
                format!("group '{}' requested from a file without groups", group),
            ));
        }
        let found = self
            .file
            .group(&group.to_string())
            .map_err(|e| SubsetError::format(&self.path, e.to_string()))?
            .ok_or_else(|| SubsetError::format(&self.path, format!("group '{}' not found", group)))?;
        self.read_attributes(found.attributes())
    }
}

fn collect_group(group: &Group<'_>, path: &GroupPath, out: &mut Vec<VariablePath>) {
    for name in sorted_names(group.variables().map(|v| v.name())) {
        out.push(VariablePath::new(path.clone(), name));
    }

    let mut children: Vec<Group<'_>> = group.groups().collect();
    children.sort_by_key(|g| g.name());
    for child in &children {
        collect_group(child, &path.join(&child.name()), out);
    }
}

fn sorted_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut names: Vec<String> = names.collect();
    names.sort();
    names
}

fn dimensions_of(var: &Variable<'_>) -> Vec<DimensionInfo> {
    var.dimensions()
        .iter()
        .map(|d| DimensionInfo {
            name: d.name().to_string(),
            length: d.len(),
            is_unlimited: d.is_unlimited(),
        })
        .collect()
}

fn element_type(vartype: &NcVariableType) -> (String, usize) {
    let (name, size) = match vartype {
        NcVariableType::Int(IntType::I8) => ("i8", 1),
        NcVariableType::Int(IntType::U8) => ("u8", 1),
        NcVariableType::Int(IntType::I16) => ("i16", 2),
        NcVariableType::Int(IntType::U16) => ("u16", 2),
        NcVariableType::Int(IntType::I32) => ("i32", 4),
        NcVariableType::Int(IntType::U32) => ("u32", 4),
        NcVariableType::Int(IntType::I64) => ("i64", 8),
        NcVariableType::Int(IntType::U64) => ("u64", 8),
        NcVariableType::Float(FloatType::F32) => ("f32", 4),
        NcVariableType::Float(FloatType::F64) => ("f64", 8),
        NcVariableType::String => ("string", std::mem::size_of::<usize>()),
        NcVariableType::Char => ("char", 1),
        other => return (format!("{:?}", other).to_lowercase(), 4),
    };
    (name.to_string(), size)
}
