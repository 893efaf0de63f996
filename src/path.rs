//! Group-qualified paths inside a hierarchical array file
//!
//! Paths are slash-delimited (`PRODUCT/SUPPORT_DATA/GEOLOCATIONS/solar_zenith_angle`).
//! Leading and trailing slashes are ignored and empty components are rejected.

use crate::errors::{Result, SubsetError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest name the NetCDF library accepts for a group or variable, in bytes
pub const MAX_NAME_LEN: usize = 256;

/// Whether `name` can be looked up in a NetCDF file at all.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_NAME_LEN && !name.contains('\0')
}

/// Last `/` component of a slash-delimited name, ignoring outer slashes.
pub fn leaf_name(name: &str) -> &str {
    let trimmed = name.trim_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Location of a group; the empty path is the root group.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupPath {
    components: Vec<String>,
}

impl GroupPath {
    /// The root group.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-delimited group path. `""` and `"/"` both denote the root.
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        Ok(Self {
            components: split_components(trimmed, path)?,
        })
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Last component, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// Child group of this one.
    pub fn join(&self, name: &str) -> Self {
        let mut components = self.components.clone();
        components.push(name.to_string());
        Self { components }
    }

    /// Every group from the root down to and including this one.
    pub fn lineage(&self) -> Vec<GroupPath> {
        (0..=self.components.len())
            .map(|depth| GroupPath {
                components: self.components[..depth].to_vec(),
            })
            .collect()
    }
}

impl fmt::Display for GroupPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.components.join("/"))
        }
    }
}

/// Full path of one variable: its group plus its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VariablePath {
    group: GroupPath,
    name: String,
}

impl VariablePath {
    /// Parse a slash-delimited variable path.
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Err(SubsetError::configuration(format!(
                "'{}' is not a variable path",
                path
            )));
        }
        let mut components = split_components(trimmed, path)?;
        // split_components never returns an empty vector for non-empty input
        let name = components.pop().unwrap_or_default();
        Ok(Self {
            group: GroupPath { components },
            name,
        })
    }

    /// Whether every component can be passed to the NetCDF library.
    pub(crate) fn has_valid_names(&self) -> bool {
        self.group.components.iter().all(|c| is_valid_name(c)) && is_valid_name(&self.name)
    }

    /// Variable directly inside `group`.
    pub fn new(group: GroupPath, name: impl Into<String>) -> Self {
        Self {
            group,
            name: name.into(),
        }
    }

    pub fn group(&self) -> &GroupPath {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for VariablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_root() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.group, self.name)
        }
    }
}

impl FromStr for VariablePath {
    type Err = SubsetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VariablePath {
    type Error = SubsetError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<VariablePath> for String {
    fn from(path: VariablePath) -> Self {
        path.to_string()
    }
}

fn split_components(trimmed: &str, original: &str) -> Result<Vec<String>> {
    trimmed
        .split('/')
        .map(|component| {
            if component.is_empty() {
                Err(SubsetError::configuration(format!(
                    "Path '{}' contains an empty component",
                    original
                )))
            } else if component.len() > MAX_NAME_LEN {
                Err(SubsetError::configuration(format!(
                    "Path '{}' has a component longer than {} bytes",
                    original.escape_debug(),
                    MAX_NAME_LEN
                )))
            } else if component.contains('\0') {
                Err(SubsetError::configuration(format!(
                    "Path '{}' contains a NUL byte",
                    original.escape_debug()
                )))
            } else {
                Ok(component.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_variable_path() {
        let path = VariablePath::parse("/PRODUCT/SUPPORT_DATA/surface_altitude").unwrap();
        assert_eq!(path.name(), "surface_altitude");
        assert_eq!(path.group().components(), ["PRODUCT", "SUPPORT_DATA"]);
        assert_eq!(path.to_string(), "PRODUCT/SUPPORT_DATA/surface_altitude");
    }

    #[test]
    fn root_variable_has_root_group() {
        let path = VariablePath::parse("time").unwrap();
        assert!(path.group().is_root());
        assert_eq!(path.to_string(), "time");
    }

    #[test]
    fn rejects_empty_and_double_slash_paths() {
        assert!(VariablePath::parse("").is_err());
        assert!(VariablePath::parse("/").is_err());
        assert!(matches!(
            VariablePath::parse("PRODUCT//latitude"),
            Err(SubsetError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_names_the_library_cannot_hold() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            VariablePath::parse(&long),
            Err(SubsetError::Configuration(_))
        ));
        assert!(matches!(
            VariablePath::parse(&format!("PRODUCT/{}/latitude", long)),
            Err(SubsetError::Configuration(_))
        ));
        assert!(matches!(
            VariablePath::parse("PRODUCT/lat\0x"),
            Err(SubsetError::Configuration(_))
        ));
        assert!(GroupPath::parse("a\0b").is_err());

        let longest = "x".repeat(MAX_NAME_LEN);
        assert!(VariablePath::parse(&longest).unwrap().has_valid_names());
        assert!(!VariablePath::new(GroupPath::root(), long).has_valid_names());
    }

    #[test]
    fn leaf_name_takes_last_component() {
        assert_eq!(leaf_name("PRODUCT/latitude"), "latitude");
        assert_eq!(leaf_name("/no2/"), "no2");
        assert_eq!(leaf_name("time"), "time");
    }

    #[test]
    fn lineage_walks_from_root() {
        let group = GroupPath::parse("a/b").unwrap();
        let lineage: Vec<String> = group.lineage().iter().map(|g| g.to_string()).collect();
        assert_eq!(lineage, ["/", "a", "a/b"]);
    }
}
