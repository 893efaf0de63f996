//! Ready-made selections for common satellite products

use crate::errors::Result;
use crate::selection::VariableSelection;

/// TROPOMI L2 NO2 fields needed for tropospheric column analysis, including the
/// cloud fields used in the retrieval. Keeping only these cuts file size by
/// roughly 90%.
pub const TROPOMI_NO2_FIELDS: &[&str] = &[
    "PRODUCT/latitude",
    "PRODUCT/longitude",
    "PRODUCT/time_utc",
    "PRODUCT/qa_value",
    "PRODUCT/nitrogendioxide_tropospheric_column",
    "PRODUCT/nitrogendioxide_tropospheric_column_precision",
    "PRODUCT/air_mass_factor_troposphere",
    "PRODUCT/SUPPORT_DATA/GEOLOCATIONS/solar_zenith_angle",
    "PRODUCT/SUPPORT_DATA/GEOLOCATIONS/viewing_zenith_angle",
    "PRODUCT/SUPPORT_DATA/GEOLOCATIONS/latitude_bounds",
    "PRODUCT/SUPPORT_DATA/GEOLOCATIONS/longitude_bounds",
    "PRODUCT/SUPPORT_DATA/DETAILED_RESULTS/cloud_fraction_crb_nitrogendioxide_window",
    "PRODUCT/SUPPORT_DATA/DETAILED_RESULTS/cloud_radiance_fraction_nitrogendioxide_window",
    "PRODUCT/SUPPORT_DATA/INPUT_DATA/surface_altitude",
    "PRODUCT/SUPPORT_DATA/INPUT_DATA/eastward_wind",
    "PRODUCT/SUPPORT_DATA/INPUT_DATA/northward_wind",
    "PRODUCT/SUPPORT_DATA/INPUT_DATA/cloud_fraction_crb",
];

/// Named presets, for lookup from the command line.
pub const PRESETS: &[(&str, &[&str])] = &[("tropomi-no2", TROPOMI_NO2_FIELDS)];

pub fn tropomi_no2() -> Result<VariableSelection> {
    VariableSelection::from_paths(TROPOMI_NO2_FIELDS)
}

/// Selection for a named preset, `None` when the name is unknown.
pub fn by_name(name: &str) -> Option<Result<VariableSelection>> {
    PRESETS
        .iter()
        .find(|(preset, _)| *preset == name)
        .map(|(_, fields)| VariableSelection::from_paths(fields.iter()))
}
