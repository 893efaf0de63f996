//! Synthetic orbit files shaped like a TROPOMI L2 product
#![allow(dead_code)]

use netcdf::{create, create_with, Options};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SCANLINES: usize = 120;
pub const GROUND_PIXELS: usize = 80;
pub const FILL: f32 = 9.96921e36;

/// Every variable path in the fixture, in listing order.
pub const ALL_PATHS: &[&str] = &[
    "orbit",
    "time",
    "PRODUCT/latitude",
    "PRODUCT/longitude",
    "PRODUCT/nitrogendioxide_tropospheric_column",
    "PRODUCT/qa_value",
    "PRODUCT/SUPPORT_DATA/processing_mode",
    "PRODUCT/SUPPORT_DATA/GEOLOCATIONS/latitude",
    "PRODUCT/SUPPORT_DATA/GEOLOCATIONS/solar_zenith_angle",
];

fn grid(f: impl Fn(usize, usize) -> f32) -> Vec<f32> {
    let mut values = Vec::with_capacity(SCANLINES * GROUND_PIXELS);
    for i in 0..SCANLINES {
        for j in 0..GROUND_PIXELS {
            values.push(f(i, j));
        }
    }
    values
}

/// Values of the `PRODUCT/SUPPORT_DATA/processing_mode` string variable.
pub const PROCESSING_MODES: [&str; 2] = ["near-real-time", "offline"];

pub fn latitudes() -> Vec<f32> {
    grid(|i, j| -60.0 + i as f32 * 0.5 + j as f32 * 0.01)
}

pub fn longitudes() -> Vec<f32> {
    grid(|i, j| 10.0 + j as f32 * 0.25 - i as f32 * 0.01)
}

pub fn no2_column() -> Vec<f32> {
    grid(|i, j| if (i + j) % 17 == 0 { FILL } else { ((i % 5) as f32) * 1.0e-5 })
}

/// Writes the fixture orbit file to `path`.
pub fn create_orbit_file(path: &Path) {
    let mut file = create(path).expect("Failed to create NetCDF file");

    file.add_attribute("title", "Synthetic NO2 orbit")
        .expect("Failed to add title");
    file.add_attribute("history", "2024-05-01T00:00:00Z: L2 processing")
        .expect("Failed to add history");

    file.add_dimension("time", 3).expect("Failed to add time");
    {
        let mut time = file
            .add_variable::<f64>("time", &["time"])
            .expect("Failed to add time variable");
        time.put_attribute("units", "seconds since 2010-01-01")
            .expect("Failed to add units");
        time.put_values(&[0.0f64, 1.0, 2.0], ..)
            .expect("Failed to write time");
    }
    {
        let mut orbit = file
            .add_variable::<i32>("orbit", &[])
            .expect("Failed to add orbit variable");
        orbit.put_values(&[33512i32], ..).expect("Failed to write orbit");
    }

    let mut product = file.add_group("PRODUCT").expect("Failed to add PRODUCT");
    product
        .add_attribute("processing_level", "L2")
        .expect("Failed to add group attribute");
    product
        .add_dimension("scanline", SCANLINES)
        .expect("Failed to add scanline");
    product
        .add_dimension("ground_pixel", GROUND_PIXELS)
        .expect("Failed to add ground_pixel");

    let dims = ["scanline", "ground_pixel"];
    {
        let mut var = product
            .add_variable::<f32>("latitude", &dims)
            .expect("Failed to add latitude");
        var.put_attribute("units", "degrees_north").unwrap();
        var.put_attribute("valid_min", -90.0f32).unwrap();
        var.put_values(&latitudes(), ..).unwrap();
    }
    {
        let mut var = product
            .add_variable::<f32>("longitude", &dims)
            .expect("Failed to add longitude");
        var.put_attribute("units", "degrees_east").unwrap();
        var.put_values(&longitudes(), ..).unwrap();
    }
    {
        let mut var = product
            .add_variable::<f32>("nitrogendioxide_tropospheric_column", &dims)
            .expect("Failed to add no2 column");
        var.put_attribute("_FillValue", FILL).unwrap();
        var.put_attribute("units", "mol m-2").unwrap();
        var.put_attribute("multiplication_factor_to_convert_to_molecules_percm2", 6.02214e19f32)
            .unwrap();
        var.put_values(&no2_column(), ..).unwrap();
    }
    {
        let mut var = product
            .add_variable::<u8>("qa_value", &dims)
            .expect("Failed to add qa_value");
        var.put_attribute("scale_factor", 0.01f32).unwrap();
        let qa: Vec<u8> = (0..SCANLINES * GROUND_PIXELS).map(|k| (k % 101) as u8).collect();
        var.put_values(&qa, ..).unwrap();
    }

    let mut support = product
        .add_group("SUPPORT_DATA")
        .expect("Failed to add SUPPORT_DATA");
    support.add_dimension("mode", PROCESSING_MODES.len()).unwrap();
    {
        let mut var = support
            .add_string_variable("processing_mode", &["mode"])
            .expect("Failed to add processing_mode");
        var.put_attribute("long_name", "processor mode").unwrap();
        for (i, mode) in PROCESSING_MODES.iter().enumerate() {
            var.put_string(mode, [i]).unwrap();
        }
    }
    let mut geolocations = support
        .add_group("GEOLOCATIONS")
        .expect("Failed to add GEOLOCATIONS");
    geolocations
        .add_attribute("description", "pixel geolocation")
        .unwrap();
    geolocations.add_dimension("scanline", SCANLINES).unwrap();
    geolocations.add_dimension("ground_pixel", GROUND_PIXELS).unwrap();
    {
        let mut var = geolocations
            .add_variable::<f32>("latitude", &dims)
            .expect("Failed to add geolocation latitude");
        var.put_values(&grid(|i, _| i as f32), ..).unwrap();
    }
    {
        let mut var = geolocations
            .add_variable::<f32>("solar_zenith_angle", &dims)
            .expect("Failed to add solar_zenith_angle");
        var.put_attribute("units", "degree").unwrap();
        var.put_values(&grid(|i, j| 20.0 + (i + j) as f32 * 0.1), ..)
            .unwrap();
    }
}

/// Temp directory holding one fixture file named `orbit.nc`.
pub fn orbit_fixture() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("orbit.nc");
    create_orbit_file(&path);
    (dir, path)
}

/// Root variables of the classic-format fixture, in listing order.
pub const CLASSIC_PATHS: &[&str] = &["latitude", "longitude", "qa_value"];

/// Writes a group-less fixture in a pre-NetCDF-4 format (`Options::CLASSIC`
/// for CDF-1, `Options::_64BIT_OFFSET` for CDF-2).
///
/// Classic files have an explicit define mode, so everything is declared
/// before `enddef` and filled afterwards.
pub fn create_classic_file(path: &Path, options: Options) {
    let mut file = create_with(path, options).expect("Failed to create classic file");
    file.add_attribute("title", "Synthetic classic orbit").unwrap();
    file.add_dimension("scanline", SCANLINES).unwrap();
    file.add_dimension("ground_pixel", GROUND_PIXELS).unwrap();

    let dims = ["scanline", "ground_pixel"];
    {
        let mut var = file.add_variable::<f32>("latitude", &dims).unwrap();
        var.put_attribute("_FillValue", FILL).unwrap();
        var.put_attribute("units", "degrees_north").unwrap();
    }
    file.add_variable::<f32>("longitude", &dims).unwrap();
    file.add_variable::<i16>("qa_value", &dims).unwrap();
    file.enddef().expect("Failed to leave define mode");

    file.variable_mut("latitude")
        .unwrap()
        .put_values(&latitudes(), ..)
        .unwrap();
    file.variable_mut("longitude")
        .unwrap()
        .put_values(&longitudes(), ..)
        .unwrap();
    let qa: Vec<i16> = (0..SCANLINES * GROUND_PIXELS).map(|k| (k % 101) as i16).collect();
    file.variable_mut("qa_value")
        .unwrap()
        .put_values(&qa, ..)
        .unwrap();
}
