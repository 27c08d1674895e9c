//! Slide property map and standard property names.

use std::collections::HashMap;

use tracing::warn;

/// Mapping from property name to string value, owned by the caller.
pub type PropertyMap = HashMap<String, String>;

/// Vendor that produced the slide
pub const PROPERTY_NAME_VENDOR: &str = "vendor";

/// Objective power of the scan, as an integer
pub const PROPERTY_NAME_OBJECTIVE_POWER: &str = "objective-power";

/// Microns per pixel along X
pub const PROPERTY_NAME_MPP_X: &str = "mpp-x";

/// Microns per pixel along Y
pub const PROPERTY_NAME_MPP_Y: &str = "mpp-y";

/// Copy `source` to `target` if its value parses as an integer.
///
/// Leading whitespace is skipped and the copy is re-formatted canonically
/// (`" +20"` becomes `"20"`). Returns whether a value was written.
pub fn duplicate_int_property(properties: &mut PropertyMap, source: &str, target: &str) -> bool {
    let Some(value) = properties.get(source) else {
        return false;
    };

    match value.trim_start().parse::<i64>() {
        Ok(parsed) => {
            properties.insert(target.to_string(), parsed.to_string());
            true
        }
        Err(_) => {
            warn!("{} is not an integer: {:?}", source, value);
            false
        }
    }
}

/// Copy `source` to `target` if its value parses as a finite float.
pub fn duplicate_double_property(properties: &mut PropertyMap, source: &str, target: &str) -> bool {
    let Some(value) = properties.get(source) else {
        return false;
    };

    match value.trim_start().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => {
            properties.insert(target.to_string(), parsed.to_string());
            true
        }
        _ => {
            warn!("{} is not a number: {:?}", source, value);
            false
        }
    }
}
