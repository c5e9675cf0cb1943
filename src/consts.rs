// Floating point comparisons and surface offsets
pub const FEQ_EPSILON: f64 = 0.0001;

// Recursion budget for reflected and refracted rays
pub const DEFAULT_RECURSION_DEPTH: usize = 5;

// Common refraction indices
pub const VACUUM_RI: f64 = 1.0;
pub const AIR_RI: f64 = 1.00029;
pub const WATER_RI: f64 = 1.333;
pub const GLASS_RI: f64 = 1.5;
pub const DIAMOND_RI: f64 = 2.417;

// Canvas output
pub const PPM_MAX_VALUE: usize = 255;
pub const PPM_LINE_WIDTH: usize = 70;
pub const DEFAULT_OUT_FILE: &str = "out.ppm";
