pub mod assemble;
pub mod calibrate;
pub mod dither;
pub mod grid;
pub mod presets;
pub mod raster;
pub mod surface;
