pub mod blinding;
pub mod consts;
pub mod error;
pub mod filters;
pub mod interaction;
pub mod io;
pub mod measure;
pub mod pipeline;
pub mod raster;
pub mod region;
pub mod revision;
pub mod segmentation;
