pub mod discover;
pub mod image_io;
pub mod table_io;

pub use discover::discover_images;
pub use image_io::{load_multichannel, FsImageSource, ImageSource};
pub use table_io::{DelimitedTableSink, TableSink};
