pub mod color;
pub mod edge_map;
pub mod field;
pub mod field_type;
pub mod image;
pub mod point;
pub mod white_balance;

pub use color::Color;
pub use edge_map::EdgeMap;
pub use field::Field;
pub use field_type::{FieldSpec, FieldType, StripLayout};
pub use image::PixelImage;
pub use point::{PixelRect, Point, PointI};
pub use white_balance::{WhiteBalance, WhiteBalanceBounds};
