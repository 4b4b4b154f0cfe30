pub mod bits;
pub mod format;
pub mod gradient;
pub mod model;
pub mod region;

pub use bits::{BitsImage, PixelBuffer};
pub use format::{Indexed, PixelFormat};
pub use gradient::{
    Circle, Color, ConicalGradient, Gradient, GradientOptions, GradientStop, LinearGradient,
    RadialGradient,
};
pub use model::{AlphaMap, Filter, Image, ImageHeader, ImageKind, ImageRef, Repeat, SourceClass};
pub use region::Region;
