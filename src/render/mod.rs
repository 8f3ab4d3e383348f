pub mod colormap;
pub mod image;
pub mod live;
