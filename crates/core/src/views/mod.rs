pub mod grid;
pub mod minimap;
pub mod scale_bar;
