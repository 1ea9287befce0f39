pub mod city;
pub mod units;
pub mod view;

pub use city::CitySize;
pub use units::{Unit, UNITS};
pub use view::{ViewState, ZoomBounds};
