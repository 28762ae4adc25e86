pub mod c_data;
pub mod collision;
pub mod insertable;
pub mod io;
pub mod special;
pub mod surface;
pub mod types;
pub mod water_box;

extern crate bytes;
extern crate col_derive;
