pub mod builder;
pub mod export;
pub mod objects;
pub mod scene;
pub mod settings;
pub mod transform;

extern crate cgmath;
extern crate col;
