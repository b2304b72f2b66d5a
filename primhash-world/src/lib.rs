pub mod check;
pub mod command;
pub mod config;
pub mod draw;
pub mod octree;
pub mod primitive;
pub mod stats;
pub mod trace;
pub mod visibility;

#[cfg(test)]
mod test_util;
