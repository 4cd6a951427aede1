pub mod age;
pub mod entity;
pub mod physics;
pub mod shift;
