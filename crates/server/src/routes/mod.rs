pub mod analysis;
pub mod data;
pub mod games;
pub mod health;
pub mod positions;
