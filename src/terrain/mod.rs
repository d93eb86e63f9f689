pub mod block;
pub mod chunk;
pub mod lighting;
pub mod position_types;
pub mod provider;
pub mod temporary_generation;
