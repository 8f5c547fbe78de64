pub mod cluster;
pub mod election;
