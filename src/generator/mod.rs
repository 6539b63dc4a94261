pub mod assembler;
pub mod broker;
pub mod context;
pub mod outlet;
pub mod persona;
pub mod workflow;
pub mod writer;
