pub mod accumulator;
pub mod pairwise;
pub mod resolvers;
pub mod streaming;
pub mod tree;
