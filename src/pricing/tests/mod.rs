mod common;
mod distribution;
mod engine;
mod solver;
