pub mod ecosystem;
