mod catalog;
mod resolver;

pub use resolver::{list_models, resolve};
