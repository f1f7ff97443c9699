pub mod block;
pub mod config;
pub mod dataset;
pub mod decoder;
pub mod errors;
pub mod parser;
pub mod structs;
pub mod tables;
pub mod verify;

pub use crate::config::ReaderConfig;
pub use crate::dataset::{Attributes, Dataset, Dimensions, Variable, Variables};
pub use crate::decoder::{Data, Decoder};
pub use crate::parser::*;
pub use crate::tables::{AttrValue, Product, VariableSpec};
