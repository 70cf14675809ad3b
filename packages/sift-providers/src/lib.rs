pub mod embedding;
pub mod explain;

mod http;
