use serde::Deserialize;
use serde::Serialize;

/// Describes an exception the host raised while running a cell.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Exception {
    pub ename: String,
    pub evalue: String,
    pub traceback: Vec<String>,
}
