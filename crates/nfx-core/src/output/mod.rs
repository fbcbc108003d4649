//! Result persistence.

mod writer;

pub use writer::{
    detailed_path, write_detailed, write_results, write_tabular, WriteReport, TABULAR_COLUMNS,
};
