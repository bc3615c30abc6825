use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovgateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error at position {position}: {source}")]
    Xml {
        source: quick_xml::Error,
        position: usize,
    },

    #[error("no usable <counter> entries found in the report")]
    NoUsableCounters,
}

pub type Result<T> = std::result::Result<T, CovgateError>;
