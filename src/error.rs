use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("block size must be a positive power of two, got {0}")]
    InvalidBlockSize(i64),
    #[error(transparent)]
    Rle(#[from] ca_formats::rle::Error),
    #[error(transparent)]
    Rule(#[from] ca_rules::ParseRuleError),
    #[error("only B3/S23 is supported, pattern asks for {0}")]
    UnsupportedRule(String),
}
