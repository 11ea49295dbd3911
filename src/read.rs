use crate::{board::Board, error::Error, rule::Rule};
use ca_formats::{rle::Rle, Input};

impl Board {
    /// Seeds a board from an RLE pattern, keeping the pattern's coordinates.
    ///
    /// A missing rule header means Life; any other rule is refused.
    pub fn from_rle<I: Input>(rle: Rle<I>) -> Result<Self, Error> {
        if let Some(rulestring) = rle.header_data().and_then(|header| header.rule.as_deref()) {
            if rulestring.parse::<Rule>()? != Rule::LIFE {
                return Err(Error::UnsupportedRule(rulestring.to_string()));
            }
        }
        let mut board = Self::new();
        for cell in rle {
            let (x, y) = cell?.position;
            board.set(x, y);
        }
        Ok(board)
    }
}
