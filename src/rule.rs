use ca_rules::{ParseLife, ParseRuleError};
use std::str::FromStr;

/// A totalistic birth/survival rule, as bit sets over neighbor counts.
///
/// Only [`Rule::LIFE`] drives the simulation; other rules are parsed so that
/// patterns asking for them can be refused.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Rule {
    birth: u16,
    survival: u16,
}

impl Rule {
    /// B3/S23.
    pub const LIFE: Rule = Rule {
        birth: 1 << 3,
        survival: 1 << 2 | 1 << 3,
    };

    pub const fn is_born(&self, count: u8) -> bool {
        self.birth & 1 << count != 0
    }

    pub const fn survives(&self, count: u8) -> bool {
        self.survival & 1 << count != 0
    }
}

impl ParseLife for Rule {
    fn from_bs(b: Vec<u8>, s: Vec<u8>) -> Self {
        Rule {
            birth: b.into_iter().fold(0, |acc, n| acc | 1 << n),
            survival: s.into_iter().fold(0, |acc, n| acc | 1 << n),
        }
    }
}

impl FromStr for Rule {
    type Err = ParseRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rule::parse_rule(s)
    }
}
