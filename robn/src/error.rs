//! Error taxonomy of the codec.
//!
//! Every failure is a first-class value carrying the byte offset where it
//! was detected and, where one exists, the offending tag byte. Nothing is
//! recovered internally; errors propagate to the caller synchronously.

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A read would have advanced past the end of the input.
    #[error(
        "truncated input: {needed} bytes needed at offset {offset}, {remaining} remaining"
    )]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// The on-wire type tag names a kind the target type cannot be
    /// produced from.
    #[error("incompatible binary: tag {tag:#04x} at offset {offset}")]
    IncompatibleBinary { tag: u8, offset: usize },

    /// The type byte carries a code for which no codec exists (reserved or
    /// unassigned).
    #[error("no codec for type code {code:#04x} at offset {offset}")]
    InvalidType { code: u8, offset: usize },

    /// A field declared required was absent from the decoded map.
    #[error("missing required field `{name}`")]
    MissingRequiredField { name: String },

    /// The field declaration itself is unusable: duplicate names, unknown
    /// dependency targets, or a dependency cycle.
    #[error("invalid field configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let error = Error::Truncated {
            offset: 3,
            needed: 8,
            remaining: 2,
        };
        assert_eq!(
            error.to_string(),
            "truncated input: 8 bytes needed at offset 3, 2 remaining"
        );

        let error = Error::IncompatibleBinary { tag: 0x8a, offset: 1 };
        assert_eq!(
            error.to_string(),
            "incompatible binary: tag 0x8a at offset 1"
        );
    }
}
