//! Typed entity identifiers.
//!
//! One newtype per entity family keeps chain ids from being handed to
//! segment queries and gives selection tie-breaks a total order.

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`crate::Chain`].
    ChainId
);
entity_id!(
    /// Identifier of a [`crate::Segment`].
    SegmentId
);
entity_id!(
    /// Identifier of a [`crate::SegmentChoice`].
    ChoiceId
);
entity_id!(
    /// Identifier of a [`crate::Library`].
    LibraryId
);
entity_id!(
    /// Identifier of a [`crate::Program`].
    ProgramId
);
entity_id!(
    /// Identifier of a [`crate::ProgramSequence`].
    SequenceId
);
entity_id!(
    /// Identifier of an [`crate::Instrument`].
    InstrumentId
);
entity_id!(
    /// Identifier of an [`crate::InstrumentAudio`].
    AudioId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_by_raw_value() {
        assert!(ProgramId(1) < ProgramId(2));
        assert_eq!(ChainId::from(7), ChainId(7));
        assert_eq!(SegmentId(42).to_string(), "42");
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&InstrumentId(9)).unwrap();
        assert_eq!(json, "9");
    }
}
