use core::fmt;
use core::num::NonZeroU32;

macro_rules! slot_id {
    ($(#[$doc:meta])* $name:ident, $tag:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Id of the slot at `index` in its assembly-order table.
            pub fn from_index(index: u32) -> Self {
                Self(NonZeroU32::MIN.saturating_add(index))
            }

            pub fn index(self) -> u32 {
                self.0.get() - 1
            }

            pub fn slot(self) -> usize {
                self.index() as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.index())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.index())
            }
        }
    };
}

slot_id!(
    /// A flow state slot, written by the component that produces it and read
    /// by the one that consumes it.
    EdgeId,
    "edge"
);

slot_id!(
    /// A component, numbered in the order it was added to the builder.
    CompId,
    "component"
);
