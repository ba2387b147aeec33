//! Identifier newtypes.
//!
//! All core records are keyed by opaque numeric ids assigned by the store.
//! Newtypes keep an identity id from ever being passed where a participant
//! id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
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

id_type!(
    /// One registered person-account.
    IdentityId
);
id_type!(
    /// One identity-verification attempt.
    SubmissionId
);
id_type!(
    /// One rotating-savings pool ("tanda").
    PoolId
);
id_type!(
    /// One identity's membership in one pool.
    ParticipantId
);
