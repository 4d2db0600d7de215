//! Strongly-typed identifiers.
//!
//! Grounded on the teacher's newtype-over-bytes pattern (e.g.
//! `common::api::UserPk`, `NodePk`): every entity gets its own type so a
//! caller can't accidentally pass an `InvoiceId` where a `SubmissionId` is
//! expected, even though both are UUIDs underneath.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id!(InvoiceId);
uuid_id!(SubmissionId);
uuid_id!(IssuerId);
uuid_id!(CustomerId);
uuid_id!(EnvironmentId);
uuid_id!(ApiKeyId);

/// The hex-encoded SHA-512 digest used to look up an [`crate::party::Issuer`]'s
/// (or any principal's) API key by fingerprint. Not a UUID — this is derived
/// data per §4.2, not an opaque identifier assigned at creation.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ApiKeyFingerprint(pub String);

impl fmt::Display for ApiKeyFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
