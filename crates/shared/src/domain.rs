use std::fmt;

use serde::{Deserialize, Serialize};

/// The remote store issues opaque string identifiers (`_id` documents).
macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(ProjectId);
id_newtype!(PostId);
id_newtype!(CommentId);
id_newtype!(ContactMessageId);
