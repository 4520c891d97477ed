#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Declares a transparent integer id newtype.
macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

id_type! {
    /// Identifies a student across semesters.
    StudentId
}
id_type! {
    /// Identifies a teaching unit (UE) within a semester.
    UeId
}
id_type! {
    /// Identifies a module implementation within a semester.
    ModuleImplId
}
id_type! {
    /// Identifies a single evaluation within a module.
    EvaluationId
}
id_type! {
    /// Identifies a semester (formsemestre).
    SemestreId
}
