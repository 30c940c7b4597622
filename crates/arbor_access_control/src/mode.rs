//! I define the access modes grantable over a resource.
//!

use arbor_space::vocab::acl;
use rdf_model::Iri;

/// An access mode of the web access control vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessMode {
    /// Read access.
    Read,

    /// Write access. Implies append in granted responses.
    Write,

    /// Append access.
    Append,

    /// Control access over the acl itself.
    Control,
}

impl AccessMode {
    /// All modes.
    pub const ALL: [AccessMode; 4] = [
        AccessMode::Read,
        AccessMode::Write,
        AccessMode::Append,
        AccessMode::Control,
    ];

    /// Get the acl iri of this mode.
    pub fn iri(&self) -> Iri {
        match self {
            AccessMode::Read => acl::READ.clone(),
            AccessMode::Write => acl::WRITE.clone(),
            AccessMode::Append => acl::APPEND.clone(),
            AccessMode::Control => acl::CONTROL.clone(),
        }
    }

    /// Resolve a mode from its acl iri. Unknown iris yield
    /// `None` and are ignored by the engine.
    pub fn from_iri(iri: &Iri) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.iri() == *iri)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(AccessMode::Read)]
    #[case(AccessMode::Write)]
    #[case(AccessMode::Append)]
    #[case(AccessMode::Control)]
    fn iri_roundtrip(#[case] mode: AccessMode) {
        assert_eq!(AccessMode::from_iri(&mode.iri()), Some(mode));
    }

    #[test]
    fn unknown_modes_resolve_to_none() {
        assert_eq!(
            AccessMode::from_iri(&Iri::new_unchecked("http://ex/Frobnicate")),
            None
        );
    }
}
