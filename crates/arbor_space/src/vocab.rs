//! I define the vocabularies used across arbor crates, as typed
//! iri constants.
//!

#![allow(missing_docs)]

/// Terms from the [ldp vocabulary](http://www.w3.org/ns/ldp#).
pub mod ldp {
    use once_cell::sync::Lazy;
    use rdf_model::Iri;

    /// Namespace of the ldp vocabulary.
    pub const NS: &str = "http://www.w3.org/ns/ldp#";

    macro_rules! ldp_term {
        ($name:ident, $local:literal) => {
            pub static $name: Lazy<Iri> =
                Lazy::new(|| Iri::new_unchecked(concat!("http://www.w3.org/ns/ldp#", $local)));
        };
    }

    ldp_term!(RESOURCE, "Resource");
    ldp_term!(RDF_SOURCE, "RDFSource");
    ldp_term!(NON_RDF_SOURCE, "NonRDFSource");
    ldp_term!(CONTAINER, "Container");
    ldp_term!(BASIC_CONTAINER, "BasicContainer");
    ldp_term!(DIRECT_CONTAINER, "DirectContainer");
    ldp_term!(INDIRECT_CONTAINER, "IndirectContainer");
    ldp_term!(CONTAINS, "contains");
    ldp_term!(MEMBER, "member");
    ldp_term!(MEMBERSHIP_RESOURCE, "membershipResource");
    ldp_term!(HAS_MEMBER_RELATION, "hasMemberRelation");
    ldp_term!(IS_MEMBER_OF_RELATION, "isMemberOfRelation");
    ldp_term!(INSERTED_CONTENT_RELATION, "insertedContentRelation");
    ldp_term!(MEMBER_SUBJECT, "MemberSubject");
    ldp_term!(INBOX, "inbox");
    ldp_term!(PREFER_CONTAINMENT, "PreferContainment");
}

/// Terms from the [web access control vocabulary](http://www.w3.org/ns/auth/acl#).
pub mod acl {
    use once_cell::sync::Lazy;
    use rdf_model::Iri;

    /// Namespace of the acl vocabulary.
    pub const NS: &str = "http://www.w3.org/ns/auth/acl#";

    macro_rules! acl_term {
        ($name:ident, $local:literal) => {
            pub static $name: Lazy<Iri> = Lazy::new(|| {
                Iri::new_unchecked(concat!("http://www.w3.org/ns/auth/acl#", $local))
            });
        };
    }

    acl_term!(AUTHORIZATION, "Authorization");
    acl_term!(AUTHENTICATED_AGENT, "AuthenticatedAgent");
    acl_term!(ACCESS_TO, "accessTo");
    acl_term!(DEFAULT, "default");
    acl_term!(AGENT, "agent");
    acl_term!(AGENT_CLASS, "agentClass");
    acl_term!(AGENT_GROUP, "agentGroup");
    acl_term!(MODE, "mode");
    acl_term!(READ, "Read");
    acl_term!(WRITE, "Write");
    acl_term!(APPEND, "Append");
    acl_term!(CONTROL, "Control");
}

/// Terms from the [foaf vocabulary](http://xmlns.com/foaf/0.1/).
pub mod foaf {
    use once_cell::sync::Lazy;
    use rdf_model::Iri;

    pub static AGENT: Lazy<Iri> =
        Lazy::new(|| Iri::new_unchecked("http://xmlns.com/foaf/0.1/Agent"));
}

/// Terms from the [vcard vocabulary](http://www.w3.org/2006/vcard/ns#).
pub mod vcard {
    use once_cell::sync::Lazy;
    use rdf_model::Iri;

    pub static HAS_MEMBER: Lazy<Iri> =
        Lazy::new(|| Iri::new_unchecked("http://www.w3.org/2006/vcard/ns#hasMember"));
}

/// Terms from the [prov vocabulary](http://www.w3.org/ns/prov#).
pub mod prov {
    use once_cell::sync::Lazy;
    use rdf_model::Iri;

    /// Namespace of the prov vocabulary.
    pub const NS: &str = "http://www.w3.org/ns/prov#";

    macro_rules! prov_term {
        ($name:ident, $local:literal) => {
            pub static $name: Lazy<Iri> =
                Lazy::new(|| Iri::new_unchecked(concat!("http://www.w3.org/ns/prov#", $local)));
        };
    }

    prov_term!(ACTIVITY, "Activity");
    prov_term!(WAS_GENERATED_BY, "wasGeneratedBy");
    prov_term!(WAS_ASSOCIATED_WITH, "wasAssociatedWith");
    prov_term!(ACTED_ON_BEHALF_OF, "actedOnBehalfOf");
    prov_term!(AT_TIME, "atTime");
}

/// Terms from the [activitystreams vocabulary](https://www.w3.org/ns/activitystreams#).
pub mod activitystreams {
    use once_cell::sync::Lazy;
    use rdf_model::Iri;

    /// Namespace of the activitystreams vocabulary.
    pub const NS: &str = "https://www.w3.org/ns/activitystreams#";

    pub static CREATE: Lazy<Iri> =
        Lazy::new(|| Iri::new_unchecked("https://www.w3.org/ns/activitystreams#Create"));
    pub static UPDATE: Lazy<Iri> =
        Lazy::new(|| Iri::new_unchecked("https://www.w3.org/ns/activitystreams#Update"));
    pub static DELETE: Lazy<Iri> =
        Lazy::new(|| Iri::new_unchecked("https://www.w3.org/ns/activitystreams#Delete"));
}

/// Terms from the rdf syntax vocabulary.
pub mod rdf {
    use once_cell::sync::Lazy;
    use rdf_model::Iri;

    pub static TYPE: Lazy<Iri> =
        Lazy::new(|| Iri::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"));
}

/// Terms from the xsd datatype vocabulary.
pub mod xsd {
    use once_cell::sync::Lazy;
    use rdf_model::Iri;

    pub static DATE_TIME: Lazy<Iri> =
        Lazy::new(|| Iri::new_unchecked("http://www.w3.org/2001/XMLSchema#dateTime"));
}

/// Terms from the internal trellis vocabulary, covering graph
/// names, agent sentinels, and constraint identifiers.
pub mod trellis {
    use once_cell::sync::Lazy;
    use rdf_model::Iri;

    /// Namespace of the trellis vocabulary.
    pub const NS: &str = "http://www.trellisldp.org/ns/trellis#";

    macro_rules! trellis_term {
        ($name:ident, $local:literal) => {
            pub static $name: Lazy<Iri> = Lazy::new(|| {
                Iri::new_unchecked(concat!("http://www.trellisldp.org/ns/trellis#", $local))
            });
        };
    }

    // Graph names of the resource representation.
    trellis_term!(PREFER_AUDIT, "PreferAudit");
    trellis_term!(PREFER_SERVER_MANAGED, "PreferServerManaged");
    trellis_term!(PREFER_ACCESS_CONTROL, "PreferAccessControl");
    trellis_term!(PREFER_USER_MANAGED, "PreferUserManaged");

    // Agent sentinels.
    trellis_term!(ANONYMOUS_AGENT, "AnonymousAgent");
    trellis_term!(ADMINISTRATOR_AGENT, "AdministratorAgent");

    // Constraint identifiers.
    trellis_term!(INVALID_PROPERTY, "InvalidProperty");
    trellis_term!(INVALID_TYPE, "InvalidType");
    trellis_term!(INVALID_CARDINALITY, "InvalidCardinality");
    trellis_term!(INVALID_RANGE, "InvalidRange");
}
