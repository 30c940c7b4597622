//! I define the audit service: the provenance quads recorded
//! under the immutable audit graph for every mutation.
//!

use arbor_space::{
    vocab::{activitystreams, prov, rdf, trellis, xsd},
    Session,
};
use chrono::SecondsFormat;
use rdf_model::{BlankNode, Dataset, Iri, Literal, Quad};
use uuid::Uuid;

/// Produce the audit quads of a resource creation.
pub fn creation(id: &Iri, session: &Session) -> Dataset {
    activity(id, session, &activitystreams::CREATE)
}

/// Produce the audit quads of a resource update.
pub fn update(id: &Iri, session: &Session) -> Dataset {
    activity(id, session, &activitystreams::UPDATE)
}

/// Produce the audit quads of a resource deletion.
pub fn deletion(id: &Iri, session: &Session) -> Dataset {
    activity(id, session, &activitystreams::DELETE)
}

/// The audit layout: one `prov:Activity` node per mutation,
/// linked from the resource through `prov:wasGeneratedBy`, all
/// under the dedicated audit graph.
fn activity(id: &Iri, session: &Session, activity_type: &Iri) -> Dataset {
    let graph = Some(trellis::PREFER_AUDIT.clone());
    let node = BlankNode::new(format!("activity-{}", Uuid::new_v4().simple()));

    let mut dataset = Dataset::new();
    dataset.insert(Quad::new(
        graph.clone(),
        id.clone(),
        prov::WAS_GENERATED_BY.clone(),
        node.clone(),
    ));
    dataset.insert(Quad::new(
        graph.clone(),
        node.clone(),
        rdf::TYPE.clone(),
        prov::ACTIVITY.clone(),
    ));
    dataset.insert(Quad::new(
        graph.clone(),
        node.clone(),
        rdf::TYPE.clone(),
        activity_type.clone(),
    ));
    dataset.insert(Quad::new(
        graph.clone(),
        node.clone(),
        prov::WAS_ASSOCIATED_WITH.clone(),
        session.agent().clone(),
    ));
    if let Some(delegator) = session.delegated_by() {
        dataset.insert(Quad::new(
            graph.clone(),
            node.clone(),
            prov::ACTED_ON_BEHALF_OF.clone(),
            delegator.clone(),
        ));
    }
    dataset.insert(Quad::new(
        graph,
        node,
        prov::AT_TIME.clone(),
        Literal::typed(
            session
                .created()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            xsd::DATE_TIME.clone(),
        ),
    ));
    dataset
}

#[cfg(test)]
mod tests {
    use rdf_model::Term;

    use super::*;

    #[test]
    fn creation_quads_live_in_audit_graph() {
        let id = Iri::new_unchecked("trellis:data/x");
        let session = Session::new(Iri::new_unchecked("http://h/webid"));
        let dataset = creation(&id, &session);

        assert_eq!(dataset.graph_names().count(), 1);
        assert!(dataset
            .quads()
            .all(|q| q.graph_name.as_ref() == Some(&*trellis::PREFER_AUDIT)));

        // The resource links to a typed activity node.
        let generated: Vec<Quad> = dataset
            .quads_matching(
                Some(&trellis::PREFER_AUDIT),
                Some(&Term::Iri(id)),
                Some(&prov::WAS_GENERATED_BY),
                None,
            )
            .collect();
        assert_eq!(generated.len(), 1);
        let node = generated[0].object.clone();
        assert!(node.is_blank_node());
        assert!(dataset
            .quads_matching(None, Some(&node), Some(&rdf::TYPE), Some(&Term::Iri(activitystreams::CREATE.clone())))
            .next()
            .is_some());
        assert!(dataset
            .quads_matching(None, Some(&node), Some(&prov::AT_TIME), None)
            .next()
            .is_some());
    }

    #[test]
    fn delegation_is_recorded() {
        let id = Iri::new_unchecked("trellis:data/x");
        let session = Session::new(Iri::new_unchecked("http://h/webid"))
            .with_delegated_by(Iri::new_unchecked("http://h/boss"));
        let dataset = update(&id, &session);

        assert!(dataset
            .quads_matching(None, None, Some(&prov::ACTED_ON_BEHALF_OF), None)
            .next()
            .is_some());
    }

    #[test]
    fn activity_nodes_are_fresh_per_call() {
        let id = Iri::new_unchecked("trellis:data/x");
        let session = Session::anonymous();
        let a = deletion(&id, &session);
        let b = deletion(&id, &session);

        let node = |d: &Dataset| {
            d.quads_matching(None, None, Some(&prov::WAS_GENERATED_BY), None)
                .next()
                .unwrap()
                .object
        };
        assert_ne!(node(&a), node(&b));
    }
}
