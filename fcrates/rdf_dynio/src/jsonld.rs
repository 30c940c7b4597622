//! I define json-ld reading and writing over the expanded
//! document form.
//!
//! Reading accepts an expanded json-ld document (an array of
//! node objects, a single node object, or a top-level `@graph`
//! wrapper). Writing emits the expanded form, optionally
//! compacting iris through a prefix map drawn from a profile
//! document.
//!

use std::{collections::BTreeMap, io::Write};

use oxiri::Iri as OxIri;
use rdf_model::{
    term::XSD_STRING, BlankNode, Dataset, Graph, Iri, Literal, Quad, Term, Triple,
};
use serde_json::{json, Map, Value};

use crate::{
    error::{RdfParseError, RdfWriteError},
    syntax::RdfSyntax,
};

static RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
static XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
static XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
static XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

/// A compaction context: prefix label to namespace iri.
#[derive(Debug, Clone, Default)]
pub struct CompactionContext {
    prefixes: BTreeMap<String, String>,
}

impl CompactionContext {
    /// Create a context from given prefix map.
    pub fn new(prefixes: BTreeMap<String, String>) -> Self {
        Self { prefixes }
    }

    /// Extract a context from a profile document: string-valued
    /// entries of its `@context` object become prefixes.
    pub fn from_profile(profile: &Value) -> Self {
        let mut prefixes = BTreeMap::new();
        if let Some(Value::Object(context)) = profile.get("@context") {
            for (key, value) in context {
                if let Value::String(ns) = value {
                    if !key.starts_with('@') {
                        prefixes.insert(key.clone(), ns.clone());
                    }
                }
            }
        }
        Self { prefixes }
    }

    fn compact(&self, iri: &str) -> Option<(String, String)> {
        self.prefixes.iter().find_map(|(prefix, ns)| {
            iri.strip_prefix(ns.as_str())
                .filter(|local| !local.is_empty() && !local.contains('/'))
                .map(|local| (prefix.clone(), format!("{}:{}", prefix, local)))
        })
    }
}

fn malformed(message: impl Into<String>) -> RdfParseError {
    RdfParseError::Malformed {
        syntax: RdfSyntax::JsonLd,
        message: message.into(),
    }
}

/// Parse given expanded json-ld document into a dataset.
pub fn parse_dataset(document: &[u8], base: Option<&Iri>) -> Result<Dataset, RdfParseError> {
    let value: Value =
        serde_json::from_slice(document).map_err(|e| malformed(e.to_string()))?;
    let base = base
        .map(|b| {
            OxIri::parse(b.as_str().to_owned())
                .map_err(|_| RdfParseError::InvalidBaseIri(b.as_str().to_owned()))
        })
        .transpose()?;

    let mut reader = ExpandedReader {
        base,
        dataset: Dataset::new(),
        bnode_counter: 0,
    };
    match value {
        Value::Array(nodes) => {
            for node in &nodes {
                reader.read_node(node, None)?;
            }
        }
        node @ Value::Object(_) => {
            reader.read_node(&node, None)?;
        }
        other => return Err(malformed(format!("unexpected document root: {}", other))),
    }
    Ok(reader.dataset)
}

struct ExpandedReader {
    base: Option<OxIri<String>>,
    dataset: Dataset,
    bnode_counter: usize,
}

impl ExpandedReader {
    fn fresh_bnode(&mut self) -> Term {
        let label = format!("jlb{}", self.bnode_counter);
        self.bnode_counter += 1;
        Term::BlankNode(BlankNode::new(label))
    }

    fn resolve(&self, value: &str) -> Result<Iri, RdfParseError> {
        if value.starts_with("_:") {
            return Err(malformed("blank node where an iri is required"));
        }
        if let Ok(iri) = Iri::new(value) {
            return Ok(iri);
        }
        match &self.base {
            Some(base) => base
                .resolve(value)
                .map(|r| Iri::new_unchecked(r.as_str()))
                .map_err(|_| malformed(format!("unresolvable iri reference: {}", value))),
            None => Err(malformed(format!("relative iri without base: {}", value))),
        }
    }

    fn node_subject(&mut self, node: &Map<String, Value>) -> Result<Term, RdfParseError> {
        match node.get("@id") {
            Some(Value::String(id)) => {
                if let Some(label) = id.strip_prefix("_:") {
                    Ok(Term::BlankNode(BlankNode::new(label)))
                } else {
                    Ok(Term::Iri(self.resolve(id)?))
                }
            }
            Some(other) => Err(malformed(format!("non-string @id: {}", other))),
            None => Ok(self.fresh_bnode()),
        }
    }

    /// Read a node object, emitting its statements into graph
    /// with given name, and return the node's subject term.
    fn read_node(
        &mut self,
        node: &Value,
        graph_name: Option<&Iri>,
    ) -> Result<Term, RdfParseError> {
        let node = node
            .as_object()
            .ok_or_else(|| malformed(format!("expected a node object, got: {}", node)))?;
        let subject = self.node_subject(node)?;

        for (key, value) in node {
            match key.as_str() {
                "@id" | "@context" | "@index" => {}
                "@type" => {
                    for t in as_array(value) {
                        let ty = t
                            .as_str()
                            .ok_or_else(|| malformed("non-string @type entry"))?;
                        self.emit(
                            graph_name,
                            subject.clone(),
                            Iri::new_unchecked(RDF_TYPE),
                            Term::Iri(self.resolve(ty)?),
                        );
                    }
                }
                "@graph" => {
                    // A named graph keyed by this node's @id; a
                    // wrapper without @id targets the current graph.
                    let name = if node.contains_key("@id") {
                        match &subject {
                            Term::Iri(iri) => Some(iri.clone()),
                            _ => return Err(malformed("blank node graph name")),
                        }
                    } else {
                        graph_name.cloned()
                    };
                    for inner in as_array(value) {
                        self.read_node(inner, name.as_ref())?;
                    }
                }
                "@list" | "@value" => {
                    return Err(malformed(format!("{} at node object position", key)))
                }
                _ => {
                    let predicate = self.resolve(key)?;
                    for v in as_array(value) {
                        let object = self.read_value(v, graph_name)?;
                        self.emit(graph_name, subject.clone(), predicate.clone(), object);
                    }
                }
            }
        }
        Ok(subject)
    }

    fn read_value(
        &mut self,
        value: &Value,
        graph_name: Option<&Iri>,
    ) -> Result<Term, RdfParseError> {
        match value {
            Value::Object(o) => {
                if o.contains_key("@list") {
                    return Err(malformed("@list values are not supported"));
                }
                if let Some(v) = o.get("@value") {
                    return self.read_literal(v, o);
                }
                // A node reference or an inline node object.
                self.read_node(value, graph_name)
            }
            // Leniency: scalars as bare values.
            Value::String(s) => Ok(Term::Literal(Literal::simple(s))),
            Value::Bool(b) => Ok(Term::Literal(Literal::typed(
                b.to_string(),
                Iri::new_unchecked(XSD_BOOLEAN),
            ))),
            Value::Number(n) => Ok(Term::Literal(number_literal(n))),
            other => Err(malformed(format!("unexpected value: {}", other))),
        }
    }

    fn read_literal(
        &self,
        value: &Value,
        object: &Map<String, Value>,
    ) -> Result<Term, RdfParseError> {
        if let Some(Value::String(language)) = object.get("@language") {
            let lexical = value
                .as_str()
                .ok_or_else(|| malformed("non-string language tagged @value"))?;
            return Ok(Term::Literal(Literal::language_tagged(lexical, language)));
        }
        if let Some(Value::String(datatype)) = object.get("@type") {
            let lexical = match value {
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => return Err(malformed(format!("unexpected @value: {}", other))),
            };
            return Ok(Term::Literal(Literal::typed(lexical, self.resolve(datatype)?)));
        }
        match value {
            Value::String(s) => Ok(Term::Literal(Literal::simple(s))),
            Value::Bool(b) => Ok(Term::Literal(Literal::typed(
                b.to_string(),
                Iri::new_unchecked(XSD_BOOLEAN),
            ))),
            Value::Number(n) => Ok(Term::Literal(number_literal(n))),
            other => Err(malformed(format!("unexpected @value: {}", other))),
        }
    }

    fn emit(&mut self, graph_name: Option<&Iri>, subject: Term, predicate: Iri, object: Term) {
        self.dataset.insert(Quad::new(
            graph_name.cloned(),
            subject,
            predicate,
            object,
        ));
    }
}

fn as_array(value: &Value) -> std::slice::Iter<'_, Value> {
    match value {
        Value::Array(items) => items.iter(),
        other => std::slice::from_ref(other).iter(),
    }
}

fn number_literal(n: &serde_json::Number) -> Literal {
    if n.is_i64() || n.is_u64() {
        Literal::typed(n.to_string(), Iri::new_unchecked(XSD_INTEGER))
    } else {
        Literal::typed(n.to_string(), Iri::new_unchecked(XSD_DOUBLE))
    }
}

/// Serialize given dataset as an expanded json-ld document into
/// given sink, compacting iris through `context` if supplied.
pub fn write_dataset(
    dataset: &Dataset,
    mut sink: impl Write,
    context: Option<&CompactionContext>,
) -> Result<(), RdfWriteError> {
    let mut used_prefixes = BTreeMap::new();
    let mut root = Vec::new();

    if let Some(default) = dataset.graph(None) {
        root.extend(graph_nodes(default, context, &mut used_prefixes));
    }
    for (name, graph) in dataset.graphs() {
        if let Some(name) = name {
            root.push(json!({
                "@id": name.as_str(),
                "@graph": graph_nodes(graph, context, &mut used_prefixes),
            }));
        }
    }

    let document = if used_prefixes.is_empty() {
        Value::Array(root)
    } else {
        let context_object: Map<String, Value> = used_prefixes
            .into_iter()
            .map(|(prefix, ns)| (prefix, Value::String(ns)))
            .collect();
        json!({ "@context": context_object, "@graph": root })
    };

    serde_json::to_writer_pretty(&mut sink, &document)
        .map_err(|e| RdfWriteError::Io(std::io::Error::other(e)))?;
    sink.write_all(b"\n")?;
    Ok(())
}

/// Write given graph as json-ld.
pub fn write_graph(
    graph: &Graph,
    sink: impl Write,
    context: Option<&CompactionContext>,
) -> Result<(), RdfWriteError> {
    let mut dataset = Dataset::new();
    dataset.set_graph(None, graph.clone());
    write_dataset(&dataset, sink, context)
}

fn graph_nodes(
    graph: &Graph,
    context: Option<&CompactionContext>,
    used_prefixes: &mut BTreeMap<String, String>,
) -> Vec<Value> {
    // Group triples by subject, in deterministic subject order.
    let mut by_subject: BTreeMap<&Term, Vec<&Triple>> = BTreeMap::new();
    for triple in graph.triples() {
        by_subject.entry(&triple.subject).or_default().push(triple);
    }

    let mut nodes = Vec::with_capacity(by_subject.len());
    for (subject, triples) in by_subject {
        let mut node = Map::new();
        node.insert("@id".into(), Value::String(subject_id(subject)));

        let mut types = Vec::new();
        let mut properties: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for triple in triples {
            if triple.predicate.as_str() == RDF_TYPE {
                if let Term::Iri(ty) = &triple.object {
                    types.push(Value::String(
                        compact_iri(ty.as_str(), context, used_prefixes),
                    ));
                    continue;
                }
            }
            let key = compact_iri(triple.predicate.as_str(), context, used_prefixes);
            properties
                .entry(key)
                .or_default()
                .push(value_object(&triple.object));
        }

        if !types.is_empty() {
            node.insert("@type".into(), Value::Array(types));
        }
        for (key, values) in properties {
            node.insert(key, Value::Array(values));
        }
        nodes.push(Value::Object(node));
    }
    nodes
}

fn subject_id(subject: &Term) -> String {
    match subject {
        Term::Iri(iri) => iri.as_str().to_owned(),
        Term::BlankNode(b) => format!("_:{}", b.label()),
        Term::Literal(l) => l.lexical_form().to_owned(),
    }
}

fn compact_iri(
    iri: &str,
    context: Option<&CompactionContext>,
    used_prefixes: &mut BTreeMap<String, String>,
) -> String {
    if let Some(context) = context {
        if let Some((prefix, compact)) = context.compact(iri) {
            if let Some(ns) = context.prefixes.get(&prefix) {
                used_prefixes.insert(prefix, ns.clone());
            }
            return compact;
        }
    }
    iri.to_owned()
}

fn value_object(object: &Term) -> Value {
    match object {
        Term::Iri(iri) => json!({ "@id": iri.as_str() }),
        Term::BlankNode(b) => json!({ "@id": format!("_:{}", b.label()) }),
        Term::Literal(l) => {
            if let Some(language) = l.language() {
                json!({ "@value": l.lexical_form(), "@language": language })
            } else if *l.datatype() == *XSD_STRING {
                json!({ "@value": l.lexical_form() })
            } else {
                json!({ "@value": l.lexical_form(), "@type": l.datatype().as_str() })
            }
        }
    }
}
