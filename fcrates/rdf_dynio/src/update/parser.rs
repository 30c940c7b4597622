//! I define the hand-written parser for the sparql-update
//! subset.
//!

use std::collections::HashMap;

use oxiri::Iri as OxIri;
use rdf_model::{BlankNode, Iri, Literal, Term, Triple};

use super::{TermPattern, TriplePattern, UpdateOperation};

static RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
static XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
static XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
static XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
static XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

/// An error in parsing a sparql update string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Sparql update parse error at line {line}, column {column}: {message}")]
pub struct UpdateParseError {
    /// Line of the offending input, 1-based.
    pub line: usize,
    /// Column of the offending input, 1-based.
    pub column: usize,
    /// What went wrong.
    pub message: String,
}

/// Kind of a `{ … }` block, governing which term kinds are
/// admissible inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    InsertData,
    DeleteData,
    InsertTemplate,
    DeleteTemplate,
    Where,
}

impl BlockKind {
    fn allows_variables(self) -> bool {
        !matches!(self, BlockKind::InsertData | BlockKind::DeleteData)
    }
}

/// Parse given update string into its operation sequence.
pub(super) fn parse_update(
    input: &str,
    base: Option<&Iri>,
) -> Result<Vec<UpdateOperation>, UpdateParseError> {
    let base = base
        .map(|b| {
            OxIri::parse(b.as_str().to_owned()).map_err(|_| UpdateParseError {
                line: 1,
                column: 1,
                message: format!("invalid base iri: {}", b),
            })
        })
        .transpose()?;

    UpdateParser {
        chars: input.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
        base,
        prefixes: HashMap::new(),
    }
    .parse()
}

struct UpdateParser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    base: Option<OxIri<String>>,
    prefixes: HashMap<String, String>,
}

impl UpdateParser {
    fn parse(mut self) -> Result<Vec<UpdateOperation>, UpdateParseError> {
        let mut operations = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek().is_none() {
                break;
            }
            if self.try_keyword("PREFIX") {
                self.parse_prefix_declaration()?;
                continue;
            }
            if self.try_keyword("BASE") {
                let iri = self.parse_iriref()?;
                self.base = Some(OxIri::parse(iri.as_str().to_owned()).map_err(|_| {
                    self.error(format!("invalid base iri: {}", iri))
                })?);
                continue;
            }

            operations.push(self.parse_operation()?);
            self.skip_trivia();
            match self.peek() {
                Some(';') => {
                    self.bump();
                }
                None => break,
                Some(c) => return Err(self.error(format!("expected ';' or end, found '{}'", c))),
            }
        }
        Ok(operations)
    }

    fn parse_prefix_declaration(&mut self) -> Result<(), UpdateParseError> {
        self.skip_trivia();
        let mut prefix = String::new();
        while let Some(c) = self.peek() {
            if c == ':' {
                break;
            }
            if c.is_alphanumeric() || c == '_' || c == '-' {
                prefix.push(c);
                self.bump();
            } else {
                return Err(self.error(format!("unexpected character '{}' in prefix name", c)));
            }
        }
        self.expect(':')?;
        let namespace = self.parse_iriref()?;
        self.prefixes.insert(prefix, namespace.as_str().to_owned());
        Ok(())
    }

    fn parse_operation(&mut self) -> Result<UpdateOperation, UpdateParseError> {
        if self.try_keyword("INSERT") {
            if self.try_keyword("DATA") {
                let triples = self.parse_data_block(BlockKind::InsertData)?;
                return Ok(UpdateOperation::InsertData(triples));
            }
            // INSERT { … } WHERE { … }
            let insert = self.parse_block(BlockKind::InsertTemplate)?;
            if !self.try_keyword("WHERE") {
                return Err(self.error("expected WHERE after insert template".to_owned()));
            }
            let pattern = self.parse_block(BlockKind::Where)?;
            return Ok(UpdateOperation::Modify {
                delete: Vec::new(),
                insert,
                pattern,
            });
        }

        if self.try_keyword("DELETE") {
            if self.try_keyword("DATA") {
                let triples = self.parse_data_block(BlockKind::DeleteData)?;
                return Ok(UpdateOperation::DeleteData(triples));
            }
            if self.try_keyword("WHERE") {
                let pattern = self.parse_block(BlockKind::Where)?;
                return Ok(UpdateOperation::DeleteWhere(pattern));
            }
            let delete = self.parse_block(BlockKind::DeleteTemplate)?;
            let insert = if self.try_keyword("INSERT") {
                self.parse_block(BlockKind::InsertTemplate)?
            } else {
                Vec::new()
            };
            if !self.try_keyword("WHERE") {
                return Err(self.error("expected WHERE after modify templates".to_owned()));
            }
            let pattern = self.parse_block(BlockKind::Where)?;
            return Ok(UpdateOperation::Modify {
                delete,
                insert,
                pattern,
            });
        }

        Err(self.error("expected INSERT or DELETE".to_owned()))
    }

    /// Parse a data block into concrete triples.
    fn parse_data_block(&mut self, kind: BlockKind) -> Result<Vec<Triple>, UpdateParseError> {
        let patterns = self.parse_block(kind)?;
        let mut triples = Vec::with_capacity(patterns.len());
        for p in patterns {
            let (TermPattern::Term(subject), TermPattern::Term(predicate), TermPattern::Term(object)) =
                (p.subject, p.predicate, p.object)
            else {
                return Err(self.error("variable in data block".to_owned()));
            };
            let Term::Iri(predicate) = predicate else {
                return Err(self.error("non-iri predicate in data block".to_owned()));
            };
            triples.push(Triple {
                subject,
                predicate,
                object,
            });
        }
        Ok(triples)
    }

    fn parse_block(&mut self, kind: BlockKind) -> Result<Vec<TriplePattern>, UpdateParseError> {
        self.skip_trivia();
        self.expect('{')?;
        let mut out = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(out);
                }
                None => return Err(self.error("unterminated block".to_owned())),
                Some(_) => {
                    self.parse_triples(kind, &mut out)?;
                    self.skip_trivia();
                    match self.peek() {
                        Some('.') => {
                            self.bump();
                        }
                        Some('}') => {
                            self.bump();
                            return Ok(out);
                        }
                        Some(c) => {
                            return Err(self.error(format!("expected '.' or '}}', found '{}'", c)))
                        }
                        None => return Err(self.error("unterminated block".to_owned())),
                    }
                }
            }
        }
    }

    fn parse_triples(
        &mut self,
        kind: BlockKind,
        out: &mut Vec<TriplePattern>,
    ) -> Result<(), UpdateParseError> {
        let subject = self.parse_term_pattern(kind, false)?;
        if matches!(&subject, TermPattern::Term(Term::Literal(_))) {
            return Err(self.error("literal in subject position".to_owned()));
        }

        loop {
            self.skip_trivia();
            let predicate = self.parse_verb(kind)?;
            loop {
                self.skip_trivia();
                let object = self.parse_term_pattern(kind, true)?;
                out.push(TriplePattern {
                    subject: subject.clone(),
                    predicate: predicate.clone(),
                    object,
                });
                self.skip_trivia();
                if self.peek() == Some(',') {
                    self.bump();
                } else {
                    break;
                }
            }
            if self.peek() == Some(';') {
                self.bump();
                self.skip_trivia();
                // A dangling ';' before the statement terminator.
                if matches!(self.peek(), Some('.') | Some('}') | None) {
                    return Ok(());
                }
            } else {
                return Ok(());
            }
        }
    }

    fn parse_verb(&mut self, kind: BlockKind) -> Result<TermPattern, UpdateParseError> {
        // The 'a' shorthand, unless it opens a longer word or pname.
        if self.peek() == Some('a') && !self.is_word_continuation(self.pos + 1) {
            self.bump();
            return Ok(TermPattern::Term(Term::Iri(Iri::new_unchecked(RDF_TYPE))));
        }
        let pattern = self.parse_term_pattern(kind, false)?;
        match &pattern {
            TermPattern::Variable(_) => Ok(pattern),
            TermPattern::Term(Term::Iri(_)) => Ok(pattern),
            _ => Err(self.error("predicate must be an iri or a variable".to_owned())),
        }
    }

    fn parse_term_pattern(
        &mut self,
        kind: BlockKind,
        allow_literal: bool,
    ) -> Result<TermPattern, UpdateParseError> {
        self.skip_trivia();
        match self.peek() {
            Some('<') => Ok(TermPattern::Term(Term::Iri(self.parse_iriref()?))),
            Some('?') | Some('$') => {
                if !kind.allows_variables() {
                    return Err(self.error("variable in data block".to_owned()));
                }
                self.bump();
                Ok(TermPattern::Variable(self.parse_name("variable")?))
            }
            Some('_') => {
                self.bump();
                self.expect(':')?;
                let label = self.parse_name("blank node label")?;
                match kind {
                    BlockKind::InsertData | BlockKind::InsertTemplate => {
                        Ok(TermPattern::Term(Term::BlankNode(BlankNode::new(label))))
                    }
                    // Bnodes in a where pattern behave as variables.
                    BlockKind::Where => Ok(TermPattern::Variable(format!("_:{}", label))),
                    _ => Err(self.error("blank node not allowed in delete".to_owned())),
                }
            }
            Some('"') | Some('\'') => {
                if !allow_literal {
                    return Err(self.error("literal not allowed here".to_owned()));
                }
                Ok(TermPattern::Term(Term::Literal(self.parse_string_literal()?)))
            }
            Some(c) if c.is_ascii_digit() || c == '+' || c == '-' => {
                if !allow_literal {
                    return Err(self.error("literal not allowed here".to_owned()));
                }
                Ok(TermPattern::Term(Term::Literal(self.parse_numeric_literal()?)))
            }
            Some(':') => {
                self.bump();
                let local = self.parse_local_name()?;
                Ok(TermPattern::Term(Term::Iri(self.resolve_pname("", &local)?)))
            }
            Some(c) if c.is_alphabetic() => self.parse_bareword(allow_literal),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of input".to_owned())),
        }
    }

    fn parse_bareword(&mut self, allow_literal: bool) -> Result<TermPattern, UpdateParseError> {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                word.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if self.peek() == Some(':') {
            self.bump();
            let local = self.parse_local_name()?;
            return Ok(TermPattern::Term(Term::Iri(
                self.resolve_pname(&word, &local)?,
            )));
        }
        if word.eq_ignore_ascii_case("true") || word.eq_ignore_ascii_case("false") {
            if !allow_literal {
                return Err(self.error("literal not allowed here".to_owned()));
            }
            return Ok(TermPattern::Term(Term::Literal(Literal::typed(
                word.to_ascii_lowercase(),
                Iri::new_unchecked(XSD_BOOLEAN),
            ))));
        }
        if word.eq_ignore_ascii_case("GRAPH") {
            return Err(self.error("GRAPH clauses are not supported".to_owned()));
        }
        Err(self.error(format!("unexpected token '{}'", word)))
    }

    fn parse_local_name(&mut self) -> Result<String, UpdateParseError> {
        let mut local = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '%' {
                local.push(c);
                self.bump();
            } else if c == '.' && self.continuation_after_dot() {
                // A '.' inside a local name, not the terminator.
                local.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Ok(local)
    }

    fn continuation_after_dot(&self) -> bool {
        self.chars
            .get(self.pos + 1)
            .is_some_and(|c| c.is_alphanumeric() || *c == '_')
    }

    fn resolve_pname(&self, prefix: &str, local: &str) -> Result<Iri, UpdateParseError> {
        let namespace = self.prefixes.get(prefix).ok_or_else(|| {
            self.error(format!("undeclared prefix '{}:'", prefix))
        })?;
        Ok(Iri::new_unchecked(format!("{}{}", namespace, local)))
    }

    fn parse_iriref(&mut self) -> Result<Iri, UpdateParseError> {
        self.skip_trivia();
        self.expect('<')?;
        let mut value = String::new();
        loop {
            match self.peek() {
                Some('>') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        Some('u') => {
                            self.bump();
                            value.push(self.parse_hex_escape(4)?);
                        }
                        Some('U') => {
                            self.bump();
                            value.push(self.parse_hex_escape(8)?);
                        }
                        Some(c) => return Err(self.error(format!("invalid iri escape '\\{}'", c))),
                        None => return Err(self.error("unterminated iri".to_owned())),
                    }
                }
                Some(c) if c == ' ' || c == '\n' || c == '\t' || c == '\r' => {
                    return Err(self.error("whitespace in iri".to_owned()))
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
                None => return Err(self.error("unterminated iri".to_owned())),
            }
        }

        if let Ok(iri) = Iri::new(&value) {
            return Ok(iri);
        }
        match &self.base {
            Some(base) => base
                .resolve(&value)
                .map(|r| Iri::new_unchecked(r.as_str()))
                .map_err(|_| self.error(format!("unresolvable iri reference <{}>", value))),
            None => Err(self.error(format!("relative iri <{}> without base", value))),
        }
    }

    fn parse_string_literal(&mut self) -> Result<Literal, UpdateParseError> {
        let quote = self.peek().expect("Caller checked.");
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    let escaped = match self.peek() {
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('"') => '"',
                        Some('\'') => '\'',
                        Some('\\') => '\\',
                        Some('u') => {
                            self.bump();
                            value.push(self.parse_hex_escape(4)?);
                            continue;
                        }
                        Some('U') => {
                            self.bump();
                            value.push(self.parse_hex_escape(8)?);
                            continue;
                        }
                        Some(c) => {
                            return Err(self.error(format!("invalid string escape '\\{}'", c)))
                        }
                        None => return Err(self.error("unterminated string".to_owned())),
                    };
                    value.push(escaped);
                    self.bump();
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
                None => return Err(self.error("unterminated string".to_owned())),
            }
        }

        // Optional language tag or datatype annotation.
        match self.peek() {
            Some('@') => {
                self.bump();
                let mut tag = String::new();
                while let Some(c) = self.peek() {
                    if c.is_ascii_alphanumeric() || c == '-' {
                        tag.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
                if tag.is_empty() {
                    return Err(self.error("empty language tag".to_owned()));
                }
                Ok(Literal::language_tagged(value, tag))
            }
            Some('^') => {
                self.bump();
                self.expect('^')?;
                self.skip_trivia();
                let datatype = match self.peek() {
                    Some('<') => self.parse_iriref()?,
                    _ => {
                        let mut prefix = String::new();
                        while let Some(c) = self.peek() {
                            if c == ':' {
                                break;
                            }
                            if c.is_alphanumeric() || c == '_' || c == '-' {
                                prefix.push(c);
                                self.bump();
                            } else {
                                return Err(self.error("expected datatype iri".to_owned()));
                            }
                        }
                        self.expect(':')?;
                        let local = self.parse_local_name()?;
                        self.resolve_pname(&prefix, &local)?
                    }
                };
                Ok(Literal::typed(value, datatype))
            }
            _ => Ok(Literal::simple(value)),
        }
    }

    fn parse_numeric_literal(&mut self) -> Result<Literal, UpdateParseError> {
        let mut lexical = String::new();
        if matches!(self.peek(), Some('+') | Some('-')) {
            lexical.push(self.peek().expect("Just checked."));
            self.bump();
        }
        let mut has_dot = false;
        let mut has_exponent = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                lexical.push(c);
                self.bump();
            } else if c == '.' && !has_dot && !has_exponent && self.continuation_after_dot() {
                has_dot = true;
                lexical.push(c);
                self.bump();
            } else if (c == 'e' || c == 'E') && !has_exponent {
                has_exponent = true;
                lexical.push(c);
                self.bump();
                if matches!(self.peek(), Some('+') | Some('-')) {
                    lexical.push(self.peek().expect("Just checked."));
                    self.bump();
                }
            } else {
                break;
            }
        }
        if lexical.chars().filter(|c| c.is_ascii_digit()).count() == 0 {
            return Err(self.error("malformed numeric literal".to_owned()));
        }
        let datatype = if has_exponent {
            XSD_DOUBLE
        } else if has_dot {
            XSD_DECIMAL
        } else {
            XSD_INTEGER
        };
        Ok(Literal::typed(lexical, Iri::new_unchecked(datatype)))
    }

    fn parse_name(&mut self, context: &str) -> Result<String, UpdateParseError> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error(format!("empty {}", context)));
        }
        Ok(name)
    }

    fn parse_hex_escape(&mut self, digits: usize) -> Result<char, UpdateParseError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let c = self
                .peek()
                .ok_or_else(|| self.error("unterminated hex escape".to_owned()))?;
            let digit = c
                .to_digit(16)
                .ok_or_else(|| self.error(format!("invalid hex digit '{}'", c)))?;
            code = code * 16 + digit;
            self.bump();
        }
        char::from_u32(code).ok_or_else(|| self.error("invalid unicode escape".to_owned()))
    }

    // Cursor primitives.

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), UpdateParseError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => self.bump(),
                Some('#') => {
                    while let Some(c) = self.peek() {
                        self.bump();
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn is_word_continuation(&self, pos: usize) -> bool {
        self.chars
            .get(pos)
            .is_some_and(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || *c == ':')
    }

    /// Try to consume given keyword case-insensitively at the
    /// cursor, respecting word boundaries.
    fn try_keyword(&mut self, keyword: &str) -> bool {
        self.skip_trivia();
        let len = keyword.len();
        let candidate: String = self.chars.iter().skip(self.pos).take(len).collect();
        if !candidate.eq_ignore_ascii_case(keyword) {
            return false;
        }
        // Not a keyword if it continues into a longer word or a pname.
        if self.is_word_continuation(self.pos + len) {
            return false;
        }
        for _ in 0..len {
            self.bump();
        }
        true
    }

    fn error(&self, message: String) -> UpdateParseError {
        UpdateParseError {
            line: self.line,
            column: self.column,
            message,
        }
    }
}
