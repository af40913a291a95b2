//! Query-string syntax
//!
//! The textual form of a search expression as it travels in URLs:
//!
//! ```text
//! title=birds AND (NOT md.place.text=Berlin OR created>2020) lorem ipsum
//! ```
//!
//! Operands are pairs (`field<op>value`, `md.<index>[.<subfield>]<op>value`,
//! `collection.md.<label><op>value`, `technical[<label>]<op>value`), parenthesised
//! groups, or free text.
//! `NOT` prefixes an operand; `AND` / `OR` separate operands and adjacent
//! operands are joined by an implicit `AND`. The characters `( ) = > <` are
//! escaped with `\` inside values.

use regex::Regex;
use std::sync::OnceLock;

use atrium_models::search::{
    LogicalRelation, MetadataSubfield, PairTarget, SearchElement, SearchField, SearchGroup,
    SearchOperator, SearchPair, SearchQuery,
};

use crate::error::{Error, Result};

const ESCAPE: char = '\\';
const SPECIAL_CHARACTERS: [char; 6] = ['(', ')', '=', '>', '<', ESCAPE];
const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    And,
    Or,
    Not,
    /// Raw operand text, escapes preserved.
    Operand(String),
}

struct Lexer {
    chars: Vec<char>,
    position: usize,
    tokens: Vec<Token>,
    operand: String,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
            tokens: Vec::new(),
            operand: String::new(),
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn at_word_start(&self) -> bool {
        self.position == 0
            || matches!(self.chars[self.position - 1], c if c.is_whitespace() || c == '(' || c == ')')
    }

    fn peek_word(&self) -> String {
        self.chars[self.position..]
            .iter()
            .take_while(|&&c| !c.is_whitespace() && !matches!(c, '(' | ')' | ESCAPE))
            .collect()
    }

    fn flush_operand(&mut self) {
        let text = self.operand.trim();
        if !text.is_empty() {
            self.tokens.push(Token::Operand(text.to_string()));
        }
        self.operand.clear();
    }

    fn tokenize(mut self) -> Vec<Token> {
        while let Some(c) = self.current() {
            match c {
                ESCAPE => {
                    self.operand.push(c);
                    self.position += 1;
                    if let Some(escaped) = self.current() {
                        self.operand.push(escaped);
                        self.position += 1;
                    }
                }
                '(' | ')' => {
                    self.flush_operand();
                    self.tokens
                        .push(if c == '(' { Token::Open } else { Token::Close });
                    self.position += 1;
                }
                c if c.is_whitespace() || !self.at_word_start() => {
                    self.operand.push(c);
                    self.position += 1;
                }
                _ => {
                    let word = self.peek_word();
                    let keyword = match word.as_str() {
                        "AND" => Some(Token::And),
                        "OR" => Some(Token::Or),
                        // only in front of an operand, never inside a value
                        "NOT" if self.operand.trim().is_empty() => Some(Token::Not),
                        _ => None,
                    };
                    match keyword {
                        Some(token) => {
                            self.flush_operand();
                            self.tokens.push(token);
                        }
                        None => self.operand.push_str(&word),
                    }
                    self.position += word.chars().count();
                }
            }
        }
        self.flush_operand();
        self.tokens
    }
}

/// Parses query strings into search expressions.
#[derive(Debug, Clone, Copy)]
pub struct QueryParser {
    fulltext: bool,
}

impl Default for QueryParser {
    fn default() -> Self {
        Self { fulltext: true }
    }
}

impl QueryParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether free text also searches file contents. On by default.
    pub fn with_fulltext(mut self, fulltext: bool) -> Self {
        self.fulltext = fulltext;
        self
    }

    pub fn parse(&self, query: &str) -> Result<SearchQuery> {
        let tokens = Lexer::new(query).tokenize();
        let mut cursor = Cursor {
            tokens,
            position: 0,
            fulltext: self.fulltext,
        };
        Ok(SearchQuery::new(cursor.parse_sequence(0)?))
    }

    /// Parse a URL-encoded query string.
    pub fn parse_url_encoded(&self, query: &str) -> Result<SearchQuery> {
        let query = query.replace('+', " ");
        let decoded = urlencoding::decode(&query)
            .map_err(|e| Error::Parse(format!("query is not valid UTF-8: {e}")))?;
        self.parse(&decoded)
    }
}

struct Cursor {
    tokens: Vec<Token>,
    position: usize,
    fulltext: bool,
}

impl Cursor {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    /// Operands and relations up to the end of input or a closing `)`.
    fn parse_sequence(&mut self, depth: usize) -> Result<Vec<SearchElement>> {
        if depth > MAX_NESTING_DEPTH {
            return Err(Error::Parse(format!(
                "query too deeply nested (max depth: {MAX_NESTING_DEPTH})"
            )));
        }

        let mut elements: Vec<SearchElement> = Vec::new();
        while let Some(token) = self.peek() {
            match token {
                Token::Close => {
                    if depth == 0 {
                        return Err(Error::Parse(
                            "unbalanced parentheses: unexpected ')'".into(),
                        ));
                    }
                    break;
                }
                Token::And | Token::Or => {
                    let relation = if *token == Token::And {
                        LogicalRelation::And
                    } else {
                        LogicalRelation::Or
                    };
                    if matches!(elements.last(), None | Some(SearchElement::Relation { .. })) {
                        return Err(Error::Parse(format!("'{relation}' without left operand")));
                    }
                    self.position += 1;
                    elements.push(relation.into());
                }
                _ => {
                    if matches!(elements.last(), Some(e) if !matches!(e, SearchElement::Relation { .. }))
                    {
                        elements.push(SearchElement::and());
                    }
                    let operand = self.parse_operand(depth)?;
                    elements.push(operand);
                }
            }
        }

        if let Some(SearchElement::Relation { relation }) = elements.last() {
            return Err(Error::Parse(format!("'{relation}' without right operand")));
        }
        Ok(elements)
    }

    fn parse_operand(&mut self, depth: usize) -> Result<SearchElement> {
        let mut negate = false;
        while self.peek() == Some(&Token::Not) {
            self.position += 1;
            negate = !negate;
        }

        match self.advance() {
            Some(Token::Open) => {
                let elements = self.parse_sequence(depth + 1)?;
                if self.advance() != Some(Token::Close) {
                    return Err(Error::Parse("unbalanced parentheses: missing ')'".into()));
                }
                let mut group = SearchGroup::new(elements);
                group.negate = negate;
                Ok(group.into())
            }
            Some(Token::Operand(text)) => parse_operand_text(&text, negate, self.fulltext),
            Some(token) => Err(Error::Parse(format!("expected an operand, got {token:?}"))),
            None => Err(Error::Parse("expected an operand, got end of query".into())),
        }
    }
}

fn technical_re() -> &'static Regex {
    static TECHNICAL_RE: OnceLock<Regex> = OnceLock::new();
    TECHNICAL_RE.get_or_init(|| {
        Regex::new(r"(?s)^technical\[([^\]]+)\](>=|<=|[=<>])(.*)$")
            .expect("technical pair regex must compile")
    })
}

fn metadata_re() -> &'static Regex {
    static METADATA_RE: OnceLock<Regex> = OnceLock::new();
    METADATA_RE.get_or_init(|| {
        Regex::new(r"(?s)^md\.([A-Za-z0-9:_\-]+)(?:\.([A-Za-z]+))?(>=|<=|[=<>])(.*)$")
            .expect("metadata pair regex must compile")
    })
}

fn collection_metadata_re() -> &'static Regex {
    static COLLECTION_METADATA_RE: OnceLock<Regex> = OnceLock::new();
    COLLECTION_METADATA_RE.get_or_init(|| {
        Regex::new(r"(?s)^collection\.md\.([A-Za-z0-9:_\-\.]+?)(>=|<=|[=<>])(.*)$")
            .expect("collection metadata pair regex must compile")
    })
}

fn pair_re() -> &'static Regex {
    static PAIR_RE: OnceLock<Regex> = OnceLock::new();
    PAIR_RE.get_or_init(|| {
        Regex::new(r"(?s)^([A-Za-z0-9_\-\.]+)(>=|<=|[=<>])(.*)$")
            .expect("pair regex must compile")
    })
}

fn parse_operand_text(text: &str, negate: bool, fulltext: bool) -> Result<SearchElement> {
    if let Some(caps) = technical_re().captures(text) {
        let pair = SearchPair::technical(
            &caps[1],
            parse_operator(&caps[2]),
            unescape(caps[3].trim()),
        );
        return Ok(with_negation(pair, negate).into());
    }

    if let Some(caps) = metadata_re().captures(text) {
        let subfield = caps
            .get(2)
            .map(|m| m.as_str().parse::<MetadataSubfield>())
            .transpose()
            .map_err(|e| Error::Parse(e.to_string()))?;
        let pair = SearchPair::metadata(
            &caps[1],
            subfield,
            parse_operator(&caps[3]),
            unescape(caps[4].trim()),
        );
        return Ok(with_negation(pair, negate).into());
    }

    if let Some(caps) = collection_metadata_re().captures(text) {
        // labels travel with underscores for spaces
        let pair = SearchPair::collection_metadata(
            caps[1].replace('_', " "),
            parse_operator(&caps[2]),
            unescape(caps[3].trim()),
        );
        return Ok(with_negation(pair, negate).into());
    }

    if let Some(caps) = pair_re().captures(text) {
        let field: SearchField = caps[1]
            .parse()
            .map_err(|e: atrium_models::Error| Error::Parse(e.to_string()))?;
        let pair = SearchPair::new(field, parse_operator(&caps[2]), unescape(caps[3].trim()));
        return Ok(with_negation(pair, negate).into());
    }

    let text = unescape(text);
    let all = SearchPair::new(SearchField::All, SearchOperator::Equals, text.clone());
    if !fulltext {
        return Ok(with_negation(all, negate).into());
    }
    let mut group = SearchGroup::new(vec![
        all.into(),
        SearchElement::or(),
        SearchPair::new(SearchField::Fulltext, SearchOperator::Equals, text).into(),
    ]);
    group.negate = negate;
    Ok(group.into())
}

fn with_negation(mut pair: SearchPair, negate: bool) -> SearchPair {
    pair.negate = negate;
    pair
}

/// `>=` and `<=` are accepted as spellings of the inclusive comparisons.
fn parse_operator(op: &str) -> SearchOperator {
    match op {
        ">" | ">=" => SearchOperator::Greater,
        "<" | "<=" => SearchOperator::Lesser,
        _ => SearchOperator::Equals,
    }
}

fn operator_symbol(op: SearchOperator) -> &'static str {
    match op {
        SearchOperator::Greater => ">",
        SearchOperator::Lesser => "<",
        SearchOperator::Equals | SearchOperator::Regex => "=",
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if SPECIAL_CHARACTERS.contains(&c) {
            escaped.push(ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn unescape(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            if let Some(escaped) = chars.next() {
                unescaped.push(escaped);
            }
        } else {
            unescaped.push(c);
        }
    }
    unescaped
}

/// Parse a query string with full-text fan-out enabled.
pub fn parse(query: &str) -> Result<SearchQuery> {
    QueryParser::new().parse(query)
}

/// Parse a URL-encoded query string with full-text fan-out enabled.
pub fn parse_url_encoded(query: &str) -> Result<SearchQuery> {
    QueryParser::new().parse_url_encoded(query)
}

/// The query-string form of an expression. Empty groups are dropped.
pub fn to_query_string(query: &SearchQuery) -> String {
    elements_to_string(&query.elements)
}

pub fn to_url_encoded(query: &SearchQuery) -> String {
    urlencoding::encode(&to_query_string(query)).into_owned()
}

fn elements_to_string(elements: &[SearchElement]) -> String {
    elements
        .iter()
        .map(|element| match element {
            SearchElement::Pair(pair) => pair_to_string(pair),
            SearchElement::Group(group) => {
                let inner = elements_to_string(&group.elements);
                if inner.is_empty() {
                    inner
                } else {
                    format!("{}({inner})", not_prefix(group.negate))
                }
            }
            SearchElement::Relation { relation } => relation.to_string(),
        })
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn pair_to_string(pair: &SearchPair) -> String {
    let target = match &pair.target {
        PairTarget::Field { field } => field.to_string(),
        PairTarget::Metadata { index, subfield: Some(subfield) } => format!("md.{index}.{subfield}"),
        PairTarget::Metadata { index, subfield: None } => format!("md.{index}"),
        PairTarget::Technical { label } => format!("technical[{label}]"),
        PairTarget::CollectionMetadata { label } => {
            format!("collection.md.{}", label.replace(' ', "_"))
        }
    };
    format!(
        "{}{target}{}{}",
        not_prefix(pair.negate),
        operator_symbol(pair.operator),
        escape(&pair.value)
    )
}

fn not_prefix(negate: bool) -> &'static str {
    if negate {
        "NOT "
    } else {
        ""
    }
}

/// Whether the query came from a simple search box: a top-level free-text
/// pair, or the free-text group the parser builds for one.
pub fn is_simple_search(query: &SearchQuery) -> bool {
    query.elements.iter().any(|element| match element {
        SearchElement::Pair(pair) => pair.field() == Some(SearchField::All),
        SearchElement::Group(group) => group.elements.iter().any(
            |e| matches!(e, SearchElement::Pair(pair) if pair.field() == Some(SearchField::All)),
        ),
        SearchElement::Relation { .. } => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(field: SearchField, value: &str) -> SearchElement {
        SearchPair::new(field, SearchOperator::Equals, value).into()
    }

    #[test]
    fn single_pair() {
        let q = parse("title=birds of prey").unwrap();
        assert_eq!(q.elements, vec![eq(SearchField::Title, "birds of prey")]);
    }

    #[test]
    fn relations_and_groups() {
        let q = parse("title=a AND (created>2020 OR NOT status=public)").unwrap();
        let expected_group = SearchGroup::new(vec![
            SearchPair::new(SearchField::Created, SearchOperator::Greater, "2020").into(),
            SearchElement::or(),
            SearchPair::new(SearchField::Status, SearchOperator::Equals, "public")
                .negated()
                .into(),
        ]);
        assert_eq!(
            q.elements,
            vec![eq(SearchField::Title, "a"), SearchElement::and(), expected_group.into()]
        );
    }

    #[test]
    fn adjacent_operands_get_implicit_and() {
        let q = QueryParser::new()
            .with_fulltext(false)
            .parse("(title=a) (title=b)")
            .unwrap();
        assert_eq!(q.elements.len(), 3);
        assert_eq!(q.elements[1], SearchElement::and());
    }

    #[test]
    fn free_text_fans_out_to_fulltext() {
        let q = parse("lorem ipsum").unwrap();
        let expected = SearchGroup::new(vec![
            eq(SearchField::All, "lorem ipsum"),
            SearchElement::or(),
            eq(SearchField::Fulltext, "lorem ipsum"),
        ]);
        assert_eq!(q.elements, vec![expected.into()]);
        assert!(is_simple_search(&q));

        let q = QueryParser::new().with_fulltext(false).parse("lorem").unwrap();
        assert_eq!(q.elements, vec![eq(SearchField::All, "lorem")]);
    }

    #[test]
    fn metadata_and_technical_pairs() {
        let q = parse("md.place.coordinates=52.5,13.4 AND NOT technical[Make]=Canon").unwrap();
        assert_eq!(
            q.elements,
            vec![
                SearchPair::metadata(
                    "place",
                    Some(MetadataSubfield::Coordinates),
                    SearchOperator::Equals,
                    "52.5,13.4"
                )
                .into(),
                SearchElement::and(),
                SearchPair::technical("Make", SearchOperator::Equals, "Canon")
                    .negated()
                    .into(),
            ]
        );
    }

    #[test]
    fn collection_metadata_pairs() {
        let q = parse("collection.md.Project_name=Atlas AND NOT collection.md.Funding<2000").unwrap();
        assert_eq!(
            q.elements,
            vec![
                SearchPair::collection_metadata("Project name", SearchOperator::Equals, "Atlas")
                    .into(),
                SearchElement::and(),
                SearchPair::collection_metadata("Funding", SearchOperator::Lesser, "2000")
                    .negated()
                    .into(),
            ]
        );
        assert_eq!(
            to_query_string(&q),
            "collection.md.Project_name=Atlas AND NOT collection.md.Funding<2000"
        );
    }

    #[test]
    fn keywords_next_to_parentheses() {
        let q = parse("(title=a)OR(title=b)").unwrap();
        assert_eq!(q.elements.len(), 3);
        assert_eq!(q.elements[1], SearchElement::or());
    }

    #[test]
    fn inclusive_comparisons_are_accepted() {
        let q = parse("md.size.number>=10 AND md.size.number<=20").unwrap();
        let ops: Vec<SearchOperator> = q.pairs().iter().map(|p| p.operator).collect();
        assert_eq!(ops, vec![SearchOperator::Greater, SearchOperator::Lesser]);
    }

    #[test]
    fn escaped_characters_stay_in_values() {
        let q = parse(r"title=a \(b\) \= c").unwrap();
        assert_eq!(q.elements, vec![eq(SearchField::Title, "a (b) = c")]);
    }

    #[test]
    fn keywords_inside_words_are_values() {
        let q = parse("title=ORCHID NOTES").unwrap();
        assert_eq!(q.elements, vec![eq(SearchField::Title, "ORCHID NOTES")]);
    }

    #[test]
    fn malformed_queries_are_rejected() {
        for query in [
            "colour=red",
            "md.place.altitude=3",
            "(title=a",
            "title=a)",
            "title=a AND",
            "OR title=a",
            "NOT",
        ] {
            assert!(matches!(parse(query), Err(Error::Parse(_))), "query {query:?}");
        }
    }

    #[test]
    fn empty_query_has_no_elements() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("   ").unwrap().is_empty());
    }

    #[test]
    fn query_string_round_trip() {
        let text = r"title=a \(b\) AND NOT (created>2020 OR md.n.number<5) OR technical[ISO]=100";
        let q = parse(text).unwrap();
        assert_eq!(to_query_string(&q), text);
        assert_eq!(parse(&to_query_string(&q)).unwrap(), q);
    }

    #[test]
    fn url_encoded_round_trip() {
        let q = parse("title=a&b AND status=public").unwrap();
        let encoded = to_url_encoded(&q);
        assert!(!encoded.contains(' '));
        assert_eq!(parse_url_encoded(&encoded).unwrap(), q);
        assert_eq!(parse_url_encoded("title=a+b").unwrap().elements, vec![eq(SearchField::Title, "a b")]);
    }

    #[test]
    fn regex_operator_serialises_as_equals() {
        let q = SearchQuery::new(vec![
            SearchPair::new(SearchField::Title, SearchOperator::Regex, "x").into(),
        ]);
        assert_eq!(to_query_string(&q), "title=x");
    }
}
