use crate::PATH_SEPARATOR;
use crate::error::{ResolveError, StructuralError};
use crate::model::{ObjectOrReference, PathItem};
use crate::validate::{Context, Validate};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Relative paths to their path items, keyed by path template such as `/pets/{petId}`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Paths(pub BTreeMap<String, ObjectOrReference<PathItem>>);

/// A request path resolved against a path template.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatch<'a> {
    pub template: &'a str,
    pub item: &'a ObjectOrReference<PathItem>,
    /// Values captured by the template placeholders, percent-decoded.
    pub parameters: HashMap<String, String>,
}

/// A piece of a mixed template segment such as `{file}.{ext}`.
#[derive(Debug, PartialEq)]
enum Piece<'t> {
    Literal(&'t str),
    Parameter(&'t str),
}

/// One `/` separated segment of a path template.
#[derive(Debug, PartialEq)]
enum PathSegment<'t> {
    /// A literal segment, e.g. `pets`.
    Static(&'t str),

    /// Literals and placeholders sharing a segment, e.g. `{file}.json`.
    Mixed(Vec<Piece<'t>>),

    /// A whole segment placeholder, e.g. `{petId}`.
    Parameter(&'t str),
}

impl<'t> PathSegment<'t> {
    fn parse(segment: &'t str) -> Self {
        let mut pieces = Vec::new();
        let mut rest = segment;
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|close| open + close) else {
                break;
            };
            if open > 0 {
                pieces.push(Piece::Literal(&rest[..open]));
            }
            pieces.push(Piece::Parameter(&rest[open + 1..close]));
            rest = &rest[close + 1..];
        }
        if !rest.is_empty() {
            pieces.push(Piece::Literal(rest));
        }

        if let [Piece::Parameter(name)] = pieces.as_slice() {
            return PathSegment::Parameter(name);
        }
        if pieces.iter().all(|piece| matches!(piece, Piece::Literal(_))) {
            return PathSegment::Static(segment);
        }
        PathSegment::Mixed(pieces)
    }

    /// Higher is more specific.
    fn rank(&self) -> u8 {
        match self {
            PathSegment::Static(_) => 2,
            PathSegment::Mixed(_) => 1,
            PathSegment::Parameter(_) => 0,
        }
    }

    fn matches(&self, request_segment: &str, captures: &mut Vec<(String, String)>) -> bool {
        match self {
            PathSegment::Static(literal) => *literal == request_segment,
            PathSegment::Parameter(name) => {
                if request_segment.is_empty() {
                    return false;
                }
                captures.push((name.to_string(), request_segment.to_string()));
                true
            }
            PathSegment::Mixed(pieces) => match_pieces(pieces, request_segment, captures),
        }
    }
}

/// Matches pieces left to right, trying every non-empty length for each placeholder.
fn match_pieces(pieces: &[Piece], input: &str, captures: &mut Vec<(String, String)>) -> bool {
    match pieces.split_first() {
        None => input.is_empty(),
        Some((Piece::Literal(literal), rest)) => input
            .strip_prefix(*literal)
            .is_some_and(|remaining| match_pieces(rest, remaining, captures)),
        Some((Piece::Parameter(name), rest)) => {
            for end in (1..=input.len()).filter(|end| input.is_char_boundary(*end)) {
                let mark = captures.len();
                captures.push((name.to_string(), input[..end].to_string()));
                if match_pieces(rest, &input[end..], captures) {
                    return true;
                }
                captures.truncate(mark);
            }
            false
        }
    }
}

const EMPTY_SEGMENT_FILTER: fn(&&str) -> bool = |s| !s.is_empty();

fn split_path_segments(path: &str) -> Vec<&str> {
    path.split(PATH_SEPARATOR)
        .filter(EMPTY_SEGMENT_FILTER)
        .collect()
}

struct Candidate<'a> {
    template: &'a str,
    item: &'a ObjectOrReference<PathItem>,
    rank: Vec<u8>,
    captures: Vec<(String, String)>,
}

impl Paths {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ObjectOrReference<PathItem>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the path item registered for the template matching `path`.
    ///
    /// # Examples
    /// ```
    /// use oasgraph::model::Paths;
    /// use serde_json::json;
    ///
    /// let paths: Paths = serde_json::from_value(json!({
    ///     "/pets": { "get": { "operationId": "listPets" } },
    ///     "/pets/{petId}": { "get": { "operationId": "showPetById" } }
    /// }))
    /// .unwrap();
    /// let item = paths.get("/pets/0").unwrap().as_object().unwrap();
    /// let operation = item.get_operation("GET").unwrap().unwrap();
    /// assert_eq!(operation.operation_id(), Some("showPetById"));
    /// assert!(paths.get("/unknown").is_err());
    /// ```
    pub fn get(&self, path: &str) -> Result<&ObjectOrReference<PathItem>, ResolveError> {
        self.find(path).map(|found| found.item)
    }

    /// Resolves a concrete request path to the best matching template.
    ///
    /// # Parameters
    /// - `path`: The request path without query string, e.g. `/pets/42`
    ///
    /// # Returns
    /// The matching template, its path item and the captured placeholder values,
    /// or `ResolveError::UndefinedPath` when no template matches.
    ///
    /// # Behavior
    /// A literal key equal to `path` wins outright. Otherwise every template is
    /// compared segment by segment against the percent-decoded request segments.
    /// Among several matches the one with the most specific segments from left
    /// to right wins (static over mixed over placeholder). Equally specific
    /// templates are ambiguous; the first in lexicographic order is used.
    pub fn find(&self, path: &str) -> Result<PathMatch<'_>, ResolveError> {
        if let Some((template, item)) = self.0.get_key_value(path) {
            log::debug!("Exact path match for {}", path);
            return Ok(PathMatch {
                template,
                item,
                parameters: HashMap::new(),
            });
        }

        let request_segments: Vec<String> = split_path_segments(path)
            .into_iter()
            .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
            .collect();

        let mut best: Option<Candidate> = None;
        for (template, item) in &self.0 {
            let template_segments: Vec<PathSegment> = split_path_segments(template)
                .into_iter()
                .map(PathSegment::parse)
                .collect();
            if template_segments.len() != request_segments.len() {
                continue;
            }

            let mut captures = Vec::new();
            let matched = template_segments
                .iter()
                .zip(&request_segments)
                .all(|(segment, request_segment)| segment.matches(request_segment, &mut captures));
            log::trace!("Template {} against {}: {}", template, path, matched);
            if !matched {
                continue;
            }

            let candidate = Candidate {
                template,
                item,
                rank: template_segments.iter().map(PathSegment::rank).collect(),
                captures,
            };
            best = match best {
                None => Some(candidate),
                Some(current) => match candidate.rank.cmp(&current.rank) {
                    Ordering::Greater => Some(candidate),
                    Ordering::Less => Some(current),
                    Ordering::Equal => {
                        log::warn!(
                            "Path {} matches both {} and {}, using {}",
                            path,
                            current.template,
                            candidate.template,
                            current.template
                        );
                        Some(current)
                    }
                },
            };
        }

        match best {
            Some(found) => {
                log::debug!("Resolved path {} to template {}", path, found.template);
                Ok(PathMatch {
                    template: found.template,
                    item: found.item,
                    parameters: found.captures.into_iter().collect(),
                })
            }
            None => Err(ResolveError::undefined_path(path)),
        }
    }

    /// Looks up a path item by its template string, without any matching.
    pub fn by_template(&self, template: &str) -> Option<&ObjectOrReference<PathItem>> {
        self.0.get(template)
    }
}

impl Validate for Paths {
    fn validate(&self) -> Result<(), StructuralError> {
        for (template, item) in &self.0 {
            if !template.starts_with(PATH_SEPARATOR) {
                return Err(StructuralError::invalid_field(
                    "paths",
                    format!("\"{}\" must begin with a slash", template),
                ));
            }
            item.validate()
                .context(format!("pathItem \"{}\"", template))?;
        }
        Ok(())
    }
}
