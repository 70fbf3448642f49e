//! Version matching.
//!
//! Documents declare a `version` that is either a single version (`18`,
//! `2.1.0`) or a range (`^18`, `>=1.2 <2`, `2.x`). Callers ask for a range.
//! A single version must satisfy the requested range; a declared range must
//! intersect it. Pre-releases take part in every comparison.
//!
//! Anything that cannot be parsed degrades to a substring check in both
//! directions, reported as [`MatchOutcome::Fallback`] so callers can tell a
//! confident answer from a lenient one.
//!
//! # Example
//!
//! ```rust
//! use quire_extract::version::{match_version, satisfies_version, MatchOutcome};
//!
//! assert!(satisfies_version(Some("any"), Some("^3")));
//! assert!(satisfies_version(Some("2.x"), Some("2")));
//! assert!(!satisfies_version(Some("1.0.0"), Some("2")));
//! assert_eq!(
//!     match_version(Some("latest"), Some("2")),
//!     MatchOutcome::Fallback { matched: false }
//! );
//! ```

use std::cmp::Ordering;
use std::sync::LazyLock;

use quire_core::{Error, Result};
use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};

/// Document versions that match every request.
pub const WILDCARD_VERSIONS: &[&str] = &["any", "index"];

static RANGE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\^~<>\-\s]").expect("Invalid range character regex"));

static X_MINOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.x").expect("Invalid x-range regex"));

static BARE_MAJOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("Invalid major regex"));

static COERCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,16})(?:\.(\d{1,16}))?(?:\.(\d{1,16}))?").expect("Invalid coerce regex")
});

static HYPHEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+-\s+(\S+)$").expect("Invalid hyphen range regex"));

// ============================================================================
// Match outcome
// ============================================================================

/// Result of comparing a document version with a requested range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Parsed and matched (or nothing was requested).
    Matched,
    /// Parsed and did not match, or the document has no version.
    Rejected,
    /// Parsing failed; `matched` is the substring check.
    Fallback {
        /// Whether either string contains the other.
        matched: bool,
    },
}

impl MatchOutcome {
    /// Whether the document should be accepted.
    pub fn is_match(self) -> bool {
        match self {
            MatchOutcome::Matched => true,
            MatchOutcome::Rejected => false,
            MatchOutcome::Fallback { matched } => matched,
        }
    }

    /// Whether the answer came from the substring fallback.
    pub fn is_fallback(self) -> bool {
        matches!(self, MatchOutcome::Fallback { .. })
    }

    fn from_bool(matched: bool) -> Self {
        if matched {
            MatchOutcome::Matched
        } else {
            MatchOutcome::Rejected
        }
    }
}

/// Compare a document's declared version with a requested range.
///
/// A missing or blank request always matches. A missing or blank document
/// version never matches a real request.
pub fn match_version(doc_version: Option<&str>, requested: Option<&str>) -> MatchOutcome {
    let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) else {
        return MatchOutcome::Matched;
    };
    let Some(declared) = doc_version.map(strip_version_quotes).filter(|v| !v.is_empty()) else {
        return MatchOutcome::Rejected;
    };
    if WILDCARD_VERSIONS.contains(&declared) {
        return MatchOutcome::Matched;
    }

    let wanted = if BARE_MAJOR_RE.is_match(requested) {
        format!("^{requested}.0.0")
    } else {
        requested.to_string()
    };
    let wanted = match VersionRange::parse(&wanted) {
        Ok(range) => range,
        Err(e) => {
            log::debug!("Requested range {requested:?} unparsable ({e}), using substring match");
            return substring_fallback(declared, requested);
        }
    };

    if looks_like_range(declared) {
        let normalized = X_MINOR_RE.replace_all(declared, "${1}.0.0");
        match VersionRange::parse(&normalized) {
            Ok(range) => MatchOutcome::from_bool(range.intersects(&wanted)),
            Err(e) => {
                log::debug!("Document range {declared:?} unparsable ({e}), using substring match");
                substring_fallback(declared, requested)
            }
        }
    } else {
        match coerce(declared) {
            Some(version) => MatchOutcome::from_bool(wanted.matches(&version)),
            None => {
                log::debug!("Document version {declared:?} not coercible, using substring match");
                substring_fallback(declared, requested)
            }
        }
    }
}

/// Boolean form of [`match_version`].
pub fn satisfies_version(doc_version: Option<&str>, requested: Option<&str>) -> bool {
    match_version(doc_version, requested).is_match()
}

fn substring_fallback(declared: &str, requested: &str) -> MatchOutcome {
    MatchOutcome::Fallback {
        matched: declared.contains(requested) || requested.contains(declared),
    }
}

/// Strip surrounding whitespace and one optional quote at each end.
fn strip_version_quotes(raw: &str) -> &str {
    let s = raw.trim();
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    let s = s.strip_suffix(['"', '\'']).unwrap_or(s);
    s.trim()
}

/// Whether a declared version should be read as a range.
pub fn looks_like_range(version: &str) -> bool {
    RANGE_CHARS_RE.is_match(version) || version.contains('x')
}

/// The first `major[.minor[.patch]]` run in `input`, zero-filled.
///
/// ```rust
/// use quire_extract::version::coerce;
///
/// assert_eq!(coerce("v18").unwrap().to_string(), "18.0.0");
/// assert_eq!(coerce("node 20.4").unwrap().to_string(), "20.4.0");
/// assert!(coerce("latest").is_none());
/// ```
pub fn coerce(input: &str) -> Option<Version> {
    let caps = COERCE_RE.captures(input)?;
    let part = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

// ============================================================================
// Ranges
// ============================================================================

/// A union of version intervals, parsed from range syntax.
///
/// Supports `||` alternatives, hyphen ranges (`1.2 - 2`), wildcards
/// (`*`, `1.x`, `1.2.*`), caret and tilde ranges, and the comparison
/// operators `<`, `<=`, `>`, `>=` and `=`. Whitespace-separated comparators
/// in one alternative must all hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    alternatives: Vec<Interval>,
}

impl VersionRange {
    /// Parse range syntax.
    pub fn parse(input: &str) -> Result<Self> {
        let alternatives = input
            .split("||")
            .map(|alt| parse_alternative(alt.trim()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { alternatives })
    }

    /// Whether `version` lies in the range.
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|i| i.contains(version))
    }

    /// Whether at least one version lies in both ranges.
    pub fn intersects(&self, other: &VersionRange) -> bool {
        self.alternatives
            .iter()
            .any(|a| other.alternatives.iter().any(|b| !a.intersect(b).is_empty()))
    }
}

fn parse_alternative(input: &str) -> Result<Interval> {
    if input.is_empty() {
        return Ok(Interval::all());
    }

    if let Some(caps) = HYPHEN_RE.captures(input) {
        let from = parse_partial(&caps[1])?;
        let to = parse_partial(&caps[2])?;
        return Ok(hyphen_interval(&from, &to));
    }

    let mut interval = Interval::all();
    for token in join_bare_operators(input) {
        let (op, rest) = split_operator(&token);
        let partial = parse_partial(rest)?;
        interval = interval.intersect(&comparator_interval(op, &partial));
    }
    Ok(interval)
}

/// Glue `>= 1.2` into `>=1.2`.
fn join_bare_operators(input: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut pending = String::new();
    for word in input.split_whitespace() {
        if word.chars().all(|c| matches!(c, '<' | '>' | '=' | '^' | '~')) {
            pending.push_str(word);
            continue;
        }
        tokens.push(format!("{pending}{word}"));
        pending.clear();
    }
    if !pending.is_empty() {
        tokens.push(pending);
    }
    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Exact,
    Caret,
    Tilde,
    Gt,
    Ge,
    Lt,
    Le,
}

fn split_operator(token: &str) -> (Op, &str) {
    const OPERATORS: &[(&str, Op)] = &[
        (">=", Op::Ge),
        ("<=", Op::Le),
        ("~>", Op::Tilde),
        (">", Op::Gt),
        ("<", Op::Lt),
        ("^", Op::Caret),
        ("~", Op::Tilde),
        ("=", Op::Exact),
    ];
    for (prefix, op) in OPERATORS {
        if let Some(rest) = token.strip_prefix(prefix) {
            return (*op, rest.trim());
        }
    }
    (Op::Exact, token)
}

/// A version with wildcard or missing trailing components.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Partial {
    fn full(&self) -> Option<Version> {
        Some(Version {
            major: self.major?,
            minor: self.minor?,
            patch: self.patch?,
            pre: self.pre.clone(),
            build: BuildMetadata::EMPTY,
        })
    }

    /// Lowest version the partial admits. A partial with missing
    /// components starts at the `-0` pre-release of its zero-filled core.
    fn lower(&self) -> Option<Version> {
        let major = self.major?;
        Some(self.full().unwrap_or_else(|| {
            floor(major, self.minor.unwrap_or(0), self.patch.unwrap_or(0))
        }))
    }
}

fn is_wildcard(part: &str) -> bool {
    matches!(part, "x" | "X" | "*")
}

fn parse_partial(input: &str) -> Result<Partial> {
    let s = input.trim();
    let s = s.strip_prefix(['v', 'V']).unwrap_or(s);
    let s = s.split_once('+').map_or(s, |(core, _build)| core);
    let mut partial = Partial {
        major: None,
        minor: None,
        patch: None,
        pre: Prerelease::EMPTY,
    };
    if s.is_empty() || is_wildcard(s) {
        return Ok(partial);
    }

    let (core, pre) = match s.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (s, None),
    };
    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3 {
        return Err(Error::parse(format!("Too many version components in '{input}'")));
    }

    let mut numbers = [None; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        if is_wildcard(part) {
            break;
        }
        let n = part
            .parse::<u64>()
            .map_err(|_| Error::parse(format!("Invalid version component '{part}' in '{input}'")))?;
        *slot = Some(n);
    }
    [partial.major, partial.minor, partial.patch] = numbers;

    if let Some(pre) = pre {
        if partial.patch.is_none() {
            return Err(Error::parse(format!("Pre-release on partial version '{input}'")));
        }
        partial.pre = Prerelease::new(pre)
            .map_err(|e| Error::parse(format!("Invalid pre-release in '{input}': {e}")))?;
    }
    Ok(partial)
}

/// `major.minor.patch-0`, the lowest version with that core.
fn floor(major: u64, minor: u64, patch: u64) -> Version {
    Version {
        major,
        minor,
        patch,
        pre: Prerelease::new("0").unwrap_or(Prerelease::EMPTY),
        build: BuildMetadata::EMPTY,
    }
}

/// Exclusive upper bound for everything under a partial's last given part.
fn next_floor(p: &Partial) -> Option<Version> {
    match (p.major, p.minor, p.patch) {
        (Some(major), None, _) => Some(floor(major.saturating_add(1), 0, 0)),
        (Some(major), Some(minor), None) => Some(floor(major, minor.saturating_add(1), 0)),
        _ => None,
    }
}

fn comparator_interval(op: Op, p: &Partial) -> Interval {
    let Some(major) = p.major else {
        return match op {
            Op::Gt | Op::Lt => Interval::none(),
            _ => Interval::all(),
        };
    };

    match op {
        Op::Exact => match (p.full(), next_floor(p)) {
            (Some(v), _) => Interval::exactly(v),
            (None, Some(upper)) => Interval::between(p.lower(), upper),
            (None, None) => Interval::all(),
        },
        Op::Caret => {
            let lower = p.lower();
            let upper = match (p.minor, p.patch) {
                _ if major > 0 => floor(major.saturating_add(1), 0, 0),
                (None, _) => floor(1, 0, 0),
                (Some(minor), None) => floor(0, minor.saturating_add(1), 0),
                (Some(minor), Some(_)) if minor > 0 => floor(0, minor.saturating_add(1), 0),
                (Some(_), Some(patch)) => floor(0, 0, patch.saturating_add(1)),
            };
            Interval::between(lower, upper)
        }
        Op::Tilde => {
            let upper = match p.minor {
                None => floor(major.saturating_add(1), 0, 0),
                Some(minor) => floor(major, minor.saturating_add(1), 0),
            };
            Interval::between(p.lower(), upper)
        }
        Op::Gt => match (p.full(), p.minor) {
            (Some(v), _) => Interval::above(v, false),
            (None, None) => Interval::above(floor(major.saturating_add(1), 0, 0), true),
            (None, Some(minor)) => Interval::above(floor(major, minor.saturating_add(1), 0), true),
        },
        Op::Ge => match p.lower() {
            Some(v) => Interval::above(v, true),
            None => Interval::all(),
        },
        Op::Lt => match (p.full(), p.minor) {
            (Some(v), _) => Interval::below(v, false),
            (None, None) => Interval::below(floor(major, 0, 0), false),
            (None, Some(minor)) => Interval::below(floor(major, minor, 0), false),
        },
        Op::Le => match (p.full(), next_floor(p)) {
            (Some(v), _) => Interval::below(v, true),
            (None, Some(upper)) => Interval::below(upper, false),
            (None, None) => Interval::all(),
        },
    }
}

fn hyphen_interval(from: &Partial, to: &Partial) -> Interval {
    let lower = match from.lower() {
        Some(v) => Interval::above(v, true),
        None => Interval::all(),
    };
    let upper = if to.major.is_none() {
        Interval::all()
    } else {
        match (to.full(), next_floor(to)) {
            (Some(v), _) => Interval::below(v, true),
            (None, Some(v)) => Interval::below(v, false),
            (None, None) => Interval::all(),
        }
    };
    lower.intersect(&upper)
}

// ============================================================================
// Intervals
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct Bound {
    version: Version,
    inclusive: bool,
}

/// A contiguous set of versions. The lower bound always exists because
/// `0.0.0-0` is the smallest version.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Interval {
    lower: Bound,
    upper: Option<Bound>,
}

impl Interval {
    fn all() -> Self {
        Self {
            lower: Bound {
                version: floor(0, 0, 0),
                inclusive: true,
            },
            upper: None,
        }
    }

    fn none() -> Self {
        Self::below(floor(0, 0, 0), false)
    }

    fn exactly(version: Version) -> Self {
        Self {
            lower: Bound {
                version: version.clone(),
                inclusive: true,
            },
            upper: Some(Bound {
                version,
                inclusive: true,
            }),
        }
    }

    fn above(version: Version, inclusive: bool) -> Self {
        Self {
            lower: Bound { version, inclusive },
            upper: None,
        }
    }

    fn below(version: Version, inclusive: bool) -> Self {
        Self {
            upper: Some(Bound { version, inclusive }),
            ..Self::all()
        }
    }

    /// `[lower, upper)`, unbounded below when `lower` is `None`.
    fn between(lower: Option<Version>, upper: Version) -> Self {
        let base = match lower {
            Some(v) => Self::above(v, true),
            None => Self::all(),
        };
        base.intersect(&Self::below(upper, false))
    }

    fn intersect(&self, other: &Interval) -> Interval {
        let lower = match self.lower.version.cmp(&other.lower.version) {
            Ordering::Greater => self.lower.clone(),
            Ordering::Less => other.lower.clone(),
            Ordering::Equal => Bound {
                version: self.lower.version.clone(),
                inclusive: self.lower.inclusive && other.lower.inclusive,
            },
        };
        let upper = match (&self.upper, &other.upper) {
            (None, None) => None,
            (Some(u), None) | (None, Some(u)) => Some(u.clone()),
            (Some(a), Some(b)) => Some(match a.version.cmp(&b.version) {
                Ordering::Less => a.clone(),
                Ordering::Greater => b.clone(),
                Ordering::Equal => Bound {
                    version: a.version.clone(),
                    inclusive: a.inclusive && b.inclusive,
                },
            }),
        };
        Interval { lower, upper }
    }

    fn is_empty(&self) -> bool {
        match &self.upper {
            None => false,
            Some(upper) => match self.lower.version.cmp(&upper.version) {
                Ordering::Greater => true,
                Ordering::Equal => !(self.lower.inclusive && upper.inclusive),
                Ordering::Less => false,
            },
        }
    }

    fn contains(&self, version: &Version) -> bool {
        let above = match version.cmp(&self.lower.version) {
            Ordering::Greater => true,
            Ordering::Equal => self.lower.inclusive,
            Ordering::Less => false,
        };
        let below = match &self.upper {
            None => true,
            Some(upper) => match version.cmp(&upper.version) {
                Ordering::Less => true,
                Ordering::Equal => upper.inclusive,
                Ordering::Greater => false,
            },
        };
        above && below
    }
}
