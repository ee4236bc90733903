use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;

/// Message used when the service sends an empty `<error/>`
const UNAUTHORIZED: &str = "Unauthorized access";

/// A classified Oracle of Bacon reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryResponse {
    /// Connection path as alternating actor and movie names, plus the number
    /// of movie links in it (unnamed links included)
    Graph { records: Vec<String>, degrees: usize },
    /// Candidate names when a query name was not found exactly
    SpellingSuggestions { suggestions: Vec<String> },
    /// The service refused the access key
    AuthorizationError { message: String },
    /// Anything else, kept verbatim for diagnostics
    Unknown { raw: String },
}

impl QueryResponse {
    /// Short tag for the variant: `graph`, `spellcheck`, `error` or `unknown`
    pub fn kind(&self) -> &'static str {
        match self {
            QueryResponse::Graph { .. } => "graph",
            QueryResponse::SpellingSuggestions { .. } => "spellcheck",
            QueryResponse::AuthorizationError { .. } => "error",
            QueryResponse::Unknown { .. } => "unknown",
        }
    }

    /// Number of movie links in a graph result
    pub fn degrees(&self) -> Option<usize> {
        match self {
            QueryResponse::Graph { degrees, .. } => Some(*degrees),
            _ => None,
        }
    }
}

/// Root elements the service is known to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    Error,
    Link,
    Spellcheck,
}

impl Root {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"error" => Some(Root::Error),
            b"link" => Some(Root::Link),
            b"spellcheck" => Some(Root::Spellcheck),
            _ => None,
        }
    }
}

/// Text collected from one markup payload
#[derive(Debug, Default)]
struct Scan {
    root: Option<Vec<u8>>,
    root_text: String,
    actors: Vec<String>,
    movies: Vec<String>,
    matches: Vec<String>,
}

/// Which list the text currently being read belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Actor,
    Movie,
    Match,
}

impl Capture {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"actor" => Some(Capture::Actor),
            b"movie" => Some(Capture::Movie),
            b"match" => Some(Capture::Match),
            _ => None,
        }
    }
}

/// Walk the payload once, recording the root element and every actor, movie
/// and match text in document order. Returns `None` on malformed markup.
fn scan(markup: &str) -> Option<Scan> {
    let mut reader = Reader::from_str(markup);
    let mut scan = Scan::default();
    let mut buf = Vec::new();
    let mut depth = 0usize;
    // (kind, depth at which the element opened, text so far)
    let mut current: Option<(Capture, usize, String)> = None;

    loop {
        let text = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if scan.root.is_none() {
                    scan.root = Some(e.name().as_ref().to_vec());
                }
                depth += 1;
                if current.is_none() {
                    if let Some(kind) = Capture::from_name(e.name().as_ref()) {
                        current = Some((kind, depth, String::new()));
                    }
                }
                None
            }
            Ok(Event::Empty(e)) => {
                if scan.root.is_none() {
                    scan.root = Some(e.name().as_ref().to_vec());
                }
                // Self-closed entries still hold their slot in the pairing.
                if current.is_none() {
                    match Capture::from_name(e.name().as_ref()) {
                        Some(Capture::Actor) => scan.actors.push(String::new()),
                        Some(Capture::Movie) => scan.movies.push(String::new()),
                        Some(Capture::Match) => scan.matches.push(String::new()),
                        None => {}
                    }
                }
                None
            }
            Ok(Event::End(_)) => {
                if let Some((kind, opened, text)) = current.take() {
                    if opened == depth {
                        let value = text.trim().to_string();
                        match kind {
                            Capture::Actor => scan.actors.push(value),
                            Capture::Movie => scan.movies.push(value),
                            Capture::Match => scan.matches.push(value),
                        }
                    } else {
                        current = Some((kind, opened, text));
                    }
                }
                depth = depth.saturating_sub(1);
                None
            }
            Ok(Event::Text(e)) => Some(String::from_utf8_lossy(e.as_ref()).into_owned()),
            Ok(Event::CData(e)) => Some(String::from_utf8_lossy(e.as_ref()).into_owned()),
            Ok(Event::GeneralRef(e)) => match e.resolve_char_ref() {
                Ok(Some(ch)) => Some(ch.to_string()),
                Ok(None) => {
                    let name = String::from_utf8_lossy(e.as_ref()).into_owned();
                    Some(match resolve_xml_entity(&name) {
                        Some(resolved) => resolved.to_string(),
                        None => format!("&{};", name),
                    })
                }
                Err(err) => {
                    log::warn!(
                        "Bad character reference at byte {}: {}",
                        reader.buffer_position(),
                        err
                    );
                    return None;
                }
            },
            Ok(Event::Eof) => break,
            Ok(_) => None,
            Err(e) => {
                log::warn!(
                    "Malformed response markup at byte {}: {}",
                    reader.buffer_position(),
                    e
                );
                return None;
            }
        };

        if let Some(text) = text {
            if depth == 1 {
                scan.root_text.push_str(&text);
            }
            if let Some((_, _, ref mut captured)) = current {
                captured.push_str(&text);
            }
        }
        buf.clear();
    }

    Some(scan)
}

/// Pair actors with movies the way a zip driven by the actor list does: a
/// trailing actor without a movie is kept, surplus movies are dropped, and
/// empty names are skipped. Also returns how many movies were paired, counted
/// before empty names are removed.
fn interleave(actors: Vec<String>, movies: Vec<String>) -> (Vec<String>, usize) {
    let mut movies = movies.into_iter();
    let mut records = Vec::with_capacity(actors.len() * 2);
    let mut links = 0;
    for actor in actors {
        records.push(actor);
        if let Some(movie) = movies.next() {
            records.push(movie);
            links += 1;
        }
    }
    records.retain(|r| !r.is_empty());
    (records, links)
}

/// Classify a markup payload.
///
/// The root element decides the variant, checked in the order `error`,
/// `link`, `spellcheck`. Anything else, including markup that fails to
/// parse, becomes `QueryResponse::Unknown` carrying the raw payload.
pub fn parse(markup: &str) -> QueryResponse {
    let unknown = || QueryResponse::Unknown {
        raw: markup.to_string(),
    };

    let Some(scan) = scan(markup) else {
        return unknown();
    };

    let root = scan.root.as_deref().and_then(Root::from_name);
    log::debug!(
        "Classified response root {:?} as {:?}",
        scan.root.as_deref().map(String::from_utf8_lossy),
        root
    );

    match root {
        Some(Root::Error) => {
            let message = scan.root_text.trim();
            QueryResponse::AuthorizationError {
                message: if message.is_empty() {
                    UNAUTHORIZED.to_string()
                } else {
                    message.to_string()
                },
            }
        }
        Some(Root::Link) => {
            let (records, degrees) = interleave(scan.actors, scan.movies);
            QueryResponse::Graph { records, degrees }
        }
        Some(Root::Spellcheck) => QueryResponse::SpellingSuggestions {
            suggestions: scan.matches.into_iter().filter(|m| !m.is_empty()).collect(),
        },
        None => unknown(),
    }
}
