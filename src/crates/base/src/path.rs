use std::fmt;

/// A request path split into its non-empty segments.
///
/// `"/people/123/"` has the segments `["people", "123"]`. The raw string is kept
/// as given so callers can still see trailing slashes or duplicate separators.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    raw: String,
    segments: Vec<String>,
}

impl Path {
    pub fn new(raw: &str) -> Self {
        let segments = raw
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Extension of the last segment, e.g. `json` for `/people/123.json`.
    pub fn extension(&self) -> Option<&str> {
        let last = self.segments.last()?;
        match last.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Turns the raw URL path of a request into a [`Path`].
pub trait PathResolver: Send + Sync {
    fn resolve(&self, raw: &str) -> Path;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SegmentPathResolver;

impl PathResolver for SegmentPathResolver {
    fn resolve(&self, raw: &str) -> Path {
        Path::new(raw)
    }
}
