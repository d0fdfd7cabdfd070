//! File server implementation

use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use percent_encoding::{percent_decode_str, utf8_percent_encode};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use webserve_core::{Result, ServerConfig};

use crate::listing::{generate_listing, SEGMENT};
use crate::mime::guess_mime_type;

/// Configuration for the file server
#[derive(Debug, Clone)]
pub struct FileServerConfig {
    /// Root directory to serve
    pub root: PathBuf,
    /// Index files to look for
    pub index: Vec<String>,
    /// Enable directory browsing
    pub browse: bool,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            index: vec!["index.html".to_string(), "index.htm".to_string()],
            browse: true,
        }
    }
}

impl From<&ServerConfig> for FileServerConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            root: config.root.clone(),
            index: config.index.clone(),
            browse: config.browse,
        }
    }
}

/// Request headers that change what gets served
#[derive(Debug, Default, Clone, Copy)]
pub struct Preconditions<'a> {
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
    pub range: Option<&'a str>,
}

/// Outcome of a lookup
#[derive(Debug)]
pub enum Served {
    /// File content, complete (200) or partial (206)
    File(ServedFile),
    /// Generated HTML listing for a directory without index
    Listing(String),
    /// Directory requested without trailing slash
    Redirect(String),
    /// Client copy is current
    NotModified {
        last_modified: Option<String>,
        etag: String,
    },
    /// Range starts past the end of the file
    RangeNotSatisfiable { size: u64 },
    NotFound,
}

/// File content with the metadata needed for response headers
#[derive(Debug)]
pub struct ServedFile {
    pub content: Vec<u8>,
    pub mime_type: &'static str,
    pub status: u16,
    pub content_range: Option<String>,
    pub last_modified: Option<String>,
    pub etag: String,
}

#[derive(Debug, PartialEq)]
enum ByteRange {
    Satisfiable(u64, u64),
    Unsatisfiable,
}

/// Static file server
#[derive(Debug, Clone)]
pub struct FileServer {
    config: FileServerConfig,
}

impl FileServer {
    /// Create a new file server
    pub fn new(config: FileServerConfig) -> Self {
        Self { config }
    }

    /// Create a file server for a directory
    pub fn serve_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(FileServerConfig {
            root: root.into(),
            ..Default::default()
        })
    }

    /// Enable directory browsing
    pub fn with_browse(mut self, enable: bool) -> Self {
        self.config.browse = enable;
        self
    }

    /// Serve a request for `path` (still percent-encoded, without query)
    pub async fn serve(
        &self,
        path: &str,
        query: Option<&str>,
        pre: Preconditions<'_>,
    ) -> Result<Served> {
        let segments = normalize(path);
        let mut file_path = self.config.root.clone();
        file_path.extend(&segments);

        tracing::debug!("📁 Serving request: {} -> {:?}", path, file_path);

        let metadata = match tokio::fs::metadata(&file_path).await {
            Ok(m) => m,
            Err(_) => return Ok(Served::NotFound),
        };

        if metadata.is_dir() {
            if !path.ends_with('/') {
                return Ok(Served::Redirect(redirect_location(&segments, query)));
            }

            let mut index_found = false;
            for index in &self.config.index {
                let index_path = file_path.join(index);
                if tokio::fs::metadata(&index_path).await.is_ok_and(|m| m.is_file()) {
                    file_path = index_path;
                    index_found = true;
                    break;
                }
            }

            if !index_found {
                if self.config.browse {
                    let listing = generate_listing(&file_path, &decode(path)).await?;
                    return Ok(Served::Listing(listing));
                }
                return Ok(Served::NotFound);
            }
        }

        let metadata = match tokio::fs::metadata(&file_path).await {
            Ok(m) if m.is_file() => m,
            _ => return Ok(Served::NotFound),
        };
        let file_size = metadata.len();

        let modified = metadata.modified().ok();
        let last_modified = modified.map(httpdate::fmt_http_date);
        let mtime_secs = modified
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let etag = format!("W/\"{:x}-{:x}\"", file_size, mtime_secs);

        if is_not_modified(&pre, &etag, modified) {
            return Ok(Served::NotModified { last_modified, etag });
        }

        let mut status = 200;
        let mut content_range = None;
        let mut start = 0;
        let mut length = file_size;

        if let Some(range) = pre.range {
            match parse_range(range, file_size) {
                Some(ByteRange::Satisfiable(s, e)) => {
                    start = s;
                    length = e - s + 1;
                    status = 206;
                    content_range = Some(format!("bytes {}-{}/{}", s, e, file_size));
                }
                Some(ByteRange::Unsatisfiable) => {
                    return Ok(Served::RangeNotSatisfiable { size: file_size });
                }
                None => {}
            }
        }

        let mut file = tokio::fs::File::open(&file_path).await?;

        if start > 0 {
            file.seek(std::io::SeekFrom::Start(start)).await?;
        }

        let mut content = vec![0u8; length as usize];
        file.read_exact(&mut content).await?;

        Ok(Served::File(ServedFile {
            content,
            mime_type: guess_mime_type(&file_path),
            status,
            content_range,
            last_modified,
            etag,
        }))
    }

}

/// Split a URL path into the segments that name a file under the root
///
/// The path is percent-decoded, `.` and empty segments are skipped and `..`
/// removes the previous segment without ever leaving the root. Segments the
/// platform would read as a root, prefix or separator are dropped.
fn normalize(path: &str) -> Vec<String> {
    let decoded = decode(path);
    let mut segments: Vec<String> = Vec::new();
    for segment in decoded.split('/') {
        if segment == ".." {
            segments.pop();
            continue;
        }
        if segment.is_empty() || segment.contains('\\') || segment.contains('\0') {
            continue;
        }
        let mut components = Path::new(segment).components();
        if let (Some(Component::Normal(_)), None) = (components.next(), components.next()) {
            segments.push(segment.to_string());
        }
    }
    segments
}

/// Same-origin `Location` for a directory requested without trailing slash
fn redirect_location(segments: &[String], query: Option<&str>) -> String {
    let mut location = String::from("/");
    for segment in segments {
        location.push_str(&utf8_percent_encode(segment, SEGMENT).to_string());
        location.push('/');
    }
    if let Some(q) = query {
        location.push('?');
        location.push_str(q);
    }
    location
}

fn decode(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

fn is_not_modified(pre: &Preconditions<'_>, etag: &str, modified: Option<SystemTime>) -> bool {
    if let Some(tags) = pre.if_none_match {
        return tags
            .split(',')
            .map(str::trim)
            .any(|tag| tag == "*" || strip_weak(tag) == strip_weak(etag));
    }

    let (Some(since), Some(modified)) = (pre.if_modified_since, modified) else {
        return false;
    };
    let Ok(since) = httpdate::parse_http_date(since) else {
        return false;
    };
    let modified_secs = modified.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    let since_secs = since.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    modified_secs <= since_secs
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// Parse a single-range `Range` header (`bytes=start-end`, `bytes=start-`, `bytes=-suffix`)
///
/// `None` means the header is ignored and the full file is served.
fn parse_range(header: &str, file_size: u64) -> Option<ByteRange> {
    let spec = header.trim().strip_prefix("bytes=")?;
    if spec.contains(',') {
        return None;
    }
    let (start_str, end_str) = spec.split_once('-')?;
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        let suffix = end_str.parse::<u64>().ok()?;
        if suffix == 0 || file_size == 0 {
            return Some(ByteRange::Unsatisfiable);
        }
        return Some(ByteRange::Satisfiable(file_size.saturating_sub(suffix), file_size - 1));
    }

    let start = start_str.parse::<u64>().ok()?;
    let end = if end_str.is_empty() {
        u64::MAX
    } else {
        end_str.parse::<u64>().ok()?
    };

    if end < start {
        return None;
    }
    if start >= file_size {
        return Some(ByteRange::Unsatisfiable);
    }

    Some(ByteRange::Satisfiable(start, end.min(file_size - 1)))
}
