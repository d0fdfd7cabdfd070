//! HTML directory listings

use std::path::Path;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use webserve_core::Result;

/// Characters escaped inside a single path segment of an href
pub(crate) const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate an HTML listing of `dir_path`, displayed as `req_path`
pub async fn generate_listing(dir_path: &Path, req_path: &str) -> Result<String> {
    let mut entries = tokio::fs::read_dir(dir_path).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().await?.is_dir();
        names.push((name, is_dir));
    }
    names.sort_by_key(|(name, _)| name.to_lowercase());

    let title = escape_html(req_path);
    let mut html = format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Index of {title}</title></head>\
         <body><h1>Index of {title}</h1><hr><pre>\n"
    );

    if req_path != "/" {
        html.push_str("<a href=\"../\">../</a>\n");
    }

    for (name, is_dir) in names {
        let suffix = if is_dir { "/" } else { "" };
        html.push_str(&format!(
            "<a href=\"{}{suffix}\">{}{suffix}</a>\n",
            utf8_percent_encode(&name, SEGMENT),
            escape_html(&name),
        ));
    }

    html.push_str("</pre><hr></body></html>\n");
    Ok(html)
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
    }

    #[tokio::test]
    async fn test_listing_is_sorted_and_escaped() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b file.txt"), "b").unwrap();
        std::fs::write(tmp.path().join("A<x>.js"), "a").unwrap();
        std::fs::create_dir(tmp.path().join("assets")).unwrap();

        let html = generate_listing(tmp.path(), "/sub/").await.unwrap();

        let a = html.find("A&lt;x&gt;.js").unwrap();
        let assets = html.find(">assets/<").unwrap();
        let b = html.find(">b file.txt<").unwrap();
        assert!(a < assets && assets < b);
        assert!(html.contains("href=\"b%20file.txt\""));
        assert!(html.contains("href=\"A%3Cx%3E.js\""));
        assert!(html.contains("<a href=\"../\">../</a>"));
        assert!(html.contains("Index of /sub/"));
    }

    #[tokio::test]
    async fn test_root_listing_has_no_parent_link() {
        let tmp = tempfile::tempdir().unwrap();
        let html = generate_listing(tmp.path(), "/").await.unwrap();
        assert!(!html.contains("../"));
    }
}
