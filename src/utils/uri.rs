use once_cell::sync::Lazy;
use regex::Regex;

static SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap());

/// Whether `url` names a scheme or a host, i.e. is not relative to the
/// current origin.
#[inline]
pub fn is_absolute(url: &str) -> bool {
    url.starts_with("//") || SCHEME.is_match(url)
}

/// Lexical path cleaning: collapses `//`, drops `.` and resolves `..`.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = vec![];
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ => {
                    if !rooted {
                        parts.push("..");
                    }
                }
            },
            _ => parts.push(seg),
        }
    }

    let joined = parts.join("/");
    if rooted {
        return format!("/{}", joined);
    }
    if joined.is_empty() {
        return ".".to_string();
    }
    joined
}

/// Resolves a redirect target against the path of the current request.
/// Absolute urls are returned as they are.
pub fn resolve_location(req_path: &str, url: &str) -> String {
    if is_absolute(url) {
        return url.to_string();
    }

    let mut target = url.to_string();
    if !target.starts_with('/') {
        let old = if req_path.is_empty() { "/" } else { req_path };
        let dir = match old.rfind('/') {
            Some(idx) => &old[..=idx],
            None => "",
        };
        target = format!("{}{}", dir, target);
    }

    let (path, query) = match target.find('?') {
        Some(idx) => target.split_at(idx),
        None => (target.as_str(), ""),
    };
    let mut cleaned = clean_path(path);
    if path.ends_with('/') && !cleaned.ends_with('/') {
        cleaned.push('/');
    }
    cleaned.push_str(query);
    cleaned
}

/// Percent-encodes every non-ASCII byte.
pub fn escape_non_ascii(txt: &str) -> String {
    if txt.is_ascii() {
        return txt.to_string();
    }
    let mut out = String::with_capacity(txt.len() + 16);
    for b in txt.bytes() {
        if b < 0x80 {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}
