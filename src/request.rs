use crate::header::HeaderMap;

/// The request a [`crate::ResponseWriter`] answers.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    method: String,
    path: String,
    query: String,
    version: String,
    header: HeaderMap,
}

impl IncomingRequest {
    /// `target` is the request target of the request line, e.g. `/a/b?c=d`.
    pub fn new(method: &str, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };
        let path = if path.is_empty() { "/" } else { path };
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            query: query.to_string(),
            version: "HTTP/1.1".to_string(),
            header: HeaderMap::new(),
        }
    }

    pub(crate) fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
    }

    pub(crate) fn header_mut(&mut self) -> &mut HeaderMap {
        &mut self.header
    }

    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[inline]
    pub fn header(&self) -> &HeaderMap {
        &self.header
    }
}

#[cfg(test)]
mod tests {
    use super::IncomingRequest;

    #[test]
    fn target_is_split() {
        let req = IncomingRequest::new("get", "/a/b?c=d");
        assert_eq!(req.method(), "GET");
        assert_eq!(req.path(), "/a/b");
        assert_eq!(req.query(), "c=d");

        let req = IncomingRequest::new("HEAD", "?x");
        assert_eq!(req.path(), "/");
        assert_eq!(req.query(), "x");
    }
}
