use std::fmt::{Debug, Display, Formatter};

use crate::error::InvalidStatusCode;

/// HTTP status code as registered with IANA.
///
/// Only values in `100..=599` can be constructed, either through the named
/// constants or through [`StatusCode::from_u16`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(u16);

macro_rules! status_codes {
    (
        $(
            $code:literal $name:ident $reason:literal;
        )*
    ) => {
        impl StatusCode {
            $(
                #[doc = concat!("`", stringify!($code), " ", $reason, "`")]
                pub const $name: StatusCode = StatusCode($code);
            )*

            /// Registered reason phrase, `None` for unregistered codes.
            pub const fn canonical_reason(&self) -> Option<&'static str> {
                match self.0 {
                    $(
                        $code => Some($reason),
                    )*
                    _ => None,
                }
            }
        }
    };
}

status_codes! {
    100 CONTINUE "Continue";
    101 SWITCHING_PROTOCOLS "Switching Protocols";
    103 EARLY_HINTS "Early Hints";
    200 OK "OK";
    201 CREATED "Created";
    202 ACCEPTED "Accepted";
    203 NON_AUTHORITATIVE_INFORMATION "Non-Authoritative Information";
    204 NO_CONTENT "No Content";
    205 RESET_CONTENT "Reset Content";
    206 PARTIAL_CONTENT "Partial Content";
    300 MULTIPLE_CHOICES "Multiple Choices";
    301 MOVED_PERMANENTLY "Moved Permanently";
    302 FOUND "Found";
    303 SEE_OTHER "See Other";
    304 NOT_MODIFIED "Not Modified";
    307 TEMPORARY_REDIRECT "Temporary Redirect";
    308 PERMANENT_REDIRECT "Permanent Redirect";
    400 BAD_REQUEST "Bad Request";
    401 UNAUTHORIZED "Unauthorized";
    402 PAYMENT_REQUIRED "Payment Required";
    403 FORBIDDEN "Forbidden";
    404 NOT_FOUND "Not Found";
    405 METHOD_NOT_ALLOWED "Method Not Allowed";
    406 NOT_ACCEPTABLE "Not Acceptable";
    408 REQUEST_TIMEOUT "Request Timeout";
    409 CONFLICT "Conflict";
    410 GONE "Gone";
    411 LENGTH_REQUIRED "Length Required";
    412 PRECONDITION_FAILED "Precondition Failed";
    413 PAYLOAD_TOO_LARGE "Payload Too Large";
    414 URI_TOO_LONG "URI Too Long";
    415 UNSUPPORTED_MEDIA_TYPE "Unsupported Media Type";
    416 RANGE_NOT_SATISFIABLE "Range Not Satisfiable";
    417 EXPECTATION_FAILED "Expectation Failed";
    422 UNPROCESSABLE_ENTITY "Unprocessable Entity";
    426 UPGRADE_REQUIRED "Upgrade Required";
    428 PRECONDITION_REQUIRED "Precondition Required";
    429 TOO_MANY_REQUESTS "Too Many Requests";
    431 REQUEST_HEADER_FIELDS_TOO_LARGE "Request Header Fields Too Large";
    451 UNAVAILABLE_FOR_LEGAL_REASONS "Unavailable For Legal Reasons";
    500 INTERNAL_SERVER_ERROR "Internal Server Error";
    501 NOT_IMPLEMENTED "Not Implemented";
    502 BAD_GATEWAY "Bad Gateway";
    503 SERVICE_UNAVAILABLE "Service Unavailable";
    504 GATEWAY_TIMEOUT "Gateway Timeout";
    505 HTTP_VERSION_NOT_SUPPORTED "HTTP Version Not Supported";
    507 INSUFFICIENT_STORAGE "Insufficient Storage";
    508 LOOP_DETECTED "Loop Detected";
    511 NETWORK_AUTHENTICATION_REQUIRED "Network Authentication Required";
}

impl StatusCode {
    pub const fn from_u16(code: u16) -> Result<Self, InvalidStatusCode> {
        if code < 100 || code > 599 {
            return Err(InvalidStatusCode(code));
        }
        Ok(Self(code))
    }

    #[inline]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Reason phrase, falling back to the name of the status class for
    /// codes that are valid but unregistered.
    pub const fn reason(&self) -> &'static str {
        match self.canonical_reason() {
            Some(reason) => reason,
            None => match self.0 / 100 {
                1 => "Informational",
                2 => "Success",
                3 => "Redirection",
                4 => "Client Error",
                _ => "Server Error",
            },
        }
    }

    #[inline]
    pub const fn is_informational(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    #[inline]
    pub const fn is_redirection(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    #[inline]
    pub const fn is_client_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.0 >= 500 && self.0 < 600
    }

    /// Whether a response with this status may carry a body.
    #[inline]
    pub const fn allows_body(&self) -> bool {
        !(self.is_informational() || self.0 == 204 || self.0 == 304)
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        Self::OK
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = InvalidStatusCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_u16(value)
    }
}

impl From<StatusCode> for u16 {
    fn from(value: StatusCode) -> Self {
        value.0
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason())
    }
}

impl Debug for StatusCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StatusCode").field(&self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::StatusCode;
    use crate::error::InvalidStatusCode;

    #[test]
    fn named_constants() {
        assert_eq!(StatusCode::OK.as_u16(), 200);
        assert_eq!(StatusCode::NO_CONTENT.as_u16(), 204);
        assert_eq!(StatusCode::MOVED_PERMANENTLY.as_u16(), 301);
        assert_eq!(StatusCode::BAD_REQUEST.as_u16(), 400);
        assert_eq!(StatusCode::UNAUTHORIZED.as_u16(), 401);
        assert_eq!(StatusCode::FORBIDDEN.as_u16(), 403);
        assert_eq!(StatusCode::METHOD_NOT_ALLOWED.as_u16(), 405);
        assert_eq!(StatusCode::UNSUPPORTED_MEDIA_TYPE.as_u16(), 415);
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), 500);
    }

    #[test]
    fn construction_is_range_checked() {
        assert_eq!(StatusCode::from_u16(99), Err(InvalidStatusCode(99)));
        assert_eq!(StatusCode::from_u16(600), Err(InvalidStatusCode(600)));
        assert_eq!(StatusCode::from_u16(100), Ok(StatusCode::CONTINUE));
        assert_eq!(StatusCode::try_from(599).map(u16::from), Ok(599));
    }

    #[test]
    fn classes() {
        assert!(StatusCode::INTERNAL_SERVER_ERROR.is_server_error());
        assert!(StatusCode::from_u16(599).unwrap().is_server_error());
        assert!(!StatusCode::FORBIDDEN.is_server_error());
        assert!(StatusCode::FORBIDDEN.is_client_error());
        assert!(StatusCode::FOUND.is_redirection());
        assert!(StatusCode::OK.is_success());
        assert!(!StatusCode::NO_CONTENT.allows_body());
        assert!(StatusCode::OK.allows_body());
    }

    #[test]
    fn reasons() {
        assert_eq!(StatusCode::NOT_FOUND.to_string(), "404 Not Found");
        assert_eq!(StatusCode::from_u16(599).unwrap().canonical_reason(), None);
        assert_eq!(StatusCode::from_u16(599).unwrap().reason(), "Server Error");
        assert_eq!(format!("{:?}", StatusCode::OK), "StatusCode(200)");
    }
}
