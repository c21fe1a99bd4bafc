use url::Url;

use super::headers::HeaderMap;
use super::types::{HttpVersion, MessageHead, RequestDescriptor, RequestUri, TargetForm};
use crate::error::{FramingError, ParseErrorKind};

pub fn validate_version(raw: &str) -> Result<HttpVersion, ParseErrorKind> {
    match raw {
        "1.0" => Ok(HttpVersion::Http10),
        "1.1" => Ok(HttpVersion::Http11),
        _ => Err(ParseErrorKind::UnsupportedVersion),
    }
}

/// Classifies the request-target and resolves it into a [`RequestUri`].
///
/// Origin-form targets are resolved against the Host header, which HTTP/1.1
/// requires and must be a bare `host[:port]`. HTTP/1.0 requests without a
/// usable Host fall back to `fallback_authority`. The Host header is not
/// compared with the authority of an absolute-form target.
pub fn validate_target(
    head: MessageHead,
    version: HttpVersion,
    fallback_authority: &str,
) -> Result<RequestDescriptor, ParseErrorKind> {
    let MessageHead {
        method,
        target,
        headers,
        ..
    } = head;

    let (form, uri) = if target == "*" {
        (TargetForm::Asterisk, RequestUri::Asterisk)
    } else if target.starts_with('/') {
        let url = resolve_origin_form(&target, version, &headers, fallback_authority)?;
        (TargetForm::Origin, RequestUri::Absolute(url))
    } else if target.contains("://") {
        let url = parse_absolute_form(&target)?;
        (TargetForm::Absolute, RequestUri::Absolute(url))
    } else if method == "CONNECT" && is_authority_form(&target) {
        (TargetForm::Authority, RequestUri::Authority(target.clone()))
    } else {
        return Err(ParseErrorKind::InvalidMessage);
    };

    Ok(RequestDescriptor {
        method,
        target,
        form,
        uri,
        version,
        headers,
    })
}

/// Checks the message framing fields without touching the body.
///
/// Not part of header parsing: the session accepts any framing fields, and
/// callers run this on the finished request before reading a body.
pub fn validate_framing(headers: &HeaderMap) -> Result<(), FramingError> {
    let transfer_encoding = headers.line("Transfer-Encoding");
    if let Some(encoding) = &transfer_encoding {
        if !encoding.trim().eq_ignore_ascii_case("chunked") {
            return Err(FramingError::UnsupportedTransferEncoding);
        }
    }

    let lengths = headers.get_all("Content-Length");
    if lengths.is_empty() {
        return Ok(());
    }
    if transfer_encoding.is_some() {
        return Err(FramingError::ConflictingFraming);
    }

    let mut declared: Option<u64> = None;
    for raw in lengths.iter().flat_map(|value| value.split(',')) {
        let raw = raw.trim();
        if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(FramingError::InvalidContentLength);
        }
        let length = raw
            .parse::<u64>()
            .map_err(|_| FramingError::InvalidContentLength)?;
        match declared {
            Some(previous) if previous != length => {
                return Err(FramingError::InvalidContentLength);
            }
            _ => declared = Some(length),
        }
    }

    Ok(())
}

fn resolve_origin_form(
    target: &str,
    version: HttpVersion,
    headers: &HeaderMap,
    fallback_authority: &str,
) -> Result<Url, ParseErrorKind> {
    if target.contains('#') {
        return Err(ParseErrorKind::InvalidMessage);
    }

    let mut url = match version {
        HttpVersion::Http11 => {
            let hosts = headers.get_all("Host");
            match hosts {
                [] => return Err(ParseErrorKind::InvalidMessage),
                [host] => parse_authority(host).ok_or(ParseErrorKind::InvalidHost)?,
                _ => return Err(ParseErrorKind::InvalidHost),
            }
        }
        HttpVersion::Http10 => headers
            .get("Host")
            .and_then(parse_authority)
            .or_else(|| parse_authority(fallback_authority))
            .ok_or(ParseErrorKind::InvalidMessage)?,
    };

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };
    url.set_path(path);
    url.set_query(query);
    Ok(url)
}

/// The returned URL is normalized; the raw target stays on the descriptor.
fn parse_absolute_form(target: &str) -> Result<Url, ParseErrorKind> {
    let url = Url::parse(target).map_err(|_| ParseErrorKind::InvalidRequestTarget)?;
    let allowed_scheme = matches!(url.scheme(), "http" | "https");
    if !allowed_scheme || !url.has_host() || url.fragment().is_some() {
        return Err(ParseErrorKind::InvalidRequestTarget);
    }
    Ok(url)
}

fn is_authority_form(target: &str) -> bool {
    let has_port = target.rsplit_once(':').is_some_and(|(_, port)| {
        !port.is_empty() && port.bytes().all(|byte| byte.is_ascii_digit())
    });
    has_port && parse_authority(target).is_some()
}

/// Parses a bare `host[:port]` into the root URL of an `http` origin.
pub(crate) fn parse_authority(value: &str) -> Option<Url> {
    let forbidden = |c: char| matches!(c, '/' | '\\' | '?' | '#' | '@') || c.is_whitespace();
    if value.is_empty() || value.contains(forbidden) {
        return None;
    }
    let url = Url::parse(&format!("http://{value}/")).ok()?;
    url.host_str()?;
    Some(url)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::{validate_framing, validate_target, validate_version};
    use crate::error::{FramingError, ParseErrorKind};
    use crate::http1::{HeaderMap, HttpVersion, MessageHead, RequestUri, TargetForm};

    fn head(method: &str, target: &str, headers: &[(&str, &str)]) -> MessageHead {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(*name, *value);
        }
        MessageHead {
            method: method.to_string(),
            target: target.to_string(),
            version: "1.1".to_string(),
            headers: map,
        }
    }

    fn framing(headers: &[(&str, &str)]) -> Result<(), FramingError> {
        validate_framing(&head("POST", "/", headers).headers)
    }

    #[test]
    fn accepts_only_http10_and_http11() {
        assert_eq!(validate_version("1.0"), Ok(HttpVersion::Http10));
        assert_eq!(validate_version("1.1"), Ok(HttpVersion::Http11));
        assert_eq!(
            validate_version("1.2"),
            Err(ParseErrorKind::UnsupportedVersion)
        );
        assert_eq!(validate_version("2"), Err(ParseErrorKind::UnsupportedVersion));
        assert_eq!(
            validate_version("0.9"),
            Err(ParseErrorKind::UnsupportedVersion)
        );
    }

    #[test]
    fn origin_form_resolves_against_host() {
        let request = validate_target(
            head("POST", "/foo?bar=baz", &[("Host", "example.com:80")]),
            HttpVersion::Http11,
            "localhost",
        )
        .unwrap();

        assert_eq!(request.form, TargetForm::Origin);
        assert_eq!(request.uri.to_string(), "http://example.com/foo?bar=baz");
        assert_eq!(request.target, "/foo?bar=baz");
    }

    #[test]
    fn origin_form_keeps_non_default_port() {
        let request = validate_target(
            head("GET", "/", &[("Host", "example.com:8080")]),
            HttpVersion::Http11,
            "localhost",
        )
        .unwrap();
        assert_eq!(request.uri.to_string(), "http://example.com:8080/");
    }

    #[test]
    fn http11_origin_form_requires_host() {
        let result = validate_target(head("GET", "/", &[]), HttpVersion::Http11, "localhost");
        assert_eq!(result.unwrap_err(), ParseErrorKind::InvalidMessage);
    }

    #[test]
    fn http11_rejects_host_with_path_or_userinfo() {
        for host in ["a/b/c", "user@example.com", "example.com?x", "", "exa mple.com"] {
            let result = validate_target(
                head("GET", "/", &[("Host", host)]),
                HttpVersion::Http11,
                "localhost",
            );
            assert_eq!(result.unwrap_err(), ParseErrorKind::InvalidHost, "{host}");
        }
    }

    #[test]
    fn http11_rejects_repeated_host() {
        let result = validate_target(
            head("GET", "/", &[("Host", "a.example"), ("host", "b.example")]),
            HttpVersion::Http11,
            "localhost",
        );
        assert_eq!(result.unwrap_err(), ParseErrorKind::InvalidHost);
    }

    #[test]
    fn http10_skips_host_checks() {
        let request = validate_target(
            head("GET", "/index.html", &[("Host", "a/b/c")]),
            HttpVersion::Http10,
            "localhost",
        )
        .unwrap();
        assert_eq!(request.uri.to_string(), "http://localhost/index.html");

        let request = validate_target(head("GET", "/", &[]), HttpVersion::Http10, "127.0.0.1:8080")
            .unwrap();
        assert_eq!(request.uri.to_string(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn absolute_form_requires_http_scheme_without_fragment() {
        for target in [
            "tcp://example.com:80/",
            "http://example.com:80/#home",
            "ftp://example.com/file",
            "http://",
        ] {
            let result = validate_target(head("GET", target, &[]), HttpVersion::Http10, "localhost");
            assert_eq!(
                result.unwrap_err(),
                ParseErrorKind::InvalidRequestTarget,
                "{target}"
            );
        }
    }

    #[test]
    fn absolute_form_is_not_cross_checked_against_host() {
        let request = validate_target(
            head("GET", "https://example.com/path?q=1", &[("Host", "other.example")]),
            HttpVersion::Http11,
            "localhost",
        )
        .unwrap();
        assert_eq!(request.form, TargetForm::Absolute);
        assert_eq!(request.uri.to_string(), "https://example.com/path?q=1");
    }

    #[test]
    fn absolute_form_uri_is_normalized_but_target_is_raw() {
        let request = validate_target(
            head("GET", "http://Example.COM:80/a/../b", &[]),
            HttpVersion::Http11,
            "localhost",
        )
        .unwrap();
        assert_eq!(request.target, "http://Example.COM:80/a/../b");
        assert_eq!(request.uri.to_string(), "http://example.com/b");
    }

    #[test]
    fn connect_and_options_targets_stay_opaque() {
        let request = validate_target(
            head("CONNECT", "example.com:443", &[("Host", "example.com:443")]),
            HttpVersion::Http11,
            "localhost",
        )
        .unwrap();
        assert_eq!(request.form, TargetForm::Authority);
        assert_eq!(request.uri, RequestUri::Authority("example.com:443".to_string()));

        let request =
            validate_target(head("OPTIONS", "*", &[]), HttpVersion::Http11, "localhost").unwrap();
        assert_eq!(request.form, TargetForm::Asterisk);
        assert_eq!(request.uri.to_string(), "*");
    }

    #[test]
    fn unknown_target_shapes_are_invalid_messages() {
        for (method, target) in [("GET", "example.com:443"), ("CONNECT", "example.com")] {
            let result = validate_target(head(method, target, &[]), HttpVersion::Http10, "localhost");
            assert_matches!(result, Err(ParseErrorKind::InvalidMessage));
        }
    }

    #[test]
    fn framing_accepts_single_length_or_chunked() {
        assert_eq!(framing(&[("Content-Length", "42")]), Ok(()));
        assert_eq!(framing(&[("Content-Length", "5, 5")]), Ok(()));
        assert_eq!(framing(&[("Transfer-Encoding", "Chunked")]), Ok(()));
        assert_eq!(framing(&[]), Ok(()));
    }

    #[test]
    fn framing_rejects_bad_lengths_and_encodings() {
        assert_eq!(
            framing(&[("Content-Length", "-1")]),
            Err(FramingError::InvalidContentLength)
        );
        assert_eq!(
            framing(&[("Content-Length", "5"), ("Content-Length", "6")]),
            Err(FramingError::InvalidContentLength)
        );
        assert_eq!(
            framing(&[("Transfer-Encoding", "gzip, chunked")]),
            Err(FramingError::UnsupportedTransferEncoding)
        );
        assert_eq!(
            framing(&[("Transfer-Encoding", "chunked"), ("Content-Length", "3")]),
            Err(FramingError::ConflictingFraming)
        );
    }
}
