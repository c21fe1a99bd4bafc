use thiserror::Error;

use super::headers::HeaderMap;
use super::types::MessageHead;

const CRLF: &str = "\r\n";
const HEADER_TERMINATOR: &str = "\r\n\r\n";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed message at byte {offset}: {reason}")]
pub struct MalformedMessage {
    pub offset: usize,
    pub reason: &'static str,
}

/// Turns a complete header block into a start line and field list.
///
/// Implementations only tokenize. Version, target and Host rules are applied
/// afterwards by the session, so any tokenizer can be plugged in.
pub trait MessageParser {
    fn parse(&self, head: &[u8]) -> Result<MessageHead, MalformedMessage>;
}

/// Strict RFC 7230 start-line and header-field tokenizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rfc7230Parser;

impl MessageParser for Rfc7230Parser {
    fn parse(&self, head: &[u8]) -> Result<MessageHead, MalformedMessage> {
        let text = std::str::from_utf8(head).map_err(|err| MalformedMessage {
            offset: err.valid_up_to(),
            reason: "header block is not valid UTF-8",
        })?;
        let text = text.strip_suffix(HEADER_TERMINATOR).unwrap_or(text);

        // RFC 7230 3.5: empty lines ahead of the request-line are ignored.
        let start = text.trim_start_matches(CRLF);
        let skipped = text.len() - start.len();

        let (line, fields) = start.split_once(CRLF).unwrap_or((start, ""));
        let (method, target, version) = parse_request_line(line, skipped)?;
        let headers = parse_headers(fields, skipped + line.len() + CRLF.len())?;

        Ok(MessageHead {
            method: method.to_string(),
            target: target.to_string(),
            version: version.to_string(),
            headers,
        })
    }
}

fn parse_request_line(line: &str, offset: usize) -> Result<(&str, &str, &str), MalformedMessage> {
    let invalid = |reason| MalformedMessage { offset, reason };

    if line.is_empty() {
        return Err(invalid("empty request line"));
    }

    let mut parts = line.split(' ');
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid("request line must have three parts"));
    };

    if !is_token(method) {
        return Err(invalid("invalid method"));
    }
    if target.is_empty() || !target.bytes().all(|byte| byte.is_ascii_graphic()) {
        return Err(invalid("invalid request-target"));
    }

    let version = version
        .strip_prefix("HTTP/")
        .filter(|digits| is_version_number(digits))
        .ok_or_else(|| invalid("invalid protocol version"))?;

    Ok((method, target, version))
}

fn is_version_number(raw: &str) -> bool {
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    match raw.split_once('.') {
        Some((major, minor)) => all_digits(major) && all_digits(minor),
        None => all_digits(raw),
    }
}

fn parse_headers(fields: &str, base_offset: usize) -> Result<HeaderMap, MalformedMessage> {
    let mut headers = HeaderMap::new();
    let mut pending: Option<(String, String)> = None;
    let mut offset = base_offset;

    if fields.is_empty() {
        return Ok(headers);
    }

    for line in fields.split(CRLF) {
        let invalid = |reason| MalformedMessage { offset, reason };

        if line.starts_with([' ', '\t']) {
            // obs-fold
            let Some((_, value)) = pending.as_mut() else {
                return Err(invalid("continuation line without a field"));
            };
            let continued = trim_ows(line);
            if !is_field_value(continued) {
                return Err(invalid("invalid field value"));
            }
            if !continued.is_empty() {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(continued);
            }
            offset += line.len() + CRLF.len();
            continue;
        }

        if let Some((name, value)) = pending.take() {
            headers.append(name, value);
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(invalid("field line without a colon"));
        };
        if !is_token(name) {
            return Err(invalid("invalid field name"));
        }
        let value = trim_ows(value);
        if !is_field_value(value) {
            return Err(invalid("invalid field value"));
        }

        pending = Some((name.to_string(), value.to_string()));
        offset += line.len() + CRLF.len();
    }

    if let Some((name, value)) = pending {
        headers.append(name, value);
    }

    Ok(headers)
}

fn trim_ows(value: &str) -> &str {
    value.trim_matches([' ', '\t'])
}

fn is_token(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(is_tchar)
}

fn is_tchar(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&byte)
}

fn is_field_value(value: &str) -> bool {
    value
        .bytes()
        .all(|byte| byte == b'\t' || !byte.is_ascii_control())
}
