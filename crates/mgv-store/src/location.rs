// SPDX-License-Identifier: Apache-2.0

//! Discovery locations: normalization, relative resolution and the
//! `fetch.cgi` query urls built on top of them.

/// True when `location` starts with `<alpha>://`.
#[must_use]
pub fn has_scheme(location: &str) -> bool {
    location
        .split_once("://")
        .is_some_and(|(scheme, _)| !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic()))
}

/// Splits `scheme://authority` from the path part.
fn split_origin(location: &str) -> (&str, &str) {
    if !has_scheme(location) {
        return ("", location);
    }
    let after = location.find("://").map_or(0, |i| i + 3);
    match location[after..].find('/') {
        Some(slash) => location.split_at(after + slash),
        None => (location, ""),
    }
}

/// Canonical key for a location: `.` and `..` segments resolved, duplicate
/// and trailing slashes removed. Relative locations stay relative and an
/// empty relative path becomes `.`.
#[must_use]
pub fn normalize_location(location: &str) -> String {
    let location = location.trim();
    let (origin, path) = split_origin(location);
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                _ if absolute || !origin.is_empty() => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    match (origin.is_empty(), absolute) {
        (false, _) if joined.is_empty() => origin.to_string(),
        (false, _) => format!("{origin}/{joined}"),
        (true, true) => format!("/{joined}"),
        (true, false) if joined.is_empty() => ".".to_string(),
        (true, false) => joined,
    }
}

/// Resolves a forwarding target against the location that named it.
#[must_use]
pub fn resolve_location(base: &str, target: &str) -> String {
    let target = target.trim();
    if has_scheme(target) {
        return normalize_location(target);
    }
    if target.starts_with('/') {
        let (origin, _) = split_origin(base);
        return normalize_location(&format!("{origin}{target}"));
    }
    normalize_location(&format!("{base}/{target}"))
}

#[must_use]
pub fn metadata_url(location: &str) -> String {
    format!("{location}/fetch.cgi?datatype=metadata")
}

/// Percent-encodes a query parameter value (RFC 3986 unreserved set kept).
#[must_use]
pub fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}
