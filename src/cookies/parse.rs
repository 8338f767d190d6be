//! `Set-Cookie` parsing.
//!
//! Parsing happens in two steps:
//! - [`parse_set_cookie`] turns one raw header value into a [`SetCookie`]
//!   (name, value and the recognised attributes). Unknown attributes such as
//!   `SameSite` or `Priority` are ignored; invalid `Expires`/`Max-Age` values
//!   are ignored as if absent.
//! - [`resolve`] scopes a [`SetCookie`] to the URL that sent it, applying the
//!   accept policy and the rejection rules, and yields a [`CookieUpdate`].
//!
//! Any error returned here concerns a single header value only. Callers drop
//! that value and carry on with the next one.

use crate::config::CookieAcceptPolicy;
use crate::cookies::cookie::Cookie;
use crate::cookies::matching::{default_path, domain_matches, RequestTarget};
use crate::cookies::CookieError;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time};

/// Expiry dates are clamped to this far in the future (RFC 6265bis §5.5).
const MAX_COOKIE_AGE: Duration = Duration::days(400);

/// A parsed, not yet scoped, `Set-Cookie` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SetCookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub expires: Option<OffsetDateTime>,
    pub secure: bool,
    pub http_only: bool,
}

/// What applying one `Set-Cookie` value does to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CookieUpdate {
    Upsert(Cookie),
    Remove { domain: String, path: String, name: String },
}

pub(crate) fn parse_set_cookie(raw: &str, now: OffsetDateTime) -> Result<SetCookie, CookieError> {
    let mut parts = raw.split(';');
    let pair = parts.next().unwrap_or_default();

    let (name, value) = pair
        .split_once('=')
        .ok_or_else(|| CookieError::Malformed("missing '=' in name-value pair".into()))?;
    let name = name.trim();
    let value = value.trim();

    if name.is_empty() {
        return Err(CookieError::Malformed("empty cookie name".into()));
    }
    if name.chars().chain(value.chars()).any(|c| c.is_ascii_control()) {
        return Err(CookieError::Malformed(format!("control character in cookie {name}")));
    }

    let mut cookie = SetCookie {
        name: name.to_string(),
        value: value.to_string(),
        domain: None,
        path: None,
        expires: None,
        secure: false,
        http_only: false,
    };

    let mut max_age: Option<OffsetDateTime> = None;
    let mut expires: Option<OffsetDateTime> = None;

    for attr in parts {
        let (key, val) = match attr.split_once('=') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => (attr.trim(), ""),
        };

        match key.to_ascii_lowercase().as_str() {
            "domain" => {
                let domain = val.trim_start_matches('.');
                if !domain.is_empty() {
                    cookie.domain = Some(domain.to_ascii_lowercase());
                }
            }
            "path" => {
                cookie.path = val.starts_with('/').then(|| val.to_string());
            }
            "max-age" => {
                if let Some(at) = parse_max_age(val, now) {
                    max_age = Some(at);
                }
            }
            "expires" => {
                if let Some(at) = parse_expires(val) {
                    expires = Some(clamp_expiry(at, now));
                }
            }
            "secure" => cookie.secure = true,
            "httponly" => cookie.http_only = true,
            _ => {}
        }
    }

    // Max-Age wins over Expires regardless of attribute order
    cookie.expires = max_age.or(expires);
    Ok(cookie)
}

/// Scopes a parsed cookie to the URL it was received from.
pub(crate) fn resolve(
    set_cookie: SetCookie,
    target: &RequestTarget<'_>,
    accept: CookieAcceptPolicy,
    now: OffsetDateTime,
) -> Result<CookieUpdate, CookieError> {
    if accept == CookieAcceptPolicy::None {
        return Err(CookieError::Malformed(format!("cookie {} refused by accept policy", set_cookie.name)));
    }

    let (domain, host_only) = match set_cookie.domain {
        None => (target.host.to_ascii_lowercase(), true),
        Some(domain) => {
            let is_host = target.host.eq_ignore_ascii_case(&domain);
            if !is_host && (target.is_ip || !domain.contains('.')) {
                return Err(CookieError::Malformed(format!("domain {domain} too broad for {}", target.host)));
            }
            if accept != CookieAcceptPolicy::All && !domain_matches(target.host, &domain, target.is_ip) {
                return Err(CookieError::Malformed(format!("domain {domain} does not match {}", target.host)));
            }
            (domain, false)
        }
    };

    if set_cookie.secure && !target.secure {
        return Err(CookieError::Malformed(format!("secure cookie {} set over insecure scheme", set_cookie.name)));
    }

    let path = set_cookie.path.unwrap_or_else(|| default_path(target.path));

    if set_cookie.expires.is_some_and(|at| at <= now) {
        return Ok(CookieUpdate::Remove { domain, path, name: set_cookie.name });
    }

    Ok(CookieUpdate::Upsert(Cookie {
        name: set_cookie.name,
        value: set_cookie.value,
        domain,
        host_only,
        path,
        secure: set_cookie.secure,
        http_only: set_cookie.http_only,
        expires: set_cookie.expires,
        created: now,
        sequence: 0,
    }))
}

/// `Max-Age` per RFC 6265 §5.2.2: an optional `-` followed by digits. Zero or
/// negative means "already expired".
fn parse_max_age(val: &str, now: OffsetDateTime) -> Option<OffsetDateTime> {
    let digits = val.strip_prefix('-').unwrap_or(val);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    if val.starts_with('-') {
        return Some(OffsetDateTime::UNIX_EPOCH);
    }

    // Overlong digit strings still mean "far in the future"
    let secs = digits.parse::<i64>().unwrap_or(i64::MAX);
    if secs == 0 {
        return Some(OffsetDateTime::UNIX_EPOCH);
    }

    let age = Duration::seconds(secs).min(MAX_COOKIE_AGE);
    Some(now + age)
}

/// `Expires` value. The three HTTP-date forms go through `httpdate`; anything
/// else (the dashed `Thu, 01-Jan-1970 00:00:01 GMT` form, two-digit years)
/// falls back to the cookie-date algorithm of RFC 6265 §5.1.1.
fn parse_expires(val: &str) -> Option<OffsetDateTime> {
    httpdate::parse_http_date(val)
        .map(OffsetDateTime::from)
        .ok()
        .or_else(|| parse_cookie_date(val))
}

fn parse_cookie_date(val: &str) -> Option<OffsetDateTime> {
    let mut time: Option<(u8, u8, u8)> = None;
    let mut day: Option<u8> = None;
    let mut month: Option<Month> = None;
    let mut year: Option<u32> = None;

    let tokens = val
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == ':' || !c.is_ascii()))
        .filter(|t| !t.is_empty());

    for token in tokens {
        if time.is_none() {
            if let Some(hms) = parse_hms(token) {
                time = Some(hms);
                continue;
            }
        }
        if day.is_none() {
            if let Some((d, _)) = leading_digits(token, 1, 2) {
                day = Some(d as u8);
                continue;
            }
        }
        if month.is_none() {
            if let Some(m) = parse_month(token) {
                month = Some(m);
                continue;
            }
        }
        if year.is_none() {
            if let Some((y, _)) = leading_digits(token, 2, 4) {
                year = Some(y);
            }
        }
    }

    let year = match year? {
        y @ 70..=99 => y + 1900,
        y @ 0..=69 => y + 2000,
        y => y,
    };
    if year < 1601 {
        return None;
    }

    let (hour, minute, second) = time?;
    let date = Date::from_calendar_date(year as i32, month?, day?).ok()?;
    let time = Time::from_hms(hour, minute, second).ok()?;
    Some(PrimitiveDateTime::new(date, time).assume_utc())
}

/// Between `min` and `max` digits at the start of `token`, not followed by
/// another digit. Returns the value and the remainder.
fn leading_digits(token: &str, min: usize, max: usize) -> Option<(u32, &str)> {
    let len = token.bytes().take_while(u8::is_ascii_digit).count();
    if len < min || len > max {
        return None;
    }
    let value = token[..len].parse().ok()?;
    Some((value, &token[len..]))
}

/// `hh:mm:ss`, each part one or two digits.
fn parse_hms(token: &str) -> Option<(u8, u8, u8)> {
    let (hour, rest) = leading_digits(token, 1, 2)?;
    let (minute, rest) = leading_digits(rest.strip_prefix(':')?, 1, 2)?;
    let (second, _) = leading_digits(rest.strip_prefix(':')?, 1, 2)?;
    Some((hour as u8, minute as u8, second as u8))
}

fn parse_month(token: &str) -> Option<Month> {
    const MONTHS: [&str; 12] = ["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];

    let prefix = token.get(..3)?;
    let index = MONTHS.iter().position(|m| m.eq_ignore_ascii_case(prefix))?;
    Month::try_from(index as u8 + 1).ok()
}

fn clamp_expiry(at: OffsetDateTime, now: OffsetDateTime) -> OffsetDateTime {
    at.min(now + MAX_COOKIE_AGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn resolve_for(raw: &str, url: &str, accept: CookieAcceptPolicy) -> Result<CookieUpdate, CookieError> {
        let now = now();
        let url = Url::parse(url).unwrap();
        let target = RequestTarget::from_url(&url).unwrap();
        resolve(parse_set_cookie(raw, now)?, &target, accept, now)
    }

    fn upserted(update: Result<CookieUpdate, CookieError>) -> Cookie {
        match update {
            Ok(CookieUpdate::Upsert(cookie)) => cookie,
            other => panic!("expected an upsert, got {:?}", other),
        }
    }

    #[test]
    fn parses_name_value_and_flags() {
        let c = parse_set_cookie("sid = abc ; Secure; HttpOnly; SameSite=Lax", now()).unwrap();
        assert_eq!(c.name, "sid");
        assert_eq!(c.value, "abc");
        assert!(c.secure);
        assert!(c.http_only);
        assert!(c.expires.is_none());
    }

    #[test]
    fn attribute_names_are_case_insensitive() {
        let c = parse_set_cookie("a=1; PATH=/x; dOmAiN=.Example.COM; max-AGE=60", now()).unwrap();
        assert_eq!(c.path.as_deref(), Some("/x"));
        assert_eq!(c.domain.as_deref(), Some("example.com"));
        assert!(c.expires.is_some());
    }

    #[test]
    fn value_may_be_empty_or_contain_equals() {
        let c = parse_set_cookie("token=a=b=c", now()).unwrap();
        assert_eq!(c.value, "a=b=c");

        let c = parse_set_cookie("empty=", now()).unwrap();
        assert_eq!(c.value, "");
    }

    #[test]
    fn rejects_missing_equals_and_empty_names() {
        assert!(matches!(parse_set_cookie("garbage", now()), Err(CookieError::Malformed(_))));
        assert!(matches!(parse_set_cookie("=value", now()), Err(CookieError::Malformed(_))));
        assert!(matches!(parse_set_cookie("", now()), Err(CookieError::Malformed(_))));
    }

    #[test]
    fn max_age_beats_expires_in_either_order() {
        let now = now();
        let a = parse_set_cookie("a=1; Max-Age=60; Expires=Wed, 21 Oct 2015 07:28:00 GMT", now).unwrap();
        let b = parse_set_cookie("a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT; Max-Age=60", now).unwrap();
        assert_eq!(a.expires, Some(now + Duration::seconds(60)));
        assert_eq!(b.expires, Some(now + Duration::seconds(60)));
    }

    #[test]
    fn expires_in_the_past_is_parsed() {
        let c = parse_set_cookie("a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT", now()).unwrap();
        let at = c.expires.unwrap();
        assert_eq!(at.year(), 2015);
        assert_eq!(at.hour(), 7);
    }

    #[test]
    fn dashed_expires_format_is_parsed() {
        let c = parse_set_cookie("a=; Expires=Thu, 01-Jan-1970 00:00:01 GMT", now()).unwrap();
        assert_eq!(c.expires, Some(OffsetDateTime::UNIX_EPOCH + Duration::seconds(1)));

        let c = parse_set_cookie("a=1; expires=Wednesday, 21-Oct-15 07:28:00 GMT", now()).unwrap();
        let at = c.expires.unwrap();
        assert_eq!((at.year(), at.month(), at.day()), (2015, Month::October, 21));
        assert_eq!((at.hour(), at.minute(), at.second()), (7, 28, 0));
    }

    #[test]
    fn cookie_date_accepts_loose_token_order() {
        let at = parse_cookie_date("21 oct 2015 7:28:00").unwrap();
        assert_eq!((at.year(), at.month(), at.day(), at.hour()), (2015, Month::October, 21, 7));

        let at = parse_cookie_date("Sun, 06-Nov-94 08:49:37 GMT").unwrap();
        assert_eq!(at.year(), 1994);
        let at = parse_cookie_date("Sun, 06-Nov-30 08:49:37 GMT").unwrap();
        assert_eq!(at.year(), 2030);
    }

    #[test]
    fn cookie_date_rejects_out_of_range_fields() {
        assert!(parse_cookie_date("Thu, 31-Feb-2030 00:00:00 GMT").is_none());
        assert!(parse_cookie_date("Thu, 01-Jan-2030 24:00:00 GMT").is_none());
        assert!(parse_cookie_date("Thu, 01-Jan-1600 00:00:00 GMT").is_none());
        assert!(parse_cookie_date("Thu, 01-Jan-2030").is_none());
        assert!(parse_cookie_date("tomorrow").is_none());
    }

    #[test]
    fn far_future_expires_is_clamped() {
        let now = now();
        let c = parse_set_cookie("a=1; Expires=Fri, 01 Jan 9999 00:00:00 GMT", now).unwrap();
        assert_eq!(c.expires, Some(now + MAX_COOKIE_AGE));
    }

    #[test]
    fn invalid_expiry_attributes_are_ignored() {
        let c = parse_set_cookie("a=1; Max-Age=soon; Expires=tomorrow", now()).unwrap();
        assert!(c.expires.is_none());
    }

    #[test]
    fn non_positive_max_age_means_expired() {
        let c = parse_set_cookie("a=1; Max-Age=0", now()).unwrap();
        assert_eq!(c.expires, Some(OffsetDateTime::UNIX_EPOCH));
        let c = parse_set_cookie("a=1; Max-Age=-5", now()).unwrap();
        assert_eq!(c.expires, Some(OffsetDateTime::UNIX_EPOCH));
    }

    #[test]
    fn huge_max_age_is_clamped() {
        let now = now();
        let c = parse_set_cookie("a=1; Max-Age=99999999999999999999999", now).unwrap();
        assert_eq!(c.expires, Some(now + MAX_COOKIE_AGE));
    }

    #[test]
    fn relative_path_attribute_falls_back_to_default() {
        let c = upserted(resolve_for("a=1; Path=relative", "https://h/x/y", CookieAcceptPolicy::OriginalServer));
        assert_eq!(c.path, "/x");
    }

    #[test]
    fn missing_domain_gives_host_only_cookie() {
        let c = upserted(resolve_for("a=1", "https://WWW.example.com/", CookieAcceptPolicy::OriginalServer));
        assert_eq!(c.domain, "www.example.com");
        assert!(c.host_only);
    }

    #[test]
    fn parent_domain_attribute_is_accepted() {
        let c = upserted(resolve_for("a=1; Domain=example.com", "https://www.example.com/", CookieAcceptPolicy::OriginalServer));
        assert_eq!(c.domain, "example.com");
        assert!(!c.host_only);
    }

    #[test]
    fn foreign_domain_depends_on_accept_policy() {
        let refused = resolve_for("a=1; Domain=other.com", "https://www.example.com/", CookieAcceptPolicy::OriginalServer);
        assert!(matches!(refused, Err(CookieError::Malformed(_))));

        let c = upserted(resolve_for("a=1; Domain=other.com", "https://www.example.com/", CookieAcceptPolicy::All));
        assert_eq!(c.domain, "other.com");
    }

    #[test]
    fn top_level_domains_are_refused() {
        let refused = resolve_for("a=1; Domain=com", "https://www.example.com/", CookieAcceptPolicy::All);
        assert!(matches!(refused, Err(CookieError::Malformed(_))));
    }

    #[test]
    fn accept_none_refuses_everything() {
        let refused = resolve_for("a=1", "https://example.com/", CookieAcceptPolicy::None);
        assert!(matches!(refused, Err(CookieError::Malformed(_))));
    }

    #[test]
    fn secure_cookie_over_http_is_refused() {
        let refused = resolve_for("a=1; Secure", "http://example.com/", CookieAcceptPolicy::OriginalServer);
        assert!(matches!(refused, Err(CookieError::Malformed(_))));
    }

    #[test]
    fn expired_cookie_becomes_removal() {
        let update = resolve_for("a=1; Path=/x; Max-Age=0", "https://example.com/x/y", CookieAcceptPolicy::OriginalServer).unwrap();
        assert_eq!(
            update,
            CookieUpdate::Remove {
                domain: "example.com".into(),
                path: "/x".into(),
                name: "a".into(),
            }
        );
    }
}
