/// Domain classification: grouping keys and group colors for tabs
use crate::tab_data::GroupColor;
use std::cell::RefCell;
use std::collections::HashMap;
use url::Url;

/// Extract the grouping key for a tab URL
///
/// Algorithm:
/// 1. Parse the URL
/// 2. Take its hostname
/// 3. Strip a leading "www." label
///
/// URLs that fail to parse, or have no host, map to the empty key so that
/// they all land in the same "no domain" bucket.
///
/// Examples:
/// - https://www.google.com/search → google.com
/// - https://mail.google.com → mail.google.com
/// - chrome://extensions/ → extensions
/// - not-a-url → ""
pub fn domain_key(url: &str) -> String {
    let hostname = match Url::parse(url) {
        Ok(parsed) => parsed.host_str().unwrap_or_default().to_string(),
        Err(_) => return String::new(),
    };

    match hostname.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => hostname,
    }
}

/// Hash a domain to an index into the color palette
///
/// `h = h * 31 + unit` over the UTF-16 code units of the domain, wrapping at
/// 32 bits, then `|h| mod 9`. The empty domain always maps to grey.
pub fn color_index(domain: &str) -> usize {
    if domain.is_empty() {
        return 0;
    }

    let hash = domain.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });

    (i64::from(hash).unsigned_abs() % GroupColor::PALETTE.len() as u64) as usize
}

/// Maps domains to group colors, remembering every answer it gives
///
/// One classifier lives for the whole lifetime of the background worker and
/// is handed to collapse operations by reference.
#[derive(Debug, Default)]
pub struct DomainClassifier {
    colors: RefCell<HashMap<String, GroupColor>>,
}

impl DomainClassifier {
    pub fn new() -> Self {
        DomainClassifier {
            colors: RefCell::new(HashMap::new()),
        }
    }

    pub fn color_for(&self, domain: &str) -> GroupColor {
        if let Some(color) = self.colors.borrow().get(domain) {
            return *color;
        }

        let color = GroupColor::PALETTE[color_index(domain)];
        self.colors.borrow_mut().insert(domain.to_string(), color);
        color
    }

    /// Number of domains remembered so far
    pub fn cached(&self) -> usize {
        self.colors.borrow().len()
    }
}
