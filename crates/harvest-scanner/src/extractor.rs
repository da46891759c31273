//! Contact extraction from captured pages.
//!
//! Emails and phone numbers are matched over the rendered text, then
//! `mailto:` and `tel:` anchors are folded in. Matches are kept exactly as
//! captured, so the same number may appear in two formats.

use harvest_browser::PageContent;
use harvest_core::ContactSet;
use regex::Regex;
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._-]+@[a-zA-Z0-9._-]+\.[a-zA-Z0-9_-]+";

/// ASCII digits only.
const PHONE_PATTERN: &str =
    r"(?:\+?([0-9]{1,3}))?[-. (]*([0-9]{3})[-. )]*([0-9]{3})[-. ]*([0-9]{4})(?: *x([0-9]+))?";

const MAILTO_PREFIX: &str = "mailto:";
const TEL_PREFIX: &str = "tel:";

/// Emails and phone numbers found on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContacts {
    /// Email addresses, text matches first then `mailto:` targets
    pub emails: ContactSet,
    /// Phone numbers, text matches first then `tel:` targets
    pub phone_numbers: ContactSet,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("valid regex"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("valid regex"))
}

/// Extract contacts from a captured page.
#[must_use]
pub fn extract(page: &PageContent) -> ExtractedContacts {
    let mut contacts = ExtractedContacts {
        emails: extract_emails(&page.visible_text),
        phone_numbers: extract_phone_numbers(&page.visible_text),
    };

    for href in &page.anchor_hrefs {
        if let Some(address) = mailto_address(href) {
            contacts.emails.insert(address);
        } else if let Some(number) = tel_number(href) {
            contacts.phone_numbers.insert(number);
        }
    }

    contacts
}

/// Every email-shaped match in `text`, deduplicated in order of appearance.
#[must_use]
pub fn extract_emails(text: &str) -> ContactSet {
    email_regex().find_iter(text).map(|m| m.as_str()).collect()
}

/// Every phone-shaped match in `text`, deduplicated in order of appearance.
#[must_use]
pub fn extract_phone_numbers(text: &str) -> ContactSet {
    phone_regex().find_iter(text).map(|m| m.as_str()).collect()
}

/// Address part of a `mailto:` href, without any `?subject=` style query.
fn mailto_address(href: &str) -> Option<&str> {
    let rest = href.strip_prefix(MAILTO_PREFIX)?;
    let address = rest.split('?').next().unwrap_or_default();
    (!address.is_empty()).then_some(address)
}

fn tel_number(href: &str) -> Option<&str> {
    let number = href.strip_prefix(TEL_PREFIX)?;
    (!number.is_empty()).then_some(number)
}
