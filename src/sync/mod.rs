//! Background sync paths, triggered by tag-identified events.
//!
//! Both paths are best effort: failures are logged by the caller and
//! never surfaced to the user.
//!
//! - `forms`: replay a deferred contact-form submission.
//! - `content`: poll the origin updates feed.

pub mod content;
pub mod forms;

/// Tag that triggers the contact-form replay.
pub const CONTACT_FORM_TAG: &str = "contact-form-sync";

/// Tag that triggers the periodic content sync.
pub const CONTENT_TAG: &str = "content-sync";
