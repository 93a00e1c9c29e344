use base64::Engine;
use chrono::{DateTime, Utc};

use rsvp_core::{Attendance, AttendanceTotals, FormValue, RsvpRecord};

use crate::response_store::encode_document;

use super::{Attachment, NotificationError, OutboundEmail};

/// Attachment name for the organizer's copy of the reply document.
pub const REPLIES_ATTACHMENT: &str = "replies.json";

/// Addressing and wording shared by every outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub from: String,
    /// Organizer address; without one the summary is only logged.
    pub organizer: Option<String>,
    pub event_name: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            from: "RSVP <rsvp@localhost>".to_string(),
            organizer: None,
            event_name: "our celebration".to_string(),
        }
    }
}

/// Echo the guest's answer back to them.
pub fn compose_guest_confirmation(settings: &EmailSettings, record: &RsvpRecord) -> OutboundEmail {
    let name = escape_html(&record.name);
    let event = escape_html(&settings.event_name);

    let (subject, html) = match record.attendance() {
        Attendance::Yes => {
            let mut html = format!(
                "<p>Dear {name},</p>\
                 <p>Thank you for confirming that you will attend {event}. We can't wait to celebrate with you!</p>"
            );
            if let Some(plus_one) = record
                .bringing_someone
                .as_ref()
                .filter(|f| f.is_set())
                .and(record.plus_one_name.as_ref().and_then(FormValue::as_text))
                .filter(|p| !p.is_empty())
            {
                html.push_str(&format!(
                    "<p>We have noted that you will be joined by {}.</p>",
                    escape_html(plus_one)
                ));
            }
            html.push_str("<p>See you soon!</p>");
            (format!("See you there, {}!", record.name), html)
        }
        Attendance::No | Attendance::Undecided => (
            format!("Thank you for your reply, {}", record.name),
            format!(
                "<p>Dear {name},</p>\
                 <p>Thank you for letting us know that you can't make it to {event}. You will be missed!</p>"
            ),
        ),
    };

    OutboundEmail {
        from: settings.from.clone(),
        to: record.email.clone(),
        subject,
        text: html_to_text(&html),
        html,
        attachments: Vec::new(),
    }
}

/// Organizer summary: totals, the newest reply, and the full document as an attachment.
///
/// Returns `None` when no organizer address is configured.
pub fn compose_organizer_summary(
    settings: &EmailSettings,
    newest: &RsvpRecord,
    totals: AttendanceTotals,
    snapshot: &[RsvpRecord],
    received_at: DateTime<Utc>,
) -> Result<Option<OutboundEmail>, NotificationError> {
    let Some(organizer) = settings.organizer.as_ref() else {
        return Ok(None);
    };

    let document = encode_document(snapshot).map_err(|e| NotificationError::Compose(e.to_string()))?;
    let answer = match newest.attendance() {
        Attendance::Yes => "attending",
        Attendance::No => "not attending",
        Attendance::Undecided => "undecided",
    };

    let html = format!(
        "<p>New RSVP from <strong>{guest}</strong> ({email}): {answer}.</p>\
         <p>Attending: {yes}<br>Not attending: {no}<br>Total replies: {total}</p>\
         <p>Received at {received}. The full reply list is attached.</p>",
        guest = escape_html(&newest.full_name()),
        email = escape_html(&newest.email),
        yes = totals.yes,
        no = totals.no,
        total = snapshot.len(),
        received = received_at.to_rfc3339(),
    );

    Ok(Some(OutboundEmail {
        from: settings.from.clone(),
        to: organizer.clone(),
        subject: format!("New RSVP: {}", newest.full_name()),
        text: html_to_text(&html),
        html,
        attachments: vec![Attachment {
            filename: REPLIES_ATTACHMENT.to_string(),
            content_type: "application/json".to_string(),
            content: base64::engine::general_purpose::STANDARD.encode(document),
        }],
    }))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Plain-text rendering of the small HTML bodies composed above.
///
/// Paragraph ends and `<br>` become line breaks; other tags are dropped.
pub fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            rest = &rest[start..];
            break;
        };
        let tag = rest[start + 1..start + end].trim().to_ascii_lowercase();
        if tag == "/p" {
            text.push_str("\n\n");
        } else if tag.trim_end_matches('/').trim() == "br" {
            text.push('\n');
        }
        rest = &rest[start + end + 1..];
    }
    text.push_str(rest);

    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use rsvp_core::Flag;

    use super::*;

    fn settings() -> EmailSettings {
        EmailSettings {
            from: "RSVP <rsvp@example.com>".to_string(),
            organizer: Some("host@example.com".to_string()),
            event_name: "the wedding".to_string(),
        }
    }

    #[test]
    fn attending_guest_gets_attending_variant() {
        let mut record = RsvpRecord::new("Ada", "Lovelace", "a@x.com").with_is_coming("yes");
        record.bringing_someone = Some(Flag::Bool(true));
        record.plus_one_name = Some("Charles".into());

        let email = compose_guest_confirmation(&settings(), &record);
        assert_eq!(email.to, "a@x.com");
        assert_eq!(email.from, "RSVP <rsvp@example.com>");
        assert!(email.subject.contains("Ada"));
        assert!(email.html.contains("will attend the wedding"));
        assert!(email.html.contains("Charles"));
        assert!(email.text.starts_with("Dear Ada,"));
        assert!(!email.text.contains('<'));
        assert!(email.attachments.is_empty());
    }

    #[test]
    fn non_attending_guest_gets_regrets_variant() {
        for answer in [Some("no"), Some("maybe"), None] {
            let mut record = RsvpRecord::new("Alan", "Turing", "t@x.com");
            record.is_coming = answer.map(FormValue::from);

            let email = compose_guest_confirmation(&settings(), &record);
            assert!(email.html.contains("can't make it"));
            assert!(email.text.contains("Dear Alan,"));
        }
    }

    #[test]
    fn guest_supplied_text_is_escaped() {
        let record = RsvpRecord::new("<script>", "X", "x@x.com").with_is_coming("yes");
        let email = compose_guest_confirmation(&settings(), &record);
        assert!(email.html.contains("&lt;script&gt;"));
        assert!(email.text.contains("<script>"));
    }

    #[test]
    fn summary_carries_totals_and_base64_document() {
        let snapshot = vec![
            RsvpRecord::new("Ada", "Lovelace", "a@x.com").with_is_coming("yes"),
            RsvpRecord::new("Alan", "Turing", "t@x.com").with_is_coming("no"),
        ];
        let totals = AttendanceTotals::compute(&snapshot);

        let email = compose_organizer_summary(&settings(), &snapshot[1], totals, &snapshot, Utc::now())
            .unwrap()
            .unwrap();

        assert_eq!(email.to, "host@example.com");
        assert_eq!(email.subject, "New RSVP: Alan Turing");
        assert!(email.text.contains("Attending: 1"));
        assert!(email.text.contains("Not attending: 1"));
        assert!(email.text.contains("Total replies: 2"));

        assert_eq!(email.attachments.len(), 1);
        let attachment = &email.attachments[0];
        assert_eq!(attachment.filename, REPLIES_ATTACHMENT);
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&attachment.content)
            .unwrap();
        assert_eq!(decoded, encode_document(&snapshot).unwrap());
    }

    #[test]
    fn summary_is_skipped_without_organizer() {
        let settings = EmailSettings {
            organizer: None,
            ..settings()
        };
        let record = RsvpRecord::new("Ada", "Lovelace", "a@x.com");
        let email =
            compose_organizer_summary(&settings, &record, AttendanceTotals::default(), &[], Utc::now()).unwrap();
        assert!(email.is_none());
    }

    #[test]
    fn html_to_text_handles_breaks_and_entities() {
        let text = html_to_text("<p>A &amp; B</p><p>one<br>two<br/>three</p>");
        assert_eq!(text, "A & B\n\none\ntwo\nthree");
    }
}
