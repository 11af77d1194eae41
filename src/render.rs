use pulldown_cmark::{html, Event, Options, Parser};

/// What a report page shows for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportBody {
    /// Stored HTML, rendered verbatim.
    Authoritative(String),
    /// HTML converted from the job's Markdown because no stored HTML exists yet.
    Fallback(String),
    /// Nothing to show yet.
    Pending,
}

impl ReportBody {
    pub fn html(&self) -> Option<&str> {
        match self {
            ReportBody::Authoritative(html) | ReportBody::Fallback(html) => Some(html),
            ReportBody::Pending => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReportBody::Authoritative(_) => "authoritative",
            ReportBody::Fallback(_) => "fallback",
            ReportBody::Pending => "pending",
        }
    }
}

/// Stored HTML wins; Markdown is only converted when HTML is absent.
pub fn resolve(stored_html: Option<&str>, markdown: Option<&str>) -> ReportBody {
    if let Some(html) = stored_html.filter(|h| !h.trim().is_empty()) {
        return ReportBody::Authoritative(html.to_string());
    }
    match markdown.filter(|m| !m.trim().is_empty()) {
        Some(md) => ReportBody::Fallback(markdown_to_html(md)),
        None => ReportBody::Pending,
    }
}

/// GitHub-flavored Markdown with single newlines rendered as `<br />`.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
