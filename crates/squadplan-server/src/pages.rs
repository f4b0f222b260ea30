//! Server-rendered HTML pages.
//!
//! Templates are compiled into the binary and filled by plain `{{name}}`
//! substitution. Every value is HTML-escaped unless it is produced here.

use squadplan_core::WeekendDays;

const LOGIN_TEMPLATE: &str = include_str!("../templates/login.html");
const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Values the planning page needs.
#[derive(Debug, Clone)]
pub struct IndexPage<'a> {
    /// Logged-in user.
    pub username: &'a str,
    /// Whether the save controls are enabled.
    pub is_admin: bool,
    /// Width of one day in the chart.
    pub day_px: u32,
    /// Non-working weekdays.
    pub weekend: WeekendDays,
}

/// Render the login form, optionally with an error message.
pub fn login(error: Option<&str>) -> String {
    let error_html = error
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .unwrap_or_default();
    render(LOGIN_TEMPLATE, &[("error", &error_html)])
}

/// Render the planning page.
pub fn index(page: &IndexPage<'_>) -> String {
    // The browser counts weekdays from Sunday = 0.
    let weekend_days = page
        .weekend
        .sunday_based()
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",");
    render(
        INDEX_TEMPLATE,
        &[
            ("username", &escape(page.username)),
            ("is_admin", if page.is_admin { "true" } else { "false" }),
            ("day_px", &page.day_px.to_string()),
            ("weekend_days", &format!("[{weekend_days}]")),
            ("weekend_label", &escape(&page.weekend.label())),
        ],
    )
}

/// Fill `{{name}}` placeholders in one pass; inserted values are never
/// scanned again. Unknown placeholders are kept verbatim.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        match vars.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
