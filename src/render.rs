//! Minimal HTML shell shared by all pages.

const NAV: &str = concat!(
    r#"<p><a href="/">Home</a> | <a href="/register">Register</a> | "#,
    r#"<a href="/login">Login</a> | <a href="/profile">Profile</a> | "#,
    r#"<a href="/admin">Admin</a> | <a href="/logout">Logout</a></p>"#,
);

/// Wrap a body fragment in the site shell with the shared nav bar.
#[must_use]
pub fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title}</title></head><body>\n\
         <h1>{title}</h1>\n{body}\n{NAV}\n</body></html>"
    )
}

/// Escape text interpolated into markup. Form fields and stored logins pass
/// through here before rendering.
#[must_use]
pub fn escape(text: &str) -> String {
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
