//! Pure text-hygiene helpers shared by the news pipeline and configuration.

/// Maximum length of any sanitized field, in characters.
pub const MAX_FIELD_LEN: usize = 512;

/// Sanitize a free-text field: strip control characters and `<`/`>`,
/// collapse whitespace runs to single spaces, trim, and truncate to
/// [`MAX_FIELD_LEN`] characters.
#[must_use]
pub fn sanitize_field(input: &str) -> String {
    let mut out = String::with_capacity(input.len().min(MAX_FIELD_LEN));
    let mut pending_space = false;
    for c in input.chars() {
        if c.is_control() || c == '<' || c == '>' {
            continue;
        }
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
        if out.chars().count() >= MAX_FIELD_LEN {
            break;
        }
    }
    out
}

/// Replace any run of 16 or more consecutive alphanumerics with
/// `[REDACTED]`, so error messages cannot leak embedded credentials.
#[must_use]
pub fn redact_secrets(input: &str) -> String {
    const SECRET_RUN: usize = 16;

    let mut out = String::with_capacity(input.len());
    let mut run = String::new();
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            run.push(c);
            continue;
        }
        flush_run(&mut out, &mut run, SECRET_RUN);
        out.push(c);
    }
    flush_run(&mut out, &mut run, SECRET_RUN);
    out
}

fn flush_run(out: &mut String, run: &mut String, threshold: usize) {
    if run.len() >= threshold {
        out.push_str("[REDACTED]");
    } else {
        out.push_str(run);
    }
    run.clear();
}

/// Normalize a URL field: returns the input when it parses as an absolute
/// `http`/`https` URL, otherwise an empty string.
#[must_use]
pub fn normalize_url(input: &str) -> String {
    match url::Url::parse(input) {
        Ok(u) if u.scheme() == "http" || u.scheme() == "https" => input.to_string(),
        _ => String::new(),
    }
}
