//! Annotated `docker-compose.yml` rendering.
//!
//! Output layout, in order: the description as a comment block, the service
//! header, an optional `command`, then the `ports`, `environment`,
//! `volumes`, `labels` and `devices` sections. Entries inside a section are
//! sorted by key, so rendering a template twice is byte-identical.
//!
//! Free text only ever lands in comments. Values are written as plain YAML
//! scalars when they read back unchanged, and double-quoted otherwise.

use std::borrow::Cow;
use std::fmt::Write as _;

use stencil_common::constants::RESTART_POLICY;
use stencil_common::types::{ResourceEntry, ResourceKind, Template};

use crate::sanitize::service_identifier;

/// Comment prefix of the top-level description block.
const HEADER_COMMENT: &str = "# ";
/// Comment prefix of an entry annotation inside a section.
const ENTRY_COMMENT: &str = "      # ";

/// Characters YAML parsers treat as a line break besides `\n` and `\r`.
const EXTRA_BREAKS: [char; 3] = ['\u{85}', '\u{2028}', '\u{2029}'];

/// Reflows free text into comment lines.
///
/// Carriage returns are dropped and blank lines removed. Every line after
/// the first is prefixed with `prefix`; the caller prefixes the first.
/// Returns `None` when nothing but whitespace remains.
#[must_use]
pub fn reflow(text: &str, prefix: &str) -> Option<String> {
    let mut lines = text
        .split(|c| c == '\n' || EXTRA_BREAKS.contains(&c))
        .map(|line| line.replace('\r', ""))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_end().to_owned());

    let first = lines.next()?;
    Some(lines.fold(first, |mut acc, line| {
        acc.push('\n');
        acc.push_str(prefix);
        acc.push_str(&line);
        acc
    }))
}

fn is_unprintable(c: char) -> bool {
    c.is_control() || EXTRA_BREAKS.contains(&c) || c == '\u{feff}'
}

fn needs_quotes(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    let second = chars.next();

    let reserved_start = matches!(
        first,
        ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`'
    );
    let bare_indicator =
        matches!(first, '-' | '?' | ':') && second.is_none_or(char::is_whitespace);
    let lower = value.to_ascii_lowercase();
    let implicit_type = value.parse::<f64>().is_ok()
        || lower.starts_with("0x")
        || lower.starts_with("0o")
        || [
            "true", "false", "yes", "no", "on", "off", "null", "~", ".inf", "-.inf", "+.inf", ".nan",
        ]
        .contains(&lower.as_str());

    reserved_start
        || bare_indicator
        || implicit_type
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace)
        || value.ends_with(':')
        || value.contains(": ")
        || value.contains(" #")
        || value.chars().any(is_unprintable)
}

/// Formats a value as a YAML scalar that parses back to exactly `value`.
#[must_use]
pub fn scalar(value: &str) -> Cow<'_, str> {
    if !needs_quotes(value) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if is_unprintable(c) => {
                let _ = write!(out, "\\u{:04X}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    Cow::Owned(out)
}

/// Renders the data line value of one entry for its kind.
#[must_use]
pub fn binding(kind: ResourceKind, entry: &ResourceEntry) -> String {
    let default = entry.default.as_deref().unwrap_or_default();
    let target = entry.target.as_str();
    match kind {
        ResourceKind::Port | ResourceKind::Volume => format!("{default}:{target}"),
        ResourceKind::Environment | ResourceKind::Label => format!("{target}={default}"),
        ResourceKind::Device => format!("{target}:{default}"),
    }
}

fn render_section(out: &mut String, kind: ResourceKind, template: &Template) {
    let entries = template.resources(kind);
    if entries.is_empty() {
        out.push_str(&format!("    {}: []\n", kind.section_name()));
        return;
    }

    out.push_str(&format!("    {}:", kind.section_name()));
    for (key, entry) in entries {
        let description = entry
            .description
            .as_deref()
            .and_then(|d| reflow(d, ENTRY_COMMENT));
        let annotation = match (reflow(key, ENTRY_COMMENT), description) {
            (Some(key), Some(text)) => Some(format!("{key} {text}")),
            (key, text) => key.or(text),
        };
        if let Some(text) = annotation {
            out.push_str(&format!("\n{ENTRY_COMMENT}{text}"));
        }
        out.push_str(&format!("\n      - {}", scalar(&binding(kind, entry))));
    }
    out.push('\n');
}

/// Renders one template as a compose document.
///
/// `app_name` is reduced with [`service_identifier`], which becomes both the
/// service key and the container name.
#[must_use]
pub fn render(app_name: &str, template: &Template) -> String {
    let identifier = service_identifier(app_name);
    let identifier = scalar(&identifier);
    let mut out = String::new();

    if let Some(description) = template
        .description
        .as_deref()
        .and_then(|d| reflow(d, HEADER_COMMENT))
    {
        out.push_str(&format!("{HEADER_COMMENT}{description}\n\n"));
    }

    out.push_str("services:\n");
    out.push_str(&format!("  {identifier}:\n"));
    out.push_str(&format!("    image: {}\n", scalar(&template.image)));
    out.push_str(&format!("    container_name: {identifier}\n"));
    out.push_str(&format!("    restart: {RESTART_POLICY}\n"));
    out.push_str(&format!("    network_mode: {}\n", scalar(&template.network_mode)));

    if let Some(command) = template.post_arguments.as_deref().filter(|c| !c.is_empty()) {
        out.push_str(&format!("    command: {}\n", scalar(command)));
    }

    for kind in ResourceKind::RENDER_ORDER {
        render_section(&mut out, kind, template);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Template {
        let mut t = Template::new("Plex Media Server", "plexinc/pms-docker");
        t.description = Some("Stream your media.\r\n\r\nAnywhere.".into());
        let _ = t.insert_resource(
            ResourceKind::Port,
            "Web UI",
            ResourceEntry::new("32400").with_default("32400").with_description("Main port"),
        );
        let _ = t.insert_resource(
            ResourceKind::Environment,
            "TZ",
            ResourceEntry::new("TZ").with_default("Europe/Paris"),
        );
        t
    }

    #[test]
    fn reflow_drops_blank_lines_and_prefixes_continuations() {
        assert_eq!(
            reflow("one\n\n  \ntwo\r\nthree  ", "# ").as_deref(),
            Some("one\n# two\n# three")
        );
        assert_eq!(reflow(" \n\r\n", "# "), None);
        assert_eq!(reflow("", "# "), None);
    }

    #[test]
    fn reflow_keeps_leading_indentation() {
        assert_eq!(reflow("a\n  b", "# ").as_deref(), Some("a\n#   b"));
    }

    #[test]
    fn render_full_document() {
        let expected = "\
# Stream your media.
# Anywhere.

services:
  plexmediaserver:
    image: plexinc/pms-docker
    container_name: plexmediaserver
    restart: unless-stopped
    network_mode: bridge
    ports:
      # Web UI Main port
      - 32400:32400
    environment:
      # TZ
      - TZ=Europe/Paris
    volumes: []
    labels: []
    devices: []
";
        assert_eq!(render("Plex Media Server", &template()), expected);
    }

    #[test]
    fn render_is_idempotent() {
        let t = template();
        assert_eq!(render("Plex", &t), render("Plex", &t));
    }

    #[test]
    fn empty_section_marker_is_on_header_line() {
        let out = render("x", &Template::new("x", "img"));
        assert!(out.contains("    ports: []\n    environment: []\n"));
        assert!(!out.contains("    ports:\n"));
    }

    #[test]
    fn command_only_when_post_arguments_present() {
        let mut t = Template::new("x", "img");
        assert!(!render("x", &t).contains("command:"));
        t.post_arguments = Some(String::new());
        assert!(!render("x", &t).contains("command:"));
        t.post_arguments = Some("--serve --port 80".into());
        assert!(render("x", &t).contains("    network_mode: bridge\n    command: --serve --port 80\n    ports: []"));
    }

    #[test]
    fn missing_description_starts_with_services() {
        assert!(render("x", &Template::new("x", "img")).starts_with("services:\n"));
    }

    #[test]
    fn bindings_follow_kind() {
        let entry = ResourceEntry::new("/dev/dri").with_default("/dev/dri0");
        assert_eq!(binding(ResourceKind::Device, &entry), "/dev/dri:/dev/dri0");
        let volume = ResourceEntry::new("/config").with_default("/mnt/cfg");
        assert_eq!(binding(ResourceKind::Volume, &volume), "/mnt/cfg:/config");
        let label = ResourceEntry::new("traefik.enable").with_default("true");
        assert_eq!(binding(ResourceKind::Label, &label), "traefik.enable=true");
        assert_eq!(binding(ResourceKind::Port, &ResourceEntry::new("80")), ":80");
    }

    #[test]
    fn entry_description_continues_at_entry_indent() {
        let mut t = Template::new("x", "img");
        let _ = t.insert_resource(
            ResourceKind::Volume,
            "/data",
            ResourceEntry::new("/data")
                .with_default("/mnt/data")
                .with_description("Media library\n\nread only is fine"),
        );
        let out = render("x", &t);
        assert!(out.contains(
            "    volumes:\n      # /data Media library\n      # read only is fine\n      - /mnt/data:/data\n"
        ));
    }

    #[test]
    fn plain_scalars_stay_unquoted() {
        for value in ["TZ=Europe/Paris", "32400:32400", ":80", "--verbose", "a:b", "lscr.io/app:latest"] {
            assert_eq!(scalar(value), value);
        }
    }

    #[test]
    fn unsafe_scalars_are_double_quoted() {
        assert_eq!(scalar("MSG=Status: ok"), r#""MSG=Status: ok""#);
        assert_eq!(scalar("x #tag"), r#""x #tag""#);
        assert_eq!(scalar("- item"), r#""- item""#);
        assert_eq!(scalar("*ref"), r#""*ref""#);
        assert_eq!(scalar("true"), r#""true""#);
        assert_eq!(scalar("8080"), r#""8080""#);
        assert_eq!(scalar("say \"hi\"\n"), r#""say \"hi\"\n""#);
        assert_eq!(scalar("tab\there"), r#""tab\there""#);
        assert_eq!(scalar(""), r#""""#);
    }

    #[test]
    fn multi_line_key_stays_inside_comments() {
        let mut t = Template::new("x", "img");
        let _ = t.insert_resource(
            ResourceKind::Port,
            "Web\nUI",
            ResourceEntry::new("80").with_default("8080").with_description("Main"),
        );
        let out = render("x", &t);
        assert!(out.contains("    ports:\n      # Web\n      # UI Main\n      - 8080:80\n"));
    }

    #[test]
    fn entries_are_sorted_by_key() {
        let mut t = Template::new("x", "img");
        for port in ["9000", "80", "443"] {
            let _ = t.insert_resource(ResourceKind::Port, port, ResourceEntry::new(port).with_default(port));
        }
        let out = render("x", &t);
        let p443 = out.find("- 443:443").expect("443");
        let p80 = out.find("- 80:80").expect("80");
        let p9000 = out.find("- 9000:9000").expect("9000");
        assert!(p443 < p80 && p80 < p9000);
    }
}
