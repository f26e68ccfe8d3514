use hoist::LogFetch;

use crate::ui::blocks::header::CommandHeader;
use crate::ui::blocks::warning::WarningBlock;
use crate::ui::primitives::border::rule;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

pub fn render_logs_header(
    destination: &str,
    service: &str,
    lines: usize,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut header = CommandHeader::new(Icon::Remote, "Hoist Logs");
    header.add("Server", destination);
    header.add("Service", service);
    header.add("Lines", lines.to_string());
    header.render(supports_color, supports_unicode)
}

/// Journal output framed by rules; stderr and a non-zero exit become a warning box.
pub fn render_logs(
    service: &str,
    fetch: &LogFetch,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let marker = |label: String| {
        let text = format!(" {label} ");
        let side = rule(3, supports_unicode);
        ColoredText::dim(format!("{side}{text}{side}")).render(supports_color)
    };

    let mut out = String::new();
    out.push('\n');
    out.push_str(&marker(format!("journal: {service}")));
    out.push('\n');
    if fetch.stdout.trim().is_empty() {
        out.push_str(&ColoredText::dim("(no entries)").render(supports_color));
        out.push('\n');
    } else {
        out.push_str(fetch.stdout.trim_end());
        out.push('\n');
    }
    out.push_str(&marker("end of journal".to_string()));
    out.push('\n');

    let mut warning = WarningBlock::new("journalctl reported problems");
    for line in fetch.stderr.lines().filter(|l| !l.trim().is_empty()) {
        warning.add_line(line);
    }
    if fetch.exit_code != 0 {
        warning.add_line(format!("exit code {}", fetch.exit_code));
    }
    if !warning.is_empty() {
        out.push('\n');
        out.push_str(&warning.render(supports_color, supports_unicode));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch(stdout: &str, stderr: &str, exit_code: i32) -> LogFetch {
        LogFetch {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code,
        }
    }

    #[test]
    fn journal_is_framed_by_markers() {
        let rendered = render_logs("shop", &fetch("line one\nline two\n", "", 0), false, false);

        assert!(rendered.contains("--- journal: shop ---\nline one\nline two\n--- end of journal ---"));
        assert!(!rendered.contains("[WARN]"));
    }

    #[test]
    fn stderr_becomes_a_warning() {
        let rendered = render_logs(
            "shop",
            &fetch("", "No journal files were found.", 1),
            false,
            false,
        );

        assert!(rendered.contains("(no entries)"));
        assert!(rendered.contains("[WARN] journalctl reported problems"));
        assert!(rendered.contains("No journal files were found."));
        assert!(rendered.contains("exit code 1"));
    }
}
