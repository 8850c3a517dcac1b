//! Purpose: Render pretty JSON with optional ANSI colorization for CLI output.
//! Exports: `render_json`.
//! Role: Small, pure formatter used by CLI emission paths.
//! Invariants: When color is disabled, output equals serde_json::to_string_pretty.
//! Invariants: ANSI escapes appear only when explicitly enabled.
use serde_json::Value;

const INDENT: &str = "  ";

#[derive(Copy, Clone)]
enum Tone {
    Key,
    Text,
    Number,
    Keyword,
    Null,
    Punct,
}

// Conservative 8/16-color palette for broad terminal compatibility.
impl Tone {
    fn code(self) -> &'static str {
        match self {
            Tone::Key => "36",
            Tone::Text => "32",
            Tone::Number => "33",
            Tone::Keyword => "35",
            Tone::Null | Tone::Punct => "39",
        }
    }
}

struct Painter {
    enabled: bool,
}

impl Painter {
    fn paint(&self, out: &mut String, tone: Tone, text: &str) {
        if !self.enabled {
            out.push_str(text);
            return;
        }
        out.push_str("\u{1b}[");
        out.push_str(tone.code());
        out.push('m');
        out.push_str(text);
        out.push_str("\u{1b}[0m");
    }

    fn indent(&self, out: &mut String, level: usize) {
        for _ in 0..level {
            out.push_str(INDENT);
        }
    }
}

pub fn render_json(value: &Value, use_color: bool) -> String {
    let painter = Painter { enabled: use_color };
    let mut out = String::new();
    render_value(&painter, &mut out, value, 0);
    out
}

fn render_value(painter: &Painter, out: &mut String, value: &Value, level: usize) {
    match value {
        Value::Null => painter.paint(out, Tone::Null, "null"),
        Value::Bool(flag) => {
            painter.paint(out, Tone::Keyword, if *flag { "true" } else { "false" });
        }
        Value::Number(num) => painter.paint(out, Tone::Number, &num.to_string()),
        Value::String(text) => painter.paint(out, Tone::Text, &quote(text)),
        Value::Array(items) => {
            if items.is_empty() {
                painter.paint(out, Tone::Punct, "[]");
                return;
            }
            painter.paint(out, Tone::Punct, "[");
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    painter.paint(out, Tone::Punct, ",");
                }
                out.push('\n');
                painter.indent(out, level + 1);
                render_value(painter, out, item, level + 1);
            }
            out.push('\n');
            painter.indent(out, level);
            painter.paint(out, Tone::Punct, "]");
        }
        Value::Object(map) => {
            if map.is_empty() {
                painter.paint(out, Tone::Punct, "{}");
                return;
            }
            painter.paint(out, Tone::Punct, "{");
            for (idx, (key, item)) in map.iter().enumerate() {
                if idx > 0 {
                    painter.paint(out, Tone::Punct, ",");
                }
                out.push('\n');
                painter.indent(out, level + 1);
                painter.paint(out, Tone::Key, &quote(key));
                painter.paint(out, Tone::Punct, ":");
                out.push(' ');
                render_value(painter, out, item, level + 1);
            }
            out.push('\n');
            painter.indent(out, level);
            painter.paint(out, Tone::Punct, "}");
        }
    }
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::render_json;
    use serde_json::json;

    #[test]
    fn render_json_matches_pretty_when_disabled() {
        let value = json!({
            "arr": [1, true, null],
            "nested": { "x": "y" },
            "empty": [],
            "none": {}
        });
        let plain = render_json(&value, false);
        let pretty = serde_json::to_string_pretty(&value).expect("pretty");
        assert_eq!(plain, pretty);
    }

    #[test]
    fn render_json_emits_ansi_when_enabled() {
        let value = json!({"k":"v","n":1,"b":true,"z":null});
        let colored = render_json(&value, true);
        assert!(colored.contains("\u{1b}[36m\"k\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[32m\"v\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[33m1\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[35mtrue\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[39mnull\u{1b}[0m"));
    }

    #[test]
    fn render_json_never_colors_when_disabled() {
        let value = json!(["text", {"k": 1}]);
        assert!(!render_json(&value, false).contains('\u{1b}'));
    }
}
