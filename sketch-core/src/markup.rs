//! # Markup Emitter
//!
//! Renders a layout tree to HTML plus a stylesheet. This is a pure fold over
//! the tree with a fixed template per component type; it makes no decisions.

use std::fmt::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::component::{ComponentStyle, ComponentType, UIComponent};
use crate::layout::LayoutNode;
use crate::text::TextConfig;

/// Indentation per nesting level.
const INDENT: &str = "  ";

/// Shared stylesheet for class-based output.
const CLASS_STYLESHEET: &str = "\
/* Generated from a UI sketch */

body {
    font-family: 'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    padding: 2rem;
    background-color: #f4f6f8;
    line-height: 1.6;
}

.row-container {
    display: flex;
    flex-direction: row;
    gap: 16px;
    margin-bottom: 16px;
    align-items: center;
    flex-wrap: wrap;
}

.btn {
    padding: 10px 20px;
    background-color: #007bff;
    color: white;
    border: none;
    border-radius: 4px;
    font-size: 16px;
    font-weight: 500;
    cursor: pointer;
    transition: background-color 0.2s ease;
}

.btn:hover {
    background-color: #0056b3;
}

.btn:active {
    background-color: #004085;
}

.input-field {
    padding: 10px 12px;
    border: 1px solid #ccc;
    border-radius: 4px;
    font-size: 16px;
    min-width: 200px;
    transition: border-color 0.2s ease;
}

.input-field:focus {
    outline: none;
    border-color: #007bff;
    box-shadow: 0 0 0 3px rgba(0, 123, 255, 0.1);
}

.text-label {
    font-size: 14px;
    color: #333;
    font-weight: 500;
    display: inline-block;
}

.checkbox-wrapper {
    display: flex;
    align-items: center;
    gap: 8px;
}

.checkbox-wrapper input[type=\"checkbox\"] {
    width: 18px;
    height: 18px;
    cursor: pointer;
}

.checkbox-wrapper label {
    cursor: pointer;
    user-select: none;
}

.card {
    background: white;
    padding: 20px;
    border-radius: 8px;
    box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1);
    margin-bottom: 20px;
}

/* Unrecognized shapes */
.unknown-box {
    border: 2px dashed #fecea8;
    background: #fff4e5;
    padding: 10px;
    border-radius: 4px;
    min-width: 50px;
    min-height: 50px;
}
";

/// Minimal layout stylesheet; colors and fonts come from inline styles.
const INLINE_STYLESHEET: &str = "\
/* Base layout, appearance is inline */

#generated-content {
    padding: 20px;
    font-family: -apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, Helvetica, Arial, sans-serif;
}

.row-container {
    display: flex;
    flex-direction: row;
    gap: 12px;
    margin-bottom: 12px;
    align-items: center;
}

.btn {
    padding: 10px 20px;
    cursor: pointer;
    font-weight: 500;
    transition: opacity 0.2s;
}

.btn:hover {
    opacity: 0.8;
}

.input-field {
    padding: 10px 12px;
    font-size: 14px;
    outline: none;
}

.input-field:focus {
    outline: 2px solid #007bff;
    outline-offset: 2px;
}

.text-label {
    margin: 0;
    line-height: 1.5;
}

.checkbox-wrapper {
    display: flex;
    align-items: center;
    gap: 8px;
}

.card {
    padding: 20px;
    margin-bottom: 20px;
}

.unknown-box {
    border: 2px dashed #fecea8;
    min-width: 50px;
    min-height: 50px;
}
";

/// How appearance is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleMode {
    /// Shared classes only; style records are ignored.
    #[default]
    Classes,
    /// Style records become `style="…"` attributes.
    Inline,
}

impl StyleMode {
    /// Stylesheet that accompanies markup in this mode.
    #[must_use]
    pub const fn stylesheet(self) -> &'static str {
        match self {
            StyleMode::Classes => CLASS_STYLESHEET,
            StyleMode::Inline => INLINE_STYLESHEET,
        }
    }
}

impl fmt::Display for StyleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleMode::Classes => f.write_str("classes"),
            StyleMode::Inline => f.write_str("inline"),
        }
    }
}

impl FromStr for StyleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classes" | "class" => Ok(StyleMode::Classes),
            "inline" => Ok(StyleMode::Inline),
            other => Err(format!("unknown style mode: {other}")),
        }
    }
}

/// Emitted markup and stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Markup {
    /// HTML fragment.
    pub html: String,
    /// CSS stylesheet.
    pub css: String,
}

/// Escape the five markup-significant characters.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Text safe inside `<!-- … -->`.
fn comment_text(input: &str) -> String {
    let escaped = escape_html(input);
    let mut out = String::with_capacity(escaped.len());
    for c in escaped.chars() {
        if c == '-' && out.ends_with('-') {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Inline declarations for a style record, `None` when nothing applies.
fn inline_declarations(style: &ComponentStyle) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(fill) = style.fill_color.as_deref() {
        if !fill.is_empty() && fill != "transparent" {
            parts.push(format!("background-color: {fill}"));
        }
    }
    if let Some(border) = style.border_color.as_deref() {
        if !border.is_empty() {
            let width = style.border_width.unwrap_or(2.0);
            parts.push(format!("border: {width}px solid {border}"));
        }
    }
    if let Some(radius) = style.border_radius.filter(|r| r.abs() > f32::EPSILON) {
        parts.push(format!("border-radius: {radius}px"));
    }
    if let Some(size) = style.font_size.filter(|s| *s > 0.0) {
        parts.push(format!("font-size: {size}px"));
    }
    if let Some(color) = style.font_color.as_deref() {
        if !color.is_empty() {
            parts.push(format!("color: {color}"));
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// Walks a layout tree and renders it.
#[derive(Debug, Clone, Copy)]
pub struct MarkupEmitter<'a> {
    text: &'a TextConfig,
}

impl<'a> MarkupEmitter<'a> {
    /// Create an emitter that uses `text` for empty component text.
    #[must_use]
    pub fn new(text: &'a TextConfig) -> Self {
        Self { text }
    }

    /// Render `tree` in `mode`. Never fails.
    #[must_use]
    pub fn emit(&self, tree: &LayoutNode, mode: StyleMode) -> Markup {
        let mut html = String::with_capacity(1024);
        self.render_node(&mut html, tree, mode, 0);
        Markup {
            html,
            css: mode.stylesheet().to_string(),
        }
    }

    fn render_node(&self, out: &mut String, node: &LayoutNode, mode: StyleMode, depth: usize) {
        match node {
            LayoutNode::Root { children } => {
                if children.is_empty() {
                    return;
                }
                out.push_str("<div id=\"generated-content\">\n");
                for child in children {
                    self.render_node(out, child, mode, depth + 1);
                }
                out.push_str("</div>\n");
            }
            LayoutNode::Row { children } => {
                let indent = INDENT.repeat(depth);
                let _ = writeln!(out, "{indent}<div class=\"row-container\">");
                for child in children {
                    self.render_node(out, child, mode, depth + 1);
                }
                let _ = writeln!(out, "{indent}</div>");
            }
            LayoutNode::Leaf { component } => self.render_component(out, component, mode, depth),
        }
    }

    fn render_component(
        &self,
        out: &mut String,
        component: &UIComponent,
        mode: StyleMode,
        depth: usize,
    ) {
        let indent = INDENT.repeat(depth);
        let id = escape_html(component.id.as_str());
        let text = escape_html(self.text.or_fallback(component.kind, &component.text));
        let style = match mode {
            StyleMode::Inline => component
                .style
                .as_ref()
                .and_then(inline_declarations)
                .map(|decl| format!(" style=\"{}\"", escape_html(&decl)))
                .unwrap_or_default(),
            StyleMode::Classes => String::new(),
        };

        let _ = writeln!(
            out,
            "{indent}<!-- {}: {} -->",
            comment_text(component.id.as_str()),
            comment_text(component.type_label())
        );

        match component.kind {
            ComponentType::Button => {
                let _ = writeln!(out, "{indent}<button class=\"btn\"{style}>{text}</button>");
            }
            ComponentType::Input => {
                let _ = writeln!(
                    out,
                    "{indent}<input type=\"text\" class=\"input-field\" placeholder=\"{text}\"{style} />"
                );
            }
            ComponentType::Label => {
                let _ = writeln!(out, "{indent}<label class=\"text-label\"{style}>{text}</label>");
            }
            ComponentType::Checkbox => {
                let _ = writeln!(out, "{indent}<div class=\"checkbox-wrapper\"{style}>");
                let _ = writeln!(out, "{indent}{INDENT}<input type=\"checkbox\" id=\"{id}\" />");
                let _ = writeln!(out, "{indent}{INDENT}<label for=\"{id}\">{text}</label>");
                let _ = writeln!(out, "{indent}</div>");
            }
            ComponentType::Container => {
                let _ = writeln!(out, "{indent}<div class=\"card\"{style}></div>");
            }
            ComponentType::Box => {
                let _ = writeln!(
                    out,
                    "{indent}<div class=\"unknown-box\" data-type=\"{}\"{style}></div>",
                    escape_html(component.type_label())
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    use super::*;
    use crate::component::ComponentId;
    use crate::geometry::BBox;

    fn comp(index: usize, kind: ComponentType) -> UIComponent {
        UIComponent::new(
            ComponentId::from_index(index),
            kind,
            BBox::new(0.0, 0.0, 10.0, 10.0),
        )
    }

    fn leaf(component: UIComponent) -> LayoutNode {
        LayoutNode::Leaf { component }
    }

    fn emit(tree: &LayoutNode, mode: StyleMode) -> Markup {
        let text = TextConfig::default();
        MarkupEmitter::new(&text).emit(tree, mode)
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("Submit & <Close>"),
            "Submit &amp; &lt;Close&gt;"
        );
        assert_eq!(escape_html(r#"a "b" 'c'"#), "a &quot;b&quot; &#39;c&#39;");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn test_escaped_text_reparses_to_original() {
        let tree = LayoutNode::Root {
            children: vec![leaf(
                comp(0, ComponentType::Button).with_text("Submit & <Close>"),
            )],
        };

        let markup = emit(&tree, StyleMode::Classes);
        assert!(markup.html.contains("Submit &amp; &lt;Close&gt;"));

        let mut reader = Reader::from_str(&markup.html);
        let mut in_button = false;
        let mut recovered = None;
        loop {
            match reader.read_event().expect("markup should parse") {
                Event::Start(e) if e.name().as_ref() == b"button" => in_button = true,
                Event::Text(t) if in_button => {
                    recovered = Some(t.unescape().expect("should unescape").into_owned());
                    in_button = false;
                }
                Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(recovered.as_deref(), Some("Submit & <Close>"));
    }

    #[test]
    fn test_empty_tree() {
        let markup = emit(&LayoutNode::empty(), StyleMode::Classes);
        assert!(markup.html.is_empty());
        assert!(markup.css.contains(".btn"));

        let inline = emit(&LayoutNode::empty(), StyleMode::Inline);
        assert!(inline.html.is_empty());
        assert!(inline.css.contains("#generated-content"));
    }

    #[test]
    fn test_row_and_leaf_structure() {
        let tree = LayoutNode::Root {
            children: vec![
                LayoutNode::Row {
                    children: vec![
                        leaf(comp(0, ComponentType::Label).with_text("Name")),
                        leaf(comp(1, ComponentType::Input)),
                    ],
                },
                leaf(comp(2, ComponentType::Button).with_text("Save")),
            ],
        };

        let html = emit(&tree, StyleMode::Classes).html;

        let expected = "\
<div id=\"generated-content\">
  <div class=\"row-container\">
    <!-- comp_000: label -->
    <label class=\"text-label\">Name</label>
    <!-- comp_001: input -->
    <input type=\"text\" class=\"input-field\" placeholder=\"Enter text\" />
  </div>
  <!-- comp_002: button -->
  <button class=\"btn\">Save</button>
</div>
";
        assert_eq!(html, expected);
    }

    #[test]
    fn test_checkbox_template() {
        let tree = LayoutNode::Root {
            children: vec![leaf(comp(3, ComponentType::Checkbox))],
        };

        let html = emit(&tree, StyleMode::Classes).html;

        assert!(html.contains("<div class=\"checkbox-wrapper\">"));
        assert!(html.contains("<input type=\"checkbox\" id=\"comp_003\" />"));
        assert!(html.contains("<label for=\"comp_003\">Option</label>"));
    }

    #[test]
    fn test_box_carries_original_type() {
        let mut shape = comp(4, ComponentType::Box);
        shape.source_kind = Some("ellipse".to_string());
        let tree = LayoutNode::Root {
            children: vec![leaf(shape), leaf(comp(5, ComponentType::Container))],
        };

        let html = emit(&tree, StyleMode::Classes).html;

        assert!(html.contains("<div class=\"unknown-box\" data-type=\"ellipse\"></div>"));
        assert!(html.contains("<!-- comp_004: ellipse -->"));
        assert!(html.contains("<div class=\"card\"></div>"));
    }

    #[test]
    fn test_inline_styles_only_in_inline_mode() {
        let style = ComponentStyle {
            fill_color: Some("#ff0000".to_string()),
            border_color: Some("#000".to_string()),
            border_width: None,
            border_radius: Some(6.0),
            font_size: Some(18.0),
            font_color: Some("white".to_string()),
        };
        let tree = LayoutNode::Root {
            children: vec![leaf(
                comp(0, ComponentType::Button)
                    .with_text("Go")
                    .with_style(style),
            )],
        };

        let inline = emit(&tree, StyleMode::Inline).html;
        assert!(inline.contains(
            "<button class=\"btn\" style=\"background-color: #ff0000; border: 2px solid #000; border-radius: 6px; font-size: 18px; color: white\">Go</button>"
        ));

        let classes = emit(&tree, StyleMode::Classes).html;
        assert!(!classes.contains("style="));
    }

    #[test]
    fn test_transparent_fill_skipped() {
        let style = ComponentStyle {
            fill_color: Some("transparent".to_string()),
            ..ComponentStyle::default()
        };
        assert_eq!(inline_declarations(&style), None);
    }

    #[test]
    fn test_style_values_escaped() {
        let style = ComponentStyle {
            font_color: Some("\"><script>".to_string()),
            ..ComponentStyle::default()
        };
        let tree = LayoutNode::Root {
            children: vec![leaf(comp(0, ComponentType::Label).with_style(style))],
        };

        let html = emit(&tree, StyleMode::Inline).html;

        assert!(!html.contains("<script>"));
        assert!(html.contains("color: &quot;&gt;&lt;script&gt;"));
    }

    #[test]
    fn test_comment_cannot_be_closed_early() {
        let mut shape = comp(0, ComponentType::Box);
        shape.source_kind = Some("x-->y".to_string());
        let tree = LayoutNode::Root {
            children: vec![leaf(shape)],
        };

        let html = emit(&tree, StyleMode::Classes).html;

        assert!(html.contains("<!-- comp_000: x- -&gt;y -->"));
    }

    #[test]
    fn test_comment_dash_runs_split() {
        assert_eq!(comment_text("x---y"), "x- - -y");
        assert_eq!(comment_text("----"), "- - - -");
        assert!(!comment_text("a-----b").contains("--"));
        assert_eq!(comment_text("a-b"), "a-b");
    }

    #[test]
    fn test_style_mode_parse() {
        assert_eq!("inline".parse::<StyleMode>(), Ok(StyleMode::Inline));
        assert_eq!("Classes".parse::<StyleMode>(), Ok(StyleMode::Classes));
        assert!("fancy".parse::<StyleMode>().is_err());
        assert_eq!(StyleMode::Inline.to_string(), "inline");
    }
}
