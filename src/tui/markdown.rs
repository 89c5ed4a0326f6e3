//! Markup → ratatui `Text` renderer for chat lines.
//!
//! Chat lines are built as `**Sender:** message` and the whole string is
//! parsed as markdown, so whatever markup the message carries is rendered
//! rather than shown literally. Inline styles, lists and fenced code blocks
//! get their own look. Any other block (headings, quotes, tables) falls back
//! to its plain text. Raw HTML cannot be drawn in a terminal and is shown dim,
//! as its source text.
//!
//! Terminal control characters are replaced before parsing, so a message can
//! change what is drawn but cannot drive the terminal itself.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const CODE_THEME: &str = "base16-ocean.dark";
const REPLACEMENT: char = '\u{FFFD}';
const TAB: &str = "    ";

/// Parse markup into styled `Text`, with `base_fg` for unstyled text.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let cleaned = neutralize_controls(content);

    let mut renderer = Renderer::new(base_fg);
    for event in Parser::new_ext(&cleaned, Options::ENABLE_STRIKETHROUGH) {
        renderer.event(event);
    }
    let mut lines = renderer.lines;
    if lines.is_empty() {
        lines.push(Line::default());
    }
    Text::from(lines)
}

/// Replaces C0/C1 control characters (ESC, BEL, CSI, ...) except newline and tab.
pub fn neutralize_controls(content: &str) -> String {
    content
        .chars()
        .map(|c| {
            if c.is_control() && c != '\n' && c != '\t' {
                REPLACEMENT
            } else {
                c
            }
        })
        .collect()
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

struct Renderer {
    lines: Vec<Line<'static>>,
    base: Style,
    /// Open inline styles, each already patched onto its parent.
    styles: Vec<Style>,
    /// Next number of the innermost ordered list, `None` for bullets.
    list: Vec<Option<u64>>,
    code: Option<CodeBlock>,
    /// A block ended; the next block starts after an empty line.
    gap: bool,
}

enum CodeBlock {
    Plain,
    Highlighted(Box<HighlightLines<'static>>),
}

impl Renderer {
    fn new(base_fg: Color) -> Self {
        Self {
            lines: Vec::new(),
            base: Style::default().fg(base_fg),
            styles: Vec::new(),
            list: Vec::new(),
            code: None,
            gap: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or(self.base)
    }

    fn push_style(&mut self, modifier: Modifier) {
        self.styles.push(self.style().add_modifier(modifier));
    }

    fn new_line(&mut self) {
        self.lines.push(Line::default());
    }

    fn span(&mut self, span: Span<'static>) {
        match self.lines.last_mut() {
            Some(line) => line.push_span(span),
            None => self.lines.push(Line::from(span)),
        }
    }

    fn begin_block(&mut self) {
        if std::mem::take(&mut self.gap) {
            self.new_line();
        }
        self.new_line();
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) if self.code.is_some() => self.code_text(&text),
            Event::Text(text) => {
                let style = self.style();
                self.span(Span::styled(text.replace('\t', TAB), style));
            }
            Event::Code(code) => self.span(Span::styled(
                code.replace('\t', TAB),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            )),
            Event::Html(raw) => {
                let style = self.style().add_modifier(Modifier::DIM);
                for part in raw.lines() {
                    self.lines.push(Line::from(Span::styled(part.to_owned(), style)));
                }
            }
            Event::InlineHtml(raw) => {
                let style = self.style().add_modifier(Modifier::DIM);
                self.span(Span::styled(raw.into_string(), style));
            }
            Event::SoftBreak => self.span(Span::raw(" ")),
            Event::HardBreak => self.new_line(),
            Event::Rule => {
                self.begin_block();
                self.span(Span::styled("─".repeat(40), dim()));
                self.gap = true;
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            // Tight list items carry their text directly; loose ones wrap it
            // in a paragraph that must stay on the marker's line.
            Tag::Paragraph if !self.list.is_empty() => {}
            Tag::Paragraph | Tag::Heading { .. } => self.begin_block(),
            Tag::List(first) => {
                if self.list.is_empty() {
                    self.begin_block();
                    self.lines.pop();
                }
                self.list.push(first);
            }
            Tag::Item => {
                self.new_line();
                let marker = match self.list.last_mut() {
                    Some(Some(n)) => {
                        *n += 1;
                        format!("{}. ", *n - 1)
                    }
                    _ => "- ".to_string(),
                };
                self.span(Span::styled(marker, dim()));
            }
            Tag::CodeBlock(kind) => self.start_code(kind),
            Tag::Emphasis => self.push_style(Modifier::ITALIC),
            Tag::Strong => self.push_style(Modifier::BOLD),
            Tag::Strikethrough => self.push_style(Modifier::CROSSED_OUT),
            Tag::Link { .. } => {
                let link = self.style().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED);
                self.styles.push(link);
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) => self.gap = true,
            TagEnd::List(_) => {
                self.list.pop();
                self.gap = true;
            }
            TagEnd::CodeBlock => {
                self.code = None;
                self.lines.push(Line::from(Span::styled("╰──", dim())));
                self.gap = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.styles.pop();
            }
            _ => {}
        }
    }

    fn start_code(&mut self, kind: CodeBlockKind<'_>) {
        let lang = match &kind {
            CodeBlockKind::Fenced(lang) => lang.as_ref(),
            CodeBlockKind::Indented => "",
        };
        self.begin_block();
        self.span(Span::styled(format!("╭── {lang}").trim_end().to_owned(), dim()));

        let highlighter = SYNTAX_SET
            .find_syntax_by_token(lang)
            .filter(|_| !lang.is_empty())
            .zip(THEME_SET.themes.get(CODE_THEME))
            .map(|(syntax, theme)| HighlightLines::new(syntax, theme));
        self.code = Some(match highlighter {
            Some(hl) => CodeBlock::Highlighted(Box::new(hl)),
            None => CodeBlock::Plain,
        });
    }

    fn code_text(&mut self, text: &str) {
        let text = text.replace('\t', TAB);
        for raw in LinesWithEndings::from(&text) {
            let mut spans = vec![Span::styled("│ ", dim())];
            match &mut self.code {
                Some(CodeBlock::Highlighted(hl)) => {
                    let Ok(ranges) = hl.highlight_line(raw, &SYNTAX_SET) else {
                        continue;
                    };
                    spans.extend(ranges.into_iter().filter_map(|(style, frag)| {
                        let frag = frag.trim_end_matches('\n');
                        let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                        (!frag.is_empty()).then(|| Span::styled(frag.to_owned(), Style::default().fg(fg)))
                    }));
                }
                _ => spans.push(Span::styled(
                    raw.trim_end_matches('\n').to_owned(),
                    Style::default().fg(Color::White),
                )),
            }
            self.lines.push(Line::from(spans));
        }
    }
}
