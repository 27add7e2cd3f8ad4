/// A4 in points
pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
pub const MARGIN: f32 = 72.0;

const LEADING: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Center,
}

/// Paragraph style: font, size and vertical spacing around the block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub font: Font,
    pub size: f32,
    pub align: Align,
    pub space_before: f32,
    pub space_after: f32,
}

pub const TITLE: Style = Style {
    font: Font::Bold,
    size: 24.0,
    align: Align::Center,
    space_before: 0.0,
    space_after: 30.0,
};

pub const HEADING: Style = Style {
    font: Font::Bold,
    size: 16.0,
    align: Align::Left,
    space_before: 30.0,
    space_after: 20.0,
};

pub const SUBHEADING: Style = Style {
    font: Font::Bold,
    size: 14.0,
    align: Align::Left,
    space_before: 20.0,
    space_after: 15.0,
};

pub const BODY: Style = Style {
    font: Font::Regular,
    size: 12.0,
    align: Align::Left,
    space_before: 0.0,
    space_after: 12.0,
};

/// One line of text at an absolute baseline position
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub font: Font,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

pub type Page = Vec<PlacedLine>;

/// Flows styled blocks top to bottom, starting a new page when a line
/// would cross the bottom margin.
pub struct Layout {
    pages: Vec<Page>,
    cursor: f32,
}

impl Layout {
    pub fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    pub fn push(&mut self, text: &str, style: Style) {
        let width = PAGE_WIDTH - 2.0 * MARGIN;
        let lines = wrap(&sanitize(text), style.font, style.size, width);
        if lines.is_empty() {
            return;
        }

        if !self.at_page_top() {
            self.cursor -= style.space_before;
        }

        let line_height = style.size * LEADING;
        for line in lines {
            if self.cursor - line_height < MARGIN {
                self.new_page();
            }
            self.cursor -= line_height;

            let x = match style.align {
                Align::Left => MARGIN,
                Align::Center => MARGIN + (width - text_width(&line, style.font, style.size)).max(0.0) / 2.0,
            };
            if let Some(page) = self.pages.last_mut() {
                page.push(PlacedLine {
                    font: style.font,
                    size: style.size,
                    x,
                    y: self.cursor,
                    text: line,
                });
            }
        }

        self.cursor -= style.space_after;
    }

    pub fn finish(self) -> Vec<Page> {
        self.pages
    }

    fn at_page_top(&self) -> bool {
        self.pages.last().is_none_or(|page| page.is_empty())
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor = PAGE_HEIGHT - MARGIN;
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

/// Greedy word wrap. A word wider than the line gets a line of its own.
pub fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{current} {word}");
        if text_width(&candidate, font, size) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(char_width).sum();
    let scale = match font {
        Font::Regular => 1.0,
        Font::Bold => 1.05,
    };
    units as f32 * scale * size / 1000.0
}

/// Map text onto the WinAnsi-safe ASCII range the standard fonts cover
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\n' | '\r' | '\t' => ' ',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '?',
        })
        .collect()
}

/// Helvetica advance widths in 1/1000 em
fn char_width(c: char) -> u32 {
    match c {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | '[' | '\\' | ']' | 'I' | 'f' | 't' => 278,
        '"' => 355,
        '#' | '$' | '0'..='9' | '?' | '_' | 'L' => 556,
        '%' => 889,
        '&' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' | 'A' => 667,
        '\'' | '`' | 'i' | 'j' | 'l' => 222,
        '(' | ')' | '-' | 'r' => 333,
        '*' => 389,
        '+' | '<' | '=' | '>' | '~' => 584,
        '@' => 1015,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'F' | 'T' | 'Z' => 611,
        'G' | 'O' | 'Q' => 778,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        'M' | 'm' => 833,
        'W' => 944,
        '^' => 469,
        '{' | '}' => 334,
        '|' => 260,
        _ => 556,
    }
}
