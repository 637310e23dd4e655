use pulldown_cmark::{Event, Options, Parser, TagEnd};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKind {
    Plain,
    Markdown,
}

impl TextKind {
    pub fn from_filename(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((stem, ext))
                if !stem.is_empty()
                    && (ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown")) =>
            {
                Self::Markdown
            }
            _ => Self::Plain,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    pub words: usize,
    pub chars: usize,
}

impl Counts {
    /// Characters always count the raw text; Markdown words are counted on
    /// the text a reader would see, so markup like `**` or `#` is skipped.
    pub fn of(text: &str, kind: TextKind) -> Self {
        let words = match kind {
            TextKind::Plain => text.split_whitespace().count(),
            TextKind::Markdown => markdown_words(text),
        };
        Self {
            words,
            chars: text.chars().count(),
        }
    }

    pub fn label(self, words: bool) -> String {
        let (n, one, many) = if words {
            (self.words, "word", "words")
        } else {
            (self.chars, "character", "characters")
        };
        format!("{n} {}", if n == 1 { one } else { many })
    }
}

fn markdown_words(source: &str) -> usize {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    // Inline events split words (`hel**lo**` is two text events), so a word
    // only ends at whitespace or a block/cell boundary.
    let mut words = 0;
    let mut in_word = false;
    let mut feed = |text: &str, in_word: &mut bool| {
        for c in text.chars() {
            if c.is_whitespace() {
                *in_word = false;
            } else if !*in_word {
                *in_word = true;
                words += 1;
            }
        }
    };

    for event in Parser::new_ext(source, options) {
        match event {
            Event::Text(text) | Event::Code(text) => feed(&text, &mut in_word),
            Event::SoftBreak | Event::HardBreak | Event::Rule => in_word = false,
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableCell
                | TagEnd::BlockQuote(_),
            ) => in_word = false,
            _ => {}
        }
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_counts() {
        let counts = Counts::of("hello  world\n\tagain", TextKind::Plain);
        assert_eq!(counts, Counts { words: 3, chars: 19 });
        assert_eq!(Counts::of("", TextKind::Plain), Counts::default());
    }

    #[test]
    fn markdown_skips_markup() {
        let md = "# Title\n\nHello **world**.\n\n- a\n- b\n";
        assert_eq!(Counts::of(md, TextKind::Markdown).words, 5);
        assert_eq!(Counts::of(md, TextKind::Plain).words, 8);
    }

    #[test]
    fn markdown_inline_markup_does_not_split_words() {
        assert_eq!(Counts::of("hel**lo** there", TextKind::Markdown).words, 2);
        assert_eq!(Counts::of("use `cargo` now", TextKind::Markdown).words, 3);
    }

    #[test]
    fn markdown_blocks_end_words() {
        let md = "```\nlet x = 1;\n```\nafter";
        assert_eq!(Counts::of(md, TextKind::Markdown).words, 5);
        assert_eq!(Counts::of("| a | b |\n|---|---|\n| c | d |", TextKind::Markdown).words, 4);
    }

    #[test]
    fn text_kind_from_filename() {
        let cases = [
            ("notes.md", TextKind::Markdown),
            ("NOTES.Markdown", TextKind::Markdown),
            ("document.txt", TextKind::Plain),
            ("md", TextKind::Plain),
            (".md", TextKind::Plain),
        ];
        for (name, kind) in cases {
            assert_eq!(TextKind::from_filename(name), kind, "{name}");
        }
    }

    #[test]
    fn labels_pluralise() {
        let counts = Counts { words: 1, chars: 2 };
        assert_eq!(counts.label(true), "1 word");
        assert_eq!(counts.label(false), "2 characters");
        assert_eq!(Counts::default().label(true), "0 words");
    }
}
