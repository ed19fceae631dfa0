use crate::domain::degradation::SectionKind;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

// Section headings, anchored at line start. Leading decoration (markdown `#`/`**`,
// quote markers, emoji), a parenthetical qualifier and a colon are captured so
// that `is_heading` can tell a heading from prose that opens with the same words.
static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^(?P<lead>[^\p{L}\p{N}\n]*)(?P<head>STOCK\s+PICKS|OPTIONS?\s+PICKS|FINAL\s+VERDICT|AGENT\s+COMPARISON|股票建議|期權建議|總結|代理比較)(?:\s*[（(][^)）\n]*[)）])?(?P<tail>[ \t]*(?:\*\*)?[ \t]*[:：]?[ \t]*(?:\*\*)?)",
    )
    .expect("section marker regex")
});

static SEPARATOR_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-–—―－]{3,}[ \t]*$").expect("separator regex"));

static UNIFIED_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\*\*)?[ \t]*FINAL\s+UNIFIED\s+RECOMMENDATIONS[ \t]*[:：]?[ \t]*(?:\*\*)?")
        .expect("unified title regex")
});

static LANGUAGE_NOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:以上|全文).*(?:粵語|繁體中文)|以.*(?:粵語|繁體中文).*撰寫|符合(?:語言)?要求")
        .expect("language note regex")
});

static HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").expect("hashtag regex"));

static LEADING_HASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#+[ \t]*").expect("leading hash regex"));

static INLINE_HASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+#+[ \t]+").expect("inline hash regex"));

// Persona remarks: a parenthetical aside naming the persona, else the whole sentence.
static PERSONA_ASIDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[（(][^)）\n]*(?:中環人|(?i:central\s+hong\s+kong))[^)）\n]*[)）]")
        .expect("persona aside regex")
});

static PERSONA_SENTENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^。.!?！？\n]*(?:中環人|(?i:central\s+hong\s+kong))[^。.!?！？\n]*[。.!?！？]?")
        .expect("persona sentence regex")
});

const SENTENCE_END: &[char] = &['。', '.', '!', '?', '！', '？', '\n'];
const CLOSERS: &[char] = &[')', '）', '」', '"'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    Section(SectionKind),
    Discard,
}

fn heading(head: &str) -> Heading {
    let upper = head.to_uppercase();
    if upper.starts_with("STOCK") || head == "股票建議" {
        Heading::Section(SectionKind::Stocks)
    } else if upper.starts_with("OPTION") || head == "期權建議" {
        Heading::Section(SectionKind::Options)
    } else if upper.starts_with("FINAL") || head == "總結" {
        Heading::Section(SectionKind::Verdict)
    } else {
        Heading::Discard
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sections {
    pub stocks: String,
    pub options: String,
    pub verdict: String,
    // False when the text carried no section marker and was kept whole as the verdict.
    #[serde(skip)]
    pub markers_found: bool,
}

impl Sections {
    pub fn get(&self, kind: SectionKind) -> &str {
        match kind {
            SectionKind::Stocks => &self.stocks,
            SectionKind::Options => &self.options,
            SectionKind::Verdict => &self.verdict,
        }
    }

    fn append(&mut self, kind: SectionKind, body: &str) {
        let body = strip_meta(body);
        let body = body.trim();
        if body.is_empty() {
            return;
        }
        let slot = match kind {
            SectionKind::Stocks => &mut self.stocks,
            SectionKind::Options => &mut self.options,
            SectionKind::Verdict => &mut self.verdict,
        };
        if !slot.is_empty() {
            slot.push_str("\n\n");
        }
        slot.push_str(body);
    }
}

pub fn split(text: &str) -> Sections {
    let cleaned = strip_noise(text);
    let markers = markers(&cleaned);

    let mut out = Sections {
        markers_found: markers
            .iter()
            .any(|(_, _, h)| matches!(h, Heading::Section(_))),
        ..Sections::default()
    };

    if !out.markers_found {
        // Unstructured output: keep everything that is not an agent-comparison block.
        let end = markers.first().map_or(cleaned.len(), |(start, _, _)| *start);
        out.append(SectionKind::Verdict, &cleaned[..end]);
        return out;
    }

    for (i, (_, body_start, head)) in markers.iter().enumerate() {
        let body_end = markers.get(i + 1).map_or(cleaned.len(), |(start, _, _)| *start);
        if let Heading::Section(kind) = head {
            out.append(*kind, &cleaned[*body_start..body_end]);
        }
    }

    out
}

fn markers(text: &str) -> Vec<(usize, usize, Heading)> {
    MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let head = caps.name("head")?;
            is_heading(&caps, &text[whole.end()..])
                .then(|| (whole.start(), whole.end(), heading(head.as_str())))
        })
        .collect()
}

// A heading is decorated (`**`, `#`), ends in a colon, or stands alone on its line.
fn is_heading(caps: &Captures<'_>, after: &str) -> bool {
    let lead = caps.name("lead").map_or("", |m| m.as_str());
    let tail = caps.name("tail").map_or("", |m| m.as_str());
    let rest_of_line = after.split('\n').next().unwrap_or("");
    lead.contains("**")
        || lead.contains('#')
        || tail.contains(':')
        || tail.contains('：')
        || rest_of_line.trim().is_empty()
}

// Meta-commentary inside a section body: hashtags, stray `#` and persona remarks.
fn strip_meta(body: &str) -> String {
    let body = PERSONA_ASIDE.replace_all(body, "");
    let body = PERSONA_SENTENCE.replace_all(&body, "");
    let body = HASHTAG.replace_all(&body, "");
    let body = LEADING_HASH.replace_all(&body, "");
    let body = INLINE_HASH.replace_all(&body, " ");
    body.lines().map(str::trim_end).collect::<Vec<_>>().join("\n")
}

fn strip_noise(text: &str) -> String {
    let text = strip_language_note(text);
    let text = SEPARATOR_LINE.replace_all(text, "");
    UNIFIED_TITLE.replace_all(&text, "").into_owned()
}

// Drops a language-compliance remark, but only when it is the document's final
// sentence.
fn strip_language_note(text: &str) -> &str {
    let body = text.trim_end();
    let core = body.trim_end_matches(|c: char| {
        c.is_whitespace() || SENTENCE_END.contains(&c) || CLOSERS.contains(&c)
    });
    let start = core
        .char_indices()
        .rev()
        .find(|(_, c)| SENTENCE_END.contains(c))
        .map_or(0, |(i, c)| i + c.len_utf8());

    if LANGUAGE_NOTE.is_match(&body[start..]) {
        body[..start].trim_end()
    } else {
        body
    }
}
