use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use regex::Regex;

use super::rank::RankedEntry;

static ANALYSIS_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# ----(.+) URL analysis----$").unwrap());
static ANALYSIS_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# --(.*) \(URLs found: (\d+)\)$").unwrap());

/// How a ranked key turns into a rule.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// `url *<key>/*`, labelled by one piece of `splitn(key, '/', 4)`.
    UrlPrefix { label_index: usize },
    /// `query *<key>=*`, labelled by the key itself.
    QueryKey,
}

#[derive(Debug, Clone, Copy)]
pub struct SegmentLayout {
    pub name: &'static str,
    pub end_marker: &'static str,
    pub analysis_title: &'static str,
    pub home_rule: bool,
    pub matcher: Matcher,
}

pub const LEVEL1_FOLDERS: SegmentLayout = SegmentLayout {
    name: "sl_level1_Folders",
    end_marker: "level1Folders",
    analysis_title: "Level 1 Folder",
    home_rule: true,
    matcher: Matcher::UrlPrefix { label_index: 3 },
};

pub const LEVEL2_FOLDERS: SegmentLayout = SegmentLayout {
    name: "sl_level2_Folders",
    end_marker: "level2Folders",
    analysis_title: "Level 2 Folder",
    home_rule: true,
    matcher: Matcher::UrlPrefix { label_index: 3 },
};

pub const SUBDOMAINS: SegmentLayout = SegmentLayout {
    name: "sl_subdomains",
    end_marker: "subDomains",
    analysis_title: "subDomains Folder",
    home_rule: true,
    matcher: Matcher::UrlPrefix { label_index: 2 },
};

pub const PARAMETER_KEYS: SegmentLayout = SegmentLayout {
    name: "sl_parameterKeys",
    end_marker: "parameterKeys",
    analysis_title: "parameterKeys",
    home_rule: false,
    matcher: Matcher::QueryKey,
};

/// Generator comment placed once at the top of a rule file.
pub fn preamble(generated_at: DateTime<Local>) -> String {
    format!(
        "# Rule file generated by segmentify v{}\n# Generated on {}\n",
        env!("CARGO_PKG_VERSION"),
        generated_at.to_rfc2822()
    )
}

fn rule_label<'a>(matcher: Matcher, key: &'a str) -> Option<&'a str> {
    match matcher {
        Matcher::UrlPrefix { label_index } => key
            .splitn(4, '/')
            .nth(label_index)
            .filter(|l| !l.is_empty()),
        Matcher::QueryKey => Some(key).filter(|k| !k.is_empty()),
    }
}

/// Render one `[segment:...]` block followed by its URL analysis comments.
///
/// Entries without a label get no rule but are still listed in the analysis.
pub fn render_segment(layout: &SegmentLayout, entries: &[RankedEntry]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "[segment:{}]", layout.name);
    if layout.home_rule {
        out.push_str("@Home\npath /\n\n");
    }

    for entry in entries {
        let Some(label) = rule_label(layout.matcher, &entry.key) else {
            continue;
        };
        let _ = match layout.matcher {
            Matcher::UrlPrefix { .. } => writeln!(out, "@{}\nurl *{}/*\n", label, entry.key),
            Matcher::QueryKey => writeln!(out, "@{}\nquery *{}=*\n", label, entry.key),
        };
    }

    let _ = writeln!(
        out,
        "@~Other\npath /*\n# ----End of {} Segment----",
        layout.end_marker
    );

    let _ = writeln!(out, "\n# ----{} URL analysis----", layout.analysis_title);
    for entry in entries {
        let _ = writeln!(out, "# --{} (URLs found: {})", entry.key, entry.count);
    }

    out
}

/// One `# ----<title> URL analysis----` listing read back from a rule file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSection {
    pub title: String,
    pub entries: Vec<RankedEntry>,
}

pub fn parse_analysis(text: &str) -> Vec<AnalysisSection> {
    let mut sections: Vec<AnalysisSection> = Vec::new();
    let mut in_section = false;

    for line in text.lines() {
        if let Some(caps) = ANALYSIS_HEADER_RE.captures(line) {
            sections.push(AnalysisSection {
                title: caps[1].to_string(),
                entries: Vec::new(),
            });
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        match (ANALYSIS_ENTRY_RE.captures(line), sections.last_mut()) {
            (Some(caps), Some(section)) => match caps[2].parse() {
                Ok(count) => section.entries.push(RankedEntry {
                    key: caps[1].to_string(),
                    count,
                }),
                Err(_) => in_section = false,
            },
            _ => in_section = false,
        }
    }

    sections
}

/// Owns the rule file: the first segment creates it, later ones append.
pub struct RuleWriter {
    path: PathBuf,
    preamble: String,
    started: bool,
}

impl RuleWriter {
    pub fn new(path: impl Into<PathBuf>, preamble: String) -> Self {
        Self {
            path: path.into(),
            preamble,
            started: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one rendered segment and flush it to disk.
    pub fn append(&mut self, segment: &str) -> Result<()> {
        let file = if self.started {
            OpenOptions::new()
                .append(true)
                .create(true)
                .open(&self.path)
                .with_context(|| format!("Failed to open output file {}", self.path.display()))?
        } else {
            File::create(&self.path)
                .with_context(|| format!("Failed to create output file {}", self.path.display()))?
        };

        let mut writer = BufWriter::new(file);
        let lead = if self.started {
            "\n\n".to_string()
        } else {
            format!("{}\n", self.preamble)
        };
        writer
            .write_all(lead.as_bytes())
            .and_then(|_| writer.write_all(segment.as_bytes()))
            .with_context(|| format!("Failed to write to output file {}", self.path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush output file {}", self.path.display()))?;

        self.started = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, count: usize) -> RankedEntry {
        RankedEntry {
            key: key.to_string(),
            count,
        }
    }

    #[test]
    fn level1_block() {
        let out = render_segment(
            &LEVEL1_FOLDERS,
            &[entry("https://example.com/shop", 10), entry("https://example.com/blog", 4)],
        );
        let expected = "\
[segment:sl_level1_Folders]
@Home
path /

@shop
url *https://example.com/shop/*

@blog
url *https://example.com/blog/*

@~Other
path /*
# ----End of level1Folders Segment----

# ----Level 1 Folder URL analysis----
# --https://example.com/shop (URLs found: 10)
# --https://example.com/blog (URLs found: 4)
";
        assert_eq!(out, expected);
    }

    #[test]
    fn level2_label_keeps_both_folders() {
        let out = render_segment(&LEVEL2_FOLDERS, &[entry("https://example.com/men/shoes", 7)]);
        assert!(out.contains("@men/shoes\nurl *https://example.com/men/shoes/*\n"));
    }

    #[test]
    fn missing_label_still_analysed() {
        let out = render_segment(&LEVEL1_FOLDERS, &[entry("https://example.com/", 12)]);
        assert!(!out.contains("url *https://example.com//*"));
        assert!(out.contains("# --https://example.com/ (URLs found: 12)\n"));
    }

    #[test]
    fn empty_segment() {
        let out = render_segment(&LEVEL1_FOLDERS, &[]);
        assert_eq!(
            out,
            "[segment:sl_level1_Folders]\n@Home\npath /\n\n@~Other\npath /*\n# ----End of level1Folders Segment----\n\n# ----Level 1 Folder URL analysis----\n"
        );
    }

    #[test]
    fn subdomain_label_is_host() {
        let out = render_segment(&SUBDOMAINS, &[entry("https://blog.example.com", 3)]);
        assert!(out.contains("@blog.example.com\nurl *https://blog.example.com/*\n"));
    }

    #[test]
    fn parameter_keys_have_no_home_rule() {
        let out = render_segment(&PARAMETER_KEYS, &[entry("page", 9)]);
        assert!(out.starts_with("[segment:sl_parameterKeys]\n@page\nquery *page=*\n\n@~Other"));
        assert!(out.contains("# ----parameterKeys URL analysis----\n# --page (URLs found: 9)\n"));
    }

    #[test]
    fn analysis_round_trip() {
        let entries = vec![
            entry("https://example.com/a", 30),
            entry("https://example.com/", 20),
            entry("https://example.com/b", 5),
        ];
        let mut text = render_segment(&LEVEL1_FOLDERS, &entries);
        text.push_str("\n\n");
        text.push_str(&render_segment(&PARAMETER_KEYS, &[entry("utm_source", 2)]));

        let sections = parse_analysis(&text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Level 1 Folder");
        assert_eq!(sections[0].entries, entries);
        assert_eq!(sections[1].title, "parameterKeys");
        assert_eq!(sections[1].entries, vec![entry("utm_source", 2)]);
    }

    #[test]
    fn writer_creates_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segment.txt");
        std::fs::write(&path, "stale contents\n").unwrap();

        let mut writer = RuleWriter::new(&path, "# header\n".to_string());
        writer.append("[segment:one]\n").unwrap();
        writer.append("[segment:two]\n").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "# header\n\n[segment:one]\n\n\n[segment:two]\n");
    }

    #[test]
    fn writer_fails_on_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RuleWriter::new(dir.path().join("nope/segment.txt"), String::new());
        let err = writer.append("[segment:one]\n").unwrap_err();
        assert!(err.to_string().contains("Failed to create output file"));
    }

    #[test]
    fn preamble_names_generator() {
        let text = preamble(Local::now());
        assert!(text.starts_with("# Rule file generated by segmentify v"));
        assert!(text.contains("\n# Generated on "));
        assert!(text.ends_with('\n'));
    }
}
