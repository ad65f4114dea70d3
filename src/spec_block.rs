use crate::constants::{DESCRIPTION_LABEL, FILES_LABEL, SPEC_INDENT};
use crate::error::{P4Error, P4Result};
use crate::session::label_value;

/// Index of the first line equal to `label` once trimmed.
pub fn find_section<S: AsRef<str>>(lines: &[S], label: &str) -> Option<usize> {
    lines.iter().position(|line| line.as_ref().trim() == label)
}

/// Inserts `line` one line above `Files:`, or at the end when there is no
/// `Files:` section. Returns the index the line landed on.
pub fn insert_before_files_section(lines: &mut Vec<String>, line: impl Into<String>) -> usize {
    let at = match find_section(lines, FILES_LABEL) {
        Some(files) => files.saturating_sub(1),
        None => lines.len(),
    };
    lines.insert(at, line.into());
    at
}

/// Drops `Files:` and everything after it, plus the blank lines it leaves
/// dangling. Returns whether a section was removed.
pub fn strip_files_section(lines: &mut Vec<String>) -> bool {
    let Some(files) = find_section(lines, FILES_LABEL) else {
        return false;
    };
    lines.truncate(files);
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    true
}

fn is_section_start(line: &str) -> bool {
    !line.is_empty() && !line.starts_with(char::is_whitespace) && !line.starts_with('#')
}

/// A `p4 change -o` form: `Label:` sections with tab-indented bodies, `Files:` last.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeSpec {
    lines: Vec<String>,
}

impl ChangeSpec {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Serialized form accepted by `p4 change -i`.
    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// Single-line field such as `Change:` or `Status:`.
    pub fn field(&self, label: &str) -> Option<&str> {
        self.lines
            .iter()
            .filter(|line| is_section_start(line))
            .find_map(|line| label_value(line, label))
            .filter(|value| !value.is_empty())
    }

    /// `(first, end)` of the Description body, `end` exclusive and excluding
    /// trailing blank lines.
    fn description_body(&self) -> Option<(usize, usize)> {
        let label = find_section(&self.lines, DESCRIPTION_LABEL)?;
        let first = label + 1;
        let mut end = self.lines[first..]
            .iter()
            .position(|line| is_section_start(line))
            .map_or(self.lines.len(), |offset| first + offset);
        while end > first && self.lines[end - 1].trim().is_empty() {
            end -= 1;
        }
        Some((first, end))
    }

    pub fn description(&self) -> Option<String> {
        let (first, end) = self.description_body()?;
        let text = self.lines[first..end]
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join("\n");
        Some(text)
    }

    /// Replaces the Description body (the template placeholder on a new spec).
    pub fn set_description(&mut self, description: &str) -> P4Result<()> {
        let body: Vec<String> = description
            .trim()
            .lines()
            .map(|line| format!("{SPEC_INDENT}{}", line.trim_end()))
            .collect();
        if body.is_empty() {
            return Err(P4Error::not_eligible("changelist description must not be empty"));
        }
        let (first, end) = self.description_body().ok_or_else(|| {
            P4Error::Parse(format!("change spec has no `{DESCRIPTION_LABEL}` section"))
        })?;
        self.lines.splice(first..end, body);
        Ok(())
    }

    /// Adds `text` as the last Description line. Normally that is just above
    /// `Files:`; when another section (`Jobs:`) sits in between, the line goes
    /// right after the Description body instead.
    pub fn append_description_line(&mut self, text: &str) -> P4Result<usize> {
        let (_, end) = self.description_body().ok_or_else(|| {
            P4Error::Parse(format!("change spec has no `{DESCRIPTION_LABEL}` section"))
        })?;
        let line = format!("{SPEC_INDENT}{}", text.trim());
        let next_section = self.lines[end..]
            .iter()
            .position(|candidate| is_section_start(candidate))
            .map(|offset| end + offset);
        if next_section.is_some() && next_section != find_section(&self.lines, FILES_LABEL) {
            self.lines.insert(end, line);
            return Ok(end);
        }
        Ok(insert_before_files_section(&mut self.lines, line))
    }

    pub fn strip_files(&mut self) -> bool {
        strip_files_section(&mut self.lines)
    }

    /// Raw entries of the `Files:` section, e.g. `//depot/a.c\t# edit`.
    pub fn file_entries(&self) -> Vec<&str> {
        let Some(files) = find_section(&self.lines, FILES_LABEL) else {
            return Vec::new();
        };
        self.lines[files + 1..]
            .iter()
            .take_while(|line| !is_section_start(line))
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect()
    }
}
