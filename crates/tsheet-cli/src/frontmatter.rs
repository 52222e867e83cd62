//! Splitting a leading `---` delimited settings block off a timesheet.

/// A timesheet with its front-matter separated out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
    /// The front-matter block including its delimiter lines, verbatim.
    pub header: Vec<&'a str>,
    /// The YAML between the delimiters, if there was a block.
    pub front_matter: Option<String>,
    /// The timesheet lines.
    pub body: Vec<&'a str>,
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Splits `text` into front-matter and body.
///
/// A block only counts when the first line is `---` and a closing `---`
/// follows; otherwise the whole text is body.
pub fn split(text: &str) -> Document<'_> {
    let lines: Vec<&str> = text.lines().collect();

    let closing = match lines.first() {
        Some(first) if is_delimiter(first) => lines
            .iter()
            .skip(1)
            .position(|line| is_delimiter(line))
            .map(|i| i + 1),
        _ => None,
    };

    match closing {
        Some(end) => Document {
            header: lines[..=end].to_vec(),
            front_matter: Some(lines[1..end].join("\n")),
            body: lines[end + 1..].to_vec(),
        },
        None => Document {
            header: Vec::new(),
            front_matter: None,
            body: lines,
        },
    }
}
