/// Collects the lines a lesson prints.
///
/// Lines are always retained; with `echo` on they also go to stdout as they
/// are written, so a run reads like a plain console program.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    lines: Vec<String>,
    echo: bool,
}

impl Transcript {
    /// Transcript that prints every line as it is recorded
    pub fn echoing() -> Self {
        Self {
            lines: Vec::new(),
            echo: true,
        }
    }

    /// Transcript that only records
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn with_echo(echo: bool) -> Self {
        Self {
            lines: Vec::new(),
            echo,
        }
    }

    pub fn line(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.echo {
            println!("{}", text);
        }
        self.lines.push(text);
    }

    /// Blank line followed by a `=== title ===` header
    pub fn section(&mut self, title: &str) {
        self.blank();
        self.line(format!("=== {} ===", title));
    }

    pub fn blank(&mut self) {
        self.line(String::new());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines recorded after the first `mark` lines
    pub fn lines_since(&self, mark: usize) -> Vec<String> {
        self.lines.iter().skip(mark).cloned().collect()
    }

    /// Drain everything recorded since the last call
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_and_take() {
        let mut transcript = Transcript::silent();
        transcript.section("演示");
        transcript.line("a");
        assert_eq!(transcript.lines(), &["", "=== 演示 ===", "a"]);
        assert!(transcript.contains("演示"));
        assert_eq!(transcript.lines_since(2), vec!["a"]);

        let taken = transcript.take_lines();
        assert_eq!(taken.len(), 3);
        assert!(transcript.is_empty());
    }
}
