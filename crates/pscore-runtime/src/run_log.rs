/// Accumulates the operator-facing run log.
///
/// Every line is kept for the report email and, unless quiet, echoed to stdout
/// as it is recorded.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    lines: Vec<String>,
    echo: bool,
}

impl RunLog {
    pub fn new(echo: bool) -> Self {
        Self {
            lines: Vec::new(),
            echo,
        }
    }

    pub fn record(&mut self, line: impl Into<String>) {
        let line = line.into();
        if self.echo {
            println!("{line}");
        }
        self.lines.push(line);
    }

    /// Records `message` prefixed with `[issue_key]`.
    pub fn issue(&mut self, issue_key: &str, message: impl AsRef<str>) {
        self.record(format!("[{issue_key}] {}", message.as_ref()));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::RunLog;

    #[test]
    fn unit_issue_lines_are_prefixed_with_key() {
        let mut log = RunLog::new(false);
        log.record("Using FilterId: 7");
        log.issue("PS-1", "PriorityScore unchanged.");
        assert_eq!(
            log.lines(),
            ["Using FilterId: 7", "[PS-1] PriorityScore unchanged."]
        );
        assert_eq!(
            log.render(),
            "Using FilterId: 7\n[PS-1] PriorityScore unchanged."
        );
    }

    #[test]
    fn unit_new_log_is_empty() {
        let log = RunLog::new(true);
        assert!(log.is_empty());
        assert_eq!(log.render(), "");
    }
}
