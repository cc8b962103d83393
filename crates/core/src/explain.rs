//! An opt-in reasoning trace. When disabled, every recording call is a no-op
//! so the calculator doesn't need a separate code path per mode.

/// A nil-safe accumulator of reasoning steps. `None` when `--explain` wasn't
/// requested; every `add*` call becomes a no-op in that state.
#[derive(Debug, Clone, Default)]
pub struct Explanation {
    enabled: bool,
    lines: Vec<String>,
}

impl Explanation {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            lines: Vec::new(),
        }
    }

    pub fn add(&mut self, line: impl Into<String>) {
        if self.enabled {
            self.lines.push(line.into());
        }
    }

    pub fn addf(&mut self, args: std::fmt::Arguments<'_>) {
        if self.enabled {
            self.lines.push(args.to_string());
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl std::fmt::Display for Explanation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_explanation_records_nothing() {
        let mut explanation = Explanation::new(false);
        explanation.add("this should not appear");
        assert!(explanation.lines().is_empty());
    }

    #[test]
    fn enabled_explanation_records_lines() {
        let mut explanation = Explanation::new(true);
        explanation.add("step one");
        assert_eq!(explanation.lines(), ["step one"]);
    }
}
