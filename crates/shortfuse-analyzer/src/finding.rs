//! Confirmed vulnerabilities.

use serde::Serialize;

/// One confirmed attack: `prefix · pump^k · suffix` drove the interpreter
/// past the step threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub prefix: String,
    pub pump: String,
    pub suffix: String,
    /// Steps the validation run had taken when it was cut off.
    pub steps: u64,
    /// Byte span of the offending repetition in the pattern text.
    pub node_span: (usize, usize),
}

impl Finding {
    /// The validated attack input at the given pump count.
    pub fn attack_input(&self, pump_count: u32) -> String {
        let mut out = String::with_capacity(
            self.prefix.len() + self.pump.len() * pump_count as usize + self.suffix.len(),
        );
        out.push_str(&self.prefix);
        for _ in 0..pump_count {
            out.push_str(&self.pump);
        }
        out.push_str(&self.suffix);
        out
    }
}
