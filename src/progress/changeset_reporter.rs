use console::style;
use std::time::Duration;

/// Human-readable progress for migrate and reset runs.
///
/// Prints nothing unless verbose; the engine logs through `tracing` either way.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangesetReporter {
    verbose: bool,
}

impl ChangesetReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn applied(&self, label: &str) {
        self.print(&format!("Changeset applied: {}", label));
    }

    pub fn already_applied(&self, label: &str) {
        self.print(&format!("Changeset already applied: {}", label));
    }

    pub fn rollback_applied(&self, label: &str) {
        self.print(&format!("Rollback applied: {}", label));
    }

    pub fn nothing_to_roll_back(&self) {
        self.print("No rollbacks to perform.");
    }

    pub fn summary(&self, action: &str, count: usize, elapsed: Duration) {
        if !self.verbose {
            return;
        }
        println!(
            "{} {} {} changeset{} in {}",
            style("✓").green(),
            action,
            count,
            if count == 1 { "" } else { "s" },
            style(format_duration(elapsed)).green()
        );
    }

    fn print(&self, line: &str) {
        if self.verbose {
            println!("{}", line);
        }
    }
}

pub(crate) fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let millis = d.subsec_millis();

    if total_secs == 0 {
        format!("{}ms", millis)
    } else if total_secs < 60 {
        if millis > 0 {
            format!("{}.{}s", total_secs, millis / 100)
        } else {
            format!("{}s", total_secs)
        }
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{}m{}s", mins, secs)
        } else {
            format!("{}m", mins)
        }
    }
}
