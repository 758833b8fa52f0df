//! Terminal output for shipctl commands.
//!
//! Services report progress through [`TerminalReporter`]; command handlers
//! print their closing summary through [`OutputContext::summary`].

pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use reporter::TerminalReporter;
pub use styles::Styles;

/// Styling and terminal state shared by every printer.
pub struct OutputContext {
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Suppress everything except errors.
    pub quiet: bool,
}

impl OutputContext {
    /// `no_color` already folds in `NO_COLOR`, which clap reads for the flag.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let mut styles = Styles::default();
        if !no_color && is_tty {
            styles.colorize();
        }
        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Spinners only make sense on an interactive, non-quiet terminal.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Progress reporter for one install, configure or service operation.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(self)
    }

    pub fn step(&self, msg: &str) {
        self.line("→", self.styles.step, msg);
    }

    pub fn success(&self, msg: &str) {
        self.line("✓", self.styles.success, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.line("⚠", self.styles.warning, msg);
    }

    /// Print `rows` as dimmed labels with their values aligned in one column.
    pub fn summary(&self, rows: &[(&str, String)]) {
        if self.quiet {
            return;
        }
        for line in summary_lines(rows, self.styles.dim) {
            println!("{line}");
        }
    }

    fn line(&self, marker: &str, style: owo_colors::Style, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", marker.style(style));
        }
    }
}

fn summary_lines(rows: &[(&str, String)], label_style: owo_colors::Style) -> Vec<String> {
    let width = rows.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| {
            let label = format!("{label:<width$}");
            format!("  {}  {value}", label.style(label_style))
        })
        .collect()
}
