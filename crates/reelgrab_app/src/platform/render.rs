use std::io::{self, Write};

use chrono::Local;
use reelgrab_core::AppViewModel;

const CLEAR_LINE: &str = "\r\x1b[2K";

/// Prints the log panel incrementally and keeps one live status line.
///
/// On a non-interactive writer the status is printed as its own line, and
/// only when it names something other than a transfer tick.
pub struct TerminalRenderer<W: Write> {
    out: W,
    interactive: bool,
    printed_logs: usize,
    status: String,
    status_shown: bool,
    notice: Option<String>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, interactive: bool) -> Self {
        Self {
            out,
            interactive,
            printed_logs: 0,
            status: String::new(),
            status_shown: false,
            notice: None,
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        let new_logs = view.logs.get(self.printed_logs..).unwrap_or_default();
        let status_changed = view.status != self.status;
        let notice_changed = view.notice.is_some() && view.notice != self.notice;
        if new_logs.is_empty() && !status_changed && !notice_changed {
            return Ok(());
        }

        self.clear_status()?;
        let stamp = Local::now().format("%H:%M:%S");
        for line in new_logs {
            writeln!(self.out, "[{stamp}] {line}")?;
        }
        self.printed_logs = view.logs.len();

        if notice_changed {
            if let Some(notice) = &view.notice {
                writeln!(self.out, "! {notice}")?;
            }
        }
        self.notice = view.notice.clone();

        if self.interactive {
            if !view.status.is_empty() {
                write!(self.out, "{}", view.status)?;
                self.status_shown = true;
            }
        } else if status_changed && !view.status.starts_with("downloading") {
            writeln!(self.out, "status: {}", view.status)?;
        }
        self.status = view.status.clone();
        self.out.flush()
    }

    /// Leave the cursor on a fresh line.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.status_shown {
            writeln!(self.out)?;
            self.status_shown = false;
        }
        self.out.flush()
    }

    fn clear_status(&mut self) -> io::Result<()> {
        if self.status_shown {
            write!(self.out, "{CLEAR_LINE}")?;
            self.status_shown = false;
        }
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use reelgrab_core::LogLine;

    use super::*;

    fn view(logs: &[LogLine], status: &str) -> AppViewModel {
        AppViewModel {
            logs: logs.to_vec(),
            status: status.to_string(),
            ..AppViewModel::default()
        }
    }

    fn output(renderer: TerminalRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn logs_are_printed_once_with_timestamps() {
        let mut renderer = TerminalRenderer::new(Vec::new(), false);
        let first = vec![LogLine::info("Start")];
        renderer.render(&view(&first, "")).unwrap();
        let second = vec![LogLine::info("Start"), LogLine::error("boom")];
        renderer.render(&view(&second, "")).unwrap();
        renderer.render(&view(&second, "")).unwrap();

        let text = output(renderer);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] Start"));
        assert!(lines[1].ends_with("] ✗ ERROR: boom"));
    }

    #[test]
    fn plain_output_skips_transfer_ticks() {
        let mut renderer = TerminalRenderer::new(Vec::new(), false);
        renderer.render(&view(&[], "downloading… 10.0%")).unwrap();
        renderer.render(&view(&[], "post-processing…")).unwrap();
        renderer.render(&view(&[], "done")).unwrap();

        assert_eq!(
            output(renderer),
            "status: post-processing…\nstatus: done\n"
        );
    }

    #[test]
    fn interactive_status_is_redrawn_in_place() {
        let mut renderer = TerminalRenderer::new(Vec::new(), true);
        renderer.render(&view(&[], "downloading… 10.0%")).unwrap();
        renderer.render(&view(&[], "downloading… 20.0%")).unwrap();
        renderer.finish().unwrap();

        assert_eq!(
            output(renderer),
            "downloading… 10.0%\r\x1b[2Kdownloading… 20.0%\n"
        );
    }

    #[test]
    fn notice_is_shown_once() {
        let mut renderer = TerminalRenderer::new(Vec::new(), false);
        let noticed = AppViewModel {
            notice: Some("nothing to do".into()),
            ..AppViewModel::default()
        };
        renderer.render(&noticed).unwrap();
        renderer.render(&noticed).unwrap();
        assert_eq!(output(renderer), "! nothing to do\n");
    }
}
