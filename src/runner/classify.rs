use regex::Regex;
use std::sync::OnceLock;

/// How many paired lines (counted from the end) are inspected.
pub const MAX_LINES_TO_GO_BACK: usize = 5;

fn keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)error|exception").expect("static regex"))
}

fn non_empty_lines(text: &str) -> Vec<&str> {
    text.split(['\n', '\r'])
        .filter(|l| !l.is_empty())
        .collect()
}

/// Pick the line of a failed run's output that best explains the failure.
///
/// Both streams are walked backwards in lock-step; at each position the stderr
/// line is checked before the stdout line. Without a match in the last
/// [`MAX_LINES_TO_GO_BACK`] positions the last stdout line is returned, or an
/// empty string if stdout had none.
pub fn identify_error(stdout: &str, stderr: &str) -> String {
    let out = non_empty_lines(stdout);
    let err = non_empty_lines(stderr);

    let depth = out.len().max(err.len()).min(MAX_LINES_TO_GO_BACK);
    for i in 0..depth {
        let std_msg = out.len().checked_sub(i + 1).map_or("", |j| out[j]);
        let err_msg = err.len().checked_sub(i + 1).map_or("", |j| err[j]);
        for msg in [err_msg, std_msg] {
            if keyword_re().is_match(msg) {
                return msg.to_string();
            }
        }
    }

    tracing::debug!("no error message found, falling back to the last stdout line");
    out.last().map(|l| l.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stderr_wins_at_the_same_position() {
        let msg = identify_error("ok\ndone\n", "warn\nException: bad input\n");
        assert_eq!(msg, "Exception: bad input");
    }

    #[test]
    fn falls_back_to_last_stdout_line() {
        assert_eq!(identify_error("line1\nline2\n", ""), "line2");
    }

    #[test]
    fn empty_stdout_fallback_is_empty() {
        assert_eq!(identify_error("", ""), "");
        assert_eq!(identify_error("\n\n", "nothing useful\n"), "");
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert_eq!(identify_error("a\nFATAL ERROR here\nb\n", ""), "FATAL ERROR here");
        assert_eq!(identify_error("", "x\nValueError: nope\n"), "ValueError: nope");
    }

    #[test]
    fn later_lines_take_precedence_over_stderr() {
        // stdout's last line is checked before stderr's second-to-last line.
        let msg = identify_error("first\nerror in stdout\n", "error in stderr\nclean\n");
        assert_eq!(msg, "error in stdout");
    }

    #[test]
    fn unequal_lengths_are_aligned_from_the_end() {
        let msg = identify_error("Error early\nx\ny\n", "z\n");
        assert_eq!(msg, "Error early");
    }

    #[test]
    fn scan_is_bounded_to_five_positions() {
        let stdout = "Exception: too old\n1\n2\n3\n4\n5\n";
        assert_eq!(identify_error(stdout, ""), "5");
        let stdout = "Exception: just in range\n2\n3\n4\n5\n";
        assert_eq!(identify_error(stdout, ""), "Exception: just in range");
    }

    #[test]
    fn carriage_returns_split_lines() {
        assert_eq!(identify_error("50%\r100%\rERROR: x\r\n", ""), "ERROR: x");
        assert_eq!(identify_error("a\r\nb\r\n", ""), "b");
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(identify_error("\n\nlast\n\n\n", "\n"), "last");
    }
}
