//! Confirmation policy for destructive or irreversible steps.
//!
//! Every question the sweep asks has "yes" as its default answer.

use std::io::{self, BufRead, Write};

use clap::ValueEnum;

/// The decisions a sweep may need from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Delete log files left over from a previous invocation.
    RemoveStaleLogFiles(Vec<String>),
    /// Delete an existing log folder before recreating it.
    RemoveLogFolder(String),
    /// Apply the given array configuration to every block of an archive.
    UseConfigForAllBlocks(String),
    /// Keep the log folders once the sweep is finished.
    KeepLogFiles,
}

impl Prompt {
    pub fn question(&self) -> String {
        match self {
            Prompt::RemoveStaleLogFiles(files) => format!(
                "found existing log files (from previous run?):\n{}\nremove these log files?",
                files.join("\n")
            ),
            Prompt::RemoveLogFolder(folder) => format!("remove existing log folder {}?", folder),
            Prompt::UseConfigForAllBlocks(config) => format!(
                "ATTENTION: will use antenna configuration {} for all SBs. Do you want to proceed?",
                config
            ),
            Prompt::KeepLogFiles => "keep log files?".to_string(),
        }
    }
}

/// How prompts are answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ConfirmPolicy {
    /// Ask on the terminal.
    #[default]
    Ask,
    /// Delete stale artifacts and keep results without asking.
    Delete,
    /// Never delete anything; stale artifacts abort the sweep.
    Keep,
}

/// Something that answers the sweep's prompts.
pub trait Confirm {
    fn confirm(&self, prompt: &Prompt) -> io::Result<bool>;
}

impl ConfirmPolicy {
    /// Answer `prompt`, reading from stdin when the policy is [`ConfirmPolicy::Ask`].
    pub fn decide(&self, prompt: &Prompt) -> io::Result<bool> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        self.decide_with(prompt, &mut stdin.lock(), &mut stdout)
    }

    /// Like [`ConfirmPolicy::decide`], with the terminal replaced by `input`
    /// and `output`.
    pub fn decide_with<R: BufRead, W: Write>(&self, prompt: &Prompt, input: &mut R, output: &mut W) -> io::Result<bool> {
        match self {
            ConfirmPolicy::Ask => ask_yes_no(&prompt.question(), input, output),
            ConfirmPolicy::Delete => Ok(true),
            ConfirmPolicy::Keep => Ok(match prompt {
                Prompt::RemoveStaleLogFiles(_) | Prompt::RemoveLogFolder(_) => false,
                Prompt::UseConfigForAllBlocks(_) | Prompt::KeepLogFiles => true,
            }),
        }
    }
}

impl Confirm for ConfirmPolicy {
    fn confirm(&self, prompt: &Prompt) -> io::Result<bool> {
        self.decide(prompt)
    }
}

/// Ask a yes/no question with "yes" as the default.
///
/// Re-asks until the answer is empty, `y` or `n`. End of input counts as the
/// default.
pub fn ask_yes_no<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    writeln!(output, "{}", question)?;
    loop {
        write!(output, "([y]/n):")?;
        output.flush()?;
        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Ok(true);
        }
        match answer.trim() {
            "" | "y" => return Ok(true),
            "n" => return Ok(false),
            _ => continue,
        }
    }
}
