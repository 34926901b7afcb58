use std::{
    io,
    os::unix::process::ExitStatusExt,
    process::{Command, Output},
};

use anyhow::{anyhow, Context, Error};
use log::trace;

use crate::crate_private::Sealed;

/// Describes how a finished (or never started) process ended.
fn explain(result: &io::Result<Output>) -> String {
    match result {
        Ok(output) => match (output.status.code(), output.status.signal()) {
            (Some(code), _) => format!("process exited with status: {code}"),
            (None, Some(signal)) => format!("process was terminated by signal: {signal}"),
            (None, None) => "process exited with unknown status".into(),
        },
        Err(e) => format!("Failed to execute process: {e}"),
    }
}

/// Collects whatever the process printed, stdout first.
fn report(output: &Output) -> String {
    let mut report = String::new();
    for (label, bytes) in [("stdout", &output.stdout), ("stderr", &output.stderr)] {
        let text = String::from_utf8_lossy(bytes);
        if text.is_empty() {
            continue;
        }
        if !report.is_empty() {
            report.push('\n');
        }
        report += &format!("{label}:\n{text}\n");
    }
    report
}

/// Runs a command and turns a non-zero exit into an error carrying the
/// process output.
///
/// This is a sealed trait, so it cannot be implemented outside of this crate.
pub trait RunAndCheck: Sealed {
    /// Run the command, discarding stdout on success.
    fn run_and_check(&mut self) -> Result<(), Error> {
        self.output_and_check().map(|_| ())
    }

    /// Run the command and return its stdout on success.
    fn output_and_check(&mut self) -> Result<String, Error>;

    /// Render the command line as a shell would show it.
    fn render_command(&self) -> String;
}

impl Sealed for Command {}

impl RunAndCheck for Command {
    fn output_and_check(&mut self) -> Result<String, Error> {
        let rendered = self.render_command();
        trace!("Executing '{rendered}'");

        let result = self.output();
        let explanation = explain(&result);
        let output = match result {
            Ok(output) => output,
            Err(_) => {
                return Err(anyhow!(explanation))
                    .with_context(|| format!("Error when running: {rendered}"))
            }
        };

        let captured = report(&output);
        trace!("Executed '{rendered}': {explanation}. Report:\n{captured}");

        if !output.status.success() {
            let detail = if captured.is_empty() {
                anyhow!("(No output was captured)")
            } else {
                anyhow!("Process output:\n{captured}")
            };
            return Err(detail
                .context(explanation)
                .context(format!("Error when running: {rendered}")));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into())
    }

    fn render_command(&self) -> String {
        std::iter::once(self.get_program().to_string_lossy())
            .chain(self.get_args().map(|arg| arg.to_string_lossy()))
            .map(|part| {
                if part.contains(' ') {
                    format!("'{part}'")
                } else {
                    part.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
