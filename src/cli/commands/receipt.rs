use crate::cli::advisory::Severity;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::receipt::{render_text, ExportFormat, ReceiptSink};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "receipt",
            "Show the receipt and offer to print it",
            "receipt",
            cmd_receipt,
        ),
        CommandEntry::new(
            "print",
            "Write a self-printing HTML receipt",
            "print",
            cmd_print,
        ),
        CommandEntry::new(
            "export",
            "Save the receipt without ending the session",
            "export [text|html]",
            cmd_export,
        ),
        CommandEntry::new(
            "finish",
            "Save the receipt and start a new list",
            "finish [text|html]",
            cmd_finish,
        ),
    ]
}

fn format_arg(context: &ShellContext, args: &[&str], usage: &str) -> Result<ExportFormat, CommandError> {
    match args {
        [] => Ok(context.config.default_export_format),
        [format] => Ok(format.parse()?),
        _ => Err(CommandError::usage(usage)),
    }
}

fn cmd_receipt(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let receipt = context.session.receipt(context.clock.as_ref());
    let style = context.config.receipt_style();
    output::plain(render_text(&receipt, &style).trim_end());

    if context.confirm("Print this receipt?", false)? {
        let path = context.exporter().print(&receipt)?;
        context.show_advisory(
            format!("Printable receipt written to {}.", path.display()),
            Severity::Success,
        );
    }
    Ok(())
}

fn cmd_print(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let receipt = context.session.receipt(context.clock.as_ref());
    let path = context.exporter().print(&receipt)?;
    context.show_advisory(
        format!("Printable receipt written to {}.", path.display()),
        Severity::Success,
    );
    Ok(())
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let format = format_arg(context, args, "export [text|html]")?;
    let receipt = context.session.receipt(context.clock.as_ref());
    let path = context.exporter().export(&receipt, format)?;
    context.show_advisory(
        format!("Receipt saved to {}.", path.display()),
        Severity::Success,
    );
    Ok(())
}

fn cmd_finish(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let format = format_arg(context, args, "finish [text|html]")?;
    if context.ledger().is_empty() && !context.session.has_budget() {
        output::info("Nothing to finish yet.");
        return Ok(());
    }
    let exporter = context.exporter();
    let path = context
        .session
        .finish(&exporter, format, context.clock.as_ref())?;
    context.show_advisory(
        format!("Receipt saved to {}.", path.display()),
        Severity::Success,
    );
    output::info("Session cleared. Set a new budget to start another list.");
    Ok(())
}
