use std::path::PathBuf;

use clap::{Args, Command};

#[derive(Args, Debug)]
pub struct ManArgs {
    /// Output directory (default: dist/share/man/man1)
    #[arg(long = "out-dir", default_value = "dist/share/man/man1")]
    pub out_dir: PathBuf,
}

/// Render `semtag.1` plus `semtag-<subcommand>.1` for each subcommand.
pub fn cmd_man(args: ManArgs) -> Result<(), String> {
    let out_dir = crate::prepare_out_dir(&args.out_dir)?;

    let cmd = semtag::command();
    let bin = semtag::BIN_NAME;
    crate::write_asset(&out_dir.join(format!("{bin}.1")), &render(cmd.clone())?)?;

    for subcommand in cmd.get_subcommands() {
        let name = subcommand.get_name();
        crate::write_asset(
            &out_dir.join(format!("{bin}-{name}.1")),
            &render(subcommand.clone())?,
        )?;
    }

    Ok(())
}

fn render(cmd: Command) -> Result<Vec<u8>, String> {
    let name = cmd.get_name().to_string();
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd)
        .render(&mut buffer)
        .map_err(|e| format!("render manpage for {name}: {e}"))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subcommand_renders() {
        let cmd = semtag::command();
        for subcommand in cmd.get_subcommands() {
            let page = render(subcommand.clone()).unwrap();
            assert!(!page.is_empty(), "{} rendered nothing", subcommand.get_name());
        }
    }
}
