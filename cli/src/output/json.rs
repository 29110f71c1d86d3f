use anyhow::Result;
use recollate::ChangeSet;
use std::io::Write;

pub fn write_json_result<W: Write>(w: &mut W, result: &ChangeSet) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, result)?;
    writeln!(w)?;
    Ok(())
}
