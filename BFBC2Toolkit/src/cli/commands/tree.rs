//! CLI command for the data tree

use std::path::Path;

use crate::tree::DataTree;

/// Print the data tree of a folder as text or JSON
pub fn show(folder: &Path, json: bool) -> anyhow::Result<()> {
    if !folder.is_dir() {
        anyhow::bail!("Not a folder: {}", folder.display());
    }

    let tree = DataTree::populate(folder)?;
    if json {
        println!("{}", tree.to_json()?);
    } else {
        print!("{}", tree.render());
        println!();
        println!("{} files, {} folders", tree.file_count(), tree.dir_count());
    }
    Ok(())
}
