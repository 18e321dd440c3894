use anyhow::Result;
use clap::Parser;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tar::Builder;
use thiserror::Error;
use log::{debug, info};

// everything lands under this fixed prefix inside the archive,
// so extracting drops the folder into custom/AiTomaton/ no matter
// what the output file is called. the top segment happens to match
// the default output name below, they're unrelated.
const NEST_TOP: &str = "custom";
const NEST_SUB: &str = "AiTomaton";

const TAR_EXT: &str = ".tar";

#[derive(Parser, Debug)]
#[clap(about = "create an uncompressed tar archive nested under custom/AiTomaton/")]
#[clap(after_help = "example: tardir ./my_app_folder my_archive")]
pub struct Args {
    /// path to the folder to archive
    #[clap(default_value = "./dist")]
    source_folder: PathBuf,

    /// name for the tar archive,
    /// .tar gets appended if missing
    #[clap(default_value = "custom")]
    output_file: String,

    /// silent mode
    #[clap(long)]
    pub silent: bool,

    /// debug
    #[clap(long)]
    pub debug: bool,
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("source folder not found at '{}'", .0.display())]
    SourceNotFound(PathBuf),
    #[error("failed to write archive: {0}")]
    Write(#[from] io::Error),
}

pub struct Archiver {
    source_folder: PathBuf,
    output_file: String,
}

impl Archiver {
    pub fn new(args: Args) -> Self {
        Archiver {
            source_folder: args.source_folder,
            output_file: args.output_file,
        }
    }

    /// writes the archive and returns the path it ended up at
    pub fn create(&self) -> Result<PathBuf, ArchiveError> {
        if !self.source_folder.is_dir() {
            return Err(ArchiveError::SourceNotFound(self.source_folder.clone()));
        }
        let output = normalize_output_name(&self.output_file);
        let target = archive_target_path(&self.source_folder);
        info!("archiving {:?} into {} as {:?}", self.source_folder, output, target);
        let file = File::create(&output)?;
        let mut builder = Builder::new(file);
        builder.append_dir_all(&target, &self.source_folder)?;
        // into_inner writes the closing blocks and hands the file
        // back, which closes on drop before we report anything
        builder.into_inner()?;
        Ok(PathBuf::from(output))
    }
}

pub fn run(args: Args) -> Result<()> {
    let archiver = Archiver::new(args);
    match archiver.create() {
        Ok(path) => {
            debug!("archive written to {:?}", path);
            println!("Done");
        }
        // a missing source is a normal exit, not an error
        Err(e @ ArchiveError::SourceNotFound(_)) => println!("{e}"),
        Err(e) => {
            // printed line stays fixed, details go to the log
            debug!("archive creation failed: {e}");
            println!("failed to create archive");
        }
    }
    Ok(())
}

fn normalize_output_name(name: &str) -> String {
    if name.ends_with(TAR_EXT) {
        name.to_string()
    } else {
        format!("{name}{TAR_EXT}")
    }
}

fn archive_target_path(source: &Path) -> PathBuf {
    // components() already drops any trailing separator,
    // so "./dist/" still gives "dist"
    let base = source
        .components()
        .next_back()
        .map(|c| c.as_os_str().to_os_string())
        .unwrap_or_default();
    Path::new(NEST_TOP).join(NEST_SUB).join(base)
}
