use std::path::PathBuf;

use tracing::info;

use crate::engine::Retagger;
use crate::parser::load_markup;
use crate::CommonOpts;
use crate::Error;

/// Tags a page and prints it
///
/// Passes start at `<body>`, or at the top of the document when there is none.
pub fn execute(options: &CommonOpts) -> Result<(), Error> {
    let files = options.input_files()?;
    let file: PathBuf = match files.as_slice() {
        [file] => file.clone(),
        [] => return Err(Error::new("tag needs an input file, use -f")),
        _ => return Err(Error::new("tag works on one file at a time")),
    };

    let mut document = load_markup(&file)?;
    let retagger = Retagger::new(options.scanner()?, options.rate_table()?, options.tag_options());
    let root = document
        .find_first("body")
        .unwrap_or_else(|| document.root());
    let report = retagger.pass(&mut document, root)?;
    info!(file = %file.display(), report = %report, "tagged");
    println!("{}", document.to_html(document.root()));
    Ok(())
}
