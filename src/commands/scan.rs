use std::fs::read_to_string;
use std::io::Read;

use prettytable::{format, Cell, Row, Table};
use tracing::info;

use crate::models::{HasName, RateProvider};
use crate::parser::normalize;
use crate::CommonOpts;
use crate::Error;

/// Prints a table with every price found in the text, the input files or stdin
pub fn execute(options: &CommonOpts, text: Option<String>) -> Result<(), Error> {
    let scanner = options.scanner()?;
    let rates = options.rate_table()?;
    let display = options.display_format()?;

    let sources = match text {
        Some(x) => vec![x],
        None if options.input_files.is_empty() => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            vec![buffer]
        }
        None => {
            let mut sources = vec![];
            for file in options.input_files()? {
                info!(file = %file.display(), "scanning");
                sources.push(read_to_string(file)?);
            }
            sources
        }
    };

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(vec![
        Cell::new("Form"),
        Cell::new("Currency"),
        Cell::new("Text"),
        Cell::new("Amount").style_spec("r"),
        Cell::new("Converted").style_spec("r"),
    ]));
    let mut found = 0;
    for source in sources.iter() {
        for m in scanner.matches(source) {
            found += 1;
            let (amount, converted) = match normalize(m.raw_number()) {
                Ok(amount) => (
                    format!("{}", amount),
                    rates
                        .convert(m.currency(), amount)
                        .map(|x| display.format_amount(x))
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Err(e) => (format!("{}", e), "-".to_string()),
            };
            table.add_row(Row::new(vec![
                Cell::new(&m.form.kind().to_string()),
                Cell::new(m.currency().get_name()),
                Cell::new(m.text),
                Cell::new(&amount).style_spec("r"),
                Cell::new(&converted).style_spec("r"),
            ]));
        }
    }
    if found == 0 {
        println!("No prices found");
    } else {
        table.printstd();
    }
    Ok(())
}
