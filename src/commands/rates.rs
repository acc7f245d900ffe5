use colored::Colorize;
use prettytable::{format, Cell, Row, Table};

use crate::models::{HasName, RateProvider};
use crate::CommonOpts;
use crate::Error;

pub fn execute(options: &CommonOpts) -> Result<(), Error> {
    let table = options.rate_table()?;
    let display = options.display_format()?;

    let mut output = Table::new();
    output.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    output.set_titles(Row::new(vec![
        Cell::new("Currency"),
        Cell::new("Rate").style_spec("r"),
        Cell::new(&format!("1 unit in {}", table.get_target())).style_spec("r"),
    ]));
    for (currency, rate) in table.rates() {
        output.add_row(Row::new(vec![
            Cell::new(currency.get_name()),
            Cell::new(&format!("{:.6}", rate)).style_spec("r"),
            Cell::new(&display.format_amount(rate)).style_spec("r"),
        ]));
    }
    output.printstd();

    match table.as_of() {
        Some(date) if table.is_stale(options.now(), options.max_rate_age()) => println!(
            "{}",
            format!("Rates are stale, newest quote from {}", date).yellow()
        ),
        Some(date) => println!("Rates as of {}", date),
        None => println!("{}", "No quotes".yellow()),
    }
    let mut unknown = options
        .currencies()?
        .values()
        .filter(|x| table.rate(x).is_none())
        .map(|x| x.get_name().to_string())
        .collect::<Vec<String>>();
    if !unknown.is_empty() {
        unknown.sort();
        println!("No rate for {}", unknown.join(", "));
    }
    Ok(())
}
