use crate::models::HasName;
use crate::CommonOpts;
use crate::Error;

pub fn execute(options: &CommonOpts) -> Result<(), Error> {
    let list = options.currencies()?;
    let mut currencies = list.values().collect::<Vec<_>>();
    currencies.sort_by(|a, b| a.get_name().cmp(b.get_name()));
    for cur in currencies {
        let symbols = cur.symbols();
        if symbols.is_empty() {
            println!("{}", cur);
        } else {
            println!("{} {}", cur, symbols.join(" "));
        }
    }
    Ok(())
}
