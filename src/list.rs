use std::collections::hash_map::Values;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use crate::error::ListError;
use crate::models::{HasAliases, HasName};

/// A list of things with aliases
///
/// This structure holds the currencies the scanner looks for. Lookups are case insensitive,
/// both for names and for aliases, so `eur`, `EUR` and `€` can all lead to the same element.
///
/// It provides methods for:
/// - Adding new elements to the list
/// - Retrieving elements by name or alias
/// - Walking every element, which is what the scanner pattern is built from
#[derive(Debug, Clone)]
pub struct List<T> {
    aliases: HashMap<String, String>,
    list: HashMap<String, Rc<T>>,
}

impl<T: Eq + Hash + HasName + HasAliases + Debug> List<T> {
    pub fn new() -> Self {
        List {
            aliases: HashMap::new(),
            list: HashMap::new(),
        }
    }

    /// Inserts an ```element``` in the list
    ///
    /// Inserting an element whose name is already in the list does nothing. An alias that
    /// already belongs to another element is an error.
    pub fn insert(&mut self, element: T) -> Result<(), ListError> {
        let name = element.get_name().to_lowercase();
        if self.list.contains_key(&name) {
            return Ok(());
        }
        for alias in element.get_aliases().iter() {
            self.check_alias(alias, element.get_name())?;
        }
        for alias in element.get_aliases().iter() {
            self.aliases.insert(alias.to_lowercase(), name.clone());
        }
        self.list.insert(name, Rc::new(element));
        Ok(())
    }

    fn check_alias(&self, alias: &str, requested: &str) -> Result<(), ListError> {
        let key = alias.to_lowercase();
        let owner = match self.aliases.get(&key) {
            Some(x) => Some(x.clone()),
            None if self.list.contains_key(&key) => Some(key.clone()),
            None => None,
        };
        match owner {
            Some(x) if x != requested.to_lowercase() => Err(ListError::RepeatedAlias {
                alias: alias.to_string(),
                existing: x,
                requested: requested.to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub fn get(&self, index: &str) -> Result<&Rc<T>, ListError> {
        let key = index.to_lowercase();
        let found = match self.list.get(&key) {
            Some(x) => Some(x),
            None => self.aliases.get(&key).and_then(|x| self.list.get(x)),
        };
        found.ok_or_else(|| {
            ListError::AliasNotInList(format!(
                "{} {:?} not found",
                std::any::type_name::<T>(),
                index
            ))
        })
    }

    /// Every element name, as it was written
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.list.values().map(|x| x.get_name())
    }

    pub fn values(&self) -> Values<'_, String, Rc<T>> {
        self.list.values()
    }
    pub fn len(&self) -> usize {
        self.list.len()
    }
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl<T: Eq + Hash + HasName + HasAliases + Debug> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;

    #[test]
    fn list() {
        let mut list: List<Currency> = List::new();
        list.insert(Currency::with_symbols("EUR", &["€", "euro"])).unwrap();

        assert_eq!(list.get("eur").unwrap().get_name(), "EUR");
        assert_eq!(list.get("€").unwrap().get_name(), "EUR");
        assert_eq!(list.get("EURO").unwrap(), list.get("€").unwrap());
        assert_eq!(list.len(), 1);

        // Inserting the same name again keeps the first definition
        list.insert(Currency::from("eur")).unwrap();
        assert_eq!(list.get("euro").unwrap().get_name(), "EUR");

        // Retrieve an element that is not in the list
        assert!(list.get("usd").is_err());
    }

    #[test]
    fn repeated_alias() {
        let mut list: List<Currency> = List::new();
        list.insert(Currency::with_symbols("USD", &["$"])).unwrap();
        let res = list.insert(Currency::with_symbols("CAD", &["$"]));
        assert_eq!(
            res,
            Err(ListError::RepeatedAlias {
                alias: "$".to_string(),
                existing: "usd".to_string(),
                requested: "CAD".to_string(),
            })
        );
        // The failed insert left nothing behind
        assert!(list.get("cad").is_err());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn alias_cannot_shadow_a_name() {
        let mut list: List<Currency> = List::new();
        list.insert(Currency::from("EUR")).unwrap();
        assert!(list.insert(Currency::with_symbols("USD", &["eur"])).is_err());
        assert!(list.get("usd").is_err());
    }
}
